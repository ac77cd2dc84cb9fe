use std::{
    io::Read,
    path::{Path, PathBuf},
};

use super::error::KeyStoreError;

pub const DEFAULT_FILE_NAME: &str = "config";

const EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Where a credential store reads its key document from.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// A single file.
    File(PathBuf),
    /// First `<dir>/<file_name>.{yaml,yml}` that exists, dirs tried in order.
    Search {
        dirs: Vec<PathBuf>,
        file_name: String,
    },
    /// Document held in memory. Never watched.
    Memory(String),
}

/// Raw document plus the file it came from, if any.
#[derive(Debug)]
pub struct LoadedSource {
    pub path: Option<PathBuf>,
    pub contents: String,
}

impl KeySource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn search<I, P>(dirs: I, file_name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::Search {
            dirs: dirs.into_iter().map(Into::into).collect(),
            file_name: file_name.into(),
        }
    }

    pub fn from_reader(mut reader: impl Read) -> std::io::Result<Self> {
        let mut contents = String::new();
        reader.read_to_string(&mut contents)?;
        Ok(Self::Memory(contents))
    }

    /// File backing this source, `Ok(None)` for in-memory documents.
    pub fn resolve(&self) -> Result<Option<PathBuf>, KeyStoreError> {
        match self {
            Self::File(path) => {
                if path.is_file() {
                    Ok(Some(path.clone()))
                } else {
                    Err(KeyStoreError::SourceNotFound {
                        file_name: display_name(path),
                        searched: vec![path.clone()],
                    })
                }
            }
            Self::Search { dirs, file_name } => {
                let candidates: Vec<PathBuf> = dirs
                    .iter()
                    .flat_map(|dir| {
                        EXTENSIONS
                            .iter()
                            .map(move |ext| dir.join(format!("{file_name}.{ext}")))
                    })
                    .collect();

                match candidates.iter().find(|p| p.is_file()) {
                    Some(found) => Ok(Some(found.clone())),
                    None => Err(KeyStoreError::SourceNotFound {
                        file_name: file_name.clone(),
                        searched: candidates,
                    }),
                }
            }
            Self::Memory(_) => Ok(None),
        }
    }

    pub fn load(&self) -> Result<LoadedSource, KeyStoreError> {
        if let Self::Memory(contents) = self {
            return Ok(LoadedSource {
                path: None,
                contents: contents.clone(),
            });
        }

        let path = self.resolve()?;
        let Some(path) = path else {
            return Err(KeyStoreError::Malformed("source has no backing file".into()));
        };

        let contents = std::fs::read_to_string(&path).map_err(|e| KeyStoreError::Read {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(LoadedSource {
            path: Some(path),
            contents,
        })
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
