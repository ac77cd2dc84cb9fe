use std::fmt;

pub const EXTENDED_PREFIX: &str = "ext:";

const MAX_NAME_LEN: usize = 32;

/// Name of an `ext:<name>` scope token; capabilities outside the known catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtendedToken(String);

impl ExtendedToken {
    /// Parses a full scope token; `None` unless the name matches `[a-zA-Z:]{1,32}`.
    pub fn parse(token: &str) -> Option<Self> {
        let name = token.strip_prefix(EXTENDED_PREFIX)?;
        is_valid_name(name).then(|| Self(name.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtendedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{EXTENDED_PREFIX}{}", self.0)
    }
}

fn is_valid_name(name: &str) -> bool {
    (1..=MAX_NAME_LEN).contains(&name.len())
        && name.bytes().all(|b| b.is_ascii_alphabetic() || b == b':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_letters_and_colons() {
        let token = ExtendedToken::parse("ext:reports:Export").expect("extended");
        assert_eq!(token.name(), "reports:Export");
        assert_eq!(token.to_string(), "ext:reports:Export");
    }

    #[test]
    fn rejects_bad_names() {
        assert!(ExtendedToken::parse("ext:").is_none());
        assert!(ExtendedToken::parse("ext:foo_bar").is_none());
        assert!(ExtendedToken::parse("ext:v2").is_none());
        assert!(ExtendedToken::parse(&format!("ext:{}", "a".repeat(33))).is_none());
        assert!(ExtendedToken::parse(&format!("ext:{}", "a".repeat(32))).is_some());
        assert!(ExtendedToken::parse("extension:foo").is_none());
    }
}
