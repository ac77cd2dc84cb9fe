use std::fmt;

pub const TAG_PREFIX: &str = "tag:";

/// Scope token granting access to every tag.
pub const TAG_WILDCARD: &str = "tag:*";

/// Payload of a `tag:<payload>` scope token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(String);

impl Tag {
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    /// Parses a full scope token; `None` if it is not a tag token.
    pub fn parse(token: &str) -> Option<Self> {
        token.strip_prefix(TAG_PREFIX).map(Self::new)
    }

    pub fn payload(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == "*"
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TAG_PREFIX}{}", self.0)
    }
}

pub fn is_tag(token: &str) -> bool {
    token.starts_with(TAG_PREFIX)
}
