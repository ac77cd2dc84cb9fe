//! Catalogue of plain permission tokens understood by this service.

use super::tag::TAG_WILDCARD;

pub const TOKEN_USER_READ: &str = "user:r";
pub const TOKEN_USER_WRITE: &str = "user:w";
pub const TOKEN_USER_QUERY: &str = "user:q";
pub const TOKEN_PERMISSION_READ: &str = "perm:r";
pub const TOKEN_PERMISSION_WRITE: &str = "perm:w";
pub const TOKEN_RECORD_READ: &str = "rec:r";
pub const TOKEN_RECORD_WRITE: &str = "rec:w";
pub const TOKEN_ATTACHMENT_READ: &str = "attachment:r";
pub const TOKEN_ATTACHMENT_WRITE: &str = "attachment:w";
pub const TOKEN_APP_KEYS_READ: &str = "appkeys:r";
pub const TOKEN_APP_KEYS_CREATE: &str = "appkeys:c";
pub const TOKEN_TAGS: &str = TAG_WILDCARD;

pub const KNOWN_TOKENS: &[&str] = &[
    TOKEN_USER_READ,
    TOKEN_USER_WRITE,
    TOKEN_USER_QUERY,
    TOKEN_PERMISSION_READ,
    TOKEN_PERMISSION_WRITE,
    TOKEN_RECORD_READ,
    TOKEN_RECORD_WRITE,
    TOKEN_ATTACHMENT_READ,
    TOKEN_ATTACHMENT_WRITE,
    TOKEN_APP_KEYS_READ,
    TOKEN_APP_KEYS_CREATE,
    TOKEN_TAGS,
];

pub fn is_known(token: &str) -> bool {
    KNOWN_TOKENS.contains(&token)
}
