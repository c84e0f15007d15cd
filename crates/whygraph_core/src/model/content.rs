//! Shared content validation for concerns and nodes.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum content length for concerns and nodes, counted in chars.
pub const CONTENT_MAX_CHARS: usize = 40;

/// Validation failure for user-supplied content fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// Content is empty or whitespace-only after trimming.
    Blank,
    /// Content exceeds the character cap.
    TooLong { max: usize, actual: usize },
}

impl Display for ContentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank => write!(f, "content must not be blank"),
            Self::TooLong { max, actual } => {
                write!(f, "content is {actual} chars, limit is {max}")
            }
        }
    }
}

impl Error for ContentError {}

/// Trims and validates a content field.
///
/// # Contract
/// - Leading/trailing whitespace is stripped before persistence.
/// - Blank content and content over [`CONTENT_MAX_CHARS`] are rejected.
pub fn normalize_content(raw: &str) -> Result<String, ContentError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ContentError::Blank);
    }
    let actual = trimmed.chars().count();
    if actual > CONTENT_MAX_CHARS {
        return Err(ContentError::TooLong {
            max: CONTENT_MAX_CHARS,
            actual,
        });
    }
    Ok(trimmed.to_string())
}
