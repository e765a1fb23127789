use thiserror::Error;

/// Errors surfaced by header ingestion and mutation.
///
/// All failures are synchronous and propagate immediately to the caller; the
/// engine never retries. Unknown header names and unresolved compression
/// indices are *not* errors, they take defined fallback paths instead.
#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("content-length header appears more than once")]
    DuplicateContentLength,

    #[error("forbidden character in value of header `{name}`")]
    ForbiddenValueChar { name: String },

    #[error("headers are read-only")]
    ReadOnly,
}

impl HeaderError {
    pub fn invalid_content_length<S: ToString>(reason: S) -> Self {
        Self::InvalidContentLength { reason: reason.to_string() }
    }

    pub fn forbidden_char<S: ToString>(name: S) -> Self {
        Self::ForbiddenValueChar { name: name.to_string() }
    }
}
