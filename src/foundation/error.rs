/// Convenience result type used across webvfx.
pub type VfxResult<T> = Result<T, VfxError>;

/// Top-level error taxonomy used by the effect entry points and the content capability.
#[derive(thiserror::Error, Debug)]
pub enum VfxError {
    /// Invalid user-provided configuration or data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The host pipeline could not produce a frame buffer.
    #[error("buffer error: {0}")]
    Buffer(String),

    /// The content engine could not be created, loaded or resized.
    #[error("content error: {0}")]
    Content(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VfxError {
    /// Build a [`VfxError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`VfxError::Buffer`] value.
    pub fn buffer(msg: impl Into<String>) -> Self {
        Self::Buffer(msg.into())
    }

    /// Build a [`VfxError::Content`] value.
    pub fn content(msg: impl Into<String>) -> Self {
        Self::Content(msg.into())
    }

    /// Build a [`VfxError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Non-zero error code reported to the host pipeline for this error.
    ///
    /// Buffer-fetch failures keep their own code; everything else is the generic `1`.
    pub fn code(&self) -> i32 {
        match self {
            Self::Buffer(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
