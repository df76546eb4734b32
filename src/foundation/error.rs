/// Crate-wide result alias.
pub type LyricResult<T> = Result<T, LyricError>;

/// Error taxonomy for track construction, layout and frame rendering.
///
/// Per-entry data problems (blank lines, too-short durations) are not errors: they are dropped
/// during preprocessing and only show up in logs.
#[derive(thiserror::Error, Debug)]
pub enum LyricError {
    /// Fatal construction-time misconfiguration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid input at an API boundary.
    #[error("validation error: {0}")]
    Validation(String),

    /// Rasterization or compositing failure.
    #[error("render error: {0}")]
    Render(String),

    /// Anything else, usually I/O surfaced by sinks or project loading.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LyricError {
    /// Build a [`LyricError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`LyricError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LyricError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
