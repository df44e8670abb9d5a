//! Error types shared across Crete crates.

use std::path::PathBuf;

/// Top-level error type for Crete operations.
///
/// A frame without a detected pose is not represented here: estimators
/// report it as `Ok(None)` and the run carries on.
#[derive(Debug, thiserror::Error)]
pub enum CreteError {
    #[error("Clip not ready: {message}")]
    ClipNotReady { message: String },

    #[error("Pose estimator unavailable: {message}")]
    EstimatorUnavailable { message: String },

    #[error("Narration failed: {message}")]
    Narration { message: String },

    #[error("Invalid trim window: {message}")]
    InvalidTrim { message: String },

    #[error("{operation} timed out after {after_ms} ms")]
    Timeout { operation: String, after_ms: u64 },

    #[error("Extraction run {generation} was cancelled")]
    Cancelled { generation: u64 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Pose track error: {message}")]
    Replay { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using CreteError.
pub type CreteResult<T> = Result<T, CreteError>;

impl CreteError {
    pub fn clip_not_ready(msg: impl Into<String>) -> Self {
        Self::ClipNotReady {
            message: msg.into(),
        }
    }

    pub fn estimator_unavailable(msg: impl Into<String>) -> Self {
        Self::EstimatorUnavailable {
            message: msg.into(),
        }
    }

    pub fn narration(msg: impl Into<String>) -> Self {
        Self::Narration {
            message: msg.into(),
        }
    }

    pub fn invalid_trim(msg: impl Into<String>) -> Self {
        Self::InvalidTrim {
            message: msg.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, after_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            after_ms,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn replay(msg: impl Into<String>) -> Self {
        Self::Replay {
            message: msg.into(),
        }
    }

    /// Whether the error disables video analysis entirely rather than
    /// failing a single run.
    pub fn is_fatal_for_feature(&self) -> bool {
        matches!(self, Self::EstimatorUnavailable { .. })
    }

    /// Whether this error is the expected outcome of a superseded run.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Short message suitable for showing to the skater.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ClipNotReady { .. } => "Video is still loading, try again in a moment",
            Self::EstimatorUnavailable { .. } => "Tracking unavailable",
            Self::Narration { .. } => "Analysis failed, please retry",
            Self::InvalidTrim { .. } => "Pick a valid section of the video",
            Self::Timeout { .. } => "Video analysis stalled, please retry",
            Self::Cancelled { .. } => "Analysis cancelled",
            _ => "Something went wrong",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_estimator_unavailable_is_fatal() {
        assert!(CreteError::estimator_unavailable("missing model").is_fatal_for_feature());
        assert!(!CreteError::clip_not_ready("loading").is_fatal_for_feature());
        assert!(!CreteError::Cancelled { generation: 3 }.is_fatal_for_feature());
    }

    #[test]
    fn test_superseded_run_is_not_a_failure() {
        let err = CreteError::Cancelled { generation: 7 };
        assert!(err.is_cancelled());
        assert_eq!(err.user_message(), "Analysis cancelled");
        assert!(!CreteError::timeout("seek", 10).is_cancelled());
        assert!(!CreteError::estimator_unavailable("x").is_cancelled());
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            CreteError::estimator_unavailable("x").user_message(),
            "Tracking unavailable"
        );
        assert_eq!(
            CreteError::narration("bad json").user_message(),
            "Analysis failed, please retry"
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = CreteError::timeout("seek to 1.50s", 5000);
        assert_eq!(err.to_string(), "seek to 1.50s timed out after 5000 ms");
    }
}
