//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Frames sampled per second of trimmed video unless configured otherwise.
pub const DEFAULT_SAMPLE_FPS: u32 = 30;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Motion extraction settings.
    #[serde(default)]
    pub analysis: AnalysisDefaults,

    /// Result playback settings.
    #[serde(default)]
    pub playback: PlaybackDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Motion extraction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisDefaults {
    /// Frames sampled per second of trimmed video.
    pub fps: u32,

    /// Minimum confidence for the pose model to report a new detection.
    pub min_detection_confidence: f64,

    /// Minimum confidence for the pose model to keep tracking a pose.
    pub min_tracking_confidence: f64,

    /// Pose model complexity (0 = lite, 1 = full, 2 = heavy).
    pub model_complexity: u8,

    /// Whether the pose model smooths landmarks across frames.
    pub smooth_landmarks: bool,

    /// Upper bound on a single clip seek.
    pub seek_timeout_ms: u64,

    /// Upper bound on a single pose estimation.
    pub estimate_timeout_ms: u64,
}

/// Result playback parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackDefaults {
    /// Overlay redraw rate while playing (Hz).
    pub refresh_hz: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "crete=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self {
            fps: DEFAULT_SAMPLE_FPS,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            model_complexity: 1,
            smooth_landmarks: true,
            seek_timeout_ms: 5_000,
            estimate_timeout_ms: 10_000,
        }
    }
}

impl Default for PlaybackDefaults {
    fn default() -> Self {
        Self { refresh_hz: 60 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AnalysisDefaults {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), crate::CreteError> {
        if self.fps == 0 {
            return Err(crate::CreteError::config("analysis.fps must be positive"));
        }
        for (name, value) in [
            ("min_detection_confidence", self.min_detection_confidence),
            ("min_tracking_confidence", self.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(crate::CreteError::config(format!(
                    "analysis.{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    ///
    /// Runs before logging is set up, so a file that could not be used is
    /// reported back as a warning for the caller to log once it can.
    pub fn load() -> (Self, Option<String>) {
        Self::load_from(&config_file_path())
    }

    /// Load config from `path`. A missing file is not a warning.
    pub fn load_from(path: &Path) -> (Self, Option<String>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        let warning = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => return (config, None),
                Err(e) => format!("Failed to parse config at {}: {e}", path.display()),
            },
            Err(e) => format!("Failed to read config at {}: {e}", path.display()),
        };
        (Self::default(), Some(warning))
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("crete").join("config.json")
}
