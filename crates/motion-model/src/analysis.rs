//! Structured trick verdict returned by narration.

use serde::{Deserialize, Deserializer, Serialize};

/// Score above which a trick counts as landed.
///
/// Calibration origin unknown; kept as-is so stored results compare
/// consistently.
pub const LANDED_SCORE_THRESHOLD: u8 = 40;

/// Trick identification and coaching feedback for one analyzed clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrickAnalysis {
    /// Identified trick, e.g. "Kickflip".
    pub trick_name: String,

    /// Identification confidence in [0.0, 1.0].
    #[serde(default)]
    pub confidence: f64,

    /// Free-text description of the board's motion.
    #[serde(rename = "board_physics", default)]
    pub board_physics: String,

    /// Execution score in [0, 100].
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u8,

    /// Estimated peak height of the board in meters.
    #[serde(default)]
    pub height_meters: f64,

    /// Coaching feedback.
    #[serde(default)]
    pub feedback_text: String,

    /// One concrete thing to work on next.
    #[serde(default)]
    pub improvement_tip: String,
}

impl TrickAnalysis {
    /// Whether the score clears [`LANDED_SCORE_THRESHOLD`].
    pub fn is_landed(&self) -> bool {
        self.score > LANDED_SCORE_THRESHOLD
    }

    /// Check value ranges a well-formed verdict must respect.
    pub fn validate(&self) -> Result<(), String> {
        if self.trick_name.trim().is_empty() {
            return Err("trickName is empty".to_string());
        }
        if self.score > 100 {
            return Err(format!("score {} exceeds 100", self.score));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!("confidence {} outside [0, 1]", self.confidence));
        }
        if !self.height_meters.is_finite() || self.height_meters < 0.0 {
            return Err(format!("heightMeters {} is not a height", self.height_meters));
        }
        Ok(())
    }
}

/// Accept whole or fractional scores (`72` and `72.0` alike), rounded to
/// the nearest point. The 0..=100 range is left to [`TrickAnalysis::validate`].
fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    let rounded = raw.round();
    if !rounded.is_finite() || !(0.0..=u8::MAX as f64).contains(&rounded) {
        return Err(serde::de::Error::custom(format!(
            "score {raw} is not a point score"
        )));
    }
    Ok(rounded as u8)
}
