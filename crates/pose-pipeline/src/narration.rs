//! Narration service seam.
//!
//! The narration service is an external generative model that watches the
//! clip, reads the motion table, and answers with a JSON verdict. This
//! module assembles the request and turns the raw completion into a
//! [`TrickAnalysis`]. It does not retry; any failure is reported as
//! [`CreteError::Narration`] and the caller keeps its motion trace.

use async_trait::async_trait;
use crete_common::error::{CreteError, CreteResult};
use crete_motion_model::analysis::TrickAnalysis;
use crete_motion_model::trace::{MotionTrace, TrimWindow};

/// Everything the narration service is given for one clip.
#[derive(Debug, Clone)]
pub struct NarrationRequest {
    /// Original video bytes.
    pub video: Vec<u8>,

    /// MIME type of `video`, e.g. "video/mp4".
    pub mime_type: String,

    /// Section of the video that was analyzed.
    pub trim: TrimWindow,

    /// Trick the skater says they attempted, if any.
    pub trick_hint: Option<String>,

    /// Feedback the skater gave on earlier verdicts, oldest first.
    pub feedback_history: Vec<String>,

    /// Tabular export of the motion trace.
    pub motion_table: String,
}

impl NarrationRequest {
    pub fn new(video: Vec<u8>, mime_type: impl Into<String>, trace: &MotionTrace) -> Self {
        Self {
            video,
            mime_type: mime_type.into(),
            trim: trace.trim(),
            trick_hint: None,
            feedback_history: Vec::new(),
            motion_table: trace.to_table(),
        }
    }

    pub fn with_trick_hint(mut self, hint: impl Into<String>) -> Self {
        let hint = hint.into();
        self.trick_hint = (!hint.trim().is_empty()).then_some(hint);
        self
    }

    pub fn with_feedback_history(mut self, history: Vec<String>) -> Self {
        self.feedback_history = history;
        self
    }

    /// Instruction text sent alongside the video.
    pub fn prompt(&self) -> String {
        let mut prompt = format!(
            "You are a skateboarding coach. Analyze the trick performed between \
             {:.2}s and {:.2}s of the attached video.\n",
            self.trim.start, self.trim.end
        );

        if let Some(hint) = &self.trick_hint {
            prompt.push_str(&format!("The skater says they attempted: {hint}.\n"));
        }

        if !self.feedback_history.is_empty() {
            prompt.push_str("Corrections the skater gave on earlier analyses:\n");
            for feedback in &self.feedback_history {
                prompt.push_str(&format!("- {feedback}\n"));
            }
        }

        prompt.push_str(
            "Pose tracking data (normalized coordinates, y grows downward, \
             angles in degrees):\n",
        );
        prompt.push_str(&self.motion_table);
        prompt.push_str(
            "\n\nRespond with JSON only, shaped as: {\"trickName\": string, \
             \"confidence\": number 0-1, \"board_physics\": string, \"score\": integer 0-100, \
             \"heightMeters\": number, \"feedbackText\": string, \"improvementTip\": string}",
        );
        prompt
    }
}

/// An external completion capability.
#[async_trait]
pub trait NarrationService: Send + Sync {
    /// Service name for logging.
    fn name(&self) -> &str;

    /// Return the raw completion text for `request`.
    async fn complete(&self, request: &NarrationRequest) -> CreteResult<String>;
}

/// Request a verdict and parse it.
pub async fn narrate(
    service: &dyn NarrationService,
    request: &NarrationRequest,
) -> CreteResult<TrickAnalysis> {
    tracing::info!(
        service = service.name(),
        video_bytes = request.video.len(),
        hint = request.trick_hint.as_deref().unwrap_or(""),
        "Requesting narration"
    );

    let text = match service.complete(request).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(service = service.name(), error = %e, "Narration call failed");
            return Err(match e {
                e @ CreteError::Narration { .. } => e,
                other => CreteError::narration(other.to_string()),
            });
        }
    };

    let analysis = parse_trick_analysis(&text).map_err(|e| {
        tracing::warn!(service = service.name(), error = %e, "Narration response unusable");
        e
    })?;
    tracing::info!(
        trick = %analysis.trick_name,
        score = analysis.score,
        landed = analysis.is_landed(),
        "Narration complete"
    );
    Ok(analysis)
}

/// Parse a completion into a verdict.
///
/// Models often wrap JSON in prose or a fenced block; only the outermost
/// `{ ... }` span is read.
pub fn parse_trick_analysis(text: &str) -> CreteResult<TrickAnalysis> {
    let (Some(open), Some(close)) = (text.find('{'), text.rfind('}')) else {
        return Err(CreteError::narration("response contains no JSON object"));
    };
    if close < open {
        return Err(CreteError::narration("response contains no JSON object"));
    }

    let analysis: TrickAnalysis = serde_json::from_str(&text[open..=close])
        .map_err(|e| CreteError::narration(format!("malformed verdict: {e}")))?;
    analysis.validate().map_err(CreteError::narration)?;
    Ok(analysis)
}
