//! Motion trace building.
//!
//! Drives the sampler, estimator, and kinematics one frame at a time and
//! records the result. The run token is checked after every suspension so
//! a superseded run issues no further seeks or estimates, and a result
//! that arrives after supersession is dropped.

use std::time::Duration;

use crete_common::config::AnalysisDefaults;
use crete_common::error::{CreteError, CreteResult};
use crete_motion_model::trace::{MotionTrace, TraceWriter, TrimWindow};

use crate::estimator::EstimatorAdapter;
use crate::kinematics::derive_kinematics;
use crate::run::RunToken;
use crate::sampler::{FrameSampler, VideoClip};

/// Progress callback invoked after every processed frame.
pub type ProgressCallback = Box<dyn Fn(ExtractionProgress) + Send + Sync>;

/// Extraction progress report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionProgress {
    /// Run the report belongs to.
    pub generation: u64,

    /// Elapsed share of the trim window, 0 to 100.
    pub percent: u8,

    /// Frames processed so far.
    pub frames_processed: usize,

    /// Frames the run will process in total.
    pub total_frames: usize,
}

/// Percentage of `trim` covered at `time_secs`.
pub fn progress_percent(trim: TrimWindow, time_secs: f64) -> u8 {
    (trim.elapsed_fraction(time_secs) * 100.0).clamp(0.0, 100.0).round() as u8
}

/// Builds one [`MotionTrace`] per sampler run.
pub struct TraceBuilder<'e> {
    estimator: &'e mut EstimatorAdapter,
    token: RunToken,
    progress: Option<ProgressCallback>,
}

impl<'e> TraceBuilder<'e> {
    pub fn new(estimator: &'e mut EstimatorAdapter, token: RunToken) -> Self {
        Self {
            estimator,
            token,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Consume every frame from `sampler` and assemble the trace.
    ///
    /// Frames without a pose are recorded with no landmarks; they never
    /// end the run. A sampler that yields nothing produces an empty trace.
    pub async fn build<C: VideoClip + ?Sized>(
        mut self,
        mut sampler: FrameSampler<'_, C>,
    ) -> CreteResult<MotionTrace> {
        let generation = self.token.generation();
        let trim = sampler.trim();
        let total_frames = sampler.total_frames();
        let mut writer = TraceWriter::new(trim, sampler.fps());
        let mut no_pose_streak = 0usize;

        tracing::info!(
            generation,
            start = trim.start,
            end = trim.end,
            frames = total_frames,
            "Motion extraction started"
        );

        loop {
            self.token.ensure_current()?;

            let Some((time, frame)) = sampler.next_frame().await? else {
                break;
            };
            self.token.ensure_current()?;

            let landmarks = self.estimator.estimate(frame).await?;
            if !self.token.is_current() {
                tracing::debug!(generation, time_secs = time, "Dropping estimate from superseded run");
                return Err(CreteError::Cancelled { generation });
            }

            if landmarks.is_some() {
                if no_pose_streak > 0 {
                    tracing::debug!(generation, frames = no_pose_streak, "Pose reacquired");
                }
                no_pose_streak = 0;
            } else {
                no_pose_streak += 1;
            }

            let sample = derive_kinematics(landmarks.as_ref(), time);
            writer
                .push(landmarks, sample)
                .map_err(|e| CreteError::Other(e.into()))?;

            if let Some(cb) = &self.progress {
                cb(ExtractionProgress {
                    generation,
                    percent: progress_percent(trim, time),
                    frames_processed: writer.len(),
                    total_frames,
                });
            }
        }

        let trace = writer.finish();
        tracing::info!(
            generation,
            frames = trace.len(),
            detected = trace.detected_frames(),
            "Motion extraction finished"
        );
        Ok(trace)
    }
}

/// Sample `clip` over `trim` and build its motion trace with the
/// configured frame rate and timeouts.
pub async fn extract_motion_trace<C: VideoClip + ?Sized>(
    clip: &mut C,
    trim: TrimWindow,
    config: &AnalysisDefaults,
    estimator: &mut EstimatorAdapter,
    token: RunToken,
    progress: Option<ProgressCallback>,
) -> CreteResult<MotionTrace> {
    config.validate()?;
    let sampler = FrameSampler::new(
        clip,
        trim,
        config.fps,
        Duration::from_millis(config.seek_timeout_ms),
    )?;

    let mut builder = TraceBuilder::new(estimator, token);
    if let Some(progress) = progress {
        builder = builder.with_progress(progress);
    }
    builder.build(sampler).await
}
