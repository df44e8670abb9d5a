//! Landmark estimator adapter.
//!
//! Wraps an external pose model behind a request/response call. The model
//! keeps temporal smoothing state between frames, so the adapter takes
//! `&mut self` per estimate: a second request cannot be issued until the
//! first has resolved, and one adapter cannot serve two runs at once.

use std::time::Duration;

use async_trait::async_trait;
use crete_common::config::AnalysisDefaults;
use crete_common::error::{CreteError, CreteResult};
use crete_motion_model::landmark::{Landmark, PoseLandmarks};

use crate::sampler::RasterFrame;

/// Fixed configuration handed to the pose model once at start-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorOptions {
    pub min_detection_confidence: f64,
    pub min_tracking_confidence: f64,
    pub model_complexity: u8,
    pub smooth_landmarks: bool,
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        Self::from(&AnalysisDefaults::default())
    }
}

impl From<&AnalysisDefaults> for EstimatorOptions {
    fn from(defaults: &AnalysisDefaults) -> Self {
        Self {
            min_detection_confidence: defaults.min_detection_confidence,
            min_tracking_confidence: defaults.min_tracking_confidence,
            model_complexity: defaults.model_complexity,
            smooth_landmarks: defaults.smooth_landmarks,
        }
    }
}

/// An external pose-estimation capability.
#[async_trait]
pub trait PoseModel: Send {
    /// Model name for logging.
    fn name(&self) -> &str;

    /// Load the model. Any error means the model cannot be used at all.
    async fn initialize(&mut self, options: &EstimatorOptions) -> CreteResult<()>;

    /// Estimate the pose in one frame. `Ok(None)` means no pose was found.
    async fn detect(&mut self, frame: &RasterFrame) -> CreteResult<Option<Vec<Landmark>>>;

    /// Release model resources.
    fn close(&mut self);
}

/// Single-request-at-a-time front for a [`PoseModel`].
///
/// The model is closed when the adapter is closed or dropped.
pub struct EstimatorAdapter {
    model: Box<dyn PoseModel>,
    options: EstimatorOptions,
    timeout: Duration,
    estimates: u64,
    closed: bool,
}

impl EstimatorAdapter {
    /// Initialize `model` with `options`.
    ///
    /// An initialization failure is reported as
    /// [`CreteError::EstimatorUnavailable`].
    pub async fn open(
        mut model: Box<dyn PoseModel>,
        options: EstimatorOptions,
        timeout: Duration,
    ) -> CreteResult<Self> {
        let init = tokio::time::timeout(timeout, model.initialize(&options)).await;
        let result = match init {
            Ok(result) => result,
            Err(_) => Err(CreteError::timeout(
                "pose model initialization",
                timeout.as_millis() as u64,
            )),
        };

        if let Err(e) = result {
            tracing::warn!(model = model.name(), error = %e, "Pose model failed to initialize");
            model.close();
            return Err(CreteError::estimator_unavailable(format!(
                "{}: {e}",
                model.name()
            )));
        }

        tracing::info!(
            model = model.name(),
            min_detection_confidence = options.min_detection_confidence,
            min_tracking_confidence = options.min_tracking_confidence,
            "Pose estimator ready"
        );

        Ok(Self {
            model,
            options,
            timeout,
            estimates: 0,
            closed: false,
        })
    }

    pub fn options(&self) -> &EstimatorOptions {
        &self.options
    }

    /// Estimates completed so far.
    pub fn estimates(&self) -> u64 {
        self.estimates
    }

    /// Estimate landmarks for one frame.
    ///
    /// A frame without a pose yields `Ok(None)`; a result containing
    /// unusable values is treated the same way.
    pub async fn estimate(&mut self, frame: &RasterFrame) -> CreteResult<Option<PoseLandmarks>> {
        let detected = match tokio::time::timeout(self.timeout, self.model.detect(frame)).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(time_secs = frame.pts_secs, "Pose estimation stalled");
                return Err(CreteError::timeout(
                    format!("pose estimation at {:.2}s", frame.pts_secs),
                    self.timeout.as_millis() as u64,
                ));
            }
        };
        self.estimates += 1;

        Ok(detected.and_then(PoseLandmarks::new))
    }

    /// Release the model now rather than on drop.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.model.close();
            tracing::debug!(model = self.model.name(), estimates = self.estimates, "Pose estimator closed");
        }
    }
}

impl Drop for EstimatorAdapter {
    fn drop(&mut self) {
        self.release();
    }
}
