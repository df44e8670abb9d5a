//! Crete Pose Pipeline
//!
//! Turns a trimmed video clip into a [`MotionTrace`]:
//!
//! ```text
//! VideoClip ──seek/read──▶ FrameSampler ──frame──▶ EstimatorAdapter
//!                                                        │ landmarks | none
//!                                                        ▼
//!                            TraceBuilder ◀──sample── kinematics
//!                                 │
//!                                 ▼
//!                            MotionTrace ──table──▶ NarrationService
//! ```
//!
//! Everything inside one run is strictly sequential: one outstanding seek,
//! then one outstanding estimation, per frame. A [`RunToken`] is checked
//! after every suspension so a superseded run stops at its next step.
//!
//! [`MotionTrace`]: crete_motion_model::MotionTrace

pub mod builder;
pub mod estimator;
pub mod kinematics;
pub mod narration;
pub mod replay;
pub mod run;
pub mod sampler;

pub use builder::{extract_motion_trace, ExtractionProgress, ProgressCallback, TraceBuilder};
pub use estimator::{EstimatorAdapter, EstimatorOptions, PoseModel};
pub use kinematics::derive_kinematics;
pub use narration::{narrate, NarrationRequest, NarrationService};
pub use replay::PoseTrack;
pub use run::{RunRegistry, RunToken};
pub use sampler::{FrameSampler, RasterFrame, VideoClip};
