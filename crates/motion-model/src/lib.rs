//! Crete Motion Model
//!
//! Defines the data contracts of the trick-analysis pipeline:
//! - **Landmarks:** Per-frame body keypoints and the pose skeleton topology
//! - **Trace:** Trim windows, kinematic samples, and the motion trace with its tabular export
//! - **Analysis:** The structured trick verdict returned by narration
//! - **State:** The analysis view state and its pure reducer
//!
//! All landmark coordinates are normalized to `[0.0, 1.0]` relative to the
//! video frame, origin at the top-left.

pub mod analysis;
pub mod landmark;
pub mod state;
pub mod trace;

pub use analysis::*;
pub use landmark::*;
pub use state::*;
pub use trace::*;
