//! Crete Trace Player
//!
//! Replays a built [`MotionTrace`] in step with result playback:
//!
//! ```text
//! PlaybackClock ──time──▶ loop_correct ──▶ nearest_frame ──record──▶ render_overlay
//!       ▲                     │                                          │
//!       └──── seek(start) ────┘                                          ▼
//!                                                                 OverlaySurface
//! ```
//!
//! The render loop ticks at the configured refresh rate while the playing
//! flag is set and stops as soon as it is cleared or its sender is gone.
//!
//! [`MotionTrace`]: crete_motion_model::MotionTrace

pub mod overlay;
pub mod player;
pub mod render_loop;

pub use overlay::{render_overlay, Color, DrawCommand, DrawCommandRecorder, OverlaySurface};
pub use player::{loop_correct, nearest_frame, PlayerTick, TracePlayer};
pub use render_loop::{run_render_loop, RenderLoopReport};
