//! Redraw loop for result playback.

use std::time::Duration;

use crete_common::clock::PlaybackClock;
use crete_common::error::{CreteError, CreteResult};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::overlay::{render_overlay, OverlaySurface};
use crate::player::TracePlayer;

/// Summary of one render loop session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderLoopReport {
    /// Overlay frames drawn.
    pub frames_drawn: u64,

    /// Passes through the trim window completed during the session.
    pub loops: u64,
}

/// Redraw the overlay at `refresh_hz` while `playing` holds `true`.
///
/// Returns as soon as the flag turns `false` or its sender is dropped; no
/// further frames are drawn after that.
pub async fn run_render_loop<C, S>(
    player: &mut TracePlayer<C>,
    surface: &mut S,
    refresh_hz: u32,
    mut playing: watch::Receiver<bool>,
) -> CreteResult<RenderLoopReport>
where
    C: PlaybackClock,
    S: OverlaySurface + ?Sized,
{
    if refresh_hz == 0 {
        return Err(CreteError::config("refresh rate must be at least 1 Hz"));
    }

    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / refresh_hz as f64));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let loops_before = player.loops();
    let mut report = RenderLoopReport::default();
    tracing::debug!(refresh_hz, "Render loop started");

    loop {
        if !*playing.borrow_and_update() {
            break;
        }

        tokio::select! {
            biased;

            changed = playing.changed() => {
                if changed.is_err() {
                    tracing::debug!("Playback handle dropped");
                    break;
                }
            }
            _ = ticker.tick() => {
                let tick = player.tick();
                render_overlay(surface, tick.frame);
                report.frames_drawn += 1;
            }
        }
    }

    report.loops = player.loops() - loops_before;
    tracing::debug!(
        frames = report.frames_drawn,
        loops = report.loops,
        "Render loop stopped"
    );
    Ok(report)
}
