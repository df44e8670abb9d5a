//! Replay the skeleton overlay for a pose track.

use std::path::PathBuf;
use std::time::Duration;

use crete_common::clock::WallClock;
use crete_common::config::AppConfig;
use crete_trace_player::{run_render_loop, DrawCommandRecorder, TracePlayer};
use tokio::sync::watch;

pub async fn run(
    config: &AppConfig,
    poses: PathBuf,
    start: Option<f64>,
    end: Option<f64>,
    seconds: f64,
    refresh_hz: Option<u32>,
) -> anyhow::Result<()> {
    if !seconds.is_finite() || seconds <= 0.0 {
        anyhow::bail!("--seconds must be a positive number, got {seconds}");
    }
    let refresh_hz = refresh_hz.unwrap_or(config.playback.refresh_hz);

    let (trace, header) = super::build_trace(&poses, start, end, &config.analysis).await?;
    let trim = trace.trim();

    let mut player = TracePlayer::new(trace, WallClock::starting_at(trim.start));
    player.rewind();
    let mut surface = DrawCommandRecorder::new(header.width, header.height);

    let (playing, playing_rx) = watch::channel(true);
    let stopper = tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs_f64(seconds)) => {}
            _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
        }
        let _ = playing.send(false);
    });

    println!(
        "Playing {:.2}s - {:.2}s for {seconds:.1}s at {refresh_hz} Hz...",
        trim.start, trim.end
    );
    let report = run_render_loop(&mut player, &mut surface, refresh_hz, playing_rx).await?;
    stopper.abort();

    println!("  Frames drawn: {}", report.frames_drawn);
    println!("  Loops: {}", report.loops);
    println!("  Last frame: {} draw commands", surface.commands().len());

    Ok(())
}
