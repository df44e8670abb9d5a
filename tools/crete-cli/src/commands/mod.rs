pub mod play;
pub mod trace;
pub mod validate;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use crete_common::config::AnalysisDefaults;
use crete_motion_model::state::{reduce, AnalysisAction, AnalysisState, ClipInfo};
use crete_motion_model::trace::MotionTrace;
use crete_pose_pipeline::replay::{PoseTrackClip, PoseTrackHeader, PoseTrackModel};
use crete_pose_pipeline::{
    extract_motion_trace, EstimatorAdapter, EstimatorOptions, ExtractionProgress, PoseTrack,
    RunRegistry,
};

/// Load a pose track and build its motion trace over the requested window.
///
/// The run goes through the analysis state reducer the same way the
/// interactive view does: select the clip, adjust the trim, start the
/// extraction, then record the outcome.
pub(crate) async fn build_trace(
    poses: &Path,
    start: Option<f64>,
    end: Option<f64>,
    analysis: &AnalysisDefaults,
) -> anyhow::Result<(MotionTrace, PoseTrackHeader)> {
    let track = Arc::new(PoseTrack::load(poses)?);
    let header = track.header();

    let mut state = reduce(
        AnalysisState::default(),
        AnalysisAction::ClipSelected(ClipInfo {
            duration_secs: track.duration_secs(),
            width: header.width,
            height: header.height,
        }),
    );
    if let Some(error) = &state.error {
        anyhow::bail!("Pose track is not usable: {error}");
    }

    if start.is_some() || end.is_some() {
        let full = state.trim.context("clip has no trim window")?;
        state = reduce(
            state,
            AnalysisAction::TrimChanged {
                start: start.unwrap_or(full.start),
                end: end.unwrap_or(full.end),
            },
        );
        if let Some(error) = &state.error {
            anyhow::bail!("Invalid trim window: {error}");
        }
    }

    state = reduce(state, AnalysisAction::ExtractionStarted);
    let generation = state.generation;
    let trim = state.trim.context("clip has no trim window")?;
    let registry = RunRegistry::new();
    let token = registry.adopt(generation);

    println!("Tracing: {}", poses.display());
    println!("  Window: {:.2}s - {:.2}s at {} fps", trim.start, trim.end, analysis.fps);

    let mut estimator = EstimatorAdapter::open(
        Box::new(PoseTrackModel::new(track.clone())),
        EstimatorOptions::from(analysis),
        Duration::from_millis(analysis.estimate_timeout_ms),
    )
    .await
    .map_err(|e| anyhow::anyhow!("{}: {e}", e.user_message()))?;

    // Ctrl-C supersedes the run; the builder stops at its next check.
    let interrupt = tokio::spawn({
        let registry = registry.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                registry.cancel();
            }
        }
    });

    let mut clip = PoseTrackClip::new(track);
    let result = extract_motion_trace(
        &mut clip,
        trim,
        analysis,
        &mut estimator,
        token,
        Some(Box::new(|p: ExtractionProgress| {
            print!(
                "\r  Progress: {:>3}% ({}/{} frames)  ",
                p.percent, p.frames_processed, p.total_frames
            );
            let _ = std::io::stdout().flush();
        })),
    )
    .await;
    println!();
    interrupt.abort();
    estimator.close();

    match result {
        Ok(trace) => {
            state = reduce(state, AnalysisAction::TraceBuilt { generation, trace });
        }
        Err(e) if e.is_cancelled() => {
            state = reduce(state, AnalysisAction::Discarded);
            tracing::info!(generation, phase = ?state.phase, "Extraction interrupted");
            anyhow::bail!("{}", e.user_message());
        }
        Err(e) => {
            state = reduce(
                state,
                AnalysisAction::ExtractionFailed {
                    generation,
                    message: e.user_message().to_string(),
                },
            );
            tracing::warn!(error = %e, phase = ?state.phase, "Extraction failed");
            anyhow::bail!("{}: {e}", e.user_message());
        }
    }

    let trace = state.trace.context("extraction finished without a trace")?;
    println!(
        "  Frames: {} ({} with a detected pose)",
        trace.len(),
        trace.detected_frames()
    );
    Ok((trace, header))
}
