//! Build a motion trace from a recorded pose track.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use crete_common::config::AppConfig;
use crete_motion_model::trace::MotionTrace;
use serde::Serialize;

/// JSON export envelope.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TraceExport<'a> {
    generated_at: DateTime<Utc>,
    source: String,
    width: u32,
    height: u32,
    trace: &'a MotionTrace,
}

pub async fn run(
    config: &AppConfig,
    poses: PathBuf,
    start: Option<f64>,
    end: Option<f64>,
    fps: Option<u32>,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut analysis = config.analysis.clone();
    if let Some(fps) = fps {
        analysis.fps = fps;
    }

    let (trace, header) = super::build_trace(&poses, start, end, &analysis).await?;

    if csv.is_none() && json.is_none() {
        print!("{}", trace.to_table());
        return Ok(());
    }

    if let Some(path) = csv {
        std::fs::write(&path, trace.to_table())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  Table: {}", path.display());
    }

    if let Some(path) = json {
        let export = TraceExport {
            generated_at: Utc::now(),
            source: poses.display().to_string(),
            width: header.width,
            height: header.height,
            trace: &trace,
        };
        std::fs::write(&path, serde_json::to_string_pretty(&export)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  JSON: {}", path.display());
    }

    Ok(())
}
