//! Analysis view state and its reducer.
//!
//! Every change to the video-analysis view goes through [`reduce`], a pure
//! function from the previous state and an action to the next state. The
//! `generation` counter identifies the current extraction run; actions
//! tagged with any other generation come from a superseded run and are
//! ignored.

use serde::{Deserialize, Serialize};

use crate::analysis::TrickAnalysis;
use crate::trace::{MotionTrace, TrimWindow};

/// Basic properties of the selected clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipInfo {
    pub duration_secs: f64,
    pub width: u32,
    pub height: u32,
}

/// Where the view is in the analysis flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum AnalysisPhase {
    /// No clip selected.
    Idle,
    /// Clip selected, trim editable.
    Ready,
    /// Motion extraction running.
    Extracting { percent: u8 },
    /// Trace built, narration not (successfully) done yet.
    TraceReady,
    /// Waiting on the narration service.
    Narrating,
    /// Verdict available.
    Complete,
}

/// The complete state of the analysis view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisState {
    pub clip: Option<ClipInfo>,
    pub trim: Option<TrimWindow>,
    pub phase: AnalysisPhase,
    /// Identifier of the current extraction run.
    pub generation: u64,
    pub trace: Option<MotionTrace>,
    pub analysis: Option<TrickAnalysis>,
    pub playing: bool,
    /// Last user-visible failure, cleared when a new attempt starts.
    pub error: Option<String>,
}

impl Default for AnalysisState {
    fn default() -> Self {
        Self {
            clip: None,
            trim: None,
            phase: AnalysisPhase::Idle,
            generation: 0,
            trace: None,
            analysis: None,
            playing: false,
            error: None,
        }
    }
}

/// Everything that can happen to the analysis view.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisAction {
    ClipSelected(ClipInfo),
    TrimChanged { start: f64, end: f64 },
    ExtractionStarted,
    ExtractionProgress { generation: u64, percent: u8 },
    TraceBuilt { generation: u64, trace: MotionTrace },
    ExtractionFailed { generation: u64, message: String },
    NarrationStarted { generation: u64 },
    NarrationCompleted { generation: u64, analysis: TrickAnalysis },
    NarrationFailed { generation: u64, message: String },
    PlaybackChanged { playing: bool },
    Discarded,
}

impl AnalysisState {
    /// Whether a run tagged with `generation` is still the current one.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Drop everything derived from the previous run and move to a new
    /// generation.
    fn invalidate_run(&mut self) {
        self.generation += 1;
        self.trace = None;
        self.analysis = None;
        self.playing = false;
    }
}

/// Compute the next state.
pub fn reduce(mut state: AnalysisState, action: AnalysisAction) -> AnalysisState {
    use AnalysisAction::*;
    use AnalysisPhase::*;

    match action {
        ClipSelected(clip) => {
            state.invalidate_run();
            state.error = None;
            match TrimWindow::new(0.0, clip.duration_secs) {
                Ok(trim) => {
                    state.clip = Some(clip);
                    state.trim = Some(trim);
                    state.phase = Ready;
                }
                Err(e) => {
                    state.clip = None;
                    state.trim = None;
                    state.phase = Idle;
                    state.error = Some(e.to_string());
                }
            }
        }

        TrimChanged { start, end } => {
            let Some(clip) = state.clip else {
                return state;
            };
            let start = start.clamp(0.0, clip.duration_secs);
            let end = end.clamp(0.0, clip.duration_secs);
            match TrimWindow::new(start, end) {
                Ok(trim) => {
                    if state.trim != Some(trim) {
                        state.invalidate_run();
                        state.trim = Some(trim);
                        state.phase = Ready;
                    }
                    state.error = None;
                }
                Err(e) => state.error = Some(e.to_string()),
            }
        }

        ExtractionStarted => {
            if state.clip.is_none() || state.trim.is_none() {
                return state;
            }
            state.invalidate_run();
            state.error = None;
            state.phase = Extracting { percent: 0 };
        }

        ExtractionProgress {
            generation,
            percent,
        } => {
            if state.is_current(generation) && matches!(state.phase, Extracting { .. }) {
                state.phase = Extracting {
                    percent: percent.min(100),
                };
            }
        }

        TraceBuilt { generation, trace } => {
            if state.is_current(generation) && matches!(state.phase, Extracting { .. }) {
                state.trace = Some(trace);
                state.phase = TraceReady;
            }
        }

        ExtractionFailed {
            generation,
            message,
        } => {
            if state.is_current(generation) && matches!(state.phase, Extracting { .. }) {
                state.phase = Ready;
                state.error = Some(message);
            }
        }

        NarrationStarted { generation } => {
            if state.is_current(generation) && state.phase == TraceReady {
                state.phase = Narrating;
                state.error = None;
            }
        }

        NarrationCompleted {
            generation,
            analysis,
        } => {
            if state.is_current(generation) && state.phase == Narrating {
                state.analysis = Some(analysis);
                state.phase = Complete;
            }
        }

        NarrationFailed {
            generation,
            message,
        } => {
            if state.is_current(generation) && state.phase == Narrating {
                state.phase = TraceReady;
                state.error = Some(message);
            }
        }

        PlaybackChanged { playing } => {
            state.playing = playing && state.trace.is_some();
        }

        Discarded => {
            state.invalidate_run();
            state.clip = None;
            state.trim = None;
            state.phase = Idle;
            state.error = None;
        }
    }

    state
}
