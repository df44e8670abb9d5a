//! Trace playback synchronized to a playback clock.
//!
//! Playback loops strictly inside the trim window: reaching the window end
//! seeks back to its start, and a scrub before the start is pulled forward
//! to it. The frame shown is the trace record nearest the corrected time,
//! with no interpolation between samples.

use crete_common::clock::PlaybackClock;
use crete_motion_model::trace::{FrameRecord, MotionTrace, TrimWindow};

/// Where playback must seek to stay inside `trim`, if anywhere.
///
/// Returns `None` when `time_secs` already lies in `[start, end)`.
pub fn loop_correct(time_secs: f64, trim: TrimWindow) -> Option<f64> {
    if time_secs >= trim.start && time_secs < trim.end {
        None
    } else {
        Some(trim.start)
    }
}

/// The record whose time is closest to `time_secs`.
///
/// Ties go to the earlier record.
pub fn nearest_frame(frames: &[FrameRecord], time_secs: f64) -> Option<&FrameRecord> {
    let mut best: Option<(&FrameRecord, f64)> = None;
    for record in frames {
        let distance = (record.time - time_secs).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((record, distance)),
        }
    }
    best.map(|(record, _)| record)
}

/// What one player tick decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerTick<'a> {
    /// Playback time after loop correction.
    pub time: f64,

    /// Record to draw, if the trace has any.
    pub frame: Option<&'a FrameRecord>,

    /// Whether this tick wrapped from the window end back to its start.
    pub looped: bool,
}

/// Drives a clock around a trace's trim window.
pub struct TracePlayer<C: PlaybackClock> {
    trace: MotionTrace,
    clock: C,
    loops: u64,
}

impl<C: PlaybackClock> TracePlayer<C> {
    pub fn new(trace: MotionTrace, clock: C) -> Self {
        Self {
            trace,
            clock,
            loops: 0,
        }
    }

    /// Seek the clock to the window start.
    pub fn rewind(&mut self) {
        self.clock.seek(self.trace.trim().start);
    }

    /// Read the clock, correct it into the window, and pick the record to
    /// draw.
    pub fn tick(&mut self) -> PlayerTick<'_> {
        let trim = self.trace.trim();
        let mut time = self.clock.current_time();
        let mut looped = false;

        if let Some(target) = loop_correct(time, trim) {
            if time >= trim.end {
                self.loops += 1;
                looped = true;
                tracing::trace!(time_secs = time, loops = self.loops, "Playback looped");
            } else {
                tracing::debug!(time_secs = time, start = trim.start, "Playback clamped to trim start");
            }
            self.clock.seek(target);
            time = target;
        }

        PlayerTick {
            time,
            frame: nearest_frame(self.trace.frames(), time),
            looped,
        }
    }

    /// Completed passes through the window.
    pub fn loops(&self) -> u64 {
        self.loops
    }

    pub fn trace(&self) -> &MotionTrace {
        &self.trace
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
