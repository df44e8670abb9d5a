//! Trim windows, kinematic samples, and the motion trace.
//!
//! A [`MotionTrace`] is built wholesale by one extraction run and never
//! mutated afterwards. It carries two parallel views of the same frames:
//! the frame records used by the overlay player, and the numeric channels
//! exported as a small comma-separated table for narration.

use serde::{Deserialize, Serialize};

use crate::landmark::{Point2D, PoseLandmarks};

/// Header row of the tabular export.
pub const TRACE_TABLE_HEADER: &str =
    "Timestamp,LeftAnkleY,RightAnkleY,BoardAngle,BoardHeight,ShoulderRotation";

/// Number of comma-separated fields in every table row.
pub const TRACE_TABLE_FIELDS: usize = 6;

/// Errors raised by trace data contracts.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TraceError {
    #[error("invalid trim window: {0}")]
    InvalidTrim(String),

    #[error("frame at {time:.3}s precedes previous frame at {previous:.3}s")]
    OutOfOrder { time: f64, previous: f64 },

    #[error("trace table line {line}: {message}")]
    Table { line: usize, message: String },
}

/// The `[start, end]` section of a video selected for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimWindow {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

impl TrimWindow {
    /// Create a window, requiring `0 <= start < end`.
    pub fn new(start: f64, end: f64) -> Result<Self, TraceError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(TraceError::InvalidTrim(format!(
                "bounds must be finite, got [{start}, {end}]"
            )));
        }
        if start < 0.0 {
            return Err(TraceError::InvalidTrim(format!(
                "start {start:.3}s is negative"
            )));
        }
        if start >= end {
            return Err(TraceError::InvalidTrim(format!(
                "start {start:.3}s is not before end {end:.3}s"
            )));
        }
        Ok(Self { start, end })
    }

    /// Check that the window lies within a clip of `duration_secs`.
    pub fn fits(&self, duration_secs: f64) -> Result<(), TraceError> {
        if self.end > duration_secs {
            return Err(TraceError::InvalidTrim(format!(
                "end {:.3}s exceeds clip duration {duration_secs:.3}s",
                self.end
            )));
        }
        Ok(())
    }

    /// Length of the window in seconds.
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Fraction of the window elapsed at `time_secs`, unclamped.
    pub fn elapsed_fraction(&self, time_secs: f64) -> f64 {
        (time_secs - self.start) / self.span()
    }
}

/// Kinematic quantities derived from one frame's landmarks.
///
/// When no board center could be estimated, `board_height` and
/// `board_angle_degrees` are zero and carry no signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinematicSample {
    pub time: f64,
    pub left_ankle_y: f64,
    pub right_ankle_y: f64,
    pub board_center: Option<Point2D>,
    pub board_height: f64,
    pub board_angle_degrees: f64,
    pub shoulder_rotation_degrees: f64,
}

impl KinematicSample {
    /// A sample for a frame with no usable landmarks.
    pub fn empty(time: f64) -> Self {
        Self {
            time,
            left_ankle_y: 0.0,
            right_ankle_y: 0.0,
            board_center: None,
            board_height: 0.0,
            board_angle_degrees: 0.0,
            shoulder_rotation_degrees: 0.0,
        }
    }

    /// Render as one row of the tabular export.
    pub fn table_row(&self) -> String {
        format!(
            "{:.2},{:.3},{:.3},{:.1},{:.3},{:.1}",
            self.time,
            self.left_ankle_y,
            self.right_ankle_y,
            self.board_angle_degrees,
            self.board_height,
            self.shoulder_rotation_degrees
        )
    }
}

/// One sampled frame as replayed by the overlay player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    pub time: f64,
    pub landmarks: Option<PoseLandmarks>,
    pub board_center: Option<Point2D>,
}

/// The time-ordered frame records of one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionTrace {
    trim: TrimWindow,
    fps: u32,
    frames: Vec<FrameRecord>,
    samples: Vec<KinematicSample>,
}

impl MotionTrace {
    /// Trim window the trace covers.
    pub fn trim(&self) -> TrimWindow {
        self.trim
    }

    /// Sampling rate the trace was built at.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Frame records in non-decreasing time order.
    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    /// Kinematic samples, parallel to [`frames`](Self::frames).
    pub fn samples(&self) -> &[KinematicSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of frames where a pose was detected.
    pub fn detected_frames(&self) -> usize {
        self.frames.iter().filter(|f| f.landmarks.is_some()).count()
    }

    /// Render the tabular export: header, then one row per frame.
    pub fn to_table(&self) -> String {
        let mut table = String::from(TRACE_TABLE_HEADER);
        for sample in &self.samples {
            table.push('\n');
            table.push_str(&sample.table_row());
        }
        table
    }
}

/// Append-only accumulator that produces a [`MotionTrace`].
#[derive(Debug)]
pub struct TraceWriter {
    trace: MotionTrace,
}

impl TraceWriter {
    pub fn new(trim: TrimWindow, fps: u32) -> Self {
        Self {
            trace: MotionTrace {
                trim,
                fps,
                frames: Vec::new(),
                samples: Vec::new(),
            },
        }
    }

    /// Append one frame. Times must not decrease.
    pub fn push(
        &mut self,
        landmarks: Option<PoseLandmarks>,
        sample: KinematicSample,
    ) -> Result<(), TraceError> {
        if let Some(previous) = self.trace.frames.last() {
            if sample.time < previous.time {
                return Err(TraceError::OutOfOrder {
                    time: sample.time,
                    previous: previous.time,
                });
            }
        }

        self.trace.frames.push(FrameRecord {
            time: sample.time,
            landmarks,
            board_center: sample.board_center,
        });
        self.trace.samples.push(sample);
        Ok(())
    }

    /// Frames appended so far.
    pub fn len(&self) -> usize {
        self.trace.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace.frames.is_empty()
    }

    pub fn finish(self) -> MotionTrace {
        self.trace
    }
}

/// One parsed row of the tabular export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceRow {
    pub time: f64,
    pub left_ankle_y: f64,
    pub right_ankle_y: f64,
    pub board_angle: f64,
    pub board_height: f64,
    pub shoulder_rotation: f64,
}

/// Parse a tabular export back into rows.
///
/// Blank lines are ignored. The first line must be the exact header and
/// every other line must hold six finite numeric fields.
pub fn parse_trace_table(table: &str) -> Result<Vec<TraceRow>, TraceError> {
    let mut lines = table
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    match lines.next() {
        Some((_, TRACE_TABLE_HEADER)) => {}
        Some((line, other)) => {
            return Err(TraceError::Table {
                line,
                message: format!("unexpected header {other:?}"),
            })
        }
        None => {
            return Err(TraceError::Table {
                line: 0,
                message: "missing header".to_string(),
            })
        }
    }

    lines
        .map(|(line, text)| {
            let fields: Vec<&str> = text.split(',').collect();
            if fields.len() != TRACE_TABLE_FIELDS {
                return Err(TraceError::Table {
                    line,
                    message: format!(
                        "expected {TRACE_TABLE_FIELDS} fields, found {}",
                        fields.len()
                    ),
                });
            }

            let mut values = [0.0; TRACE_TABLE_FIELDS];
            for (slot, field) in values.iter_mut().zip(&fields) {
                let value: f64 = field.parse().map_err(|_| TraceError::Table {
                    line,
                    message: format!("field {field:?} is not a number"),
                })?;
                if !value.is_finite() {
                    return Err(TraceError::Table {
                        line,
                        message: format!("field {field:?} is not finite"),
                    });
                }
                *slot = value;
            }

            Ok(TraceRow {
                time: values[0],
                left_ankle_y: values[1],
                right_ankle_y: values[2],
                board_angle: values[3],
                board_height: values[4],
                shoulder_rotation: values[5],
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_at(time: f64) -> KinematicSample {
        KinematicSample {
            time,
            left_ankle_y: 0.6,
            right_ankle_y: 0.6,
            board_center: Some(Point2D::new(0.5, 0.62)),
            board_height: 0.38,
            board_angle_degrees: 0.0,
            shoulder_rotation_degrees: -12.345,
        }
    }

    #[test]
    fn test_trim_window_rejects_inverted_bounds() {
        assert!(TrimWindow::new(2.0, 1.0).is_err());
        assert!(TrimWindow::new(1.0, 1.0).is_err());
        assert!(TrimWindow::new(-0.5, 1.0).is_err());
        assert!(TrimWindow::new(0.0, f64::NAN).is_err());
        assert!(TrimWindow::new(0.0, 1.0).is_ok());
    }

    #[test]
    fn test_trim_window_must_fit_clip() {
        let trim = TrimWindow::new(1.0, 4.0).unwrap();
        assert!(trim.fits(4.0).is_ok());
        assert!(trim.fits(3.5).is_err());
    }

    #[test]
    fn test_table_row_precision() {
        assert_eq!(sample_at(1.0 / 3.0).table_row(), "0.33,0.600,0.600,0.0,0.380,-12.3");
    }

    #[test]
    fn test_empty_trace_exports_header_only() {
        let trace = TraceWriter::new(TrimWindow::new(0.0, 1.0).unwrap(), 30).finish();
        assert!(trace.is_empty());
        assert_eq!(trace.to_table(), TRACE_TABLE_HEADER);
        assert!(parse_trace_table(&trace.to_table()).unwrap().is_empty());
    }

    #[test]
    fn test_writer_rejects_time_going_backwards() {
        let mut writer = TraceWriter::new(TrimWindow::new(0.0, 1.0).unwrap(), 30);
        writer.push(None, KinematicSample::empty(0.5)).unwrap();
        let err = writer.push(None, KinematicSample::empty(0.4)).unwrap_err();
        assert!(matches!(err, TraceError::OutOfOrder { .. }));
        assert_eq!(writer.len(), 1);
    }

    #[test]
    fn test_frame_record_mirrors_sample_board_center() {
        let mut writer = TraceWriter::new(TrimWindow::new(0.0, 1.0).unwrap(), 30);
        writer.push(None, sample_at(0.0)).unwrap();
        writer.push(None, KinematicSample::empty(0.1)).unwrap();
        let trace = writer.finish();

        assert_eq!(trace.frames()[0].board_center, Some(Point2D::new(0.5, 0.62)));
        assert_eq!(trace.frames()[1].board_center, None);
        assert_eq!(trace.detected_frames(), 0);
    }

    #[test]
    fn test_parse_rejects_bad_header_and_short_rows() {
        assert!(parse_trace_table("").is_err());
        assert!(parse_trace_table("Time,Y\n0.00,1").is_err());

        let short = format!("{TRACE_TABLE_HEADER}\n0.00,0.5,0.5");
        let err = parse_trace_table(&short).unwrap_err();
        assert_eq!(
            err,
            TraceError::Table {
                line: 2,
                message: "expected 6 fields, found 3".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_non_finite_fields() {
        let table = format!(
            "{TRACE_TABLE_HEADER}\n0.50,0.6,0.6,0.0,0.38,0.0\nNaN,0.6,0.6,0.0,0.38,0.0\n0.10,0.6,0.6,0.0,0.38,0.0"
        );
        let err = parse_trace_table(&table).unwrap_err();
        assert_eq!(
            err,
            TraceError::Table {
                line: 3,
                message: "field \"NaN\" is not finite".to_string()
            }
        );

        let table = format!("{TRACE_TABLE_HEADER}\n0.00,0.6,0.6,inf,0.38,0.0");
        assert!(matches!(
            parse_trace_table(&table),
            Err(TraceError::Table { line: 2, .. })
        ));
    }

    #[test]
    fn test_trace_json_uses_camel_case() {
        let mut writer = TraceWriter::new(TrimWindow::new(0.0, 1.0).unwrap(), 30);
        writer.push(None, sample_at(0.0)).unwrap();
        let json = serde_json::to_string(&writer.finish()).unwrap();
        assert!(json.contains("\"boardCenter\":{\"x\":0.5,\"y\":0.62}"));
        assert!(json.contains("\"shoulderRotationDegrees\""));
    }

    proptest! {
        #[test]
        fn prop_table_has_one_row_per_frame(times in proptest::collection::vec(0.0f64..100.0, 0..60)) {
            let mut times = times;
            times.sort_by(|a, b| a.partial_cmp(b).unwrap());

            let mut writer = TraceWriter::new(TrimWindow::new(0.0, 100.0).unwrap(), 30);
            for &t in &times {
                writer.push(None, sample_at(t)).unwrap();
            }
            let trace = writer.finish();
            let table = trace.to_table();

            prop_assert_eq!(table.lines().count(), trace.len() + 1);
            for line in table.lines() {
                prop_assert_eq!(line.split(',').count(), TRACE_TABLE_FIELDS);
            }
            prop_assert_eq!(parse_trace_table(&table).unwrap().len(), trace.len());
        }
    }
}
