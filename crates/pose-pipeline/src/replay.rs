//! Recorded pose tracks.
//!
//! A pose track is a JSONL file holding one pose estimate per line, as
//! captured from an earlier session or exported by another tool:
//!
//! ```text
//! # {"width":720,"height":1280}
//! {"t":0.0,"landmarks":[{"x":0.41,"y":0.62,"visibility":0.98}, ...]}
//! {"t":0.033,"landmarks":null}
//! ```
//!
//! The optional `#` header gives the source frame size. A track stands in
//! for both the video clip and the pose model, so the full pipeline can
//! run without a decoder or an inference runtime.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use crete_common::error::{CreteError, CreteResult};
use crete_motion_model::landmark::{Landmark, PoseLandmarks};
use serde::{Deserialize, Serialize};

use crate::estimator::{EstimatorOptions, PoseModel};
use crate::sampler::{RasterFrame, VideoClip};

/// Source frame size recorded in the track header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoseTrackHeader {
    pub width: u32,
    pub height: u32,
}

impl Default for PoseTrackHeader {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PoseTrackLine {
    t: f64,
    #[serde(default)]
    landmarks: Option<Vec<Landmark>>,
}

/// Time-ordered pose estimates for one clip.
#[derive(Debug, Clone)]
pub struct PoseTrack {
    header: PoseTrackHeader,
    frames: Vec<(f64, Option<PoseLandmarks>)>,
}

impl PoseTrack {
    /// Build a track from frames in non-decreasing time order.
    pub fn from_frames(
        header: PoseTrackHeader,
        frames: Vec<(f64, Option<PoseLandmarks>)>,
    ) -> CreteResult<Self> {
        if let Some(bad) = frames.iter().find(|(t, _)| !t.is_finite() || *t < 0.0) {
            return Err(CreteError::replay(format!("invalid frame time {}", bad.0)));
        }
        if let Some(pair) = frames.windows(2).find(|w| w[1].0 < w[0].0) {
            return Err(CreteError::replay(format!(
                "frame at {:.3}s follows frame at {:.3}s",
                pair[1].0, pair[0].0
            )));
        }
        Ok(Self { header, frames })
    }

    /// Parse JSONL track content.
    pub fn parse(jsonl: &str) -> CreteResult<Self> {
        let mut header = PoseTrackHeader::default();
        let mut frames = Vec::new();

        for (index, line) in jsonl.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(comment) = line.strip_prefix('#') {
                if let Ok(parsed) = serde_json::from_str::<PoseTrackHeader>(comment.trim()) {
                    header = parsed;
                }
                continue;
            }

            let parsed: PoseTrackLine = serde_json::from_str(line).map_err(|e| {
                CreteError::replay(format!("line {}: {e}", index + 1))
            })?;
            frames.push((parsed.t, parsed.landmarks.and_then(PoseLandmarks::new)));
        }

        Self::from_frames(header, frames)
    }

    /// Load a track from disk.
    pub fn load(path: &Path) -> CreteResult<Self> {
        if !path.exists() {
            return Err(CreteError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let track = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            frames = track.len(),
            duration_secs = track.duration_secs(),
            "Pose track loaded"
        );
        Ok(track)
    }

    /// Serialize to JSONL, header first.
    pub fn to_jsonl(&self) -> CreteResult<String> {
        let mut output = format!("# {}\n", serde_json::to_string(&self.header)?);
        for (t, landmarks) in &self.frames {
            let line = PoseTrackLine {
                t: *t,
                landmarks: landmarks.as_ref().map(|l| l.as_slice().to_vec()),
            };
            output.push_str(&serde_json::to_string(&line)?);
            output.push('\n');
        }
        Ok(output)
    }

    pub fn header(&self) -> PoseTrackHeader {
        self.header
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Time of the last recorded frame.
    pub fn duration_secs(&self) -> f64 {
        self.frames.last().map_or(0.0, |(t, _)| *t)
    }

    /// Pose recorded nearest to `time_secs`; ties go to the earlier frame.
    pub fn pose_at(&self, time_secs: f64) -> Option<&PoseLandmarks> {
        if self.frames.is_empty() {
            return None;
        }

        let idx = self.frames.partition_point(|(t, _)| *t < time_secs);
        let nearest = if idx == 0 {
            0
        } else if idx == self.frames.len() {
            idx - 1
        } else {
            let before = time_secs - self.frames[idx - 1].0;
            let after = self.frames[idx].0 - time_secs;
            if after < before {
                idx
            } else {
                idx - 1
            }
        };

        self.frames[nearest].1.as_ref()
    }
}

/// A pose track presented as a seekable clip.
///
/// Frames carry no pixels, only their presentation time.
#[derive(Debug, Clone)]
pub struct PoseTrackClip {
    track: Arc<PoseTrack>,
    position: f64,
}

impl PoseTrackClip {
    pub fn new(track: Arc<PoseTrack>) -> Self {
        Self {
            track,
            position: 0.0,
        }
    }

    /// Current seek position.
    pub fn position(&self) -> f64 {
        self.position
    }
}

#[async_trait]
impl VideoClip for PoseTrackClip {
    fn duration_secs(&self) -> f64 {
        self.track.duration_secs()
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.track.header.width, self.track.header.height)
    }

    fn is_ready(&self) -> bool {
        !self.track.is_empty()
    }

    async fn seek(&mut self, time_secs: f64) -> CreteResult<()> {
        tokio::task::yield_now().await;
        self.position = time_secs.clamp(0.0, self.track.duration_secs());
        Ok(())
    }

    fn read_frame(&mut self, frame: &mut RasterFrame) -> CreteResult<()> {
        frame.width = self.track.header.width;
        frame.height = self.track.header.height;
        frame.pts_secs = self.position;
        frame.rgba.clear();
        Ok(())
    }
}

/// A pose track presented as a pose model.
#[derive(Debug)]
pub struct PoseTrackModel {
    track: Arc<PoseTrack>,
    initialized: bool,
}

impl PoseTrackModel {
    pub fn new(track: Arc<PoseTrack>) -> Self {
        Self {
            track,
            initialized: false,
        }
    }
}

#[async_trait]
impl PoseModel for PoseTrackModel {
    fn name(&self) -> &str {
        "pose-track"
    }

    async fn initialize(&mut self, _options: &EstimatorOptions) -> CreteResult<()> {
        if self.track.is_empty() {
            return Err(CreteError::replay("pose track has no frames"));
        }
        self.initialized = true;
        Ok(())
    }

    async fn detect(&mut self, frame: &RasterFrame) -> CreteResult<Option<Vec<Landmark>>> {
        if !self.initialized {
            return Err(CreteError::estimator_unavailable("pose track not initialized"));
        }
        tokio::task::yield_now().await;
        Ok(self
            .track
            .pose_at(frame.pts_secs)
            .map(|pose| pose.as_slice().to_vec()))
    }

    fn close(&mut self) {
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(x: f64) -> Option<PoseLandmarks> {
        PoseLandmarks::new(vec![Landmark::new(x, 0.5, 1.0)])
    }

    #[test]
    fn test_parse_reads_header_and_null_frames() {
        let jsonl = "# {\"width\":720,\"height\":1280}\n\
                     {\"t\":0.0,\"landmarks\":[{\"x\":0.1,\"y\":0.2,\"visibility\":0.9}]}\n\
                     \n\
                     {\"t\":0.5,\"landmarks\":null}\n\
                     {\"t\":1.0}\n";
        let track = PoseTrack::parse(jsonl).unwrap();
        assert_eq!(track.header(), PoseTrackHeader { width: 720, height: 1280 });
        assert_eq!(track.len(), 3);
        assert_eq!(track.duration_secs(), 1.0);
        assert!(track.pose_at(0.0).is_some());
        assert!(track.pose_at(0.5).is_none());
    }

    #[test]
    fn test_parse_rejects_unordered_frames() {
        let jsonl = "{\"t\":1.0}\n{\"t\":0.5}\n";
        assert!(matches!(
            PoseTrack::parse(jsonl),
            Err(CreteError::Replay { .. })
        ));
    }

    #[test]
    fn test_parse_reports_bad_line_number() {
        let err = PoseTrack::parse("{\"t\":0.0}\nnot json\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_pose_at_picks_nearest_earlier_on_tie() {
        let track = PoseTrack::from_frames(
            PoseTrackHeader::default(),
            vec![(0.0, pose(0.1)), (1.0, pose(0.2)), (2.0, pose(0.3))],
        )
        .unwrap();

        assert_eq!(track.pose_at(0.4).unwrap().get(0).unwrap().x, 0.1);
        assert_eq!(track.pose_at(0.5).unwrap().get(0).unwrap().x, 0.1);
        assert_eq!(track.pose_at(0.6).unwrap().get(0).unwrap().x, 0.2);
        assert_eq!(track.pose_at(9.0).unwrap().get(0).unwrap().x, 0.3);
        assert_eq!(track.pose_at(-1.0).unwrap().get(0).unwrap().x, 0.1);
    }

    #[test]
    fn test_jsonl_round_trip_keeps_frames() {
        let track = PoseTrack::from_frames(
            PoseTrackHeader { width: 640, height: 480 },
            vec![(0.0, pose(0.1)), (0.5, None)],
        )
        .unwrap();
        let parsed = PoseTrack::parse(&track.to_jsonl().unwrap()).unwrap();
        assert_eq!(parsed.header(), track.header());
        assert_eq!(parsed.len(), 2);
        assert!(parsed.pose_at(0.5).is_none());
    }

    #[tokio::test]
    async fn test_clip_frames_carry_seek_position() {
        let track = Arc::new(
            PoseTrack::from_frames(PoseTrackHeader::default(), vec![(0.0, None), (2.0, None)])
                .unwrap(),
        );
        let mut clip = PoseTrackClip::new(track);
        clip.seek(1.25).await.unwrap();

        let mut frame = RasterFrame::default();
        clip.read_frame(&mut frame).unwrap();
        assert_eq!(frame.pts_secs, 1.25);
        assert_eq!((frame.width, frame.height), (1280, 720));
    }

    #[tokio::test]
    async fn test_model_requires_initialization() {
        let track = Arc::new(
            PoseTrack::from_frames(PoseTrackHeader::default(), vec![(0.0, pose(0.1))]).unwrap(),
        );
        let mut model = PoseTrackModel::new(track);
        assert!(model.detect(&RasterFrame::default()).await.is_err());

        model.initialize(&EstimatorOptions::default()).await.unwrap();
        let detected = model.detect(&RasterFrame::default()).await.unwrap();
        assert_eq!(detected.unwrap().len(), 1);
    }
}
