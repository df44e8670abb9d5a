//! Frame sampling over a trim window.
//!
//! The sampler seeks the clip to evenly spaced timestamps and hands out
//! the decoded raster at each one. Seeks are awaited one at a time; the
//! raster buffer is scratch space owned by the sampler and only lent out
//! until the next frame is requested.

use std::time::Duration;

use async_trait::async_trait;
use crete_common::error::{CreteError, CreteResult};
use crete_motion_model::trace::TrimWindow;

/// Relative slack applied when flooring `span * fps`, so spans like
/// `0.4 - 0.1` at 10 fps that land a hair under an integer still count the
/// final frame. Scaled by the frame count so long spans get the same
/// tolerance in ULPs as short ones.
const FRAME_COUNT_SLACK: f64 = 1e-9;

/// A decoded video frame.
#[derive(Debug, Clone, Default)]
pub struct RasterFrame {
    pub width: u32,
    pub height: u32,
    /// Presentation time of the decoded frame in seconds.
    pub pts_secs: f64,
    /// Tightly packed RGBA pixels, `width * height * 4` bytes when present.
    pub rgba: Vec<u8>,
}

/// A seekable video resource.
#[async_trait]
pub trait VideoClip: Send {
    /// Total duration in seconds.
    fn duration_secs(&self) -> f64;

    /// Frame size in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Whether the clip can seek and decode yet.
    fn is_ready(&self) -> bool;

    /// Seek to `time_secs`, resolving once the seek has completed.
    async fn seek(&mut self, time_secs: f64) -> CreteResult<()>;

    /// Decode the frame at the current position into `frame`.
    fn read_frame(&mut self, frame: &mut RasterFrame) -> CreteResult<()>;
}

/// Number of frames sampled from `trim` at `fps`: `floor(span * fps) + 1`.
///
/// The floor tolerates a relative shortfall of `FRAME_COUNT_SLACK`. A
/// span that falls that close under a whole number of steps therefore gets
/// one more frame than the literal formula; that last sample is clamped to
/// `trim.end` and sits slightly off the `1 / fps` grid.
pub fn frame_count(trim: TrimWindow, fps: u32) -> usize {
    let frames = trim.span() * fps as f64;
    (frames + frames.max(1.0) * FRAME_COUNT_SLACK).floor() as usize + 1
}

/// Timestamps visited when sampling `trim` at `fps`, in order.
pub fn sample_timestamps(trim: TrimWindow, fps: u32) -> impl Iterator<Item = f64> {
    let step = 1.0 / fps as f64;
    (0..frame_count(trim, fps)).map(move |i| (trim.start + i as f64 * step).min(trim.end))
}

/// Lazily walks a clip across a trim window.
///
/// Building a new sampler restarts from the window start. The clip's
/// playback position is left wherever the last seek put it.
pub struct FrameSampler<'c, C: VideoClip + ?Sized> {
    clip: &'c mut C,
    trim: TrimWindow,
    fps: u32,
    next_index: usize,
    total: usize,
    seek_timeout: Duration,
    scratch: RasterFrame,
}

impl<'c, C: VideoClip + ?Sized> FrameSampler<'c, C> {
    /// Prepare to sample `clip` over `trim`.
    ///
    /// Fails before any seek if the clip is not ready, the window does not
    /// fit the clip, or `fps` is zero.
    pub fn new(
        clip: &'c mut C,
        trim: TrimWindow,
        fps: u32,
        seek_timeout: Duration,
    ) -> CreteResult<Self> {
        if !clip.is_ready() {
            return Err(CreteError::clip_not_ready(
                "clip has no decodable frame yet",
            ));
        }
        if fps == 0 {
            return Err(CreteError::config("sample fps must be positive"));
        }
        trim.fits(clip.duration_secs())
            .map_err(|e| CreteError::invalid_trim(e.to_string()))?;

        let (width, height) = clip.dimensions();
        let total = frame_count(trim, fps);
        tracing::debug!(
            start = trim.start,
            end = trim.end,
            fps,
            frames = total,
            "Frame sampler ready"
        );

        Ok(Self {
            clip,
            trim,
            fps,
            next_index: 0,
            total,
            seek_timeout,
            scratch: RasterFrame {
                width,
                height,
                ..Default::default()
            },
        })
    }

    pub fn trim(&self) -> TrimWindow {
        self.trim
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Number of frames the full walk yields.
    pub fn total_frames(&self) -> usize {
        self.total
    }

    /// Frames handed out so far.
    pub fn frames_sampled(&self) -> usize {
        self.next_index
    }

    /// Seek to the next timestamp and decode it.
    ///
    /// Returns `None` once the window is exhausted.
    pub async fn next_frame(&mut self) -> CreteResult<Option<(f64, &RasterFrame)>> {
        if self.next_index >= self.total {
            return Ok(None);
        }

        let step = 1.0 / self.fps as f64;
        let time = (self.trim.start + self.next_index as f64 * step).min(self.trim.end);

        match tokio::time::timeout(self.seek_timeout, self.clip.seek(time)).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(time_secs = time, "Seek stalled");
                return Err(CreteError::timeout(
                    format!("seek to {time:.2}s"),
                    self.seek_timeout.as_millis() as u64,
                ));
            }
        }

        self.clip.read_frame(&mut self.scratch)?;
        self.next_index += 1;
        tracing::trace!(time_secs = time, index = self.next_index, "Frame sampled");

        Ok(Some((time, &self.scratch)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct FakeClip {
        ready: bool,
        duration: f64,
        position: f64,
        seeks: Vec<f64>,
        stall: bool,
    }

    impl FakeClip {
        fn ready(duration: f64) -> Self {
            Self {
                ready: true,
                duration,
                position: 0.0,
                seeks: Vec::new(),
                stall: false,
            }
        }
    }

    #[async_trait]
    impl VideoClip for FakeClip {
        fn duration_secs(&self) -> f64 {
            self.duration
        }

        fn dimensions(&self) -> (u32, u32) {
            (64, 48)
        }

        fn is_ready(&self) -> bool {
            self.ready
        }

        async fn seek(&mut self, time_secs: f64) -> CreteResult<()> {
            if self.stall {
                std::future::pending::<()>().await;
            }
            tokio::task::yield_now().await;
            self.position = time_secs;
            self.seeks.push(time_secs);
            Ok(())
        }

        fn read_frame(&mut self, frame: &mut RasterFrame) -> CreteResult<()> {
            frame.pts_secs = self.position;
            Ok(())
        }
    }

    #[test]
    fn test_one_second_at_thirty_fps_yields_thirty_one_stamps() {
        let trim = TrimWindow::new(0.0, 1.0).unwrap();
        let stamps: Vec<f64> = sample_timestamps(trim, 30).collect();
        assert_eq!(stamps.len(), 31);
        for (i, t) in stamps.iter().enumerate() {
            assert!((t - i as f64 / 30.0).abs() < 1e-12);
        }
        assert_eq!(*stamps.last().unwrap(), 1.0);
    }

    #[test]
    fn test_frame_count_tolerates_float_spans() {
        let trim = TrimWindow::new(0.1, 0.4).unwrap();
        assert_eq!(frame_count(trim, 10), 4);
    }

    #[test]
    fn test_near_whole_span_clamps_last_sample_to_end() {
        let end = 0.3 - 1e-11;
        let trim = TrimWindow::new(0.0, end).unwrap();
        assert_eq!(frame_count(trim, 10), 4);

        let times: Vec<f64> = sample_timestamps(trim, 10).collect();
        assert_eq!(times.len(), 4);
        assert_eq!(*times.last().unwrap(), end);

        // Well short of the next step: the literal floor applies.
        let trim = TrimWindow::new(0.0, 0.29).unwrap();
        assert_eq!(frame_count(trim, 10), 3);
    }

    #[test]
    fn test_long_span_keeps_relative_slack() {
        let trim = TrimWindow::new(1000.1, 4000.1).unwrap();
        assert_eq!(frame_count(trim, 30), 90_001);
    }

    #[tokio::test]
    async fn test_sampler_seeks_each_timestamp_in_order() {
        let mut clip = FakeClip::ready(2.0);
        let trim = TrimWindow::new(0.5, 0.6).unwrap();
        let mut sampler = FrameSampler::new(&mut clip, trim, 30, Duration::from_secs(1)).unwrap();
        assert_eq!(sampler.total_frames(), 4);

        let mut seen = Vec::new();
        while let Some((time, frame)) = sampler.next_frame().await.unwrap() {
            assert_eq!(frame.pts_secs, time);
            assert_eq!((frame.width, frame.height), (64, 48));
            seen.push(time);
        }

        assert_eq!(seen.len(), 4);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(clip.seeks, seen);
    }

    #[tokio::test]
    async fn test_not_ready_clip_fails_before_seeking() {
        let mut clip = FakeClip::ready(2.0);
        clip.ready = false;
        let trim = TrimWindow::new(0.0, 1.0).unwrap();
        let err = FrameSampler::new(&mut clip, trim, 30, Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(err, CreteError::ClipNotReady { .. }));
        assert!(clip.seeks.is_empty());
    }

    #[tokio::test]
    async fn test_window_past_clip_end_is_rejected() {
        let mut clip = FakeClip::ready(1.0);
        let trim = TrimWindow::new(0.0, 1.5).unwrap();
        let err = FrameSampler::new(&mut clip, trim, 30, Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(err, CreteError::InvalidTrim { .. }));
    }

    #[tokio::test]
    async fn test_stalled_seek_times_out() {
        let mut clip = FakeClip::ready(1.0);
        clip.stall = true;
        let trim = TrimWindow::new(0.0, 1.0).unwrap();
        let mut sampler =
            FrameSampler::new(&mut clip, trim, 30, Duration::from_millis(20)).unwrap();
        let err = sampler.next_frame().await.err().unwrap();
        assert!(matches!(err, CreteError::Timeout { .. }));
    }

    proptest! {
        #[test]
        fn prop_frame_count_matches_formula(
            start_ms in 0u32..10_000,
            span_ms in 1u32..10_000,
            fps in 1u32..120,
        ) {
            let start = start_ms as f64 / 1000.0;
            let end = (start_ms + span_ms) as f64 / 1000.0;
            let trim = TrimWindow::new(start, end).unwrap();

            let expected = (span_ms as u64 * fps as u64 / 1000) as usize + 1;
            let stamps: Vec<f64> = sample_timestamps(trim, fps).collect();

            prop_assert_eq!(stamps.len(), expected);
            prop_assert!(stamps.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(stamps.iter().all(|&t| t >= start && t <= end));
        }
    }
}
