//! Playback clock abstraction.
//!
//! The trace player never reads a media element directly. It asks a
//! [`PlaybackClock`] for the current media time and seeks through it,
//! which lets the loop logic run against a real-time clock in the CLI
//! and a hand-driven one in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A seekable source of media playback time, in seconds.
pub trait PlaybackClock: Send {
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Move the playback position to `time_secs`.
    fn seek(&mut self, time_secs: f64);
}

/// A clock that only moves when told to.
///
/// Clones share the same position, so a test can keep one handle and
/// advance time while another handle is owned by the player.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
    seeks: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock positioned at `time_secs`.
    pub fn at(time_secs: f64) -> Self {
        let clock = Self::default();
        clock.set(time_secs);
        clock
    }

    /// Set the position without counting it as a seek.
    pub fn set(&self, time_secs: f64) {
        self.bits.store(time_secs.to_bits(), Ordering::SeqCst);
    }

    /// Move the position forward by `delta_secs`.
    pub fn advance(&self, delta_secs: f64) {
        self.set(self.now() + delta_secs);
    }

    /// Number of `seek` calls made through any handle.
    pub fn seek_count(&self) -> u64 {
        self.seeks.load(Ordering::SeqCst)
    }

    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

impl PlaybackClock for ManualClock {
    fn current_time(&self) -> f64 {
        self.now()
    }

    fn seek(&mut self, time_secs: f64) {
        self.seeks.fetch_add(1, Ordering::SeqCst);
        self.set(time_secs);
    }
}

/// A clock that advances in real time from the last seek.
#[derive(Debug, Clone)]
pub struct WallClock {
    anchor: Instant,
    anchor_media_secs: f64,
}

impl WallClock {
    /// Start playing from `time_secs` now.
    pub fn starting_at(time_secs: f64) -> Self {
        Self {
            anchor: Instant::now(),
            anchor_media_secs: time_secs,
        }
    }
}

impl PlaybackClock for WallClock {
    fn current_time(&self) -> f64 {
        self.anchor_media_secs + self.anchor.elapsed().as_secs_f64()
    }

    fn seek(&mut self, time_secs: f64) {
        self.anchor = Instant::now();
        self.anchor_media_secs = time_secs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shares_position_between_clones() {
        let handle = ManualClock::at(1.0);
        let mut owned = handle.clone();

        handle.advance(0.5);
        assert!((owned.current_time() - 1.5).abs() < 1e-12);

        owned.seek(0.25);
        assert!((handle.current_time() - 0.25).abs() < 1e-12);
        assert_eq!(handle.seek_count(), 1);
    }

    #[test]
    fn test_set_is_not_a_seek() {
        let clock = ManualClock::default();
        clock.set(3.0);
        assert_eq!(clock.seek_count(), 0);
        assert_eq!(clock.current_time(), 3.0);
    }

    #[test]
    fn test_wall_clock_seek_resets_anchor() {
        let mut clock = WallClock::starting_at(10.0);
        assert!(clock.current_time() >= 10.0);

        clock.seek(2.0);
        let now = clock.current_time();
        assert!((2.0..2.5).contains(&now), "unexpected time {now}");
    }
}
