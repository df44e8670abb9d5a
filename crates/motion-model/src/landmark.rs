//! Pose landmarks and skeleton topology.
//!
//! A pose is an ordered set of landmarks, one slot per body joint, in the
//! 33-point layout used by full-body pose models. Lighter models (e.g.
//! upper-body only) return a shorter set; any joint past the end of the
//! set is treated as missing.

use serde::{Deserialize, Serialize};

/// Number of landmarks in a full-body pose.
pub const POSE_LANDMARK_COUNT: usize = 33;

pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const RIGHT_ANKLE: usize = 27;
pub const LEFT_ANKLE: usize = 28;

/// Skeleton connections (pairs of landmark indices) drawn by the overlay.
pub const POSE_CONNECTIONS: [(usize, usize); 35] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 7),
    (0, 4),
    (4, 5),
    (5, 6),
    (6, 8),
    (9, 10),
    (11, 12),
    (11, 13),
    (13, 15),
    (15, 17),
    (15, 19),
    (15, 21),
    (17, 19),
    (12, 14),
    (14, 16),
    (16, 18),
    (16, 20),
    (16, 22),
    (18, 20),
    (11, 23),
    (12, 24),
    (23, 24),
    (23, 25),
    (24, 26),
    (25, 27),
    (26, 28),
    (27, 29),
    (28, 30),
    (29, 31),
    (30, 32),
    (27, 31),
    (28, 32),
];

/// A single body keypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized X coordinate [0.0, 1.0].
    pub x: f64,
    /// Normalized Y coordinate [0.0, 1.0], growing downwards.
    pub y: f64,
    /// Model confidence that the joint is visible.
    #[serde(default = "full_visibility")]
    pub visibility: f64,
}

fn full_visibility() -> f64 {
    1.0
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }

    /// Position as a point.
    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.visibility.is_finite()
    }
}

/// All landmarks detected in one frame.
///
/// Never partially filled: a frame either has a complete set from the
/// model or no `PoseLandmarks` at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoseLandmarks(Vec<Landmark>);

impl PoseLandmarks {
    /// Wrap a model's landmark set.
    ///
    /// Returns `None` for an empty set or one containing non-finite
    /// values, both of which mean "no usable pose".
    pub fn new(points: Vec<Landmark>) -> Option<Self> {
        if points.is_empty() || !points.iter().all(Landmark::is_finite) {
            return None;
        }
        Some(Self(points))
    }

    /// Landmark at `index`, or `None` if this set does not cover it.
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Landmark] {
        &self.0
    }
}

/// A 2D normalized point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between two points.
    pub fn midpoint(a: Point2D, b: Point2D) -> Self {
        Self::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }

    /// Scale a normalized point into pixel space.
    pub fn to_pixels(&self, width: u32, height: u32) -> (f64, f64) {
        (self.x * width as f64, self.y * height as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_pose() -> Vec<Landmark> {
        (0..POSE_LANDMARK_COUNT)
            .map(|i| Landmark::new(i as f64 / 100.0, 0.5, 0.9))
            .collect()
    }

    #[test]
    fn test_empty_set_is_no_pose() {
        assert!(PoseLandmarks::new(vec![]).is_none());
    }

    #[test]
    fn test_non_finite_set_is_no_pose() {
        let mut points = full_pose();
        points[5].x = f64::NAN;
        assert!(PoseLandmarks::new(points).is_none());
    }

    #[test]
    fn test_short_set_reports_missing_joints() {
        let points = full_pose().into_iter().take(25).collect();
        let pose = PoseLandmarks::new(points).unwrap();
        assert!(pose.get(LEFT_SHOULDER).is_some());
        assert!(pose.get(RIGHT_ANKLE).is_none());
        assert!(pose.get(LEFT_ANKLE).is_none());
    }

    #[test]
    fn test_connections_stay_within_full_pose() {
        for (a, b) in POSE_CONNECTIONS {
            assert!(a < POSE_LANDMARK_COUNT && b < POSE_LANDMARK_COUNT);
        }
    }

    #[test]
    fn test_landmarks_serialize_as_plain_array() {
        let pose = PoseLandmarks::new(vec![Landmark::new(0.25, 0.75, 1.0)]).unwrap();
        let json = serde_json::to_string(&pose).unwrap();
        assert_eq!(json, r#"[{"x":0.25,"y":0.75,"visibility":1.0}]"#);

        let parsed: PoseLandmarks = serde_json::from_str(r#"[{"x":0.1,"y":0.2}]"#).unwrap();
        assert_eq!(parsed.get(0).unwrap().visibility, 1.0);
    }

    #[test]
    fn test_point_to_pixels() {
        let p = Point2D::new(0.5, 0.25);
        assert_eq!(p.to_pixels(640, 480), (320.0, 120.0));
    }
}
