//! Board and body kinematics from pose landmarks.
//!
//! There is no board detector. The board center is approximated from the
//! ankle midpoint pushed slightly down toward the deck.

use crete_motion_model::landmark::{
    Landmark, Point2D, PoseLandmarks, LEFT_ANKLE, LEFT_SHOULDER, RIGHT_ANKLE, RIGHT_SHOULDER,
};
use crete_motion_model::trace::KinematicSample;

/// Downward offset from the ankle midpoint to the estimated deck position,
/// in normalized frame units.
///
/// Calibration origin unknown; changing it shifts every stored board
/// height.
pub const BOARD_CENTER_Y_OFFSET: f64 = 0.02;

/// Derive the kinematic sample for one frame.
///
/// Without landmarks every numeric field is zero. Board center, height,
/// and angle need both ankles; shoulder rotation needs both shoulders.
pub fn derive_kinematics(landmarks: Option<&PoseLandmarks>, time: f64) -> KinematicSample {
    let mut sample = KinematicSample::empty(time);
    let Some(pose) = landmarks else {
        return sample;
    };

    let left_ankle = pose.get(LEFT_ANKLE);
    let right_ankle = pose.get(RIGHT_ANKLE);
    sample.left_ankle_y = left_ankle.map_or(0.0, |l| l.y);
    sample.right_ankle_y = right_ankle.map_or(0.0, |l| l.y);

    if let (Some(left), Some(right)) = (left_ankle, right_ankle) {
        let mid = Point2D::midpoint(left.point(), right.point());
        let center = Point2D::new(mid.x, mid.y + BOARD_CENTER_Y_OFFSET);
        sample.board_center = Some(center);
        sample.board_height = 1.0 - center.y;
        sample.board_angle_degrees = segment_angle_degrees(left, right);
    }

    if let (Some(left), Some(right)) = (pose.get(LEFT_SHOULDER), pose.get(RIGHT_SHOULDER)) {
        sample.shoulder_rotation_degrees = segment_angle_degrees(left, right);
    }

    sample
}

/// Angle of the segment from `left` to `right`, in degrees.
fn segment_angle_degrees(left: &Landmark, right: &Landmark) -> f64 {
    (right.y - left.y).atan2(right.x - left.x).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crete_motion_model::landmark::POSE_LANDMARK_COUNT;
    use proptest::prelude::*;

    fn pose_with(points: &[(usize, f64, f64)]) -> PoseLandmarks {
        let mut landmarks = vec![Landmark::new(0.5, 0.5, 1.0); POSE_LANDMARK_COUNT];
        for &(index, x, y) in points {
            landmarks[index] = Landmark::new(x, y, 1.0);
        }
        PoseLandmarks::new(landmarks).unwrap()
    }

    #[test]
    fn test_level_stance() {
        let pose = pose_with(&[(LEFT_ANKLE, 0.4, 0.6), (RIGHT_ANKLE, 0.6, 0.6)]);
        let sample = derive_kinematics(Some(&pose), 1.25);

        let center = sample.board_center.unwrap();
        assert!((center.x - 0.5).abs() < 1e-9);
        assert!((center.y - 0.62).abs() < 1e-9);
        assert!(sample.board_angle_degrees.abs() < 1e-9);
        assert!((sample.board_height - 0.38).abs() < 1e-9);
        assert_eq!(sample.time, 1.25);
    }

    #[test]
    fn test_no_landmarks_zeroes_everything() {
        let sample = derive_kinematics(None, 0.5);
        assert_eq!(sample, KinematicSample::empty(0.5));
    }

    #[test]
    fn test_missing_ankles_keep_shoulder_rotation() {
        let upper_body: Vec<Landmark> = (0..25)
            .map(|i| {
                if i == RIGHT_SHOULDER {
                    Landmark::new(0.6, 0.4, 1.0)
                } else {
                    Landmark::new(0.4, 0.4, 1.0)
                }
            })
            .collect();
        let pose = PoseLandmarks::new(upper_body).unwrap();
        let sample = derive_kinematics(Some(&pose), 0.0);

        assert!(sample.board_center.is_none());
        assert_eq!(sample.board_height, 0.0);
        assert_eq!(sample.board_angle_degrees, 0.0);
        assert_eq!(sample.left_ankle_y, 0.0);
        assert!(sample.shoulder_rotation_degrees.abs() < 1e-9);
    }

    #[test]
    fn test_single_ankle_reports_its_height_without_board() {
        let mut points = vec![Landmark::new(0.5, 0.5, 1.0); RIGHT_ANKLE + 1];
        points[RIGHT_ANKLE] = Landmark::new(0.55, 0.7, 1.0);
        let pose = PoseLandmarks::new(points).unwrap();
        assert!(pose.get(LEFT_ANKLE).is_none());

        let sample = derive_kinematics(Some(&pose), 0.4);
        assert_eq!(sample.right_ankle_y, 0.7);
        assert_eq!(sample.left_ankle_y, 0.0);
        assert!(sample.board_center.is_none());
        assert_eq!(sample.board_height, 0.0);
        assert_eq!(sample.board_angle_degrees, 0.0);
    }

    #[test]
    fn test_tilted_board_angle() {
        // Right ankle lower on screen than left: board tail pressed down.
        let pose = pose_with(&[(LEFT_ANKLE, 0.4, 0.5), (RIGHT_ANKLE, 0.5, 0.6)]);
        let sample = derive_kinematics(Some(&pose), 0.0);
        assert!((sample.board_angle_degrees - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_shoulder_rotation_uses_shoulder_pair() {
        let pose = pose_with(&[(LEFT_SHOULDER, 0.5, 0.3), (RIGHT_SHOULDER, 0.5, 0.4)]);
        let sample = derive_kinematics(Some(&pose), 0.0);
        assert!((sample.shoulder_rotation_degrees - 90.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_board_center_sits_below_ankle_midpoint(
            lx in 0.0f64..1.0, ly in 0.0f64..1.0,
            rx in 0.0f64..1.0, ry in 0.0f64..1.0,
        ) {
            let pose = pose_with(&[(LEFT_ANKLE, lx, ly), (RIGHT_ANKLE, rx, ry)]);
            let sample = derive_kinematics(Some(&pose), 0.0);
            let center = sample.board_center.unwrap();

            prop_assert!((center.y - ((ly + ry) / 2.0 + BOARD_CENTER_Y_OFFSET)).abs() < 1e-9);
            prop_assert!((sample.board_height - (1.0 - center.y)).abs() < 1e-9);
            prop_assert_eq!(sample.left_ankle_y, ly);
            prop_assert_eq!(sample.right_ankle_y, ry);
        }

        #[test]
        fn prop_short_pose_has_no_board(len in 1usize..28, y in 0.0f64..1.0) {
            let pose = PoseLandmarks::new(vec![Landmark::new(0.5, y, 1.0); len]).unwrap();
            let sample = derive_kinematics(Some(&pose), 0.0);

            prop_assert!(sample.board_center.is_none());
            prop_assert_eq!(sample.board_height, 0.0);
            prop_assert_eq!(sample.board_angle_degrees, 0.0);
        }
    }
}
