//! Skeleton and board overlay rendering.
//!
//! Rendering goes through [`OverlaySurface`], a minimal 2D drawing target
//! in pixel coordinates. [`DrawCommandRecorder`] implements it by keeping
//! the commands of the last frame, which is all the CLI and tests need.

use crete_motion_model::landmark::{PoseLandmarks, POSE_CONNECTIONS};
use crete_motion_model::trace::FrameRecord;
use serde::Serialize;

/// Joints below this visibility are not drawn.
pub const OVERLAY_VISIBILITY_MIN: f64 = 0.5;

/// Label drawn next to the board marker.
pub const BOARD_LABEL: &str = "BOARD";

const BONE_WIDTH: f64 = 3.0;
const JOINT_RADIUS: f64 = 4.0;
const BOARD_RADIUS: f64 = 8.0;

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

pub mod colors {
    use super::Color;

    /// Skeleton bones.
    pub const BONE: Color = Color::rgba(51, 230, 230, 180);
    /// Joint markers.
    pub const JOINT: Color = Color::rgba(255, 51, 51, 255);
    /// Board center marker and label.
    pub const BOARD: Color = Color::rgba(255, 230, 51, 255);
}

/// A 2D drawing target in pixel coordinates.
pub trait OverlaySurface {
    /// Current surface size in pixels.
    fn size(&self) -> (u32, u32);

    /// Erase everything drawn so far.
    fn clear(&mut self);

    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64);

    fn draw_circle(&mut self, center: (f64, f64), radius: f64, color: Color);

    fn draw_label(&mut self, at: (f64, f64), text: &str, color: Color);
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Line {
        from: (f64, f64),
        to: (f64, f64),
        color: Color,
        width: f64,
    },
    Circle {
        center: (f64, f64),
        radius: f64,
        color: Color,
    },
    Label {
        at: (f64, f64),
        text: String,
        color: Color,
    },
}

/// Surface that records draw commands instead of rasterizing.
#[derive(Debug, Clone)]
pub struct DrawCommandRecorder {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
    frames: u64,
}

impl DrawCommandRecorder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            frames: 0,
        }
    }

    /// Change the surface size, as a canvas resize would.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Commands drawn since the last clear.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of clears, i.e. frames started.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl OverlaySurface for DrawCommandRecorder {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.frames += 1;
    }

    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn draw_circle(&mut self, center: (f64, f64), radius: f64, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn draw_label(&mut self, at: (f64, f64), text: &str, color: Color) {
        self.commands.push(DrawCommand::Label {
            at,
            text: text.to_string(),
            color,
        });
    }
}

/// Clear `surface` and draw `record` on it.
///
/// Nothing beyond the clear is drawn for a missing record; a record without
/// landmarks can still carry a board marker.
pub fn render_overlay<S: OverlaySurface + ?Sized>(surface: &mut S, record: Option<&FrameRecord>) {
    surface.clear();
    let Some(record) = record else {
        return;
    };
    let (width, height) = surface.size();

    if let Some(pose) = &record.landmarks {
        draw_skeleton(surface, pose, width, height);
    }

    if let Some(center) = record.board_center {
        let at = center.to_pixels(width, height);
        surface.draw_circle(at, BOARD_RADIUS, colors::BOARD);
        surface.draw_label(
            (at.0 + BOARD_RADIUS + 2.0, at.1),
            BOARD_LABEL,
            colors::BOARD,
        );
    }
}

fn draw_skeleton<S: OverlaySurface + ?Sized>(
    surface: &mut S,
    pose: &PoseLandmarks,
    width: u32,
    height: u32,
) {
    let visible = |index: usize| {
        pose.get(index)
            .filter(|l| l.visibility >= OVERLAY_VISIBILITY_MIN)
            .map(|l| l.point().to_pixels(width, height))
    };

    for (a, b) in POSE_CONNECTIONS {
        if let (Some(from), Some(to)) = (visible(a), visible(b)) {
            surface.draw_line(from, to, colors::BONE, BONE_WIDTH);
        }
    }

    for index in 0..pose.len() {
        if let Some(at) = visible(index) {
            surface.draw_circle(at, JOINT_RADIUS, colors::JOINT);
        }
    }
}
