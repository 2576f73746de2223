use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{Point2, Point3, Vector2, Vector3};
use crate::transform::Axis;

/// One of the four editor panels.
///
/// The orthographic panels each drop one world axis. Their 2D world frame is
/// screen aligned (x right, y down):
///
/// | viewport | 2D x | 2D y | dropped (depth) |
/// |----------|------|------|-----------------|
/// | top      | X    | Z    | Y               |
/// | front    | X    | -Y   | Z               |
/// | side     | -Z   | -Y   | X               |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    Top,
    Front,
    Side,
    #[serde(rename = "3d")]
    Perspective,
}

impl Viewport {
    pub const ALL: [Viewport; 4] = [
        Viewport::Top,
        Viewport::Front,
        Viewport::Side,
        Viewport::Perspective,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Viewport::Top => "top",
            Viewport::Front => "front",
            Viewport::Side => "side",
            Viewport::Perspective => "3d",
        }
    }

    #[must_use]
    pub fn is_orthographic(self) -> bool {
        !matches!(self, Viewport::Perspective)
    }

    /// The world axis this viewport looks along, or `None` for perspective.
    #[must_use]
    pub fn depth_axis(self) -> Option<Axis> {
        match self {
            Viewport::Top => Some(Axis::Y),
            Viewport::Front => Some(Axis::Z),
            Viewport::Side => Some(Axis::X),
            Viewport::Perspective => None,
        }
    }

    /// Depth proxy used for topmost-wins picking: the coordinate along the
    /// dropped axis. Larger is nearer to the viewer.
    #[must_use]
    pub fn depth(self, p: &Point3) -> Option<f64> {
        self.depth_axis().map(|axis| axis.component(p))
    }

    /// Projects a world point into this viewport's 2D world frame.
    #[must_use]
    pub fn project(self, p: &Point3) -> Option<Point2> {
        match self {
            Viewport::Top => Some(Point2::new(p.x, p.z)),
            Viewport::Front => Some(Point2::new(p.x, -p.y)),
            Viewport::Side => Some(Point2::new(-p.z, -p.y)),
            Viewport::Perspective => None,
        }
    }

    /// Inverse of [`Viewport::project`], placing the point at `depth` along
    /// the dropped axis.
    #[must_use]
    pub fn unproject(self, p: &Point2, depth: f64) -> Option<Point3> {
        match self {
            Viewport::Top => Some(Point3::new(p.x, depth, p.y)),
            Viewport::Front => Some(Point3::new(p.x, -p.y, depth)),
            Viewport::Side => Some(Point3::new(depth, -p.y, -p.x)),
            Viewport::Perspective => None,
        }
    }

    /// Maps a 2D cursor delta onto the two world axes this viewport shows.
    #[must_use]
    pub fn map_delta(self, d: &Vector2) -> Option<Vector3> {
        match self {
            Viewport::Top => Some(Vector3::new(d.x, 0.0, d.y)),
            Viewport::Front => Some(Vector3::new(d.x, -d.y, 0.0)),
            Viewport::Side => Some(Vector3::new(0.0, -d.y, -d.x)),
            Viewport::Perspective => None,
        }
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
