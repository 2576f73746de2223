//! Screen/world projection service.
//!
//! The editing core only talks to [`Projection`]. [`ViewCameras`] is a plain
//! reference implementation: pan/zoom orthographic panels and a look-at
//! pinhole camera. Orbit and pan controls live with the host.

use nalgebra::{Isometry3, Perspective3};

use crate::math::intersect_3d::Ray;
use crate::math::{Point2, Point3, Vector2, Vector3};
use crate::viewport::Viewport;

/// Projection collaborator consumed by picking, dragging and creation.
pub trait Projection {
    /// Maps a pixel of an orthographic viewport into its 2D world frame
    /// (see [`Viewport::project`]).
    fn screen_to_world(&self, viewport: Viewport, screen: &Point2, screen_size: &Vector2) -> Point2;

    /// Projects a world point into the perspective viewport, or `None` when
    /// the point cannot be projected (behind the camera).
    fn project_to_screen(&self, world: &Point3, screen_size: &Vector2) -> Option<Point2>;

    /// Ray from the perspective camera through a pixel.
    fn screen_to_world_ray(&self, screen: &Point2, screen_size: &Vector2) -> Ray;

    /// World position of the perspective camera.
    fn camera_position(&self) -> Point3;
}

/// Pan/zoom state of one orthographic panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoView {
    /// 2D world point shown at the panel centre.
    pub center: Point2,
    /// Pixels per world unit.
    pub zoom: f64,
}

impl Default for OrthoView {
    fn default() -> Self {
        Self {
            center: Point2::origin(),
            zoom: 1.0,
        }
    }
}

impl OrthoView {
    #[must_use]
    pub fn screen_to_world(&self, screen: &Point2, screen_size: &Vector2) -> Point2 {
        let zoom = if self.zoom.abs() > f64::EPSILON { self.zoom } else { 1.0 };
        self.center + (screen - Point2::from(screen_size * 0.5)) / zoom
    }

    #[must_use]
    pub fn world_to_screen(&self, world: &Point2, screen_size: &Vector2) -> Point2 {
        Point2::from(screen_size * 0.5) + (world - self.center) * self.zoom
    }
}

/// Look-at pinhole camera for the perspective panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub eye: Point3,
    pub target: Point3,
    pub up: Vector3,
    /// Vertical field of view in radians.
    pub fov_y: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            eye: Point3::new(300.0, 300.0, 300.0),
            target: Point3::origin(),
            up: Vector3::y(),
            fov_y: 60.0_f64.to_radians(),
            near: 0.1,
            far: 10_000.0,
        }
    }
}

impl PerspectiveCamera {
    fn view(&self) -> Isometry3<f64> {
        Isometry3::look_at_rh(&self.eye, &self.target, &self.up)
    }

    fn projection(&self, screen_size: &Vector2) -> Perspective3<f64> {
        let aspect = if screen_size.y > 0.0 && screen_size.x > 0.0 {
            screen_size.x / screen_size.y
        } else {
            1.0
        };
        Perspective3::new(aspect, self.fov_y, self.near, self.far)
    }

    /// Projects to pixel coordinates (origin top-left, y down).
    #[must_use]
    pub fn project(&self, world: &Point3, screen_size: &Vector2) -> Option<Point2> {
        let in_view = self.view() * world;
        // Camera looks down -Z in view space.
        if -in_view.z < self.near {
            return None;
        }
        let ndc = self.projection(screen_size).project_point(&in_view);
        if !(ndc.x.is_finite() && ndc.y.is_finite()) {
            return None;
        }
        Some(Point2::new(
            (ndc.x + 1.0) * 0.5 * screen_size.x,
            (1.0 - ndc.y) * 0.5 * screen_size.y,
        ))
    }

    /// Ray from the eye through a pixel.
    #[must_use]
    pub fn ray(&self, screen: &Point2, screen_size: &Vector2) -> Ray {
        let (w, h) = (screen_size.x.max(1.0), screen_size.y.max(1.0));
        let ndc_x = screen.x / w * 2.0 - 1.0;
        let ndc_y = 1.0 - screen.y / h * 2.0;
        let on_near = self
            .projection(screen_size)
            .unproject_point(&Point3::new(ndc_x, ndc_y, -1.0));
        let world = self.view().inverse() * on_near;
        Ray::new(self.eye, (world - self.eye).normalize())
    }
}

/// The four panels' cameras.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewCameras {
    pub top: OrthoView,
    pub front: OrthoView,
    pub side: OrthoView,
    pub perspective: PerspectiveCamera,
}

impl ViewCameras {
    /// Orthographic view state of a panel, `None` for perspective.
    #[must_use]
    pub fn ortho(&self, viewport: Viewport) -> Option<&OrthoView> {
        match viewport {
            Viewport::Top => Some(&self.top),
            Viewport::Front => Some(&self.front),
            Viewport::Side => Some(&self.side),
            Viewport::Perspective => None,
        }
    }
}

impl Projection for ViewCameras {
    fn screen_to_world(&self, viewport: Viewport, screen: &Point2, screen_size: &Vector2) -> Point2 {
        self.ortho(viewport)
            .map_or(*screen, |view| view.screen_to_world(screen, screen_size))
    }

    fn project_to_screen(&self, world: &Point3, screen_size: &Vector2) -> Option<Point2> {
        self.perspective.project(world, screen_size)
    }

    fn screen_to_world_ray(&self, screen: &Point2, screen_size: &Vector2) -> Ray {
        self.perspective.ray(screen, screen_size)
    }

    fn camera_position(&self) -> Point3 {
        self.perspective.eye
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn size() -> Vector2 {
        Vector2::new(800.0, 600.0)
    }

    #[test]
    fn ortho_centre_maps_to_view_centre() {
        let view = OrthoView {
            center: Point2::new(10.0, -5.0),
            zoom: 2.0,
        };
        let w = view.screen_to_world(&Point2::new(400.0, 300.0), &size());
        assert_relative_eq!(w, Point2::new(10.0, -5.0));
        let w = view.screen_to_world(&Point2::new(420.0, 300.0), &size());
        assert_relative_eq!(w, Point2::new(20.0, -5.0));
        assert_relative_eq!(view.world_to_screen(&w, &size()), Point2::new(420.0, 300.0));
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let cam = PerspectiveCamera::default();
        let s = cam.project(&Point3::origin(), &size()).unwrap();
        assert_relative_eq!(s, Point2::new(400.0, 300.0), epsilon = 1e-9);
    }

    #[test]
    fn point_behind_camera_is_unprojectable() {
        let cam = PerspectiveCamera::default();
        assert!(cam.project(&Point3::new(600.0, 600.0, 600.0), &size()).is_none());
    }

    #[test]
    fn ray_passes_through_projected_point() {
        let cam = PerspectiveCamera::default();
        let world = Point3::new(40.0, 10.0, -25.0);
        let s = cam.project(&world, &size()).unwrap();
        let ray = cam.ray(&s, &size());
        let to_point = (world - ray.origin).normalize();
        assert_relative_eq!(ray.direction, to_point, epsilon = 1e-9);
    }

    #[test]
    fn view_cameras_dispatch_per_viewport() {
        let mut cams = ViewCameras::default();
        cams.front.center = Point2::new(100.0, 0.0);
        let centre = Point2::new(400.0, 300.0);
        assert_relative_eq!(
            cams.screen_to_world(Viewport::Front, &centre, &size()),
            Point2::new(100.0, 0.0)
        );
        assert_relative_eq!(cams.screen_to_world(Viewport::Top, &centre, &size()), Point2::origin());
        assert_eq!(cams.camera_position(), cams.perspective.eye);
    }
}
