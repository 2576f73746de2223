use super::{Point3, Vector3, TOLERANCE};

/// A half-line `origin + t * direction` for `t >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start of the ray (the camera eye for picking rays).
    pub origin: Point3,
    /// Direction of travel. Not required to be unit length.
    pub direction: Vector3,
}

impl Ray {
    /// Creates a new ray.
    #[must_use]
    pub fn new(origin: Point3, direction: Vector3) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t`.
    #[must_use]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}

/// Relationship of a ray with a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RayPlaneRelation {
    /// Ray hits the plane at a single point in front of its origin.
    Point { point: Point3, t: f64 },
    /// The supporting line crosses the plane behind the ray origin.
    Behind,
    /// Ray is parallel to the plane (does not intersect).
    Parallel,
    /// Ray lies entirely on the plane.
    OnPlane,
}

impl RayPlaneRelation {
    /// The hit point, if the ray intersects the plane at a single point.
    #[must_use]
    pub fn point(&self) -> Option<Point3> {
        match self {
            Self::Point { point, .. } => Some(*point),
            _ => None,
        }
    }
}

/// Computes the intersection of a ray with the plane through `plane_point`
/// with normal `plane_normal`.
#[must_use]
pub fn ray_plane_intersect(
    ray: &Ray,
    plane_point: &Point3,
    plane_normal: &Vector3,
) -> RayPlaneRelation {
    let denom = plane_normal.dot(&ray.direction);
    let numer = plane_normal.dot(&(plane_point - ray.origin));

    if denom.abs() < TOLERANCE {
        if numer.abs() < TOLERANCE {
            RayPlaneRelation::OnPlane
        } else {
            RayPlaneRelation::Parallel
        }
    } else {
        let t = numer / denom;
        if t < 0.0 {
            RayPlaneRelation::Behind
        } else {
            RayPlaneRelation::Point {
                point: ray.at(t),
                t,
            }
        }
    }
}
