use crate::math::{Point3, Vector3};

/// A world axis, used for axis locks and depth proxies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[must_use]
    pub fn unit_vector(self) -> Vector3 {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    /// Coordinate of `p` along this axis.
    #[must_use]
    pub fn component(self, p: &Point3) -> f64 {
        self.component_of(&p.coords)
    }

    /// Component of `v` along this axis.
    #[must_use]
    pub fn component_of(self, v: &Vector3) -> f64 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    /// Keeps only this axis' component of `v`.
    #[must_use]
    pub fn isolate(self, v: &Vector3) -> Vector3 {
        self.unit_vector() * self.component_of(v)
    }
}
