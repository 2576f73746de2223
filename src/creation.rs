//! Click-driven edge and surface construction.
//!
//! Both builders only collect vertex keys until the final click; nothing is
//! written to the model before the commit. The provisional geometry is
//! exposed through `preview` for drawing.

use tracing::debug;

use crate::camera::Projection;
use crate::error::ModelError;
use crate::math::intersect_3d::ray_plane_intersect;
use crate::math::{Point2, Point3, Vector2, Vector3};
use crate::model::{EdgeKey, Model, SurfaceKey, VertexKey};
use crate::viewport::Viewport;

/// Where the pointer lands on the plane through `through`.
///
/// Orthographic viewports keep `through`'s coordinate on the dropped axis.
/// The perspective viewport intersects the pointer ray with the horizontal
/// plane through `through`; `None` when the ray misses it.
#[must_use]
pub fn pointer_on_plane(
    viewport: Viewport,
    pointer: &Point2,
    screen_size: &Vector2,
    projection: &dyn Projection,
    through: &Point3,
) -> Option<Point3> {
    match viewport.depth(through) {
        Some(depth) => {
            let flat = projection.screen_to_world(viewport, pointer, screen_size);
            viewport.unproject(&flat, depth)
        }
        None => {
            let ray = projection.screen_to_world_ray(pointer, screen_size);
            ray_plane_intersect(&ray, through, &Vector3::y()).point()
        }
    }
}

/// Outcome of one click on an [`EdgeBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStep {
    Started,
    Committed(EdgeKey),
    Ignored,
}

/// Edge tool state: idle, or waiting for the second endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EdgeBuilder {
    #[default]
    Idle,
    Pending {
        first: VertexKey,
        /// Free end of the provisional edge.
        cursor: Point3,
    },
}

impl EdgeBuilder {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, EdgeBuilder::Idle)
    }

    /// First endpoint of the provisional edge.
    #[must_use]
    pub fn first(&self) -> Option<VertexKey> {
        match self {
            EdgeBuilder::Idle => None,
            EdgeBuilder::Pending { first, .. } => Some(*first),
        }
    }

    /// Handles a click on `vertex`. The second distinct vertex commits the edge.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if a vertex is missing; the
    /// builder returns to idle when the commit fails.
    pub fn click(&mut self, model: &mut Model, vertex: VertexKey) -> Result<EdgeStep, ModelError> {
        let position = model.vertex(vertex)?.position;
        match *self {
            EdgeBuilder::Idle => {
                *self = EdgeBuilder::Pending {
                    first: vertex,
                    cursor: position,
                };
                debug!("edge started");
                Ok(EdgeStep::Started)
            }
            EdgeBuilder::Pending { first, .. } if first == vertex => Ok(EdgeStep::Ignored),
            EdgeBuilder::Pending { first, .. } => {
                *self = EdgeBuilder::Idle;
                let key = model.add_edge(first, vertex)?;
                debug!("edge committed");
                Ok(EdgeStep::Committed(key))
            }
        }
    }

    /// Moves the free end of the provisional edge.
    pub fn track_cursor(&mut self, point: Point3) {
        if let EdgeBuilder::Pending { cursor, .. } = self {
            *cursor = point;
        }
    }

    /// Endpoints of the provisional edge.
    #[must_use]
    pub fn preview(&self, model: &Model) -> Option<(Point3, Point3)> {
        match self {
            EdgeBuilder::Idle => None,
            EdgeBuilder::Pending { first, cursor } => {
                model.vertex(*first).ok().map(|v| (v.position, *cursor))
            }
        }
    }

    /// Discards the provisional edge. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        let was_pending = !self.is_idle();
        if was_pending {
            debug!("edge creation cancelled");
        }
        *self = EdgeBuilder::Idle;
        was_pending
    }
}

/// Outcome of one click on a [`SurfaceBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceStep {
    Started,
    Appended,
    /// An interior vertex was clicked again and taken out of the loop.
    Removed,
    Closed(SurfaceKey),
    Ignored,
}

/// Surface tool state: idle, or collecting the vertex loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SurfaceBuilder {
    #[default]
    Idle,
    Building {
        vertices: Vec<VertexKey>,
        cursor: Option<Point3>,
    },
}

impl SurfaceBuilder {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, SurfaceBuilder::Idle)
    }

    /// Vertices collected so far.
    #[must_use]
    pub fn vertices(&self) -> &[VertexKey] {
        match self {
            SurfaceBuilder::Idle => &[],
            SurfaceBuilder::Building { vertices, .. } => vertices,
        }
    }

    /// Handles a click on `vertex`.
    ///
    /// Clicking the first vertex again closes the loop once it has at least
    /// three vertices; with fewer the click is ignored. Clicking another
    /// vertex already in the loop removes it.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if a vertex is missing; the
    /// builder returns to idle when the commit fails.
    pub fn click(&mut self, model: &mut Model, vertex: VertexKey) -> Result<SurfaceStep, ModelError> {
        model.vertex(vertex)?;
        let SurfaceBuilder::Building { vertices, .. } = &mut *self else {
            *self = SurfaceBuilder::Building {
                vertices: vec![vertex],
                cursor: None,
            };
            debug!("surface started");
            return Ok(SurfaceStep::Started);
        };

        if vertices.first() == Some(&vertex) {
            if vertices.len() < 3 {
                return Ok(SurfaceStep::Ignored);
            }
            let loop_vertices = std::mem::take(vertices);
            *self = SurfaceBuilder::Idle;
            let key = model.add_surface(loop_vertices)?;
            debug!("surface closed");
            return Ok(SurfaceStep::Closed(key));
        }

        if let Some(index) = vertices.iter().position(|&k| k == vertex) {
            vertices.remove(index);
            Ok(SurfaceStep::Removed)
        } else {
            vertices.push(vertex);
            Ok(SurfaceStep::Appended)
        }
    }

    pub fn track_cursor(&mut self, point: Point3) {
        if let SurfaceBuilder::Building { cursor, .. } = self {
            *cursor = Some(point);
        }
    }

    /// Outline of the provisional surface, cursor last.
    #[must_use]
    pub fn preview(&self, model: &Model) -> Vec<Point3> {
        match self {
            SurfaceBuilder::Idle => Vec::new(),
            SurfaceBuilder::Building { vertices, cursor } => vertices
                .iter()
                .filter_map(|&k| model.vertex(k).ok().map(|v| v.position))
                .chain(*cursor)
                .collect(),
        }
    }

    /// Discards the provisional surface. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        let was_building = !self.is_idle();
        if was_building {
            debug!("surface creation cancelled");
        }
        *self = SurfaceBuilder::Idle;
        was_building
    }
}
