//! Hover resolution across the four viewports.
//!
//! At most one entity is hovered, with strict priority vertex > edge >
//! surface. Among several hits of the same kind:
//!
//! * orthographic viewports keep the candidate with the largest coordinate
//!   along the dropped axis (painter's order, topmost wins);
//! * the perspective viewport keeps the candidate nearest to the camera.
//!
//! Candidates that cannot be projected are skipped.

use crate::camera::Projection;
use crate::config::EditorConfig;
use crate::math::distance_2d::point_to_segment_dist;
use crate::math::polygon_2d::point_in_polygon_2d;
use crate::math::{centroid, Point2, Point3, Vector2};
use crate::model::{EdgeKey, Model, SurfaceKey, VertexKey};
use crate::tool::Tool;
use crate::viewport::Viewport;

/// The entity under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoverTarget {
    Vertex(VertexKey),
    Edge(EdgeKey),
    Surface(SurfaceKey),
}

/// Where the pointer is and what may be picked.
#[derive(Clone, Copy)]
pub struct PickQuery<'a> {
    pub viewport: Viewport,
    /// Pointer position in viewport pixels.
    pub pointer: Point2,
    pub screen_size: Vector2,
    pub projection: &'a dyn Projection,
    pub tool: Tool,
}

/// Hover resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Picker {
    pick_radius: f64,
    screen_pick_radius: f64,
}

impl Picker {
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            pick_radius: config.pick_radius,
            screen_pick_radius: config.screen_pick_radius,
        }
    }

    /// Resolves the hovered entity, honouring the tool's eligibility rules.
    #[must_use]
    pub fn resolve(&self, model: &Model, query: &PickQuery<'_>) -> Option<HoverTarget> {
        if query.tool.picks_vertices() {
            if let Some(v) = self.pick_vertex(model, query) {
                return Some(HoverTarget::Vertex(v));
            }
        }
        if query.tool.picks_edges_and_surfaces() {
            if let Some(e) = self.pick_edge(model, query) {
                return Some(HoverTarget::Edge(e));
            }
            if let Some(s) = self.pick_surface(model, query) {
                return Some(HoverTarget::Surface(s));
            }
        }
        None
    }

    /// Best visible vertex within the pick radius.
    #[must_use]
    pub fn pick_vertex(&self, model: &Model, query: &PickQuery<'_>) -> Option<VertexKey> {
        let frame = self.frame(query);
        model
            .vertices()
            .filter(|(_, v)| !v.hidden)
            .filter_map(|(key, v)| {
                let flat = frame.flatten(&v.position)?;
                ((flat - frame.cursor).norm() <= frame.radius).then(|| (key, frame.score(&v.position)))
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(key, _)| key)
    }

    /// Best edge whose projected segment passes within the pick radius.
    #[must_use]
    pub fn pick_edge(&self, model: &Model, query: &PickQuery<'_>) -> Option<EdgeKey> {
        let frame = self.frame(query);
        model
            .edges()
            .filter_map(|(key, _)| {
                let (a, b) = model.edge_points(key).ok()?;
                let (fa, fb) = (frame.flatten(&a)?, frame.flatten(&b)?);
                let midpoint = Point3::from((a.coords + b.coords) * 0.5);
                (point_to_segment_dist(&frame.cursor, &fa, &fb) <= frame.radius)
                    .then(|| (key, frame.score(&midpoint)))
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(key, _)| key)
    }

    /// Best surface whose projected polygon contains the pointer.
    #[must_use]
    pub fn pick_surface(&self, model: &Model, query: &PickQuery<'_>) -> Option<SurfaceKey> {
        let frame = self.frame(query);
        model
            .surfaces()
            .filter_map(|(key, _)| {
                let points = model.surface_points(key).ok()?;
                let flat = points
                    .iter()
                    .map(|p| frame.flatten(p))
                    .collect::<Option<Vec<_>>>()?;
                let center = centroid(&points)?;
                point_in_polygon_2d(&frame.cursor, &flat).then(|| (key, frame.score(&center)))
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(key, _)| key)
    }

    fn frame<'a>(&self, query: &PickQuery<'a>) -> PickFrame<'a> {
        if query.viewport.is_orthographic() {
            PickFrame {
                viewport: query.viewport,
                cursor: query
                    .projection
                    .screen_to_world(query.viewport, &query.pointer, &query.screen_size),
                radius: self.pick_radius,
                screen_size: query.screen_size,
                projection: query.projection,
            }
        } else {
            PickFrame {
                viewport: query.viewport,
                cursor: query.pointer,
                radius: self.screen_pick_radius,
                screen_size: query.screen_size,
                projection: query.projection,
            }
        }
    }
}

/// Sets the hover flag on `target` and clears it everywhere else.
pub fn apply_hover(model: &mut Model, target: Option<HoverTarget>) {
    model.clear_hover();
    // A stale target simply hovers nothing.
    let _ = match target {
        Some(HoverTarget::Vertex(k)) => model.vertex_mut(k).map(|v| v.hovered = true),
        Some(HoverTarget::Edge(k)) => model.edge_mut(k).map(|e| e.hovered = true),
        Some(HoverTarget::Surface(k)) => model.surface_mut(k).map(|s| s.hovered = true),
        None => Ok(()),
    };
}

/// The 2D space picking happens in for one query.
struct PickFrame<'a> {
    viewport: Viewport,
    /// Pointer in the same space as [`PickFrame::flatten`].
    cursor: Point2,
    radius: f64,
    screen_size: Vector2,
    projection: &'a dyn Projection,
}

impl PickFrame<'_> {
    fn flatten(&self, world: &Point3) -> Option<Point2> {
        if self.viewport.is_orthographic() {
            self.viewport.project(world)
        } else {
            self.projection.project_to_screen(world, &self.screen_size)
        }
    }

    /// Larger is better.
    fn score(&self, world: &Point3) -> f64 {
        match self.viewport.depth(world) {
            Some(depth) => depth,
            None => -(world - self.projection.camera_position()).norm(),
        }
    }
}
