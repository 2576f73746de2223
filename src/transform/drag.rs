use slotmap::SecondaryMap;
use tracing::debug;

use crate::camera::Projection;
use crate::config::EditorConfig;
use crate::error::ModelError;
use crate::math::intersect_3d::ray_plane_intersect;
use crate::math::{Point2, Point3, Vector2, Vector3};
use crate::model::{Model, VertexKey};
use crate::viewport::Viewport;

use super::{snap_axes, Axis};

/// Per-frame input to a running drag.
#[derive(Clone, Copy)]
pub struct DragInput<'a> {
    /// Pointer position in viewport pixels.
    pub pointer: Point2,
    pub screen_size: Vector2,
    pub projection: &'a dyn Projection,
    pub axis_lock: Option<Axis>,
    /// Grid-snap modifier held.
    pub snap: bool,
}

/// A rigid translation of a vertex set, driven by one anchor vertex.
///
/// The drag lives across frames. Each [`Drag::update`] recomputes the delta
/// from the drag start, so positions never accumulate rounding drift.
#[derive(Debug, Clone)]
pub struct Drag {
    anchor: VertexKey,
    viewport: Viewport,
    start_pointer: Point2,
    anchor_start: Point3,
    start_positions: SecondaryMap<VertexKey, Point3>,
    delta: Vector3,
}

impl Drag {
    /// Freezes the start positions of `vertices` (plus the anchor).
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if the anchor or any vertex is missing.
    pub fn begin(
        model: &Model,
        anchor: VertexKey,
        vertices: &[VertexKey],
        viewport: Viewport,
        pointer: Point2,
    ) -> Result<Self, ModelError> {
        let anchor_start = model.vertex(anchor)?.position;
        let mut start_positions = SecondaryMap::new();
        start_positions.insert(anchor, anchor_start);
        for &key in vertices {
            start_positions.insert(key, model.vertex(key)?.position);
        }
        debug!(%viewport, vertices = start_positions.len(), "drag started");
        Ok(Self {
            anchor,
            viewport,
            start_pointer: pointer,
            anchor_start,
            start_positions,
            delta: Vector3::zeros(),
        })
    }

    #[must_use]
    pub fn anchor(&self) -> VertexKey {
        self.anchor
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Delta applied by the latest update.
    #[must_use]
    pub fn delta(&self) -> Vector3 {
        self.delta
    }

    /// Position of `key` when the drag began, if it is being dragged.
    #[must_use]
    pub fn start_position(&self, key: VertexKey) -> Option<Point3> {
        self.start_positions.get(key).copied()
    }

    /// Keys of every dragged vertex.
    pub fn vertices(&self) -> impl Iterator<Item = VertexKey> + '_ {
        self.start_positions.keys()
    }

    /// Computes the delta for the current pointer, or `None` when the
    /// pointer ray misses the drag plane.
    #[must_use]
    pub fn compute_delta(&self, input: &DragInput<'_>, config: &EditorConfig) -> Option<Vector3> {
        let (raw, driven): (Vector3, Vec<Axis>) = match (self.viewport.is_orthographic(), input.axis_lock) {
            (true, lock) => {
                let from = input
                    .projection
                    .screen_to_world(self.viewport, &self.start_pointer, &input.screen_size);
                let to = input
                    .projection
                    .screen_to_world(self.viewport, &input.pointer, &input.screen_size);
                let mapped = self.viewport.map_delta(&(to - from))?;
                match lock {
                    Some(axis) => (axis.isolate(&mapped), vec![axis]),
                    None => {
                        let hidden = self.viewport.depth_axis();
                        let shown = [Axis::X, Axis::Y, Axis::Z]
                            .into_iter()
                            .filter(|a| Some(*a) != hidden)
                            .collect();
                        (mapped, shown)
                    }
                }
            }
            (false, None) => {
                let ray = input
                    .projection
                    .screen_to_world_ray(&input.pointer, &input.screen_size);
                let hit = ray_plane_intersect(&ray, &self.anchor_start, &Vector3::y()).point()?;
                let mut d = hit - self.anchor_start;
                d.y = 0.0;
                (d, vec![Axis::X, Axis::Z])
            }
            (false, Some(axis)) => {
                // Screen up is positive.
                let amount = (self.start_pointer.y - input.pointer.y) * config.axis_drag_sensitivity;
                (axis.unit_vector() * amount, vec![axis])
            }
        };

        if input.snap && config.grid_size > 0.0 {
            let snapped = snap_axes(&(self.anchor_start + raw), config.grid_size, &driven);
            Some(snapped - self.anchor_start)
        } else {
            Some(raw)
        }
    }

    /// Recomputes the delta and moves every dragged vertex to its start
    /// position plus that delta. A missed ray keeps the previous delta.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if a dragged vertex vanished.
    /// The remaining vertices are still moved, so a following
    /// [`Drag::cancel`] restores all of them.
    pub fn update(
        &mut self,
        model: &mut Model,
        input: &DragInput<'_>,
        config: &EditorConfig,
    ) -> Result<Vector3, ModelError> {
        if let Some(delta) = self.compute_delta(input, config) {
            self.delta = delta;
        }
        if self.apply(model, self.delta) > 0 {
            return Err(ModelError::EntityNotFound("vertex".into()));
        }
        Ok(self.delta)
    }

    /// Ends the drag. Emits a single "vertices moved" change when the net
    /// displacement exceeds `epsilon`; returns whether it did.
    pub fn finish(self, model: &mut Model, epsilon: f64) -> bool {
        let moved = self.delta.norm() > epsilon;
        debug!(moved, delta = ?self.delta, "drag finished");
        if moved {
            model.emit_change_event("vertices moved");
        }
        moved
    }

    /// Abandons the drag and puts every vertex back where it started.
    pub fn cancel(self, model: &mut Model) {
        let missing = self.apply(model, Vector3::zeros());
        debug!(missing, "drag cancelled");
    }

    /// Moves every dragged vertex still in the model to its start plus
    /// `delta`. Returns how many dragged vertices are gone.
    fn apply(&self, model: &mut Model, delta: Vector3) -> usize {
        let mut missing = 0;
        for (key, start) in &self.start_positions {
            if model.set_vertex_position(key, start + delta).is_err() {
                missing += 1;
            }
        }
        missing
    }
}
