//! Vertex, edge and surface selection sets.

use crate::error::ModelError;
use crate::model::{EdgeKey, EntityChange, EntityKind, Model, SurfaceKey, VertexKey};
use crate::picking::HoverTarget;

/// A reference to one entity of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Vertex(VertexKey),
    Edge(EdgeKey),
    Surface(SurfaceKey),
}

impl EntityRef {
    #[must_use]
    pub fn kind(self) -> EntityKind {
        match self {
            EntityRef::Vertex(_) => EntityKind::Vertex,
            EntityRef::Edge(_) => EntityKind::Edge,
            EntityRef::Surface(_) => EntityKind::Surface,
        }
    }
}

impl From<HoverTarget> for EntityRef {
    fn from(target: HoverTarget) -> Self {
        match target {
            HoverTarget::Vertex(k) => EntityRef::Vertex(k),
            HoverTarget::Edge(k) => EntityRef::Edge(k),
            HoverTarget::Surface(k) => EntityRef::Surface(k),
        }
    }
}

/// Three independent, ordered selection sets.
///
/// Members carry `selected = true` in the model. Touching one kind never
/// alters the other two.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    vertices: Vec<VertexKey>,
    edges: Vec<EdgeKey>,
    surfaces: Vec<SurfaceKey>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected vertices, in selection order.
    #[must_use]
    pub fn vertices(&self) -> &[VertexKey] {
        &self.vertices
    }

    #[must_use]
    pub fn edges(&self) -> &[EdgeKey] {
        &self.edges
    }

    #[must_use]
    pub fn surfaces(&self) -> &[SurfaceKey] {
        &self.surfaces
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty() && self.surfaces.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len() + self.edges.len() + self.surfaces.len()
    }

    #[must_use]
    pub fn contains(&self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Vertex(k) => self.vertices.contains(&k),
            EntityRef::Edge(k) => self.edges.contains(&k),
            EntityRef::Surface(k) => self.surfaces.contains(&k),
        }
    }

    /// Adds `entity` to its kind's set. Without `additive`, the rest of that
    /// kind is deselected first.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if the entity is not in the
    /// model; the selection is left unchanged.
    pub fn select(&mut self, model: &mut Model, entity: EntityRef, additive: bool) -> Result<(), ModelError> {
        check_exists(model, entity)?;
        if !additive {
            self.clear_kind(model, entity.kind());
        }
        if self.contains(entity) {
            return Ok(());
        }
        match entity {
            EntityRef::Vertex(k) => self.vertices.push(k),
            EntityRef::Edge(k) => self.edges.push(k),
            EntityRef::Surface(k) => self.surfaces.push(k),
        }
        mark(model, entity, true);
        Ok(())
    }

    /// Removes one entity from its set. Returns whether it was selected.
    pub fn deselect(&mut self, model: &mut Model, entity: EntityRef) -> bool {
        let removed = match entity {
            EntityRef::Vertex(k) => remove_key(&mut self.vertices, k),
            EntityRef::Edge(k) => remove_key(&mut self.edges, k),
            EntityRef::Surface(k) => remove_key(&mut self.surfaces, k),
        };
        if removed {
            mark(model, entity, false);
        }
        removed
    }

    /// Deselects every entity of one kind.
    pub fn clear_kind(&mut self, model: &mut Model, kind: EntityKind) {
        let members: Vec<EntityRef> = match kind {
            EntityKind::Vertex => self.vertices.drain(..).map(EntityRef::Vertex).collect(),
            EntityKind::Edge => self.edges.drain(..).map(EntityRef::Edge).collect(),
            EntityKind::Surface => self.surfaces.drain(..).map(EntityRef::Surface).collect(),
        };
        for entity in members {
            mark(model, entity, false);
        }
    }

    /// Deselects everything.
    pub fn clear_all(&mut self, model: &mut Model) {
        self.clear_kind(model, EntityKind::Vertex);
        self.clear_kind(model, EntityKind::Edge);
        self.clear_kind(model, EntityKind::Surface);
    }

    /// Drops members that no longer exist in `model`.
    pub fn prune(&mut self, model: &Model) {
        self.vertices.retain(|&k| model.contains_vertex(k));
        self.edges.retain(|&k| model.contains_edge(k));
        self.surfaces.retain(|&k| model.contains_surface(k));
    }

    /// Forgets every member without touching the model.
    ///
    /// Used after the model content has been replaced, when the old keys
    /// mean nothing in the new arena.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.surfaces.clear();
    }
}

fn remove_key<K: PartialEq>(keys: &mut Vec<K>, key: K) -> bool {
    match keys.iter().position(|k| *k == key) {
        Some(index) => {
            keys.remove(index);
            true
        }
        None => false,
    }
}

fn check_exists(model: &Model, entity: EntityRef) -> Result<(), ModelError> {
    match entity {
        EntityRef::Vertex(k) => model.vertex(k).map(|_| ()),
        EntityRef::Edge(k) => model.edge(k).map(|_| ()),
        EntityRef::Surface(k) => model.surface(k).map(|_| ()),
    }
}

/// Sets the entity's `selected` flag and reports it to listeners.
fn mark(model: &mut Model, entity: EntityRef, selected: bool) {
    let id = match entity {
        EntityRef::Vertex(k) => model.vertex_mut(k).ok().map(|v| {
            v.selected = selected;
            v.id.clone()
        }),
        EntityRef::Edge(k) => model.edge_mut(k).ok().map(|e| {
            e.selected = selected;
            e.id.clone()
        }),
        EntityRef::Surface(k) => model.surface_mut(k).ok().map(|s| {
            s.selected = selected;
            s.id.clone()
        }),
    };
    if let Some(id) = id {
        let change = if selected {
            EntityChange::Selected
        } else {
            EntityChange::Deselected
        };
        model.notify_entity(entity.kind(), &id, change);
    }
}
