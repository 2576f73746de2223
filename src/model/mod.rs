pub mod document;
pub mod edge;
pub mod events;
pub mod surface;
pub mod vertex;

pub use document::{EdgeDoc, ModelDoc, PositionDoc, SurfaceDoc, VertexDoc};
pub use edge::{Edge, EdgeKey};
pub use events::{ChangeEvent, EntityChange, EntityEvent, EntityKind, ListenerId, ModelEvent};
pub use surface::{Surface, SurfaceKey};
pub use vertex::{Vertex, VertexKey};

use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;
use tracing::debug;

use crate::error::ModelError;
use crate::math::Point3;
use events::Listeners;

/// Generates a fresh opaque entity id.
pub(crate) fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Owning container of every vertex, edge and surface being edited.
///
/// Entities reference each other via typed keys (generational indices).
/// Insertion order is kept separately and defines display and
/// serialization order.
///
/// Every structural mutation completes before a single
/// [`ModelEvent::Changed`] is broadcast to listeners.
#[derive(Debug, Default)]
pub struct Model {
    name: String,
    vertices: SlotMap<VertexKey, Vertex>,
    edges: SlotMap<EdgeKey, Edge>,
    surfaces: SlotMap<SurfaceKey, Surface>,
    vertex_order: Vec<VertexKey>,
    edge_order: Vec<EdgeKey>,
    surface_order: Vec<SurfaceKey>,
    listeners: Listeners,
}

impl Model {
    /// Creates a new, empty model.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Display name of the model.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the model.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.emit_change_event("model renamed");
    }

    // --- Listeners ---

    /// Registers a listener. Listeners are called synchronously, in
    /// registration order, from inside the mutating call.
    pub fn on_change(&mut self, listener: impl FnMut(&ModelEvent) + 'static) -> ListenerId {
        self.listeners.add(Box::new(listener))
    }

    /// Unregisters a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Broadcasts a [`ChangeEvent`] carrying a snapshot of the current state.
    pub fn emit_change_event(&mut self, action: &str) {
        if self.listeners.is_empty() {
            return;
        }
        let event = ModelEvent::Changed(ChangeEvent {
            action: action.to_owned(),
            snapshot: self.serialize(),
        });
        self.listeners.dispatch(&event);
    }

    pub(crate) fn notify(&mut self, event: &ModelEvent) {
        self.listeners.dispatch(event);
    }

    pub(crate) fn notify_entity(&mut self, kind: EntityKind, id: &str, change: EntityChange) {
        if self.listeners.is_empty() {
            return;
        }
        self.notify(&ModelEvent::Entity(EntityEvent {
            kind,
            id: id.to_owned(),
            change,
        }));
    }

    // --- Lookup ---

    /// Returns a reference to the vertex, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if the key is stale.
    pub fn vertex(&self, key: VertexKey) -> Result<&Vertex, ModelError> {
        self.vertices
            .get(key)
            .ok_or_else(|| ModelError::EntityNotFound("vertex".into()))
    }

    /// Returns a mutable reference to the vertex, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if the key is stale.
    pub fn vertex_mut(&mut self, key: VertexKey) -> Result<&mut Vertex, ModelError> {
        self.vertices
            .get_mut(key)
            .ok_or_else(|| ModelError::EntityNotFound("vertex".into()))
    }

    /// Returns a reference to the edge, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if the key is stale.
    pub fn edge(&self, key: EdgeKey) -> Result<&Edge, ModelError> {
        self.edges
            .get(key)
            .ok_or_else(|| ModelError::EntityNotFound("edge".into()))
    }

    /// Returns a mutable reference to the edge, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if the key is stale.
    pub fn edge_mut(&mut self, key: EdgeKey) -> Result<&mut Edge, ModelError> {
        self.edges
            .get_mut(key)
            .ok_or_else(|| ModelError::EntityNotFound("edge".into()))
    }

    /// Returns a reference to the surface, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if the key is stale.
    pub fn surface(&self, key: SurfaceKey) -> Result<&Surface, ModelError> {
        self.surfaces
            .get(key)
            .ok_or_else(|| ModelError::EntityNotFound("surface".into()))
    }

    /// Returns a mutable reference to the surface, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if the key is stale.
    pub fn surface_mut(&mut self, key: SurfaceKey) -> Result<&mut Surface, ModelError> {
        self.surfaces
            .get_mut(key)
            .ok_or_else(|| ModelError::EntityNotFound("surface".into()))
    }

    #[must_use]
    pub fn contains_vertex(&self, key: VertexKey) -> bool {
        self.vertices.contains_key(key)
    }

    #[must_use]
    pub fn contains_edge(&self, key: EdgeKey) -> bool {
        self.edges.contains_key(key)
    }

    #[must_use]
    pub fn contains_surface(&self, key: SurfaceKey) -> bool {
        self.surfaces.contains_key(key)
    }

    /// Finds a vertex by its persistent id.
    #[must_use]
    pub fn vertex_by_id(&self, id: &str) -> Option<VertexKey> {
        self.vertices().find(|(_, v)| v.id == id).map(|(k, _)| k)
    }

    /// Finds an edge by its persistent id.
    #[must_use]
    pub fn edge_by_id(&self, id: &str) -> Option<EdgeKey> {
        self.edges().find(|(_, e)| e.id == id).map(|(k, _)| k)
    }

    /// Finds a surface by its persistent id.
    #[must_use]
    pub fn surface_by_id(&self, id: &str) -> Option<SurfaceKey> {
        self.surfaces().find(|(_, s)| s.id == id).map(|(k, _)| k)
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexKey, &Vertex)> + '_ {
        self.vertex_order
            .iter()
            .filter_map(|&k| self.vertices.get(k).map(|v| (k, v)))
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, &Edge)> + '_ {
        self.edge_order
            .iter()
            .filter_map(|&k| self.edges.get(k).map(|e| (k, e)))
    }

    /// Surfaces in insertion order.
    pub fn surfaces(&self) -> impl Iterator<Item = (SurfaceKey, &Surface)> + '_ {
        self.surface_order
            .iter()
            .filter_map(|&k| self.surfaces.get(k).map(|s| (k, s)))
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// World positions of both endpoints of an edge.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if the edge or an endpoint is missing.
    pub fn edge_points(&self, key: EdgeKey) -> Result<(Point3, Point3), ModelError> {
        let edge = self.edge(key)?;
        Ok((self.vertex(edge.a)?.position, self.vertex(edge.b)?.position))
    }

    /// World positions of a surface's boundary, in winding order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if the surface or a vertex is missing.
    pub fn surface_points(&self, key: SurfaceKey) -> Result<Vec<Point3>, ModelError> {
        self.surface(key)?
            .vertices
            .iter()
            .map(|&v| self.vertex(v).map(|v| v.position))
            .collect()
    }

    // --- Vertex mutation ---

    /// Adds a visible vertex with a fresh id and returns its key.
    pub fn add_vertex(&mut self, position: Point3) -> VertexKey {
        let key = self.insert_vertex(Vertex::new(position));
        self.emit_change_event("vertex added");
        key
    }

    /// Adds a fully constructed vertex.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateId`] if a vertex with the same id exists.
    pub fn add_vertex_entity(&mut self, vertex: Vertex) -> Result<VertexKey, ModelError> {
        if self.vertex_by_id(&vertex.id).is_some() {
            return Err(ModelError::DuplicateId(vertex.id));
        }
        let key = self.insert_vertex(vertex);
        self.emit_change_event("vertex added");
        Ok(key)
    }

    /// Removes a vertex together with every edge and surface that uses it.
    ///
    /// Listeners see one [`ModelEvent::Changed`] for the whole cascade.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if the key is stale.
    pub fn remove_vertex(&mut self, key: VertexKey) -> Result<(), ModelError> {
        self.vertex(key)?;
        self.detach_vertex(key);
        self.emit_change_event("vertex removed");
        Ok(())
    }

    /// Moves a vertex without broadcasting a change.
    ///
    /// Used for in-progress edits (drags) that emit one event when finished.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if the key is stale.
    pub fn set_vertex_position(&mut self, key: VertexKey, position: Point3) -> Result<(), ModelError> {
        self.vertex_mut(key)?.position = position;
        Ok(())
    }

    /// Shows or hides a set of vertices as one change.
    ///
    /// Returns how many vertices actually changed; nothing is broadcast if none did.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if any key is stale; nothing changes then.
    pub fn set_vertices_hidden(&mut self, keys: &[VertexKey], hidden: bool) -> Result<usize, ModelError> {
        for &key in keys {
            self.vertex(key)?;
        }
        let mut changed = 0;
        for &key in keys {
            let vertex = self.vertex_mut(key)?;
            if vertex.hidden != hidden {
                vertex.hidden = hidden;
                changed += 1;
            }
        }
        if changed > 0 {
            self.emit_change_event(if hidden { "vertices hidden" } else { "vertices shown" });
        }
        Ok(changed)
    }

    // --- Edge mutation ---

    /// Connects two existing vertices with a new edge.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if an endpoint is missing, or
    /// [`ModelError::DegenerateEdge`] if `a == b`.
    pub fn add_edge(&mut self, a: VertexKey, b: VertexKey) -> Result<EdgeKey, ModelError> {
        self.add_edge_entity(Edge::new(a, b))
    }

    /// Adds a fully constructed edge.
    ///
    /// # Errors
    ///
    /// Same as [`Model::add_edge`], plus [`ModelError::DuplicateId`].
    pub fn add_edge_entity(&mut self, edge: Edge) -> Result<EdgeKey, ModelError> {
        self.vertex(edge.a)?;
        self.vertex(edge.b)?;
        if edge.is_degenerate() {
            return Err(ModelError::DegenerateEdge(edge.id));
        }
        if self.edge_by_id(&edge.id).is_some() {
            return Err(ModelError::DuplicateId(edge.id));
        }
        let key = self.insert_edge(edge);
        self.emit_change_event("edge added");
        Ok(key)
    }

    /// Removes an edge. Its endpoints stay.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if the key is stale.
    pub fn remove_edge(&mut self, key: EdgeKey) -> Result<(), ModelError> {
        self.edge(key)?;
        self.detach_edge(key);
        self.emit_change_event("edge removed");
        Ok(())
    }

    // --- Surface mutation ---

    /// Creates a surface bounded by `vertices` in winding order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if a vertex is missing, or
    /// [`ModelError::DegenerateSurface`] for fewer than 3 distinct vertices.
    pub fn add_surface(&mut self, vertices: Vec<VertexKey>) -> Result<SurfaceKey, ModelError> {
        self.add_surface_entity(Surface::new(vertices))
    }

    /// Adds a fully constructed surface.
    ///
    /// # Errors
    ///
    /// Same as [`Model::add_surface`], plus [`ModelError::DuplicateId`].
    pub fn add_surface_entity(&mut self, surface: Surface) -> Result<SurfaceKey, ModelError> {
        for &v in &surface.vertices {
            self.vertex(v)?;
        }
        if surface.is_degenerate() {
            return Err(ModelError::DegenerateSurface(surface.id));
        }
        if self.surface_by_id(&surface.id).is_some() {
            return Err(ModelError::DuplicateId(surface.id));
        }
        let key = self.insert_surface(surface);
        self.emit_change_event("surface added");
        Ok(key)
    }

    /// Removes a surface. Its vertices stay.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if the key is stale.
    pub fn remove_surface(&mut self, key: SurfaceKey) -> Result<(), ModelError> {
        self.surface(key)?;
        self.detach_surface(key);
        self.emit_change_event("surface removed");
        Ok(())
    }

    // --- Batch mutation ---

    /// Removes several entities as one logical change labelled `action`.
    ///
    /// Vertex removal cascades as in [`Model::remove_vertex`]. Keys already
    /// removed by an earlier cascade in the same call are skipped. Returns the
    /// number of entities removed, cascades included.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EntityNotFound`] if any key is stale on entry;
    /// nothing is removed then.
    pub fn remove_entities(
        &mut self,
        vertices: &[VertexKey],
        edges: &[EdgeKey],
        surfaces: &[SurfaceKey],
        action: &str,
    ) -> Result<usize, ModelError> {
        for &k in vertices {
            self.vertex(k)?;
        }
        for &k in edges {
            self.edge(k)?;
        }
        for &k in surfaces {
            self.surface(k)?;
        }

        let before = self.vertex_count() + self.edge_count() + self.surface_count();
        for &k in surfaces {
            if self.contains_surface(k) {
                self.detach_surface(k);
            }
        }
        for &k in edges {
            if self.contains_edge(k) {
                self.detach_edge(k);
            }
        }
        for &k in vertices {
            if self.contains_vertex(k) {
                self.detach_vertex(k);
            }
        }
        let removed = before - (self.vertex_count() + self.edge_count() + self.surface_count());

        if removed > 0 {
            self.emit_change_event(action);
        }
        Ok(removed)
    }

    /// Clears the hover flag on every entity.
    pub fn clear_hover(&mut self) {
        for v in self.vertices.values_mut() {
            v.hovered = false;
        }
        for e in self.edges.values_mut() {
            e.hovered = false;
        }
        for s in self.surfaces.values_mut() {
            s.hovered = false;
        }
    }

    // --- Whole-model operations ---

    /// Swaps in the entity graph and name of `other`, keeping this model's
    /// listeners. Broadcasts [`ModelEvent::Replaced`] but no change event.
    pub fn replace_contents(&mut self, other: Model) {
        let Model {
            name,
            vertices,
            edges,
            surfaces,
            vertex_order,
            edge_order,
            surface_order,
            listeners: _,
        } = other;
        self.name = name;
        self.vertices = vertices;
        self.edges = edges;
        self.surfaces = surfaces;
        self.vertex_order = vertex_order;
        self.edge_order = edge_order;
        self.surface_order = surface_order;
        self.notify(&ModelEvent::Replaced);
    }

    /// Releases every entity and listener.
    pub fn destroy(&mut self) {
        debug!(
            vertices = self.vertices.len(),
            edges = self.edges.len(),
            surfaces = self.surfaces.len(),
            "destroying model"
        );
        self.listeners.clear();
        self.vertices.clear();
        self.edges.clear();
        self.surfaces.clear();
        self.vertex_order.clear();
        self.edge_order.clear();
        self.surface_order.clear();
    }

    /// Converts the model into its serialized document tree.
    #[must_use]
    pub fn serialize(&self) -> ModelDoc {
        let vertex_id = |k: &VertexKey| {
            self.vertices
                .get(*k)
                .map(|v| v.id.clone())
                .unwrap_or_default()
        };
        ModelDoc {
            name: self.name.clone(),
            vertices: self
                .vertices()
                .map(|(_, v)| VertexDoc {
                    id: v.id.clone(),
                    position: v.position.into(),
                    hidden: v.hidden,
                })
                .collect(),
            edges: self
                .edges()
                .map(|(_, e)| EdgeDoc {
                    id: e.id.clone(),
                    a: vertex_id(&e.a),
                    b: vertex_id(&e.b),
                })
                .collect(),
            surfaces: self
                .surfaces()
                .map(|(_, s)| SurfaceDoc {
                    id: s.id.clone(),
                    vertices: s.vertices.iter().map(&vertex_id).collect(),
                })
                .collect(),
        }
    }

    /// Builds a model from a document tree.
    ///
    /// The whole document is validated while building a fresh model, so a
    /// failure never yields a partial model.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownVertex`] for a dangling vertex reference,
    /// [`ModelError::DuplicateId`] for a repeated id, and
    /// [`ModelError::DegenerateEdge`] / [`ModelError::DegenerateSurface`] for
    /// degenerate entities.
    pub fn deserialize(doc: &ModelDoc) -> Result<Model, ModelError> {
        let mut model = Model::new(doc.name.clone());
        let mut ids: HashMap<&str, VertexKey> = HashMap::with_capacity(doc.vertices.len());

        for v in &doc.vertices {
            if ids.contains_key(v.id.as_str()) {
                return Err(ModelError::DuplicateId(v.id.clone()));
            }
            let key = model.insert_vertex(Vertex::with_id(v.id.clone(), v.position.into(), v.hidden));
            ids.insert(v.id.as_str(), key);
        }

        let resolve = |entity: &str, vertex: &str| {
            ids.get(vertex).copied().ok_or_else(|| ModelError::UnknownVertex {
                entity: entity.to_owned(),
                vertex: vertex.to_owned(),
            })
        };

        let mut edge_ids: HashSet<&str> = HashSet::with_capacity(doc.edges.len());
        for e in &doc.edges {
            let label = format!("edge `{}`", e.id);
            let edge = Edge::with_id(e.id.clone(), resolve(&label, &e.a)?, resolve(&label, &e.b)?);
            if edge.is_degenerate() {
                return Err(ModelError::DegenerateEdge(e.id.clone()));
            }
            if !edge_ids.insert(e.id.as_str()) {
                return Err(ModelError::DuplicateId(e.id.clone()));
            }
            model.insert_edge(edge);
        }

        let mut surface_ids: HashSet<&str> = HashSet::with_capacity(doc.surfaces.len());
        for s in &doc.surfaces {
            let label = format!("surface `{}`", s.id);
            let vertices = s
                .vertices
                .iter()
                .map(|v| resolve(&label, v))
                .collect::<Result<Vec<_>, _>>()?;
            let surface = Surface::with_id(s.id.clone(), vertices);
            if surface.is_degenerate() {
                return Err(ModelError::DegenerateSurface(s.id.clone()));
            }
            if !surface_ids.insert(s.id.as_str()) {
                return Err(ModelError::DuplicateId(s.id.clone()));
            }
            model.insert_surface(surface);
        }

        Ok(model)
    }

    /// Parses and builds a model from JSON text.
    ///
    /// # Errors
    ///
    /// Returns a JSON error for malformed text, or a [`ModelError`] for an
    /// inconsistent entity graph.
    pub fn from_json(json: &str) -> crate::Result<Model> {
        let doc = ModelDoc::from_json(json)?;
        Ok(Model::deserialize(&doc)?)
    }

    /// Serializes the model as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if serialization fails.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(self.serialize().to_json()?)
    }

    // --- Internal helpers ---

    fn insert_vertex(&mut self, vertex: Vertex) -> VertexKey {
        let id = vertex.id.clone();
        let key = self.vertices.insert(vertex);
        self.vertex_order.push(key);
        self.notify_entity(EntityKind::Vertex, &id, EntityChange::Created);
        key
    }

    fn insert_edge(&mut self, edge: Edge) -> EdgeKey {
        let id = edge.id.clone();
        let key = self.edges.insert(edge);
        self.edge_order.push(key);
        self.notify_entity(EntityKind::Edge, &id, EntityChange::Created);
        key
    }

    fn insert_surface(&mut self, surface: Surface) -> SurfaceKey {
        let id = surface.id.clone();
        let key = self.surfaces.insert(surface);
        self.surface_order.push(key);
        self.notify_entity(EntityKind::Surface, &id, EntityChange::Created);
        key
    }

    /// Removes a vertex and everything referencing it, without a change event.
    fn detach_vertex(&mut self, key: VertexKey) {
        let edges: Vec<EdgeKey> = self
            .edges()
            .filter(|(_, e)| e.touches(key))
            .map(|(k, _)| k)
            .collect();
        let surfaces: Vec<SurfaceKey> = self
            .surfaces()
            .filter(|(_, s)| s.contains(key))
            .map(|(k, _)| k)
            .collect();
        debug!(
            edges = edges.len(),
            surfaces = surfaces.len(),
            "cascading vertex removal"
        );
        for e in edges {
            self.detach_edge(e);
        }
        for s in surfaces {
            self.detach_surface(s);
        }
        if let Some(vertex) = self.vertices.remove(key) {
            self.vertex_order.retain(|&k| k != key);
            self.notify_entity(EntityKind::Vertex, &vertex.id, EntityChange::Removed);
        }
    }

    fn detach_edge(&mut self, key: EdgeKey) {
        if let Some(edge) = self.edges.remove(key) {
            self.edge_order.retain(|&k| k != key);
            self.notify_entity(EntityKind::Edge, &edge.id, EntityChange::Removed);
        }
    }

    fn detach_surface(&mut self, key: SurfaceKey) {
        if let Some(surface) = self.surfaces.remove(key) {
            self.surface_order.retain(|&k| k != key);
            self.notify_entity(EntityKind::Surface, &surface.id, EntityChange::Removed);
        }
    }
}
