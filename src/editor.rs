//! The editing context: one object owning everything an editing session needs.
//!
//! [`Editor::update`] processes one frame of input in a fixed order:
//! keyboard shortcuts, hover resolution, then the active tool's selection,
//! drag or creation logic. Model mutations notify the history listener from
//! inside the mutating call, so every change is recorded before `update`
//! returns.

use std::cell::{Ref, RefCell};
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::camera::Projection;
use crate::config::EditorConfig;
use crate::creation::{pointer_on_plane, EdgeBuilder, EdgeStep, SurfaceBuilder, SurfaceStep};
use crate::error::{InteractionError, Result};
use crate::history::History;
use crate::input::{InputSource, Key, MouseButton};
use crate::math::Point3;
use crate::model::{ListenerId, Model, ModelDoc, ModelEvent, VertexKey};
use crate::picking::{apply_hover, HoverTarget, PickQuery, Picker};
use crate::selection::{EntityRef, Selection};
use crate::tool::Tool;
use crate::transform::{snap_to_grid, Axis, Drag, DragInput};
use crate::viewport::Viewport;

/// History navigation request.
#[derive(Debug, Clone, Copy)]
enum Step {
    Undo,
    Redo,
    Jump(usize),
}

/// Explicit editor context.
#[derive(Debug)]
pub struct Editor {
    model: Model,
    history: Rc<RefCell<History>>,
    history_listener: ListenerId,
    selection: Selection,
    tool: Tool,
    hover: Option<HoverTarget>,
    drag: Option<Drag>,
    edge_builder: EdgeBuilder,
    surface_builder: SurfaceBuilder,
    config: EditorConfig,
    picker: Picker,
}

impl Editor {
    /// Creates an editor around an empty model. The history starts with one
    /// "new model" entry.
    #[must_use]
    pub fn new(name: impl Into<String>, config: EditorConfig) -> Self {
        let mut model = Model::new(name);
        let history = Rc::new(RefCell::new(History::with_limit(config.history_limit)));

        let sink = Rc::clone(&history);
        let history_listener = model.on_change(move |event| {
            if let ModelEvent::Changed(change) = event {
                sink.borrow_mut().record_change(change);
            }
        });
        history.borrow_mut().record("new model", model.serialize());

        Self {
            model,
            history,
            history_listener,
            selection: Selection::new(),
            tool: Tool::default(),
            hover: None,
            drag: None,
            edge_builder: EdgeBuilder::default(),
            surface_builder: SurfaceBuilder::default(),
            picker: Picker::new(&config),
            config,
        }
    }

    // --- Accessors ---

    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Direct model access. Changes made here are recorded like any other.
    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    #[must_use]
    pub fn history(&self) -> Ref<'_, History> {
        self.history.borrow()
    }

    /// Listener through which the model feeds the history.
    #[must_use]
    pub fn history_listener(&self) -> ListenerId {
        self.history_listener
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[must_use]
    pub fn hover(&self) -> Option<HoverTarget> {
        self.hover
    }

    #[must_use]
    pub fn drag(&self) -> Option<&Drag> {
        self.drag.as_ref()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    #[must_use]
    pub fn edge_builder(&self) -> &EdgeBuilder {
        &self.edge_builder
    }

    #[must_use]
    pub fn surface_builder(&self) -> &SurfaceBuilder {
        &self.surface_builder
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // --- Tools and selection ---

    /// Switches the active tool.
    ///
    /// Any running drag is cancelled. In-progress edge or surface creation
    /// survives a detour through [`Tool::Pan`] and is discarded by any other
    /// tool.
    pub fn set_tool(&mut self, tool: Tool) {
        if tool == self.tool {
            return;
        }
        debug!(from = %self.tool, to = %tool, "tool changed");
        if let Some(drag) = self.drag.take() {
            drag.cancel(&mut self.model);
        }
        if !matches!(tool, Tool::Pan | Tool::CreateEdge) {
            self.edge_builder.cancel();
        }
        if !matches!(tool, Tool::Pan | Tool::CreateSurface) {
            self.surface_builder.cancel();
        }
        self.tool = tool;
    }

    /// Selects one entity, see [`Selection::select`].
    ///
    /// # Errors
    ///
    /// Returns a model error if the entity does not exist.
    pub fn select(&mut self, entity: EntityRef, additive: bool) -> Result<()> {
        Ok(self.selection.select(&mut self.model, entity, additive)?)
    }

    /// Deselects everything.
    pub fn clear_selection(&mut self) {
        self.selection.clear_all(&mut self.model);
    }

    /// Deletes every selected entity as a single "entities deleted" change.
    /// Vertex deletion cascades. Returns the number of entities removed.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError::EmptySelection`] when nothing is
    /// selected; nothing changes then.
    pub fn delete_selection(&mut self) -> Result<usize> {
        if self.selection.is_empty() {
            warn!("delete ignored: selection is empty");
            return Err(InteractionError::EmptySelection.into());
        }
        let vertices = self.selection.vertices().to_vec();
        let edges = self.selection.edges().to_vec();
        let surfaces = self.selection.surfaces().to_vec();
        let removed = self
            .model
            .remove_entities(&vertices, &edges, &surfaces, "entities deleted")?;
        self.selection.prune(&self.model);
        self.refresh_hover();
        debug!(removed, "selection deleted");
        Ok(removed)
    }

    /// Hides or shows every selected vertex. Returns how many changed.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError::EmptySelection`] when no vertex is selected.
    pub fn set_selection_hidden(&mut self, hidden: bool) -> Result<usize> {
        if self.selection.vertices().is_empty() {
            warn!(hidden, "visibility change ignored: no vertex selected");
            return Err(InteractionError::EmptySelection.into());
        }
        let keys = self.selection.vertices().to_vec();
        let changed = self.model.set_vertices_hidden(&keys, hidden)?;
        self.refresh_hover();
        Ok(changed)
    }

    /// Renames the model.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.model.set_name(name);
    }

    // --- Frame update ---

    /// Processes one frame of input.
    ///
    /// Failures inside the frame are logged and leave the offending
    /// interaction idle; they never abort the frame.
    pub fn update<I: InputSource + ?Sized>(&mut self, input: &I, projection: &dyn Projection) {
        self.selection.prune(&self.model);
        self.handle_keys(input);

        let viewport = input.focused_viewport();
        let target = viewport.and_then(|viewport| {
            let query = PickQuery {
                viewport,
                pointer: input.pointer(),
                screen_size: input.screen_size(),
                projection,
                tool: self.tool,
            };
            self.picker.resolve(&self.model, &query)
        });
        self.set_hover(target);

        match self.tool {
            Tool::Select => self.update_select(input, viewport, projection),
            Tool::CreateVertex => self.update_create_vertex(input, viewport, projection),
            Tool::CreateEdge => self.update_create_edge(input, viewport, projection),
            Tool::CreateSurface => self.update_create_surface(input, viewport, projection),
            Tool::Pan => {}
        }
    }

    fn handle_keys<I: InputSource + ?Sized>(&mut self, input: &I) {
        if input.key_pressed(Key::Escape) {
            if let Some(drag) = self.drag.take() {
                drag.cancel(&mut self.model);
            }
            self.edge_builder.cancel();
            self.surface_builder.cancel();
        }
        if self.drag.is_some() {
            return;
        }
        if input.key_down(Key::Control) {
            // Errors are already logged by the history calls.
            if input.key_pressed(Key::Z) {
                let _ = self.undo();
            } else if input.key_pressed(Key::Y) {
                let _ = self.redo();
            }
        }
        if input.key_pressed(Key::Delete) && self.tool == Tool::Select {
            let _ = self.delete_selection();
        }
    }

    fn update_select<I: InputSource + ?Sized>(
        &mut self,
        input: &I,
        viewport: Option<Viewport>,
        projection: &dyn Projection,
    ) {
        if let Some(mut drag) = self.drag.take() {
            if input.released(MouseButton::Left) || !input.down(MouseButton::Left) {
                drag.finish(&mut self.model, self.config.drag_epsilon);
                return;
            }
            if viewport == Some(drag.viewport()) {
                let drag_input = DragInput {
                    pointer: input.pointer(),
                    screen_size: input.screen_size(),
                    projection,
                    axis_lock: axis_lock(input),
                    snap: input.key_down(Key::Control),
                };
                if let Err(err) = drag.update(&mut self.model, &drag_input, &self.config) {
                    warn!(%err, "drag aborted");
                    drag.cancel(&mut self.model);
                    return;
                }
            }
            self.drag = Some(drag);
            return;
        }

        let Some(viewport) = viewport else {
            return;
        };
        if !input.pressed(MouseButton::Left) {
            return;
        }
        let additive = input.key_down(Key::Shift);
        match self.hover {
            Some(HoverTarget::Vertex(anchor)) => self.begin_drag(anchor, additive, viewport, input),
            Some(target) => {
                if let Err(err) = self.selection.select(&mut self.model, target.into(), additive) {
                    warn!(%err, "selection failed");
                }
            }
            None => self.selection.clear_all(&mut self.model),
        }
    }

    fn begin_drag<I: InputSource + ?Sized>(
        &mut self,
        anchor: VertexKey,
        additive: bool,
        viewport: Viewport,
        input: &I,
    ) {
        let entity = EntityRef::Vertex(anchor);
        if !self.selection.contains(entity) {
            if let Err(err) = self.selection.select(&mut self.model, entity, additive) {
                warn!(%err, "selection failed");
                return;
            }
        }
        match Drag::begin(
            &self.model,
            anchor,
            self.selection.vertices(),
            viewport,
            input.pointer(),
        ) {
            Ok(drag) => self.drag = Some(drag),
            Err(err) => warn!(%err, "drag not started"),
        }
    }

    fn update_create_vertex<I: InputSource + ?Sized>(
        &mut self,
        input: &I,
        viewport: Option<Viewport>,
        projection: &dyn Projection,
    ) {
        let Some(viewport) = viewport else {
            return;
        };
        if !input.pressed(MouseButton::Left) {
            return;
        }
        let Some(mut position) = pointer_on_plane(
            viewport,
            &input.pointer(),
            &input.screen_size(),
            projection,
            &Point3::origin(),
        ) else {
            debug!(%viewport, "vertex placement missed the ground plane");
            return;
        };
        if input.key_down(Key::Control) {
            position = snap_to_grid(&position, self.config.grid_size);
        }
        self.model.add_vertex(position);
    }

    fn update_create_edge<I: InputSource + ?Sized>(
        &mut self,
        input: &I,
        viewport: Option<Viewport>,
        projection: &dyn Projection,
    ) {
        let anchor = self.edge_builder.first();
        if let Some(cursor) = self.creation_cursor(input, viewport, projection, anchor) {
            self.edge_builder.track_cursor(cursor);
        }
        if !input.pressed(MouseButton::Left) {
            return;
        }
        let Some(HoverTarget::Vertex(vertex)) = self.hover else {
            return;
        };
        match self.edge_builder.click(&mut self.model, vertex) {
            Ok(EdgeStep::Committed(_)) => info!("edge created"),
            Ok(_) => {}
            Err(err) => warn!(%err, "edge creation failed"),
        }
    }

    fn update_create_surface<I: InputSource + ?Sized>(
        &mut self,
        input: &I,
        viewport: Option<Viewport>,
        projection: &dyn Projection,
    ) {
        let anchor = self.surface_builder.vertices().first().copied();
        if let Some(cursor) = self.creation_cursor(input, viewport, projection, anchor) {
            self.surface_builder.track_cursor(cursor);
        }
        if !input.pressed(MouseButton::Left) {
            return;
        }
        let Some(HoverTarget::Vertex(vertex)) = self.hover else {
            return;
        };
        match self.surface_builder.click(&mut self.model, vertex) {
            Ok(SurfaceStep::Closed(_)) => info!("surface created"),
            Ok(step) => debug!(?step, "surface building"),
            Err(err) => warn!(%err, "surface creation failed"),
        }
    }

    /// Free end of a provisional edge or surface: the hovered vertex, else
    /// the pointer on the plane through the first vertex.
    fn creation_cursor<I: InputSource + ?Sized>(
        &self,
        input: &I,
        viewport: Option<Viewport>,
        projection: &dyn Projection,
        first: Option<VertexKey>,
    ) -> Option<Point3> {
        let first = self.model.vertex(first?).ok()?.position;
        if let Some(HoverTarget::Vertex(k)) = self.hover {
            return self.model.vertex(k).ok().map(|v| v.position);
        }
        pointer_on_plane(viewport?, &input.pointer(), &input.screen_size(), projection, &first)
    }

    fn set_hover(&mut self, target: Option<HoverTarget>) {
        if target != self.hover {
            debug!(?target, "hover changed");
        }
        self.hover = target;
        apply_hover(&mut self.model, target);
    }

    /// Drops a hover target that no longer exists or became hidden.
    fn refresh_hover(&mut self) {
        let still_valid = match self.hover {
            Some(HoverTarget::Vertex(k)) => self.model.vertex(k).is_ok_and(|v| !v.hidden),
            Some(HoverTarget::Edge(k)) => self.model.contains_edge(k),
            Some(HoverTarget::Surface(k)) => self.model.contains_surface(k),
            None => true,
        };
        if !still_valid {
            self.set_hover(None);
        }
    }

    // --- History ---

    /// Restores the previous history entry.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::HistoryError::NothingToUndo`] at the oldest entry; nothing
    /// changes then.
    pub fn undo(&mut self) -> Result<()> {
        self.navigate(Step::Undo)
    }

    /// Restores the next history entry.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::HistoryError::NothingToRedo`] at the newest entry; nothing
    /// changes then.
    pub fn redo(&mut self) -> Result<()> {
        self.navigate(Step::Redo)
    }

    /// Restores history entry `index`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::HistoryError::IndexOutOfRange`] for a bad index; nothing
    /// changes then.
    pub fn jump_to(&mut self, index: usize) -> Result<()> {
        self.navigate(Step::Jump(index))
    }

    fn navigate(&mut self, step: Step) -> Result<()> {
        let (previous, action, snapshot) = {
            let mut history = self.history.borrow_mut();
            let previous = history.cursor();
            let entry = match step {
                Step::Undo => history.undo(),
                Step::Redo => history.redo(),
                Step::Jump(index) => history.jump_to(index),
            };
            match entry {
                Ok(entry) => (previous, entry.action.clone(), entry.snapshot.clone()),
                Err(err) => {
                    warn!(?step, %err, "history navigation ignored");
                    return Err(err.into());
                }
            }
        };

        match Model::deserialize(&snapshot) {
            Ok(model) => {
                self.install(model);
                info!(?step, %action, "history restored");
                Ok(())
            }
            Err(err) => {
                if let Some(index) = previous {
                    let _ = self.history.borrow_mut().jump_to(index);
                }
                warn!(?step, %err, "history snapshot could not be restored");
                Err(err.into())
            }
        }
    }

    /// Swaps in new model content and resets every piece of interaction
    /// state keyed on the old entities.
    fn install(&mut self, model: Model) {
        // The old keys mean nothing in the new arena, so nothing to restore.
        self.drag = None;
        self.edge_builder.cancel();
        self.surface_builder.cancel();
        self.selection.reset();
        self.hover = None;
        self.model.replace_contents(model);
    }

    // --- Import / export ---

    /// Replaces the model with the document in `json` and records a
    /// "model imported" entry.
    ///
    /// # Errors
    ///
    /// Returns a JSON error for malformed text or a model error for an
    /// inconsistent document. The model, selection and history are left
    /// untouched on failure.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let model: Result<Model> = match ModelDoc::from_json(json) {
            Ok(doc) => Model::deserialize(&doc).map_err(Into::into),
            Err(err) => Err(err.into()),
        };
        let model = model.inspect_err(|err| warn!(%err, "import failed"))?;
        info!(
            name = model.name(),
            vertices = model.vertex_count(),
            edges = model.edge_count(),
            surfaces = model.surface_count(),
            "model imported"
        );
        self.install(model);
        self.model.emit_change_event("model imported");
        Ok(())
    }

    /// Reads and imports a JSON model file.
    ///
    /// # Errors
    ///
    /// As [`Editor::import_json`], plus I/O errors.
    pub fn import_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .inspect_err(|err| warn!(path = %path.display(), %err, "import failed"))?;
        self.import_json(&json)
    }

    /// The model as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if serialization fails.
    pub fn export_json(&self) -> Result<String> {
        self.model.to_json()
    }

    /// Writes the model to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns a JSON or I/O error.
    pub fn export_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.export_json()?;
        std::fs::write(path, json).inspect_err(|err| warn!(path = %path.display(), %err, "export failed"))?;
        info!(path = %path.display(), "model exported");
        Ok(())
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new("untitled", EditorConfig::default())
    }
}

/// The axis whose key is held, X before Y before Z.
fn axis_lock<I: InputSource + ?Sized>(input: &I) -> Option<Axis> {
    [(Key::X, Axis::X), (Key::Y, Axis::Y), (Key::Z, Axis::Z)]
        .into_iter()
        .find(|(key, _)| input.key_down(*key))
        .map(|(_, axis)| axis)
}
