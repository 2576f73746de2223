#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use quadview::error::ModelError;
use quadview::math::{Point2, Point3, Vector2};
use quadview::model::VertexKey;
use quadview::{
    Editor, EditorConfig, EntityRef, FrameInput, Key, MouseButton, QuadviewError, Tool, ViewCameras, Viewport,
};

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}

fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

fn size() -> Vector2 {
    Vector2::new(800.0, 600.0)
}

/// Frame over the top view with the pointer at top-view world `(x, z)`.
fn top(x: f64, z: f64) -> FrameInput {
    FrameInput::at(Viewport::Top, Point2::new(x + 400.0, z + 300.0), size())
}

fn position(editor: &Editor, key: VertexKey) -> Point3 {
    editor.model().vertex(key).unwrap().position
}

fn actions(editor: &Editor) -> Vec<String> {
    editor.history().entries().iter().map(|e| e.action.clone()).collect()
}

fn editor() -> Editor {
    init_tracing();
    Editor::new("untitled", EditorConfig::default())
}

// ── select and drag ──

#[test]
fn drag_translates_selection_rigidly() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    let a = ed.model_mut().add_vertex(p(0.0, 0.0, 0.0));
    let b = ed.model_mut().add_vertex(p(100.0, 0.0, 0.0));
    let c = ed.model_mut().add_vertex(p(0.0, 0.0, 100.0));
    ed.select(EntityRef::Vertex(b), false).unwrap();

    ed.update(&top(0.0, 0.0).key_hold(Key::Shift).press(MouseButton::Left), &cams);
    assert!(ed.is_dragging());
    assert_eq!(ed.selection().vertices(), &[b, a]);

    ed.update(&top(30.0, 20.0).hold(MouseButton::Left), &cams);
    ed.update(&top(30.0, 20.0).release(MouseButton::Left), &cams);

    assert!(!ed.is_dragging());
    assert_relative_eq!(position(&ed, a), p(30.0, 0.0, 20.0));
    assert_relative_eq!(position(&ed, b), p(130.0, 0.0, 20.0));
    assert_relative_eq!(position(&ed, c), p(0.0, 0.0, 100.0));
    assert_eq!(actions(&ed).last().unwrap(), "vertices moved");
    assert_eq!(ed.history().len(), 5);
}

#[test]
fn pressing_unselected_vertex_replaces_selection() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    let a = ed.model_mut().add_vertex(p(0.0, 0.0, 0.0));
    let b = ed.model_mut().add_vertex(p(100.0, 0.0, 0.0));
    ed.select(EntityRef::Vertex(b), false).unwrap();

    ed.update(&top(0.0, 0.0).press(MouseButton::Left), &cams);
    ed.update(&top(0.0, 0.0).release(MouseButton::Left), &cams);

    assert_eq!(ed.selection().vertices(), &[a]);
    assert!(!ed.model().vertex(b).unwrap().selected);
    // No displacement, no entry.
    assert_ne!(actions(&ed).last().unwrap(), "vertices moved");
}

#[test]
fn grid_snap_can_cancel_a_small_drag() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    let v = ed.model_mut().add_vertex(Point3::origin());

    ed.update(&top(0.0, 0.0).press(MouseButton::Left), &cams);
    ed.update(&top(23.0, 0.0).hold(MouseButton::Left).key_hold(Key::Control), &cams);
    assert_relative_eq!(position(&ed, v), Point3::origin());
    ed.update(&top(23.0, 0.0).release(MouseButton::Left).key_hold(Key::Control), &cams);

    assert_eq!(actions(&ed), vec!["new model", "vertex added"]);
}

#[test]
fn grid_snap_rounds_anchor() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    let v = ed.model_mut().add_vertex(Point3::origin());

    ed.update(&top(0.0, 0.0).press(MouseButton::Left), &cams);
    ed.update(&top(38.0, -61.0).hold(MouseButton::Left).key_hold(Key::Control), &cams);
    ed.update(&top(38.0, -61.0).release(MouseButton::Left), &cams);

    assert_relative_eq!(position(&ed, v), p(50.0, 0.0, -50.0));
}

#[test]
fn axis_lock_in_top_view() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    let v = ed.model_mut().add_vertex(Point3::origin());

    ed.update(&top(0.0, 0.0).press(MouseButton::Left), &cams);
    ed.update(&top(30.0, 20.0).hold(MouseButton::Left).key_hold(Key::X), &cams);
    ed.update(&top(30.0, 20.0).release(MouseButton::Left), &cams);

    assert_relative_eq!(position(&ed, v), p(30.0, 0.0, 0.0));
}

#[test]
fn front_view_drag_maps_screen_up_to_world_up() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    let v = ed.model_mut().add_vertex(Point3::origin());
    let front = |x: f64, y: f64| FrameInput::at(Viewport::Front, Point2::new(400.0 + x, 300.0 + y), size());

    ed.update(&front(0.0, 0.0).press(MouseButton::Left), &cams);
    ed.update(&front(10.0, -40.0).hold(MouseButton::Left), &cams);
    ed.update(&front(10.0, -40.0).release(MouseButton::Left), &cams);

    assert_relative_eq!(position(&ed, v), p(10.0, 40.0, 0.0));
}

#[test]
fn perspective_drag_follows_ground_plane() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    let v = ed.model_mut().add_vertex(Point3::origin());
    let start = cams.perspective.project(&Point3::origin(), &size()).unwrap();
    let end = cams.perspective.project(&p(50.0, 0.0, -20.0), &size()).unwrap();

    ed.update(&FrameInput::at(Viewport::Perspective, start, size()).press(MouseButton::Left), &cams);
    assert!(ed.is_dragging());
    ed.update(&FrameInput::at(Viewport::Perspective, end, size()).hold(MouseButton::Left), &cams);
    ed.update(&FrameInput::at(Viewport::Perspective, end, size()).release(MouseButton::Left), &cams);

    assert_relative_eq!(position(&ed, v), p(50.0, 0.0, -20.0), epsilon = 1e-6);
}

#[test]
fn escape_cancels_drag_and_restores() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    let v = ed.model_mut().add_vertex(p(10.0, 0.0, 10.0));

    ed.update(&top(10.0, 10.0).press(MouseButton::Left), &cams);
    ed.update(&top(80.0, 60.0).hold(MouseButton::Left), &cams);
    assert_relative_eq!(position(&ed, v), p(80.0, 0.0, 60.0));

    ed.update(&top(80.0, 60.0).hold(MouseButton::Left).key_press(Key::Escape), &cams);
    assert!(!ed.is_dragging());
    assert_relative_eq!(position(&ed, v), p(10.0, 0.0, 10.0));

    ed.update(&top(80.0, 60.0).release(MouseButton::Left), &cams);
    assert_eq!(actions(&ed), vec!["new model", "vertex added"]);
}

#[test]
fn drag_aborted_by_removed_vertex_restores_the_rest() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    let a = ed.model_mut().add_vertex(p(0.0, 0.0, 0.0));
    let b = ed.model_mut().add_vertex(p(30.0, 0.0, 0.0));
    let c = ed.model_mut().add_vertex(p(60.0, 0.0, 0.0));
    for v in [a, b, c] {
        ed.select(EntityRef::Vertex(v), true).unwrap();
    }

    ed.update(&top(0.0, 0.0).press(MouseButton::Left), &cams);
    ed.update(&top(30.0, 0.0).hold(MouseButton::Left), &cams);
    assert_relative_eq!(position(&ed, c), p(90.0, 0.0, 0.0));

    ed.model_mut().remove_vertex(b).unwrap();
    ed.update(&top(40.0, 0.0).hold(MouseButton::Left), &cams);

    assert!(!ed.is_dragging());
    assert_relative_eq!(position(&ed, a), p(0.0, 0.0, 0.0));
    assert_relative_eq!(position(&ed, c), p(60.0, 0.0, 0.0));
    assert!(!actions(&ed).iter().any(|action| action == "vertices moved"));
}

// ── selection ──

#[test]
fn empty_click_clears_every_kind() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    let a = ed.model_mut().add_vertex(p(0.0, 0.0, 0.0));
    let b = ed.model_mut().add_vertex(p(100.0, 0.0, 0.0));
    let e = ed.model_mut().add_edge(a, b).unwrap();
    ed.select(EntityRef::Vertex(a), false).unwrap();
    ed.select(EntityRef::Edge(e), false).unwrap();

    ed.update(&top(-200.0, -200.0).press(MouseButton::Left), &cams);
    assert!(ed.selection().is_empty());
    assert!(!ed.model().edge(e).unwrap().selected);
}

#[test]
fn clicking_edge_keeps_vertex_selection() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    let a = ed.model_mut().add_vertex(p(0.0, 0.0, 0.0));
    let b = ed.model_mut().add_vertex(p(100.0, 0.0, 0.0));
    let e = ed.model_mut().add_edge(a, b).unwrap();
    ed.select(EntityRef::Vertex(a), false).unwrap();

    ed.update(&top(50.0, 2.0).press(MouseButton::Left), &cams);
    assert_eq!(ed.selection().edges(), &[e]);
    assert_eq!(ed.selection().vertices(), &[a]);
}

#[test]
fn selection_is_inert_outside_select_tool() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    let a = ed.model_mut().add_vertex(p(0.0, 0.0, 0.0));
    ed.select(EntityRef::Vertex(a), false).unwrap();
    ed.set_tool(Tool::Pan);

    ed.update(&top(-200.0, -200.0).press(MouseButton::Left), &cams);
    assert_eq!(ed.selection().vertices(), &[a]);
}

#[test]
fn delete_key_removes_selection_with_cascade() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    let a = ed.model_mut().add_vertex(p(0.0, 0.0, 0.0));
    let b = ed.model_mut().add_vertex(p(100.0, 0.0, 0.0));
    ed.model_mut().add_edge(a, b).unwrap();
    ed.select(EntityRef::Vertex(a), false).unwrap();

    ed.update(&top(300.0, 300.0).key_press(Key::Delete), &cams);

    assert_eq!(ed.model().vertex_count(), 1);
    assert_eq!(ed.model().edge_count(), 0);
    assert!(ed.selection().is_empty());
    assert_eq!(actions(&ed).last().unwrap(), "entities deleted");
}

#[test]
fn delete_with_empty_selection_is_reported() {
    let mut ed = editor();
    ed.model_mut().add_vertex(Point3::origin());
    let before = ed.history().len();

    let err = ed.delete_selection().unwrap_err();
    assert!(matches!(err, QuadviewError::Interaction(_)));
    assert_eq!(ed.model().vertex_count(), 1);
    assert_eq!(ed.history().len(), before);
}

#[test]
fn hidden_vertices_cannot_be_hovered() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    let a = ed.model_mut().add_vertex(Point3::origin());
    ed.select(EntityRef::Vertex(a), false).unwrap();
    assert_eq!(ed.set_selection_hidden(true).unwrap(), 1);

    ed.update(&top(0.0, 0.0), &cams);
    assert_eq!(ed.hover(), None);
    assert_eq!(actions(&ed).last().unwrap(), "vertices hidden");
}

// ── creation tools ──

#[test]
fn create_vertex_tool_places_on_dropped_axis_zero() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    ed.set_tool(Tool::CreateVertex);

    ed.update(&top(40.0, 70.0).press(MouseButton::Left), &cams);
    ed.update(&top(40.0, 70.0).key_hold(Key::Control).press(MouseButton::Left), &cams);

    let placed: Vec<Point3> = ed.model().vertices().map(|(_, v)| v.position).collect();
    assert_eq!(placed.len(), 2);
    assert_relative_eq!(placed[0], p(40.0, 0.0, 70.0));
    assert_relative_eq!(placed[1], p(50.0, 0.0, 50.0));
}

#[test]
fn edge_tool_connects_two_hovered_vertices() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    let a = ed.model_mut().add_vertex(p(0.0, 0.0, 0.0));
    let b = ed.model_mut().add_vertex(p(100.0, 0.0, 0.0));
    ed.set_tool(Tool::CreateEdge);

    ed.update(&top(0.0, 0.0).press(MouseButton::Left), &cams);
    ed.update(&top(60.0, 40.0), &cams);
    let (start, cursor) = ed.edge_builder().preview(ed.model()).unwrap();
    assert_relative_eq!(start, p(0.0, 0.0, 0.0));
    assert_relative_eq!(cursor, p(60.0, 0.0, 40.0));

    // Panning keeps the provisional edge.
    ed.set_tool(Tool::Pan);
    ed.set_tool(Tool::CreateEdge);
    assert_eq!(ed.edge_builder().first(), Some(a));

    ed.update(&top(100.0, 0.0).press(MouseButton::Left), &cams);
    let (_, edge) = ed.model().edges().next().unwrap();
    assert_eq!((edge.a, edge.b), (a, b));
    assert!(ed.edge_builder().is_idle());
    assert_eq!(actions(&ed).last().unwrap(), "edge added");
}

#[test]
fn switching_tool_discards_provisional_edge() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    ed.model_mut().add_vertex(p(0.0, 0.0, 0.0));
    ed.set_tool(Tool::CreateEdge);

    ed.update(&top(0.0, 0.0).press(MouseButton::Left), &cams);
    assert!(!ed.edge_builder().is_idle());
    ed.set_tool(Tool::Select);
    assert!(ed.edge_builder().is_idle());
    assert_eq!(ed.model().edge_count(), 0);
}

#[test]
fn surface_tool_closes_on_first_vertex() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    let a = ed.model_mut().add_vertex(p(0.0, 0.0, 0.0));
    let b = ed.model_mut().add_vertex(p(100.0, 0.0, 0.0));
    let c = ed.model_mut().add_vertex(p(100.0, 0.0, 100.0));
    ed.set_tool(Tool::CreateSurface);

    for (x, z) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 0.0)] {
        ed.update(&top(x, z).press(MouseButton::Left), &cams);
    }

    let (_, surface) = ed.model().surfaces().next().unwrap();
    assert_eq!(surface.vertices, vec![a, b, c]);
    assert!(ed.surface_builder().is_idle());
}

#[test]
fn escape_discards_surface_in_progress() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    ed.model_mut().add_vertex(p(0.0, 0.0, 0.0));
    ed.model_mut().add_vertex(p(100.0, 0.0, 0.0));
    ed.set_tool(Tool::CreateSurface);

    ed.update(&top(0.0, 0.0).press(MouseButton::Left), &cams);
    ed.update(&top(100.0, 0.0).press(MouseButton::Left), &cams);
    ed.update(&top(50.0, 50.0).key_press(Key::Escape), &cams);

    assert!(ed.surface_builder().is_idle());
    assert_eq!(ed.model().surface_count(), 0);
}

// ── history ──

#[test]
fn history_is_linear() {
    let mut ed = editor();
    ed.model_mut().add_vertex(p(0.0, 0.0, 0.0));
    ed.rename("renamed");
    ed.undo().unwrap();
    ed.model_mut().add_vertex(p(1.0, 0.0, 0.0));

    assert_eq!(actions(&ed), vec!["new model", "vertex added", "vertex added"]);
    assert_eq!(ed.history().cursor(), Some(2));
    assert_eq!(ed.model().name(), "untitled");
    assert_eq!(ed.model().vertex_count(), 2);
}

#[test]
fn undo_and_redo_at_boundaries_change_nothing() {
    let mut ed = editor();
    assert!(matches!(ed.undo(), Err(QuadviewError::History(_))));
    assert_eq!(ed.history().cursor(), Some(0));

    ed.model_mut().add_vertex(Point3::origin());
    assert!(matches!(ed.redo(), Err(QuadviewError::History(_))));
    assert_eq!(ed.model().vertex_count(), 1);
    assert_eq!(ed.history().cursor(), Some(1));
}

#[test]
fn keyboard_undo_redo() {
    let cams = ViewCameras::default();
    let mut ed = editor();
    ed.model_mut().add_vertex(p(50.0, 0.0, 50.0));

    ed.update(&top(0.0, 0.0).key_hold(Key::Control).key_press(Key::Z), &cams);
    assert_eq!(ed.model().vertex_count(), 0);

    ed.update(&top(0.0, 0.0).key_hold(Key::Control).key_press(Key::Y), &cams);
    let (_, v) = ed.model().vertices().next().unwrap();
    assert_relative_eq!(v.position, p(50.0, 0.0, 50.0));
}

#[test]
fn jump_to_restores_snapshot_and_clears_selection() {
    let mut ed = editor();
    let a = ed.model_mut().add_vertex(p(0.0, 0.0, 0.0));
    ed.model_mut().add_vertex(p(1.0, 0.0, 0.0));
    ed.select(EntityRef::Vertex(a), false).unwrap();

    ed.jump_to(1).unwrap();
    assert_eq!(ed.model().vertex_count(), 1);
    assert!(ed.selection().is_empty());
    assert!(ed.jump_to(9).is_err());
    assert_eq!(ed.history().cursor(), Some(1));
}

// ── import / export ──

#[test]
fn failed_import_leaves_everything_untouched() {
    let mut ed = editor();
    let a = ed.model_mut().add_vertex(Point3::origin());
    ed.select(EntityRef::Vertex(a), false).unwrap();
    let before = ed.model().serialize();
    let history_len = ed.history().len();

    let dangling = r#"{
        "vertices": [{"id": "a", "position": {"x": 0, "y": 0, "z": 0}, "hidden": false}],
        "edges": [{"id": "e1", "a": "a", "b": "missing"}],
        "surfaces": []
    }"#;
    let err = ed.import_json(dangling).unwrap_err();
    assert!(matches!(
        err,
        QuadviewError::Model(ModelError::UnknownVertex { ref vertex, .. }) if vertex == "missing"
    ));
    assert!(matches!(ed.import_json("{ nope"), Err(QuadviewError::Json(_))));

    assert_eq!(ed.model().serialize(), before);
    assert_eq!(ed.selection().vertices(), &[a]);
    assert_eq!(ed.history().len(), history_len);
}

#[test]
fn export_then_import_through_a_file() {
    let mut source = editor();
    let a = source.model_mut().add_vertex(p(1.0, 2.0, 3.0));
    let b = source.model_mut().add_vertex(p(4.0, 5.0, 6.0));
    let c = source.model_mut().add_vertex(p(7.0, 8.0, 9.0));
    source.model_mut().add_edge(a, b).unwrap();
    source.model_mut().add_surface(vec![a, b, c]).unwrap();
    source.model_mut().set_vertices_hidden(&[c], true).unwrap();

    let path = std::env::temp_dir().join(format!("quadview-export-{}.json", std::process::id()));
    source.export_file(&path).unwrap();

    let mut target = editor();
    target.import_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(target.model().serialize(), source.model().serialize());
    assert_eq!(actions(&target), vec!["new model", "model imported"]);

    target.undo().unwrap();
    assert_eq!(target.model().vertex_count(), 0);
}

#[test]
fn missing_import_file_is_an_io_error() {
    let mut ed = editor();
    let err = ed.import_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, QuadviewError::Io(_)));
}
