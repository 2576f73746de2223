//! Editing core for a four-viewport wireframe and polygon model editor.
//!
//! The [`Model`] owns vertices, edges and surfaces and broadcasts every
//! logical change. The [`Editor`] drives hover, selection, dragging, creation
//! tools and undo/redo from one frame of input at a time.

pub mod camera;
pub mod config;
pub mod creation;
pub mod editor;
pub mod error;
pub mod history;
pub mod input;
pub mod math;
pub mod model;
pub mod picking;
pub mod selection;
pub mod tool;
pub mod transform;
pub mod viewport;

pub use camera::{Projection, ViewCameras};
pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{QuadviewError, Result};
pub use history::{History, HistoryEntry};
pub use input::{FrameInput, InputSource, Key, MouseButton};
pub use model::{Model, ModelDoc, ModelEvent};
pub use selection::{EntityRef, Selection};
pub use tool::Tool;
pub use viewport::Viewport;
