mod axis;
mod drag;
mod snap;

pub use axis::Axis;
pub use drag::{Drag, DragInput};
pub use snap::{snap_axes, snap_scalar, snap_to_grid};
