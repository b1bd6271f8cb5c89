//! Session control: toggle wiring and the map controller.

mod controller;
mod toggle;

pub use controller::{ControlSnapshot, LayerSnapshot, MapController, PageSnapshot};
pub use toggle::{ToggleBinding, ToggleController};
