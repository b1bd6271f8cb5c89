//! Page elements around the map: toggle controls, legends and status texts.
//!
//! The elements use interior mutability so that fetch tasks and the toggle
//! controller can update them through shared handles.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::layer::OverlayKind;

/// A checkbox that shows or hides one overlay.
#[derive(Debug)]
pub struct ToggleControl {
    id: String,
    checked: AtomicBool,
}

impl ToggleControl {
    /// Creates a control with the given initial state.
    pub fn new(id: impl Into<String>, checked: bool) -> Self {
        Self {
            id: id.into(),
            checked: AtomicBool::new(checked),
        }
    }

    /// Element id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current state.
    pub fn is_checked(&self) -> bool {
        self.checked.load(Ordering::SeqCst)
    }

    /// Changes the state.
    pub fn set_checked(&self, checked: bool) {
        self.checked.store(checked, Ordering::SeqCst);
    }
}

/// Legend explaining the colors of one overlay.
#[derive(Debug)]
pub struct Legend {
    id: String,
    visible: AtomicBool,
}

impl Legend {
    /// Creates a visible legend.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            visible: AtomicBool::new(true),
        }
    }

    /// Element id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns true if the legend is displayed.
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    /// Shows or hides the legend.
    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }
}

/// Text line reporting the state of one data source.
#[derive(Debug)]
pub struct StatusText {
    id: String,
    text: RwLock<String>,
}

impl StatusText {
    /// Creates a status with an initial text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: RwLock::new(text.into()),
        }
    }

    /// Element id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current text.
    pub fn text(&self) -> String {
        self.text.read().clone()
    }

    /// Replaces the text.
    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.write() = text.into();
    }
}

/// All page elements of one map session.
#[derive(Debug, Default)]
pub struct UiSurface {
    controls: BTreeMap<OverlayKind, Arc<ToggleControl>>,
    legends: BTreeMap<OverlayKind, Arc<Legend>>,
    statuses: BTreeMap<OverlayKind, Arc<StatusText>>,
}

impl UiSurface {
    /// Creates an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the toggle control of an overlay. Returns the shared handle.
    pub fn add_control(&mut self, kind: OverlayKind, checked: bool) -> Arc<ToggleControl> {
        let control = Arc::new(ToggleControl::new(format!("{kind}-toggle"), checked));
        self.controls.insert(kind, control.clone());
        control
    }

    /// Adds the legend of an overlay.
    pub fn add_legend(&mut self, kind: OverlayKind) -> Arc<Legend> {
        let legend = Arc::new(Legend::new(format!("{kind}-legend")));
        self.legends.insert(kind, legend.clone());
        legend
    }

    /// Adds the status text of an overlay.
    pub fn add_status(&mut self, kind: OverlayKind, text: impl Into<String>) -> Arc<StatusText> {
        let status = Arc::new(StatusText::new(format!("{kind}-status"), text));
        self.statuses.insert(kind, status.clone());
        status
    }

    /// Toggle control of an overlay.
    pub fn control(&self, kind: OverlayKind) -> Option<&Arc<ToggleControl>> {
        self.controls.get(&kind)
    }

    /// Legend of an overlay.
    pub fn legend(&self, kind: OverlayKind) -> Option<&Arc<Legend>> {
        self.legends.get(&kind)
    }

    /// Status text of an overlay.
    pub fn status(&self, kind: OverlayKind) -> Option<&Arc<StatusText>> {
        self.statuses.get(&kind)
    }

    /// Overlays that have a control, in display order.
    pub fn overlays(&self) -> impl Iterator<Item = OverlayKind> + '_ {
        self.controls.keys().copied()
    }
}
