//! The map: viewport, base layer, attached overlays and attribution.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::layer::{Layer, TileLayer};

/// Center and zoom of the visible map area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    /// Latitude of the center in degrees.
    pub lat: f64,
    /// Longitude of the center in degrees.
    pub lon: f64,
    /// Zoom level.
    pub zoom: u32,
}

impl MapView {
    /// Creates a new view.
    pub fn new(lat: f64, lon: f64, zoom: u32) -> Self {
        Self { lat, lon, zoom }
    }
}

/// Map with one always-visible base layer and any number of overlays.
///
/// Overlays are identified by their [`Layer::id`]. Attaching a layer that is
/// already attached and detaching one that is not are both no-ops.
pub struct Map {
    view: MapView,
    base: Arc<TileLayer>,
    layers: Vec<Arc<dyn Layer>>,
    attributions: Vec<String>,
}

impl Map {
    /// Creates a map showing `base` at the given view.
    pub fn new(view: MapView, base: TileLayer) -> Self {
        let mut map = Self {
            view,
            base: Arc::new(base),
            layers: Vec::new(),
            attributions: Vec::new(),
        };

        if let Some(attribution) = map.base.attribution().map(str::to_string) {
            map.add_attribution(attribution);
        }

        map
    }

    /// Current view.
    pub fn view(&self) -> MapView {
        self.view
    }

    /// Moves the viewport.
    pub fn set_view(&mut self, view: MapView) {
        self.view = view;
    }

    /// Base tile layer.
    pub fn base_layer(&self) -> &TileLayer {
        &self.base
    }

    /// Returns true if a layer with this id is attached.
    pub fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|layer| layer.id() == id)
    }

    /// Attaches a layer on top of the others. Returns false if a layer with the
    /// same id is already attached.
    pub fn add_layer(&mut self, layer: Arc<dyn Layer>) -> bool {
        if self.has_layer(layer.id()) {
            return false;
        }

        log::debug!("Attaching layer '{}'", layer.id());
        if let Some(attribution) = layer.attribution().map(str::to_string) {
            self.add_attribution(attribution);
        }
        self.layers.push(layer);

        true
    }

    /// Detaches the layer with this id. Returns false if it was not attached.
    pub fn remove_layer(&mut self, id: &str) -> bool {
        let before = self.layers.len();
        self.layers.retain(|layer| layer.id() != id);

        let removed = self.layers.len() != before;
        if removed {
            log::debug!("Detached layer '{id}'");
        }

        removed
    }

    /// Attached overlays, bottom first.
    pub fn layers(&self) -> &[Arc<dyn Layer>] {
        &self.layers
    }

    /// Adds a credit line. Duplicates are ignored.
    pub fn add_attribution(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !self.attributions.contains(&text) {
            self.attributions.push(text);
        }
    }

    /// Credit lines in insertion order.
    pub fn attributions(&self) -> &[String] {
        &self.attributions
    }
}

impl std::fmt::Debug for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("view", &self.view)
            .field("base", &self.base.id())
            .field(
                "layers",
                &self.layers.iter().map(|layer| layer.id()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
