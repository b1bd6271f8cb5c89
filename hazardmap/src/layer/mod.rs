//! Map layers.
//!
//! A layer is anything the [`Map`](crate::Map) can attach: feature
//! [`LayerGroup`]s filled by the feed fetchers and [`TileLayer`]s for the base
//! map and the radar overlay.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub mod builder;
mod layer_group;
pub mod tiles;

pub use builder::{Annotate, LayerBuilder};
pub use layer_group::{Annotation, LayerGroup, Shape};
pub use tiles::{TileIndex, TileLayer};

/// Common interface of attachable layers.
pub trait Layer: Send + Sync {
    /// Unique name of the layer within a map.
    fn id(&self) -> &str;

    /// Number of rendered annotations, for layers that hold features.
    fn annotation_count(&self) -> Option<usize> {
        None
    }

    /// Credit line to show while the layer is attached.
    fn attribution(&self) -> Option<&str> {
        None
    }
}

/// The toggleable overlays of a hazard map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    /// Active weather alert regions.
    Weather,
    /// Earthquake markers.
    Earthquakes,
    /// Radar imagery.
    Radar,
}

impl OverlayKind {
    /// All overlays in display order.
    pub const ALL: [OverlayKind; 3] = [Self::Weather, Self::Earthquakes, Self::Radar];

    /// Layer id used on the map.
    pub fn layer_id(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Earthquakes => "earthquakes",
            Self::Radar => "radar",
        }
    }

    /// Looks an overlay up by its layer id. A few short aliases are accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "weather" | "alerts" => Some(Self::Weather),
            "earthquakes" | "earthquake" | "quakes" => Some(Self::Earthquakes),
            "radar" => Some(Self::Radar),
            _ => None,
        }
    }
}

impl Display for OverlayKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.layer_id())
    }
}
