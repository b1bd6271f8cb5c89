//! Hazardmap overlays live hazard feeds on an interactive map.
//!
//! Two public feeds are supported out of the box: the USGS earthquake summary
//! feed and the NWS active alerts feed. Each feed is rendered into its own
//! [`LayerGroup`](layer::LayerGroup) that can be shown or hidden with a toggle
//! control, next to a radar WMS overlay and an OpenStreetMap base layer.
//!
//! The entry point is [`MapController`], which owns the [`Map`], the layer groups
//! and the [`UiSurface`](ui::UiSurface) for one map session:
//!
//! ```no_run
//! use std::sync::Arc;
//! use hazardmap::{MapConfig, MapController};
//! use hazardmap::feed::WebFeedLoader;
//!
//! # async fn run() -> Result<(), hazardmap::HazardMapError> {
//! let config = MapConfig::combined();
//! let loader = Arc::new(WebFeedLoader::from_config(&config)?);
//! let controller = MapController::new(config, loader)?;
//! controller.start();
//! controller.refresh_all().await;
//! println!("{:?}", controller.snapshot());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod control;
pub mod error;
pub mod feature;
pub mod feed;
pub mod layer;
pub mod map;
pub mod popup;
pub mod style;
pub mod ui;

pub use config::MapConfig;
pub use control::{MapController, PageSnapshot, ToggleController};
pub use error::HazardMapError;
pub use map::{Map, MapView};
pub use style::{Color, SizePolicy, StyleSpec};
