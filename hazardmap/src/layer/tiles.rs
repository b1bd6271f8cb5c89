//! Raster tile layers: the OpenStreetMap base layer and WMS overlays.
//!
//! Tile layers do not download anything themselves. They describe the tile
//! grid and produce the request URL for every tile; fetching and drawing the
//! images is the renderer's job.

use std::collections::HashMap;

use reqwest::Url;
use serde::Serialize;

use crate::error::HazardMapError;
use crate::layer::Layer;

/// Half of the Web Mercator world extent in meters.
pub const WEB_MERCATOR_HALF_EXTENT: f64 = 20_037_508.342_789_244;

/// Tile size in pixels used by both the XYZ and the WMS layers.
pub const TILE_SIZE: u32 = 256;

/// Default OpenStreetMap tile template.
pub const OSM_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
/// Highest zoom level the OpenStreetMap tile servers provide.
pub const OSM_MAX_ZOOM: u32 = 19;
/// Credit line required by the OpenStreetMap tile usage policy.
pub const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";

/// Index of a tile in the Web Mercator grid. `y` grows southwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileIndex {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Zoom level.
    pub z: u32,
}

impl TileIndex {
    /// Creates a new index.
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Projected bounding box of the tile as `[min_x, min_y, max_x, max_y]`
    /// in EPSG:3857 meters.
    pub fn mercator_bbox(&self) -> [f64; 4] {
        let tile_span = 2.0 * WEB_MERCATOR_HALF_EXTENT / f64::from(1u32 << self.z.min(31));
        let min_x = -WEB_MERCATOR_HALF_EXTENT + f64::from(self.x) * tile_span;
        let max_y = WEB_MERCATOR_HALF_EXTENT - f64::from(self.y) * tile_span;

        [min_x, max_y - tile_span, min_x + tile_span, max_y]
    }

    fn is_within_grid(&self) -> bool {
        let tiles_per_side = 1u64 << self.z.min(31);
        u64::from(self.x) < tiles_per_side && u64::from(self.y) < tiles_per_side
    }
}

/// Parameters of a WMS 1.1.1 `GetMap` source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WmsSource {
    /// Service endpoint without query.
    pub url: String,
    /// Comma separated WMS layer names.
    pub layers: String,
    /// Image MIME type.
    pub format: String,
    /// Whether the server should render a transparent background.
    pub transparent: bool,
}

/// Where the tile images of a layer come from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileSource {
    /// URL template with `{x}`, `{y}` and `{z}` placeholders.
    Xyz(String),
    /// WMS endpoint queried per tile bounding box.
    Wms(WmsSource),
}

/// Raster tile layer blended over the map with a fixed opacity.
#[derive(Debug, Clone)]
pub struct TileLayer {
    id: String,
    source: TileSource,
    max_zoom: u32,
    opacity: f64,
    attribution: Option<String>,
}

impl TileLayer {
    /// Creates a layer with full opacity and no attribution.
    pub fn new(id: impl Into<String>, source: TileSource, max_zoom: u32) -> Self {
        Self {
            id: id.into(),
            source,
            max_zoom,
            opacity: 1.0,
            attribution: None,
        }
    }

    /// The OpenStreetMap base layer.
    pub fn osm() -> Self {
        Self::new("base", TileSource::Xyz(OSM_TEMPLATE.to_string()), OSM_MAX_ZOOM)
            .with_attribution(OSM_ATTRIBUTION)
    }

    /// Sets the blending opacity. Values are clamped to `[0, 1]`.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Sets the credit line.
    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.attribution = Some(attribution.into());
        self
    }

    /// Tile source.
    pub fn source(&self) -> &TileSource {
        &self.source
    }

    /// Blending opacity.
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Highest zoom level served.
    pub fn max_zoom(&self) -> u32 {
        self.max_zoom
    }

    /// Request URL for the given tile.
    pub fn tile_url(&self, index: TileIndex) -> Result<String, HazardMapError> {
        if index.z > self.max_zoom {
            return Err(HazardMapError::ZoomOutOfRange {
                z: index.z,
                max: self.max_zoom,
            });
        }
        if !index.is_within_grid() {
            return Err(HazardMapError::InvalidValue {
                field: "tile",
                reason: format!("{index:?} is outside of the tile grid"),
            });
        }

        match &self.source {
            TileSource::Xyz(template) => {
                let vars = HashMap::from([
                    ("x".to_string(), index.x),
                    ("y".to_string(), index.y),
                    ("z".to_string(), index.z),
                ]);
                Ok(strfmt::strfmt(template, &vars)?)
            }
            TileSource::Wms(wms) => wms_url(wms, index),
        }
    }
}

fn wms_url(wms: &WmsSource, index: TileIndex) -> Result<String, HazardMapError> {
    let [min_x, min_y, max_x, max_y] = index.mercator_bbox();
    let size = TILE_SIZE.to_string();
    let bbox = format!("{min_x},{min_y},{max_x},{max_y}");

    let url = Url::parse_with_params(
        &wms.url,
        &[
            ("service", "WMS"),
            ("request", "GetMap"),
            ("version", "1.1.1"),
            ("layers", wms.layers.as_str()),
            ("styles", ""),
            ("format", wms.format.as_str()),
            ("transparent", if wms.transparent { "true" } else { "false" }),
            ("width", size.as_str()),
            ("height", size.as_str()),
            ("srs", "EPSG:3857"),
            ("bbox", bbox.as_str()),
        ],
    )
    .map_err(|err| HazardMapError::InvalidValue {
        field: "radar.url",
        reason: err.to_string(),
    })?;

    Ok(url.into())
}

impl Layer for TileLayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn attribution(&self) -> Option<&str> {
        self.attribution.as_deref()
    }
}
