//! Typed features decoded from the hazard feeds.
//!
//! Features are immutable once decoded. A fetch always produces a fresh
//! [`FeatureCollection`] that replaces the previous one wholesale.

use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{GeoJson, JsonObject, JsonValue, Value};
use serde::Serialize;

use crate::error::FetchError;

/// Geographic position of a point event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPosition {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Depth below surface in kilometers, when reported.
    pub depth_km: Option<f64>,
}

impl GeoPosition {
    /// Creates a position without depth.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            depth_km: None,
        }
    }

    /// Sets the depth.
    pub fn with_depth(mut self, depth_km: f64) -> Self {
        self.depth_km = Some(depth_km);
        self
    }

    /// Reads a GeoJSON position (`[lon, lat, depth?]`).
    fn from_geojson(position: &[f64]) -> Option<Self> {
        match position {
            [lon, lat] => Some(Self::new(*lat, *lon)),
            [lon, lat, depth, ..] => Some(Self::new(*lat, *lon).with_depth(*depth)),
            _ => None,
        }
    }
}

/// One seismic event from the earthquake feed.
#[derive(Debug, Clone, PartialEq)]
pub struct QuakeFeature {
    /// Feed identifier.
    pub id: Option<String>,
    /// Epicenter and hypocenter depth.
    pub position: GeoPosition,
    /// Reported magnitude. The feed sends `null` for some events.
    pub magnitude: Option<f64>,
    /// Human readable location.
    pub place: Option<String>,
    /// Origin time as milliseconds since the Unix epoch.
    pub time_ms: Option<i64>,
    /// Link to the event page.
    pub url: Option<String>,
}

/// One active alert from the weather alerts feed.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertFeature {
    /// Feed identifier.
    pub id: Option<String>,
    /// Affected area.
    pub area: MultiPolygon<f64>,
    /// NWS severity (`Extreme`, `Severe`, `Moderate`, `Minor`, `Unknown`).
    pub severity: Option<String>,
    /// Alert type, e.g. `Flood Warning`.
    pub event: Option<String>,
    /// One line summary.
    pub headline: Option<String>,
    /// Textual description of the affected zones.
    pub area_desc: Option<String>,
    /// Start of validity, ISO 8601.
    pub effective: Option<String>,
    /// End of validity, ISO 8601.
    pub expires: Option<String>,
}

/// Feature types that can be decoded from a GeoJSON feature.
pub trait FeedFeature: Sized {
    /// Human readable name of the feature kind, used in logs.
    const KIND: &'static str;

    /// Decodes one feature. Returns `None` if the feature has no geometry this
    /// kind can be drawn with.
    fn from_geojson(feature: &geojson::Feature) -> Option<Self>;
}

/// Decoded content of one feed response.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection<F> {
    /// Features that can be rendered.
    pub features: Vec<F>,
    /// Number of features in the response that were dropped for lack of a
    /// usable geometry.
    pub skipped: usize,
}

impl<F> Default for FeatureCollection<F> {
    fn default() -> Self {
        Self {
            features: Vec::new(),
            skipped: 0,
        }
    }
}

impl<F> FeatureCollection<F> {
    /// Number of renderable features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns true if there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl<F: FeedFeature> FeatureCollection<F> {
    /// Decodes a whole feed response.
    ///
    /// The response is all-or-nothing: invalid JSON or a GeoJSON object other
    /// than a feature collection fails the whole response.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FetchError> {
        let geojson = GeoJson::from_reader(bytes).map_err(geojson::Error::from)?;
        let collection = match geojson {
            GeoJson::FeatureCollection(collection) => collection,
            GeoJson::Feature(_) => return Err(FetchError::NotACollection("Feature")),
            GeoJson::Geometry(_) => return Err(FetchError::NotACollection("Geometry")),
        };

        let total = collection.features.len();
        let features: Vec<F> = collection
            .features
            .iter()
            .filter_map(F::from_geojson)
            .collect();

        let skipped = total - features.len();
        if skipped > 0 {
            log::debug!("Skipped {skipped} of {total} {} without geometry", F::KIND);
        }

        Ok(Self { features, skipped })
    }
}

impl FeedFeature for QuakeFeature {
    const KIND: &'static str = "earthquakes";

    fn from_geojson(feature: &geojson::Feature) -> Option<Self> {
        let position = match &feature.geometry.as_ref()?.value {
            Value::Point(position) => GeoPosition::from_geojson(position)?,
            _ => return None,
        };

        let properties = feature.properties.as_ref();
        Some(Self {
            id: feature_id(feature),
            position,
            magnitude: number_property(properties, "mag"),
            place: string_property(properties, "place"),
            time_ms: number_property(properties, "time").map(|time| time as i64),
            url: string_property(properties, "url"),
        })
    }
}

impl FeedFeature for AlertFeature {
    const KIND: &'static str = "weather alerts";

    fn from_geojson(feature: &geojson::Feature) -> Option<Self> {
        let area = match &feature.geometry.as_ref()?.value {
            Value::Polygon(rings) => MultiPolygon::new(vec![polygon(rings)?]),
            Value::MultiPolygon(polygons) => MultiPolygon::new(
                polygons
                    .iter()
                    .map(|rings| polygon(rings))
                    .collect::<Option<Vec<_>>>()?,
            ),
            _ => return None,
        };

        let properties = feature.properties.as_ref();
        Some(Self {
            id: feature_id(feature),
            area,
            severity: string_property(properties, "severity"),
            event: string_property(properties, "event"),
            headline: string_property(properties, "headline"),
            area_desc: string_property(properties, "areaDesc"),
            effective: string_property(properties, "effective"),
            expires: string_property(properties, "expires"),
        })
    }
}

fn polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| line_string(ring));
    let exterior = rings.next()??;
    let interiors = rings.collect::<Option<Vec<_>>>()?;
    Some(Polygon::new(exterior, interiors))
}

fn line_string(ring: &[Vec<f64>]) -> Option<LineString<f64>> {
    ring.iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Some(Coord { x: *x, y: *y }),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(LineString::new)
}

fn feature_id(feature: &geojson::Feature) -> Option<String> {
    match feature.id.as_ref()? {
        geojson::feature::Id::String(id) => Some(id.clone()),
        geojson::feature::Id::Number(id) => Some(id.to_string()),
    }
}

/// Reads a non-empty string property. Empty strings count as missing.
fn string_property(properties: Option<&JsonObject>, key: &str) -> Option<String> {
    match properties?.get(key)? {
        JsonValue::String(value) if !value.is_empty() => Some(value.clone()),
        _ => None,
    }
}

fn number_property(properties: Option<&JsonObject>, key: &str) -> Option<f64> {
    properties?.get(key)?.as_f64()
}
