//! Map session configuration.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::HazardMapError;
use crate::layer::tiles::OSM_MAX_ZOOM;
use crate::map::MapView;
use crate::popup::{DisplayZone, TimeFormatter, DEFAULT_TIME_FORMAT};
use crate::style::SizePolicy;

/// USGS summary feed with all earthquakes of the past day.
pub const USGS_ALL_DAY_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson";
/// NWS active alerts restricted to land zones.
pub const NWS_ACTIVE_LAND_ALERTS_URL: &str = "https://api.weather.gov/alerts/active?region_type=land";
/// Iowa Environmental Mesonet NEXRAD base reflectivity WMS endpoint.
pub const NEXRAD_WMS_URL: &str = "https://mesonet.agron.iastate.edu/cgi-bin/wms/nexrad/n0r.cgi";
/// NEXRAD composite layer name.
pub const NEXRAD_LAYER: &str = "nexrad-n0r-900913";

const DEFAULT_USER_AGENT: &str = concat!("hazardmap/", env!("CARGO_PKG_VERSION"));

/// One feed shown as a toggleable overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed URL.
    pub url: String,
    /// Status shown after a successful load. `{count}` is replaced with the
    /// number of rendered features.
    pub loaded_template: String,
    /// Status shown when loading fails.
    pub failed_message: String,
    /// Credit line added to the map.
    pub attribution: String,
    /// Initial state of the toggle control.
    #[serde(default = "default_checked")]
    pub initially_checked: bool,
}

/// Radar overlay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarConfig {
    /// WMS endpoint.
    pub url: String,
    /// WMS layer names.
    pub layers: String,
    /// Image format.
    #[serde(default = "default_format")]
    pub format: String,
    /// Request transparent images.
    #[serde(default = "default_checked")]
    pub transparent: bool,
    /// Blending opacity.
    #[serde(default = "default_radar_opacity")]
    pub opacity: f64,
    /// Initial state of the toggle control.
    #[serde(default = "default_checked")]
    pub initially_checked: bool,
}

fn default_checked() -> bool {
    true
}

fn default_format() -> String {
    "image/png".to_string()
}

fn default_radar_opacity() -> f64 {
    0.6
}

/// Configuration of one map session.
///
/// Fields missing from a config file take the values of [`MapConfig::combined`].
/// A feed or the radar can be disabled by setting it to `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Page title.
    pub title: String,
    /// Initial viewport.
    pub view: MapView,
    /// Earthquake marker radius policy.
    pub size_policy: SizePolicy,
    /// Earthquake feed.
    pub earthquakes: Option<FeedConfig>,
    /// Weather alert feed.
    pub weather: Option<FeedConfig>,
    /// Radar overlay.
    pub radar: Option<RadarConfig>,
    /// `User-Agent` header sent with feed requests.
    pub user_agent: String,
    /// Request timeout. No timeout when absent.
    pub request_timeout_secs: Option<u64>,
    /// strftime format of popup timestamps.
    pub time_format: String,
    /// Zone of popup timestamps.
    pub time_zone: DisplayZone,
    /// Attach overlays at startup only if their control is checked.
    ///
    /// Off by default: overlays are attached regardless of the controls, and
    /// every mismatch is logged.
    pub honor_initial_toggles: bool,
    /// Default log filter when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::combined()
    }
}

impl MapConfig {
    /// Map of the contiguous US with weather alerts, earthquakes and radar.
    pub fn combined() -> Self {
        Self {
            title: "Weather alerts and earthquakes".to_string(),
            view: MapView::new(38.0, -95.0, 4),
            size_policy: SizePolicy::Linear,
            earthquakes: Some(FeedConfig {
                url: USGS_ALL_DAY_URL.to_string(),
                loaded_template: "{count} earthquakes loaded".to_string(),
                failed_message: "Failed to load earthquake data".to_string(),
                attribution: "Earthquake data from USGS".to_string(),
                initially_checked: true,
            }),
            weather: Some(FeedConfig {
                url: NWS_ACTIVE_LAND_ALERTS_URL.to_string(),
                loaded_template: "{count} weather alerts loaded".to_string(),
                failed_message: "Failed to load weather alerts".to_string(),
                attribution: "Weather data from NWS".to_string(),
                initially_checked: true,
            }),
            radar: Some(RadarConfig {
                url: NEXRAD_WMS_URL.to_string(),
                layers: NEXRAD_LAYER.to_string(),
                format: default_format(),
                transparent: true,
                opacity: default_radar_opacity(),
                initially_checked: true,
            }),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: None,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            time_zone: DisplayZone::Local,
            honor_initial_toggles: false,
            log_level: "info".to_string(),
        }
    }

    /// World map with earthquakes of the past day only.
    pub fn earthquake_only() -> Self {
        let combined = Self::combined();
        Self {
            title: "Earthquakes of the past 24 hours".to_string(),
            view: MapView::new(20.0, 0.0, 2),
            size_policy: SizePolicy::Stepped,
            earthquakes: Some(FeedConfig {
                url: USGS_ALL_DAY_URL.to_string(),
                loaded_template: "Displaying {count} earthquakes from the past 24 hours worldwide"
                    .to_string(),
                failed_message:
                    "Failed to load earthquake data. Please check your internet connection."
                        .to_string(),
                attribution: "Earthquake data from USGS".to_string(),
                initially_checked: true,
            }),
            weather: None,
            radar: None,
            ..combined
        }
    }

    /// Parses a JSON config.
    ///
    /// The JSON is laid over [`MapConfig::combined`], nested objects included,
    /// so a file only needs the values it changes. `null` replaces a value, which
    /// removes a feed or the radar.
    pub fn from_json_str(json: &str) -> Result<Self, HazardMapError> {
        let overrides: JsonValue = serde_json::from_str(json)?;
        let mut merged = serde_json::to_value(Self::combined())?;
        merge_json(&mut merged, overrides);

        let config: MapConfig = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, HazardMapError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serializes the config as pretty JSON.
    pub fn to_json_string(&self) -> Result<String, HazardMapError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Request timeout, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Popup time formatter described by this config.
    pub fn time_formatter(&self) -> Result<TimeFormatter, HazardMapError> {
        TimeFormatter::new(self.time_format.clone(), self.time_zone)
    }

    /// Checks values that serde cannot check.
    pub fn validate(&self) -> Result<(), HazardMapError> {
        if self.view.zoom > OSM_MAX_ZOOM {
            return Err(HazardMapError::InvalidValue {
                field: "view.zoom",
                reason: format!("must be at most {OSM_MAX_ZOOM}"),
            });
        }
        if !(-90.0..=90.0).contains(&self.view.lat) || !(-180.0..=180.0).contains(&self.view.lon) {
            return Err(HazardMapError::InvalidValue {
                field: "view",
                reason: "center is not a valid latitude/longitude".to_string(),
            });
        }

        for feed in [&self.earthquakes, &self.weather].into_iter().flatten() {
            if feed.url.is_empty() {
                return Err(HazardMapError::InvalidValue {
                    field: "url",
                    reason: "feed url must not be empty".to_string(),
                });
            }
            render_count(&feed.loaded_template, 0)?;
        }

        if let Some(radar) = &self.radar {
            if !(0.0..=1.0).contains(&radar.opacity) {
                return Err(HazardMapError::InvalidValue {
                    field: "radar.opacity",
                    reason: format!("{} is not within [0, 1]", radar.opacity),
                });
            }
        }

        self.time_formatter()?;
        Ok(())
    }
}

fn merge_json(base: &mut JsonValue, overrides: JsonValue) {
    match (base, overrides) {
        (JsonValue::Object(base), JsonValue::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overrides) => *base = overrides,
    }
}

/// Fills the `{count}` field of a status template.
pub fn render_count(template: &str, count: usize) -> Result<String, HazardMapError> {
    let vars = HashMap::from([("count".to_string(), count)]);
    Ok(strfmt::strfmt(template, &vars)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        MapConfig::combined().validate().expect("combined preset");
        MapConfig::earthquake_only()
            .validate()
            .expect("earthquake preset");
    }

    #[test]
    fn earthquake_preset_uses_stepped_sizes() {
        let config = MapConfig::earthquake_only();
        assert_eq!(config.size_policy, SizePolicy::Stepped);
        assert!(config.weather.is_none());
        assert!(config.radar.is_none());
        assert_eq!(config.view, MapView::new(20.0, 0.0, 2));
    }

    #[test]
    fn missing_fields_fall_back_to_combined() {
        let config = MapConfig::from_json_str(
            r#"{"size_policy": "stepped", "radar": null, "view": {"lat": 45.0, "lon": 10.0, "zoom": 5}}"#,
        )
        .expect("valid config");

        assert_eq!(config.size_policy, SizePolicy::Stepped);
        assert!(config.radar.is_none());
        assert_eq!(config.weather, MapConfig::combined().weather);
        assert_eq!(config.view.zoom, 5);
    }

    #[test]
    fn nested_fields_fall_back_to_combined() {
        let config = MapConfig::from_json_str(
            r#"{
                "earthquakes": {"url": "https://example.org/all_hour.geojson"},
                "view": {"zoom": 6},
                "radar": {"opacity": 0.4}
            }"#,
        )
        .expect("valid config");
        let combined = MapConfig::combined();

        let earthquakes = config.earthquakes.expect("earthquake feed");
        let expected = combined.earthquakes.expect("earthquake feed");
        assert_eq!(earthquakes.url, "https://example.org/all_hour.geojson");
        assert_eq!(earthquakes.loaded_template, expected.loaded_template);
        assert_eq!(earthquakes.failed_message, expected.failed_message);
        assert_eq!(earthquakes.attribution, expected.attribution);

        assert_eq!(config.view, MapView::new(38.0, -95.0, 6));
        assert_eq!(config.radar.map(|radar| radar.opacity), Some(0.4));
    }

    #[test]
    fn nested_values_are_still_checked() {
        assert!(MapConfig::from_json_str(r#"{"view": {"lat": "north"}}"#).is_err());
        assert!(MapConfig::from_json_str(r#"{"weather": {"url": ""}}"#).is_err());
        assert!(MapConfig::from_json_str("[]").is_err());
    }

    #[test]
    fn json_round_trip() {
        let config = MapConfig::earthquake_only();
        let json = config.to_json_string().expect("serializable");
        assert_eq!(MapConfig::from_json_str(&json).expect("valid"), config);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(MapConfig::from_json_str(r#"{"view": {"lat": 0.0, "lon": 0.0, "zoom": 25}}"#).is_err());
        assert!(MapConfig::from_json_str(r#"{"time_format": "%Q"}"#).is_err());

        let mut config = MapConfig::combined();
        if let Some(radar) = config.radar.as_mut() {
            radar.opacity = 1.5;
        }
        assert!(config.validate().is_err());

        let mut config = MapConfig::combined();
        if let Some(feed) = config.earthquakes.as_mut() {
            feed.loaded_template = "{count".to_string();
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn renders_count_template() {
        assert_eq!(
            render_count("{count} earthquakes loaded", 2).expect("valid template"),
            "2 earthquakes loaded"
        );
    }
}
