//! Popup markup for rendered features.
//!
//! Every field of the fixed field list is always present in the output. Missing
//! values render as a placeholder, never as an empty string.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use maud::{html, Markup};
use serde::{Deserialize, Serialize};

use crate::error::HazardMapError;
use crate::feature::{AlertFeature, QuakeFeature};

/// Placeholder for a missing value.
pub const NOT_AVAILABLE: &str = "N/A";
/// Placeholder for a missing earthquake location.
pub const UNKNOWN_PLACE: &str = "Unknown";

/// Default timestamp format, close to what a US-English browser shows.
pub const DEFAULT_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Time zone used to display timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayZone {
    /// Zone of the machine running the map.
    #[default]
    Local,
    /// Coordinated universal time.
    Utc,
}

/// Converts feed timestamps to display strings.
#[derive(Debug, Clone)]
pub struct TimeFormatter {
    format: String,
    zone: DisplayZone,
}

impl Default for TimeFormatter {
    fn default() -> Self {
        Self {
            format: DEFAULT_TIME_FORMAT.to_string(),
            zone: DisplayZone::Local,
        }
    }
}

impl TimeFormatter {
    /// Creates a formatter with a strftime-style format string.
    ///
    /// The format is validated here so that formatting itself cannot fail.
    pub fn new(format: impl Into<String>, zone: DisplayZone) -> Result<Self, HazardMapError> {
        let format = format.into();
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(HazardMapError::InvalidValue {
                field: "time_format",
                reason: format!("`{format}` is not a valid strftime format"),
            });
        }

        Ok(Self { format, zone })
    }

    /// Formats an instant.
    pub fn format(&self, time: DateTime<Utc>) -> String {
        match self.zone {
            DisplayZone::Local => time.with_timezone(&Local).format(&self.format).to_string(),
            DisplayZone::Utc => time.format(&self.format).to_string(),
        }
    }

    /// Formats milliseconds since the Unix epoch. Out of range values give `None`.
    pub fn format_epoch_millis(&self, millis: i64) -> Option<String> {
        DateTime::from_timestamp_millis(millis).map(|time| self.format(time))
    }

    /// Formats an RFC 3339 timestamp. Unparsable input is returned as is.
    pub fn format_rfc3339(&self, timestamp: &str) -> String {
        match DateTime::parse_from_rfc3339(timestamp) {
            Ok(time) => self.format(time.with_timezone(&Utc)),
            Err(err) => {
                log::debug!("Cannot parse timestamp {timestamp:?}: {err}");
                timestamp.to_string()
            }
        }
    }
}

/// Builds popup markup for features.
#[derive(Debug, Clone, Default)]
pub struct PopupFormatter {
    time: TimeFormatter,
}

impl PopupFormatter {
    /// Creates a formatter using the given time formatter.
    pub fn new(time: TimeFormatter) -> Self {
        Self { time }
    }

    /// Popup for an earthquake marker.
    pub fn describe_quake(&self, quake: &QuakeFeature) -> Markup {
        let magnitude = quake
            .magnitude
            .filter(|magnitude| !magnitude.is_nan())
            .map(|magnitude| magnitude.to_string());
        let time = quake
            .time_ms
            .and_then(|millis| self.time.format_epoch_millis(millis));
        let depth = quake.position.depth_km.map(|depth| format!("{depth:.1} km"));
        let coordinates = format!("{:.3}, {:.3}", quake.position.lat, quake.position.lon);

        html! {
            div.earthquake-popup {
                h3 { "Earthquake Details" }
                (field("Magnitude", magnitude.as_deref().unwrap_or(NOT_AVAILABLE)))
                (field("Location", quake.place.as_deref().unwrap_or(UNKNOWN_PLACE)))
                (field("Time", time.as_deref().unwrap_or(NOT_AVAILABLE)))
                (field("Depth", depth.as_deref().unwrap_or(NOT_AVAILABLE)))
                (field("Coordinates", &coordinates))
                @if let Some(url) = &quake.url {
                    p { a href=(url) target="_blank" { "More details" } }
                }
            }
        }
    }

    /// Popup for a weather alert region.
    pub fn describe_alert(&self, alert: &AlertFeature) -> Markup {
        let effective = alert
            .effective
            .as_deref()
            .map(|timestamp| self.time.format_rfc3339(timestamp));
        let expires = alert
            .expires
            .as_deref()
            .map(|timestamp| self.time.format_rfc3339(timestamp));

        html! {
            div.weather-popup {
                h3 { "Weather Alert" }
                (field("Event", or_na(&alert.event)))
                (field("Severity", or_na(&alert.severity)))
                (field("Headline", or_na(&alert.headline)))
                (field("Area", or_na(&alert.area_desc)))
                (field("Effective", or_na(&effective)))
                (field("Expires", or_na(&expires)))
            }
        }
    }
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_AVAILABLE)
}

fn field(label: &str, value: &str) -> Markup {
    html! {
        p { strong { (label) ":" } " " (value) }
    }
}
