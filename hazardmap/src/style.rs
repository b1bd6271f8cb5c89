//! Visual style rules for earthquake markers and weather alert regions.
//!
//! All functions here are pure. A [`StyleSpec`] is recomputed for every feature
//! on every build and is never cached.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// RGB color used for strokes and fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
}

impl Color {
    /// `#8b0000`, the highest alarm level.
    pub const DARK_RED: Color = Color::rgb(0x8b, 0x00, 0x00);
    /// `#ff0000`.
    pub const RED: Color = Color::rgb(0xff, 0x00, 0x00);
    /// `#ff6600`.
    pub const ORANGE_RED: Color = Color::rgb(0xff, 0x66, 0x00);
    /// `#ffa500`.
    pub const ORANGE: Color = Color::rgb(0xff, 0xa5, 0x00);
    /// `#ffff00`.
    pub const YELLOW: Color = Color::rgb(0xff, 0xff, 0x00);
    /// `#00ff00`, the lowest alarm level.
    pub const GREEN: Color = Color::rgb(0x00, 0xff, 0x00);
    /// `#000000`.
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    /// Creates a color from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a `#rrggbb` string. The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Returns the color as a lowercase `#rrggbb` string.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or_else(|| format!("invalid color: {s}"))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Visual attributes of one rendered annotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StyleSpec {
    /// Fill color of the marker or region.
    pub fill_color: Color,
    /// Outline color.
    pub stroke_color: Color,
    /// Outline width in pixels.
    pub weight: f64,
    /// Outline opacity.
    pub opacity: f64,
    /// Fill opacity.
    pub fill_opacity: f64,
    /// Marker radius in pixels. Only point markers have one.
    pub radius: Option<f64>,
}

/// How the radius of an earthquake marker is derived from its magnitude.
///
/// The combined map and the earthquake-only map historically disagree on this,
/// so both are kept and selected through configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizePolicy {
    /// `magnitude × 3`, clamped to `[6, 20]`.
    #[default]
    Linear,
    /// Discrete steps: 20, 16, 12, 10, 8 or 6.
    Stepped,
}

/// Smallest earthquake marker radius.
pub const MIN_QUAKE_RADIUS: f64 = 6.0;
/// Largest earthquake marker radius.
pub const MAX_QUAKE_RADIUS: f64 = 20.0;

const LINEAR_RADIUS_FACTOR: f64 = 3.0;

// Both tables are sorted by descending lower bound. The first bound the value
// reaches wins, so the order matters.
const QUAKE_COLOR_THRESHOLDS: [(f64, Color); 5] = [
    (7.0, Color::DARK_RED),
    (6.0, Color::RED),
    (5.0, Color::ORANGE_RED),
    (4.0, Color::ORANGE),
    (3.0, Color::YELLOW),
];

const QUAKE_RADIUS_STEPS: [(f64, f64); 5] = [
    (7.0, 20.0),
    (6.0, 16.0),
    (5.0, 12.0),
    (4.0, 10.0),
    (3.0, 8.0),
];

fn classify<T: Copy>(table: &[(f64, T)], value: f64, fallback: T) -> T {
    table
        .iter()
        .find(|(lower_bound, _)| value >= *lower_bound)
        .map(|(_, class)| *class)
        .unwrap_or(fallback)
}

/// Fill color of an earthquake marker for the given magnitude.
///
/// NaN falls through to green.
pub fn quake_color(magnitude: f64) -> Color {
    classify(&QUAKE_COLOR_THRESHOLDS, magnitude, Color::GREEN)
}

/// Radius of an earthquake marker for the given magnitude.
///
/// The result is always within `[MIN_QUAKE_RADIUS, MAX_QUAKE_RADIUS]`. NaN gives
/// the minimum radius under both policies.
pub fn quake_radius(magnitude: f64, policy: SizePolicy) -> f64 {
    match policy {
        SizePolicy::Linear => {
            let radius = magnitude * LINEAR_RADIUS_FACTOR;
            if radius.is_nan() {
                MIN_QUAKE_RADIUS
            } else {
                radius.clamp(MIN_QUAKE_RADIUS, MAX_QUAKE_RADIUS)
            }
        }
        SizePolicy::Stepped => classify(&QUAKE_RADIUS_STEPS, magnitude, MIN_QUAKE_RADIUS),
    }
}

/// Color of a weather alert region for the given NWS severity.
///
/// Only exact matches count. `"Moderate"`, unknown values and a missing severity
/// are all orange.
pub fn alert_color(severity: Option<&str>) -> Color {
    match severity {
        Some("Extreme") => Color::DARK_RED,
        Some("Severe") => Color::RED,
        Some("Minor") => Color::YELLOW,
        _ => Color::ORANGE,
    }
}

/// Full marker style for an earthquake. A missing magnitude is styled as NaN.
pub fn quake_style(magnitude: Option<f64>, policy: SizePolicy) -> StyleSpec {
    let magnitude = magnitude.unwrap_or(f64::NAN);
    StyleSpec {
        fill_color: quake_color(magnitude),
        stroke_color: Color::BLACK,
        weight: 1.0,
        opacity: 1.0,
        fill_opacity: 0.8,
        radius: Some(quake_radius(magnitude, policy)),
    }
}

/// Full region style for a weather alert.
pub fn alert_style(severity: Option<&str>) -> StyleSpec {
    let color = alert_color(severity);
    StyleSpec {
        fill_color: color,
        stroke_color: color,
        weight: 2.0,
        opacity: 1.0,
        fill_opacity: 0.3,
        radius: None,
    }
}
