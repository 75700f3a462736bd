//! Color ramp for the colored elevation layer.
//!
//! The tile server accepts a `colormap` query parameter holding a plain text
//! table: one row per elevation threshold, five space separated fields
//! (elevation in meters, then RGBA). Tiles are colored with the row whose
//! threshold is the highest one not exceeding the pixel's elevation.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Elevation threshold in meters and the RGBA color applied at and above it.
pub type RampEntry = (i32, [u8; 4]);

/// Hypsometric ramp used by the "Elevation with coloramp" layer. Rows are
/// ordered from the highest threshold down, as the server expects.
pub const ELEVATION_RAMP: [RampEntry; 15] = [
    (5000, [255, 255, 255, 255]),
    (4000, [206, 206, 206, 255]),
    (2800, [161, 161, 161, 255]),
    (1800, [130, 30, 30, 255]),
    (1200, [163, 68, 0, 255]),
    (500, [232, 214, 125, 255]),
    (50, [16, 123, 48, 255]),
    (0, [0, 97, 71, 255]),
    (-10, [176, 226, 255, 255]),
    (-50, [135, 206, 250, 255]),
    (-150, [24, 140, 205, 255]),
    (-2500, [19, 108, 160, 255]),
    (-4000, [0, 50, 102, 255]),
    (-6000, [0, 30, 100, 255]),
    (-8000, [0, 0, 80, 255]),
];

// `-` stays unescaped so negative thresholds remain readable in the URL.
const COLORMAP_ESCAPE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-');

/// Renders the ramp as the text table the tile server parses.
pub fn ramp_text() -> String {
    ELEVATION_RAMP
        .iter()
        .map(|(threshold, [r, g, b, a])| format!("{threshold} {r} {g} {b} {a}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the ramp as a percent-encoded query parameter value.
pub fn ramp_query_value() -> String {
    utf8_percent_encode(&ramp_text(), COLORMAP_ESCAPE_SET).to_string()
}
