// SPDX-License-Identifier: GPL-3.0-only

//! Depth to gauge mapping
//!
//! Converts a signed local depth into the discrete gauge state shown on the HUD:
//! which 20 m range is visible, which of the 60 marker slots is active, the
//! marker label, its color, and the six tick labels.
//!
//! Negative depths are above the entry point. Once they reach a full unit the
//! gauge is inverted so the marker keeps moving in the direction of travel.
//!
//! All functions here are pure and total.

use crate::constants::gauge::{
    HIGHLIGHT_INTERVAL, INVERSION_THRESHOLD, MAX_LABEL_DEPTH, MAX_SLOT, RANGE_WIDTH,
    TICK_OFFSETS, UNIT_SUFFIX,
};
use crate::constants::ui::{HIGHLIGHT_COLOR, NEUTRAL_COLOR};

/// Marker color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GaugeColor {
    /// Depth sits on a 5 m interval
    Highlight,
    /// Any other depth
    Neutral,
}

impl GaugeColor {
    /// Hex color sent to the HUD
    pub fn hex(&self) -> &'static str {
        match self {
            GaugeColor::Highlight => HIGHLIGHT_COLOR,
            GaugeColor::Neutral => NEUTRAL_COLOR,
        }
    }
}

impl std::fmt::Display for GaugeColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hex())
    }
}

/// Fully computed gauge state for one measurement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaugeFrame {
    /// Start of the visible 20 m range
    pub base_range: u32,
    /// Gauge drawn upside down (above the entry point)
    pub is_inverted: bool,
    /// Active marker slot, 0..=59
    pub slot_index: usize,
    /// Marker text, e.g. "-12.4m"
    pub label_text: String,
    /// Marker color
    pub color: GaugeColor,
    /// Tick labels from the top of the gauge downwards
    pub tick_labels: [String; 6],
}

/// Map a measurement onto the gauge
///
/// `decimal_precision` selects one decimal place instead of whole units for
/// the label, and also changes how the highlight color is decided.
/// Non-finite measurements are treated as zero.
pub fn map_to_gauge(measurement: f64, decimal_precision: bool) -> GaugeFrame {
    let measurement = if measurement.is_finite() {
        measurement
    } else {
        0.0
    };

    let abs_depth = measurement.abs();
    let is_above_surface = measurement < 0.0;

    let base = (abs_depth / RANGE_WIDTH).floor() * RANGE_WIDTH;
    let is_inverted = is_above_surface && abs_depth >= INVERSION_THRESHOLD;

    let depth_in_range = abs_depth - base;
    let normalized = (depth_in_range / RANGE_WIDTH).min(1.0);

    let slot = round_half_up(normalized * MAX_SLOT as f64).max(0.0) as usize;
    let mut slot_index = slot.min(MAX_SLOT);
    if is_inverted {
        slot_index = MAX_SLOT - slot_index;
    }

    // Saturating float-to-int cast keeps absurd depths total
    let base_range = base as u32;

    GaugeFrame {
        base_range,
        is_inverted,
        slot_index,
        label_text: depth_label(abs_depth, is_above_surface, decimal_precision),
        color: marker_color(abs_depth, decimal_precision),
        tick_labels: tick_labels(base_range, is_inverted),
    }
}

/// Round half away from negative infinity, matching the HUD host's rounding
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Displayed depth in whole tenths
fn displayed_tenths(abs_depth: f64) -> i64 {
    round_half_up(abs_depth.abs().min(MAX_LABEL_DEPTH) * 10.0) as i64
}

/// Displayed depth in whole units
fn displayed_units(abs_depth: f64) -> i64 {
    round_half_up(abs_depth.abs().min(MAX_LABEL_DEPTH)) as i64
}

/// Format an absolute depth with the unit suffix
///
/// Depths beyond [`MAX_LABEL_DEPTH`] are labeled as that depth.
pub fn format_depth(abs_depth: f64, decimal_precision: bool) -> String {
    if decimal_precision {
        let tenths = displayed_tenths(abs_depth);
        format!("{}.{}{}", tenths / 10, tenths % 10, UNIT_SUFFIX)
    } else {
        format!("{}{}", displayed_units(abs_depth), UNIT_SUFFIX)
    }
}

fn depth_label(abs_depth: f64, is_above_surface: bool, decimal_precision: bool) -> String {
    let prefix = if is_above_surface { "+" } else { "-" };
    format!("{}{}", prefix, format_depth(abs_depth, decimal_precision))
}

/// Highlight follows the label text, not the raw depth
fn marker_color(abs_depth: f64, decimal_precision: bool) -> GaugeColor {
    let interval = HIGHLIGHT_INTERVAL as i64;
    let on_interval = if decimal_precision {
        let tenths = displayed_tenths(abs_depth);
        tenths > 0 && tenths % (interval * 10) == 0
    } else {
        let whole = displayed_units(abs_depth);
        whole > 0 && whole % interval == 0
    };

    if on_interval {
        GaugeColor::Highlight
    } else {
        GaugeColor::Neutral
    }
}

fn tick_labels(base_range: u32, is_inverted: bool) -> [String; 6] {
    let mut labels = TICK_OFFSETS.map(|offset| {
        format!("{}{}", base_range.saturating_add(offset), UNIT_SUFFIX)
    });
    if is_inverted {
        labels.reverse();
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_reading() {
        let frame = map_to_gauge(0.0, true);
        assert_eq!(frame.base_range, 0);
        assert!(!frame.is_inverted);
        assert_eq!(frame.slot_index, 0);
        assert_eq!(frame.label_text, "-0.0m");
        assert_eq!(frame.color, GaugeColor::Neutral);
    }

    #[test]
    fn test_mid_range_slot() {
        // 10 m is half of the first range: round(0.5 * 59) = 30
        let frame = map_to_gauge(10.0, true);
        assert_eq!(frame.slot_index, 30);
        assert_eq!(frame.label_text, "-10.0m");
        assert_eq!(frame.color, GaugeColor::Highlight);
    }

    #[test]
    fn test_second_range() {
        let frame = map_to_gauge(23.0, false);
        assert_eq!(frame.base_range, 20);
        // round(3 / 20 * 59) = round(8.85) = 9
        assert_eq!(frame.slot_index, 9);
        assert_eq!(frame.label_text, "-23m");
        assert_eq!(frame.tick_labels[0], "23m");
        assert_eq!(frame.tick_labels[5], "38m");
    }

    #[test]
    fn test_range_boundary_starts_next_range() {
        let frame = map_to_gauge(20.0, true);
        assert_eq!(frame.base_range, 20);
        assert_eq!(frame.slot_index, 0);

        let frame = map_to_gauge(19.99, true);
        assert_eq!(frame.base_range, 0);
        assert_eq!(frame.slot_index, 59);
    }

    #[test]
    fn test_inverted_above_entry() {
        let frame = map_to_gauge(-2.0, true);
        assert!(frame.is_inverted);
        // round(2 / 20 * 59) = 6, inverted to 53
        assert_eq!(frame.slot_index, 53);
        assert_eq!(frame.label_text, "+2.0m");
        assert_eq!(frame.tick_labels[0], "18m");
        assert_eq!(frame.tick_labels[5], "3m");
    }

    #[test]
    fn test_small_negative_not_inverted() {
        let frame = map_to_gauge(-0.6, true);
        assert!(!frame.is_inverted);
        assert_eq!(frame.label_text, "+0.6m");
        assert_eq!(frame.tick_labels[0], "3m");
    }

    #[test]
    fn test_highlight_rules() {
        assert_eq!(map_to_gauge(5.0, true).color, GaugeColor::Highlight);
        assert_eq!(map_to_gauge(4.97, true).color, GaugeColor::Highlight);
        assert_eq!(map_to_gauge(5.04, true).color, GaugeColor::Highlight);
        assert_eq!(map_to_gauge(5.2, true).color, GaugeColor::Neutral);
        assert_eq!(map_to_gauge(0.0, true).color, GaugeColor::Neutral);
        assert_eq!(map_to_gauge(0.02, true).color, GaugeColor::Neutral);

        assert_eq!(map_to_gauge(9.6, false).color, GaugeColor::Highlight);
        assert_eq!(map_to_gauge(0.4, false).color, GaugeColor::Neutral);
        assert_eq!(map_to_gauge(7.0, false).color, GaugeColor::Neutral);
    }

    #[test]
    fn test_highlight_matches_rounded_label() {
        for (depth, label, color) in [
            (4.95, "-5.0m", GaugeColor::Highlight),
            (9.95, "-10.0m", GaugeColor::Highlight),
            (14.95, "-15.0m", GaugeColor::Highlight),
            (5.05, "-5.1m", GaugeColor::Neutral),
            (0.04, "-0.0m", GaugeColor::Neutral),
        ] {
            let frame = map_to_gauge(depth, true);
            assert_eq!(frame.label_text, label, "label for {}", depth);
            assert_eq!(frame.color, color, "color for {}", depth);
        }
    }

    #[test]
    fn test_huge_finite_label_stays_numeric() {
        let frame = map_to_gauge(f64::MAX, true);
        assert_eq!(frame.label_text, "-4294967295.0m");
        assert_eq!(map_to_gauge(-1e300, false).label_text, "+4294967295m");
    }

    #[test]
    fn test_non_finite_is_total() {
        assert_eq!(map_to_gauge(f64::NAN, true), map_to_gauge(0.0, true));
        assert_eq!(map_to_gauge(f64::INFINITY, false), map_to_gauge(0.0, false));
    }

    #[test]
    fn test_huge_depth_stays_in_bounds() {
        let frame = map_to_gauge(1e300, true);
        assert!(frame.slot_index <= MAX_SLOT);
        assert_eq!(frame.base_range, u32::MAX);
    }

    #[test]
    fn test_format_depth_rounds_half_up() {
        assert_eq!(format_depth(0.25, true), "0.3m");
        assert_eq!(format_depth(2.5, false), "3m");
        assert_eq!(format_depth(3.04, true), "3.0m");
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(GaugeColor::Highlight.hex(), "#FFE6B5");
        assert_eq!(GaugeColor::Neutral.to_string(), "#ffffff");
    }
}
