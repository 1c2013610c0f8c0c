// SPDX-License-Identifier: GPL-3.0-only

//! Display payload and its rendering into named HUD fields

use crate::config::SubjectConfig;
use crate::constants::gauge::{SLOT_COUNT, TICK_OFFSETS, UNIT_SUFFIX};
use crate::constants::ui::{DESCENDING_GLYPH, LOCAL_DEPTH_CAPTION, RISING_GLYPH};
use crate::gauge::{GaugeFrame, map_to_gauge, round_half_up};
use crate::tracking::Direction;

/// One "set named field to value" instruction for the HUD
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub field: String,
    pub value: String,
}

impl FieldUpdate {
    fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// "Units below sea level: 5m" line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceLine {
    pub caption: String,
    pub value: String,
}

impl ReferenceLine {
    /// Build the line for a reference-level depth (positive = below)
    pub fn new(reference_depth: f64) -> Self {
        let side = if reference_depth > 0.0 {
            "below"
        } else {
            "above"
        };
        Self {
            caption: format!("Units {} sea level:", side),
            value: format!(
                "{}{}",
                round_half_up(reference_depth.abs()) as i64,
                UNIT_SUFFIX
            ),
        }
    }
}

/// Everything the HUD shows for one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFrame {
    pub gauge: GaugeFrame,
    /// Absent when the subject hides the reference level or none is configured
    pub reference: Option<ReferenceLine>,
    pub direction: Direction,
}

impl DisplayFrame {
    /// Compose a frame from tracked values and the subject's preferences
    pub fn compose(
        local_depth: f64,
        reference_depth: Option<f64>,
        direction: Direction,
        config: &SubjectConfig,
    ) -> Self {
        let reference = reference_depth
            .filter(|_| config.show_reference_level)
            .map(ReferenceLine::new);

        Self {
            gauge: map_to_gauge(local_depth, config.decimal_precision),
            reference,
            direction,
        }
    }

    /// Render to field updates: reference line, caption and direction,
    /// tick labels, then every marker slot with only the active one filled
    pub fn field_updates(&self) -> Vec<FieldUpdate> {
        let mut updates = Vec::with_capacity(SLOT_COUNT + 12);

        match &self.reference {
            Some(line) => {
                updates.push(FieldUpdate::new("#SeaLevelText.Text", line.caption.clone()));
                updates.push(FieldUpdate::new("#SeaLevelValue.Text", line.value.clone()));
            }
            None => {
                updates.push(FieldUpdate::new("#SeaLevelText.Text", ""));
                updates.push(FieldUpdate::new("#SeaLevelValue.Text", ""));
            }
        }

        updates.push(FieldUpdate::new("#LocalDepthLabel.Text", LOCAL_DEPTH_CAPTION));
        updates.push(FieldUpdate::new("#DirectionIcon.Text", direction_glyph(self.direction)));

        // Tick fields are named after their slot position, not their label
        for (offset, label) in TICK_OFFSETS.iter().zip(self.gauge.tick_labels.iter()) {
            updates.push(FieldUpdate::new(format!("#Tick{}m.Text", offset), label.clone()));
        }

        for slot in 0..SLOT_COUNT {
            if slot == self.gauge.slot_index {
                updates.push(FieldUpdate::new(
                    format!("#Marker{}.Text", slot),
                    self.gauge.label_text.clone(),
                ));
                updates.push(FieldUpdate::new(
                    format!("#Marker{}.Style.TextColor", slot),
                    self.gauge.color.hex(),
                ));
            } else {
                updates.push(FieldUpdate::new(format!("#Marker{}.Text", slot), ""));
            }
        }

        updates
    }
}

fn direction_glyph(direction: Direction) -> &'static str {
    match direction {
        Direction::Descending => DESCENDING_GLYPH,
        Direction::Rising => RISING_GLYPH,
        Direction::Steady => "",
    }
}
