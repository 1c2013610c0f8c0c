// SPDX-License-Identifier: GPL-3.0-only

//! Per-subject tracking state

use crate::backends::display::SessionHandle;
use crate::backends::world::RegionId;
use crate::constants::thresholds::DIRECTION_THRESHOLD;

/// Vertical trend between two displayed depths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Going deeper
    Descending,
    /// Going shallower
    Rising,
    /// Within the direction threshold, or no previous depth
    #[default]
    Steady,
}

impl Direction {
    /// Trend from the previously displayed depth to the current one
    pub fn between(previous: Option<f64>, current: f64) -> Self {
        match previous {
            Some(prev) if current > prev + DIRECTION_THRESHOLD => Direction::Descending,
            Some(prev) if current < prev - DIRECTION_THRESHOLD => Direction::Rising,
            _ => Direction::Steady,
        }
    }

    /// +1 descending, -1 rising, 0 steady
    pub fn as_i8(&self) -> i8 {
        match self {
            Direction::Descending => 1,
            Direction::Rising => -1,
            Direction::Steady => 0,
        }
    }
}

/// Coarse state machine position of a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectPhase {
    Dry,
    SubmergedNoDisplay,
    SubmergedDisplaying,
}

/// Everything the engine remembers about one subject
///
/// `entry_reference` is set exactly while `was_submerged` is `Some(true)`.
/// `session` is only ever set after the display confirmed the show.
#[derive(Debug, Clone, Default)]
pub struct SubjectState {
    /// Submersion flag seen on the previous tick; `None` before the first
    pub was_submerged: Option<bool>,
    /// Height at which the subject entered the water
    pub entry_reference: Option<f64>,
    /// Local depth last sent to the display
    pub last_displayed: Option<f64>,
    /// Live display session
    pub session: Option<SessionHandle>,
    /// Region the subject was last listed in
    pub region: Option<RegionId>,
}

impl SubjectState {
    pub fn is_submerged(&self) -> bool {
        self.was_submerged.unwrap_or(false)
    }

    pub fn phase(&self) -> SubjectPhase {
        match (self.is_submerged(), self.session.is_some()) {
            (false, _) => SubjectPhase::Dry,
            (true, false) => SubjectPhase::SubmergedNoDisplay,
            (true, true) => SubjectPhase::SubmergedDisplaying,
        }
    }

    /// Start of a dive
    pub fn enter_water(&mut self, vertical: f64) {
        self.entry_reference = Some(vertical);
    }

    /// End of a dive; the caller hides any session first
    pub fn surface(&mut self) {
        self.entry_reference = None;
        self.last_displayed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_thresholds() {
        assert_eq!(Direction::between(None, 3.0), Direction::Steady);
        assert_eq!(Direction::between(Some(0.6), 1.1), Direction::Descending);
        assert_eq!(Direction::between(Some(1.1), 0.6), Direction::Rising);
        assert_eq!(Direction::between(Some(1.0), 1.05), Direction::Steady);
        assert_eq!(Direction::Descending.as_i8(), 1);
        assert_eq!(Direction::Rising.as_i8(), -1);
    }

    #[test]
    fn test_phase() {
        let mut state = SubjectState::default();
        assert_eq!(state.phase(), SubjectPhase::Dry);

        state.was_submerged = Some(true);
        state.enter_water(100.0);
        assert_eq!(state.phase(), SubjectPhase::SubmergedNoDisplay);

        state.surface();
        assert!(state.entry_reference.is_none());
        assert!(state.last_displayed.is_none());
    }
}
