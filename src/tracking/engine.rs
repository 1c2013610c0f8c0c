// SPDX-License-Identifier: GPL-3.0-only

//! Depth tracking engine
//!
//! Owns the per-subject state map and decides, on every tick, whether a
//! subject's gauge appears, updates or disappears.
//!
//! Per subject and tick:
//! 1. Entering the water records the entry height, nothing is shown yet
//! 2. Surfacing hides the gauge and forgets the entry height and trend
//! 3. While submerged the local depth (entry - current) is computed, snapped
//!    to zero inside the surface dead zone, and the gauge is shown once its
//!    magnitude reaches the display threshold
//! 4. A reference-level depth that rounds to zero hides the gauge
//!    (the subject is at the surface even if the entry point disagrees)

use super::state::{Direction, SubjectState};
use crate::backends::display::{DisplayFrame, DisplaySurface, SessionHandle};
use crate::backends::world::{RegionId, SubjectId, WorldQuery};
use crate::config::ConfigStore;
use crate::constants::thresholds::{DISPLAY_THRESHOLD, SURFACE_COMPENSATION, SURFACE_DEAD_ZONE};
use crate::constants::timing::{TICK_INTERVAL, UPDATE_LOG_INTERVAL};
use crate::constants::world::{MAX_TEST_DEPTH, SEA_LEVEL};
use crate::errors::{DisplayError, DisplayResult, WorldResult};
use crate::gauge::round_half_up;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Engine tunables
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Scheduler period
    pub tick_interval: Duration,
    /// Absolute height of the reference level; `None` disables the
    /// reference-level depth and the surface recalibration guard
    pub reference_level: Option<f64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_interval: TICK_INTERVAL,
            reference_level: Some(SEA_LEVEL),
        }
    }
}

/// Submersion flag and height read from the world for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub submerged: bool,
    pub vertical: f64,
}

/// What happened to a subject during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No transition
    Idle,
    /// Gauge disabled by the subject's settings
    Disabled,
    /// Entry height recorded
    EnteredWater,
    /// Left the water
    Surfaced,
    /// Gauge created
    Shown,
    /// Display refused to create the gauge; retried next tick
    ShowFailed,
    /// Gauge updated
    Updated(Direction),
    /// Gauge removed because the depth fell below the threshold
    Hidden,
    /// Gauge removed because the reference-level depth rounds to zero
    Recalibrated,
}

/// Counters for one tracking cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub regions_scanned: usize,
    pub regions_failed: usize,
    pub subjects_processed: usize,
    pub subjects_failed: usize,
    pub shown: usize,
    pub updated: usize,
    pub hidden: usize,
}

impl CycleReport {
    fn record(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Shown => self.shown += 1,
            TickOutcome::Updated(_) => self.updated += 1,
            TickOutcome::Hidden | TickOutcome::Recalibrated => self.hidden += 1,
            _ => {}
        }
    }
}

/// Result of a forced test measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestMeasurement {
    /// Depth actually shown after clamping
    pub depth: f64,
    /// A new session was created rather than an existing one updated
    pub created: bool,
}

/// Local depth relative to the entry point, positive when deeper,
/// snapped to zero inside the surface dead zone
pub fn local_depth(entry_reference: f64, vertical: f64) -> f64 {
    let depth = entry_reference - vertical;
    if depth.abs() < SURFACE_DEAD_ZONE {
        0.0
    } else {
        depth
    }
}

/// Depth relative to the reference level
///
/// The surface is estimated as the entry height rounded up plus one unit,
/// which yields whole numbers in the default world's coordinates.
pub fn reference_depth(reference_level: f64, entry_reference: f64, local_depth: f64) -> f64 {
    let rounded_surface = entry_reference.ceil() + SURFACE_COMPENSATION;
    (reference_level - rounded_surface) + local_depth
}

/// A reference-level depth that rounds to zero means the subject is at the surface
pub fn needs_recalibration(reference_depth: f64) -> bool {
    round_half_up(reference_depth) == 0.0
}

/// Per-subject depth tracking state machine
pub struct TrackingEngine {
    states: HashMap<SubjectId, SubjectState>,
    known_regions: BTreeSet<RegionId>,
    display: Box<dyn DisplaySurface>,
    configs: Arc<ConfigStore>,
    settings: EngineSettings,
    update_count: u64,
}

impl TrackingEngine {
    pub fn new(
        display: Box<dyn DisplaySurface>,
        configs: Arc<ConfigStore>,
        settings: EngineSettings,
    ) -> Self {
        info!(
            reference_level = ?settings.reference_level,
            tick_ms = settings.tick_interval.as_millis() as u64,
            "Creating depth tracking engine"
        );
        Self {
            states: HashMap::new(),
            known_regions: BTreeSet::new(),
            display,
            configs,
            settings,
            update_count: 0,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn configs(&self) -> &Arc<ConfigStore> {
        &self.configs
    }

    /// Tracking state of a subject, if it was ever observed
    pub fn state(&self, id: SubjectId) -> Option<&SubjectState> {
        self.states.get(&id)
    }

    pub fn subject_count(&self) -> usize {
        self.states.len()
    }

    /// Subjects that currently have a live gauge
    pub fn displaying_subjects(&self) -> Vec<SubjectId> {
        self.states
            .iter()
            .filter(|(_, state)| state.session.is_some())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Remember a region so it is scanned on every following cycle
    pub fn add_known_region(&mut self, region: RegionId) {
        if self.known_regions.insert(region.clone()) {
            info!(region = %region, "Tracking region for underwater detection");
        }
    }

    pub fn known_regions(&self) -> impl Iterator<Item = &RegionId> {
        self.known_regions.iter()
    }

    /// Run one tracking cycle over every reachable subject
    ///
    /// Regions come from the previously known set, the world's region list
    /// and the regions of subjects holding a live gauge. A region or subject
    /// whose query fails is skipped for this cycle only.
    pub fn tick(&mut self, world: &mut dyn WorldQuery) -> CycleReport {
        let mut report = CycleReport::default();
        world.begin_cycle();

        match world.list_regions() {
            Ok(regions) => {
                for region in regions {
                    self.add_known_region(region);
                }
            }
            Err(e) => debug!(error = %e, "Region list unavailable, using known regions"),
        }

        let mut regions: BTreeSet<RegionId> = self.known_regions.clone();
        regions.extend(
            self.states
                .values()
                .filter(|state| state.session.is_some())
                .filter_map(|state| state.region.clone()),
        );

        let mut seen: HashSet<SubjectId> = HashSet::new();
        for region in &regions {
            report.regions_scanned += 1;
            let subjects = match world.list_subjects(region) {
                Ok(subjects) => subjects,
                Err(e) => {
                    report.regions_failed += 1;
                    warn!(region = %region, error = %e, "Error listing subjects in region");
                    continue;
                }
            };

            for id in subjects {
                if !seen.insert(id) {
                    continue;
                }
                match read_observation(world, id) {
                    Ok(observation) => {
                        let outcome = self.process(id, observation);
                        if let Some(state) = self.states.get_mut(&id) {
                            state.region = Some(region.clone());
                        }
                        report.subjects_processed += 1;
                        report.record(outcome);
                    }
                    Err(e) => {
                        report.subjects_failed += 1;
                        warn!(
                            subject = %id,
                            region = %region,
                            error = %e,
                            "Error updating subject depth"
                        );
                    }
                }
            }
        }

        trace!(?report, "Tracking cycle finished");
        report
    }

    /// Apply one observation to a subject's state machine
    pub fn process(&mut self, id: SubjectId, observation: Observation) -> TickOutcome {
        let config = self.configs.get_or_default(id);
        let state = self.states.entry(id).or_default();

        if !config.effective_enabled() {
            if let Some(session) = state.session.take() {
                hide_session(self.display.as_mut(), id, session);
            }
            return TickOutcome::Disabled;
        }

        let was_submerged = state.is_submerged();
        let outcome = match (observation.submerged, was_submerged) {
            (true, false) => {
                state.enter_water(observation.vertical);
                debug!(
                    subject = %id,
                    y = observation.vertical,
                    "Subject entered water - tracking depth"
                );
                TickOutcome::EnteredWater
            }
            (false, true) => {
                if let Some(session) = state.session.take() {
                    hide_session(self.display.as_mut(), id, session);
                }
                state.surface();
                debug!(subject = %id, "Subject surfaced - hiding depth gauge");
                TickOutcome::Surfaced
            }
            (true, true) => {
                let settings = &self.settings;
                let update_count = &mut self.update_count;
                track_submerged(
                    self.display.as_mut(),
                    settings,
                    update_count,
                    id,
                    state,
                    observation.vertical,
                    &config,
                )
            }
            (false, false) => TickOutcome::Idle,
        };

        state.was_submerged = Some(observation.submerged);
        outcome
    }

    /// Show a fixed depth on a subject's gauge, bypassing the state machine
    ///
    /// The depth is clamped to 0..=115. An existing gauge is updated, otherwise
    /// a new one is shown and recorded.
    pub fn force_measurement(
        &mut self,
        id: SubjectId,
        depth: f64,
    ) -> DisplayResult<TestMeasurement> {
        let depth = if depth.is_nan() {
            0.0
        } else {
            depth.clamp(0.0, MAX_TEST_DEPTH)
        };
        let config = self.configs.get_or_default(id);
        let frame = DisplayFrame::compose(depth, Some(0.0), Direction::Steady, &config);
        let state = self.states.entry(id).or_default();

        let created = match state.session.clone() {
            Some(session) => {
                self.display.update(&session, &frame)?;
                false
            }
            None => {
                let session = self.display.show(id, &frame)?;
                state.session = Some(session);
                true
            }
        };

        info!(subject = %id, depth, created, "Forced test measurement");
        Ok(TestMeasurement { depth, created })
    }

    /// Forget a subject entirely (disconnect)
    ///
    /// All fields go at once, so a reconnect with the same id starts from a
    /// clean first observation. The gauge is not hidden: its client is gone.
    pub fn remove_subject(&mut self, id: SubjectId) -> bool {
        let removed = self.states.remove(&id).is_some();
        if removed {
            info!(subject = %id, "Cleaned up depth state for disconnected subject");
        }
        removed
    }

    /// Drop every subject and region in one pass
    pub fn clear(&mut self) {
        let subjects = self.states.len();
        self.states.clear();
        self.known_regions.clear();
        info!(subjects, "Cleared all depth tracking state");
    }
}

impl std::fmt::Debug for TrackingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingEngine")
            .field("subjects", &self.states.len())
            .field("known_regions", &self.known_regions)
            .field("settings", &self.settings)
            .finish()
    }
}

fn read_observation(world: &dyn WorldQuery, id: SubjectId) -> WorldResult<Observation> {
    Ok(Observation {
        submerged: world.submersion_flag(id)?,
        vertical: world.vertical_position(id)?,
    })
}

fn hide_session(display: &mut dyn DisplaySurface, id: SubjectId, session: SessionHandle) {
    debug!(subject = %id, %session, "Hiding depth gauge");
    if let Err(e) = display.hide(session) {
        warn!(subject = %id, error = %e, "Error hiding depth gauge");
    }
}

fn track_submerged(
    display: &mut dyn DisplaySurface,
    settings: &EngineSettings,
    update_count: &mut u64,
    id: SubjectId,
    state: &mut SubjectState,
    vertical: f64,
    config: &crate::config::SubjectConfig,
) -> TickOutcome {
    let Some(entry) = state.entry_reference else {
        // Submerged without an entry point: start the dive here
        state.enter_water(vertical);
        return TickOutcome::EnteredWater;
    };

    let depth = local_depth(entry, vertical);
    let should_display = depth.abs() >= DISPLAY_THRESHOLD;

    if !should_display {
        return match state.session.take() {
            Some(session) => {
                hide_session(display, id, session);
                TickOutcome::Hidden
            }
            None => TickOutcome::Idle,
        };
    }

    let reference = settings.reference_level.map(|level| {
        let reference = reference_depth(level, entry, depth);
        trace!(
            subject = %id,
            entry_y = entry,
            current_y = vertical,
            local_depth = depth,
            reference_depth = reference,
            "Reference level depth"
        );
        reference
    });

    if reference.is_some_and(needs_recalibration) {
        if let Some(session) = state.session.take() {
            hide_session(display, id, session);
        }
        debug!(subject = %id, "Reference depth rounds to zero - treating as surface");
        return TickOutcome::Recalibrated;
    }

    let direction = Direction::between(state.last_displayed, depth);
    state.last_displayed = Some(depth);
    let frame = DisplayFrame::compose(depth, reference, direction, config);

    match state.session.clone() {
        None => match display.show(id, &frame) {
            Ok(session) => {
                info!(subject = %id, depth, reference = ?reference, %session, "Depth gauge shown");
                // Recorded only after the display confirmed it
                state.session = Some(session);
                TickOutcome::Shown
            }
            Err(e) => {
                warn!(subject = %id, error = %e, "Failed to show depth gauge, retrying next tick");
                TickOutcome::ShowFailed
            }
        },
        Some(session) => {
            *update_count += 1;
            if *update_count % UPDATE_LOG_INTERVAL == 0 {
                debug!(
                    update = *update_count,
                    depth,
                    reference = ?reference,
                    direction = direction.as_i8(),
                    "Depth gauge update"
                );
            }
            match display.update(&session, &frame) {
                Ok(()) => TickOutcome::Updated(direction),
                Err(DisplayError::UnknownSession(_)) => {
                    // The surface lost the gauge; show it again next tick
                    warn!(
                        subject = %id,
                        %session,
                        "Display no longer knows the session, dropping it"
                    );
                    state.session = None;
                    TickOutcome::Hidden
                }
                Err(e) => {
                    warn!(subject = %id, error = %e, "Failed to update depth gauge");
                    TickOutcome::Updated(direction)
                }
            }
        }
    }
}
