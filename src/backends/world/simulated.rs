// SPDX-License-Identifier: GPL-3.0-only

//! Scripted in-memory world
//!
//! Each subject replays a list of samples, one per cycle, and holds the last
//! sample once the script runs out. Clones share state so a test or the CLI
//! can keep steering the world after it moved to the world thread.

use super::{RegionId, SubjectId, WorldQuery};
use crate::errors::{WorldError, WorldResult};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

/// One observation of a subject
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub submerged: bool,
    pub vertical: f64,
}

impl Sample {
    pub fn dry(vertical: f64) -> Self {
        Self {
            submerged: false,
            vertical,
        }
    }

    pub fn wet(vertical: f64) -> Self {
        Self {
            submerged: true,
            vertical,
        }
    }
}

#[derive(Debug, Default)]
struct ScriptedSubject {
    samples: Vec<Sample>,
    cursor: usize,
}

impl ScriptedSubject {
    fn current(&self) -> Option<Sample> {
        self.samples
            .get(self.cursor.min(self.samples.len().saturating_sub(1)))
            .copied()
    }

    fn finished(&self) -> bool {
        self.cursor + 1 >= self.samples.len()
    }
}

#[derive(Debug, Default)]
struct WorldState {
    regions: BTreeMap<RegionId, Vec<SubjectId>>,
    subjects: BTreeMap<SubjectId, ScriptedSubject>,
    failing_regions: HashSet<RegionId>,
    failing_subjects: HashSet<SubjectId>,
    regions_unavailable: bool,
    cycles: u64,
}

/// World backed by per-subject sample scripts
#[derive(Debug, Clone, Default)]
pub struct SimulatedWorld {
    state: Arc<Mutex<WorldState>>,
}

impl SimulatedWorld {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut WorldState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Add a subject to a region with its sample script
    pub fn add_subject(&self, region: impl Into<RegionId>, id: SubjectId, samples: Vec<Sample>) {
        let region = region.into();
        self.with_state(|state| {
            state.regions.entry(region).or_default().push(id);
            state.subjects.insert(
                id,
                ScriptedSubject {
                    samples,
                    cursor: 0,
                },
            );
        });
    }

    /// Replace a subject's script with a single fixed sample
    pub fn set_sample(&self, id: SubjectId, sample: Sample) {
        self.with_state(|state| {
            state.subjects.insert(
                id,
                ScriptedSubject {
                    samples: vec![sample],
                    cursor: 0,
                },
            );
        });
    }

    /// Remove a subject from every region
    pub fn remove_subject(&self, id: SubjectId) {
        self.with_state(|state| {
            state.subjects.remove(&id);
            for members in state.regions.values_mut() {
                members.retain(|member| *member != id);
            }
        });
    }

    /// Make listing a region fail until cleared
    pub fn set_region_failing(&self, region: impl Into<RegionId>, failing: bool) {
        let region = region.into();
        self.with_state(|state| {
            if failing {
                state.failing_regions.insert(region);
            } else {
                state.failing_regions.remove(&region);
            }
        });
    }

    /// Make component reads for a subject fail until cleared
    pub fn set_subject_failing(&self, id: SubjectId, failing: bool) {
        self.with_state(|state| {
            if failing {
                state.failing_subjects.insert(id);
            } else {
                state.failing_subjects.remove(&id);
            }
        });
    }

    /// Make `list_regions` fail until cleared
    pub fn set_regions_unavailable(&self, unavailable: bool) {
        self.with_state(|state| state.regions_unavailable = unavailable);
    }

    /// Every script has reached its last sample
    pub fn is_finished(&self) -> bool {
        self.with_state(|state| state.subjects.values().all(ScriptedSubject::finished))
    }

    /// Number of cycles started so far
    pub fn cycles(&self) -> u64 {
        self.with_state(|state| state.cycles)
    }

    fn sample(&self, id: SubjectId) -> WorldResult<Sample> {
        self.with_state(|state| {
            if state.failing_subjects.contains(&id) {
                return Err(WorldError::ComponentUnavailable(id.to_string()));
            }
            state
                .subjects
                .get(&id)
                .and_then(ScriptedSubject::current)
                .ok_or_else(|| WorldError::SubjectNotFound(id.to_string()))
        })
    }
}

impl WorldQuery for SimulatedWorld {
    fn begin_cycle(&mut self) {
        self.with_state(|state| {
            // The first cycle replays the first sample
            if state.cycles > 0 {
                for subject in state.subjects.values_mut() {
                    if !subject.finished() {
                        subject.cursor += 1;
                    }
                }
            }
            state.cycles += 1;
            trace!(cycle = state.cycles, "Simulated world advanced");
        });
    }

    fn list_regions(&self) -> WorldResult<Vec<RegionId>> {
        self.with_state(|state| {
            if state.regions_unavailable {
                return Err(WorldError::Backend("region registry locked".to_string()));
            }
            Ok(state.regions.keys().cloned().collect())
        })
    }

    fn list_subjects(&self, region: &RegionId) -> WorldResult<Vec<SubjectId>> {
        self.with_state(|state| {
            if state.failing_regions.contains(region) {
                return Err(WorldError::RegionUnavailable(region.to_string()));
            }
            state
                .regions
                .get(region)
                .cloned()
                .ok_or_else(|| WorldError::RegionUnavailable(region.to_string()))
        })
    }

    fn submersion_flag(&self, id: SubjectId) -> WorldResult<bool> {
        self.sample(id).map(|sample| sample.submerged)
    }

    fn vertical_position(&self, id: SubjectId) -> WorldResult<f64> {
        self.sample(id).map(|sample| sample.vertical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_script_advances_per_cycle() {
        let mut world = SimulatedWorld::new();
        let id = Uuid::new_v4();
        world.add_subject("default", id, vec![Sample::dry(120.0), Sample::wet(110.0)]);

        world.begin_cycle();
        assert!(!world.submersion_flag(id).unwrap());
        world.begin_cycle();
        assert!(world.submersion_flag(id).unwrap());
        assert_eq!(world.vertical_position(id).unwrap(), 110.0);

        // Holds the last sample
        world.begin_cycle();
        assert_eq!(world.vertical_position(id).unwrap(), 110.0);
        assert!(world.is_finished());
    }

    #[test]
    fn test_failures_are_per_call() {
        let world = SimulatedWorld::new();
        let id = Uuid::new_v4();
        world.add_subject("default", id, vec![Sample::wet(100.0)]);

        world.set_region_failing("default", true);
        assert!(world.list_subjects(&RegionId::from("default")).is_err());
        world.set_region_failing("default", false);
        assert_eq!(world.list_subjects(&RegionId::from("default")).unwrap(), vec![id]);

        world.set_subject_failing(id, true);
        assert!(matches!(
            world.vertical_position(id),
            Err(WorldError::ComponentUnavailable(_))
        ));
    }

    #[test]
    fn test_clones_share_state() {
        let world = SimulatedWorld::new();
        let handle = world.clone();
        let id = Uuid::new_v4();
        handle.add_subject("default", id, vec![Sample::wet(90.0)]);
        assert_eq!(world.vertical_position(id).unwrap(), 90.0);
    }
}
