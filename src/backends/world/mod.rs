// SPDX-License-Identifier: GPL-3.0-only

//! Host world abstraction
//!
//! The tracking engine never touches the host's entity model directly. It
//! asks a [`WorldQuery`] implementation for regions, the subjects inside
//! them, and each subject's submersion flag and height.
//!
//! ```text
//! ┌─────────────────────┐
//! │     WorldThread     │  ← owns the world, one cycle at a time
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  WorldQuery Trait   │  ← every call may fail independently
//! └──────────┬──────────┘
//!            │
//!            ▼
//!   ┌──────────────────┐
//!   │  SimulatedWorld  │  ← scripted dives for the CLI and tests
//!   └──────────────────┘
//! ```

pub mod simulated;

pub use simulated::{Sample, SimulatedWorld};

use crate::errors::WorldResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable subject identifier
pub type SubjectId = Uuid;

/// Named region of the world (a loaded world instance in the host)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub String);

impl RegionId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RegionId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Query interface to the host world
///
/// Implementations are moved onto the world thread and only ever called
/// from there, so they need `Send` but not `Sync`.
pub trait WorldQuery: Send {
    /// Called once at the start of every tracking cycle
    fn begin_cycle(&mut self) {}

    /// Regions currently loaded
    fn list_regions(&self) -> WorldResult<Vec<RegionId>>;

    /// Subjects currently inside a region
    fn list_subjects(&self, region: &RegionId) -> WorldResult<Vec<SubjectId>>;

    /// Whether the subject is inside the tracked fluid
    fn submersion_flag(&self, id: SubjectId) -> WorldResult<bool>;

    /// Absolute vertical coordinate of the subject
    fn vertical_position(&self, id: SubjectId) -> WorldResult<f64>;
}
