// SPDX-License-Identifier: GPL-3.0-only

//! Depth tracking
//!
//! Subjects move through three phases:
//!
//! ```text
//!            submerge                 |depth| >= 0.5
//!   ┌─────┐ ─────────▶ ┌────────────┐ ─────────────▶ ┌────────────┐
//!   │ Dry │            │ Submerged  │                │ Submerged  │
//!   │     │ ◀───────── │ no display │ ◀───────────── │ displaying │
//!   └─────┘  surface   └────────────┘ |depth| < 0.5  └────────────┘
//!      ▲                                or recalibration    │
//!      └────────────────────── surface (hides) ─────────────┘
//! ```

pub mod engine;
pub mod state;

pub use engine::{
    CycleReport, EngineSettings, Observation, TestMeasurement, TickOutcome, TrackingEngine,
};
pub use state::{Direction, SubjectPhase, SubjectState};
