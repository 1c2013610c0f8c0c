// SPDX-License-Identifier: GPL-3.0-only

//! Depth Gauge - an underwater depth indicator for a multiplayer world
//!
//! Tracks every subject in the world, measures how far below its water
//! entry point it is and drives a vertical gauge on the subject's screen.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`gauge`]: Pure mapping from a depth to the gauge presentation
//! - [`tracking`]: Per-subject state machine and the tracking cycle
//! - [`backends`]: World and display collaborator abstraction
//! - [`scheduler`]: World thread and periodic cycle dispatch
//! - [`service`]: Wiring, host notifications and shutdown
//! - [`commands`]: `wdepth` and `testdepth` handling
//! - [`config`]: Per-subject settings and their persistence
//!
//! # Example
//!
//! ```ignore
//! let service = TrackingService::start(
//!     Box::new(world),
//!     Box::new(display),
//!     Arc::new(ConfigStore::new()),
//!     EngineSettings::default(),
//!     Some(default_settings_path()),
//! )?;
//! // ...
//! service.shutdown()?;
//! ```

pub mod backends;
pub mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod gauge;
pub mod scheduler;
pub mod service;
pub mod tracking;

// Re-export commonly used types
pub use backends::display::{DisplayFrame, DisplaySurface, MemoryDisplay, SessionHandle};
pub use backends::world::{RegionId, Sample, SimulatedWorld, SubjectId, WorldQuery};
pub use commands::CommandReply;
pub use config::{ConfigStore, SubjectConfig};
pub use errors::{AppError, AppResult};
pub use gauge::{GaugeFrame, map_to_gauge};
pub use service::TrackingService;
pub use tracking::{Direction, EngineSettings, TrackingEngine};
