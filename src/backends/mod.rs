// SPDX-License-Identifier: GPL-3.0-only

//! Collaborator abstraction layer
//!
//! The tracking engine talks to two external systems:
//! - The host world, for regions, subjects, submersion and height
//! - The display surface, which paints the gauge on a remote client
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Tracking Engine               │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                  │
//! │  ┌─────────────┐    ┌──────────────────┐    │
//! │  │    World    │    │     Display      │    │
//! │  │   (query)   │    │ (show/update/    │    │
//! │  │             │    │      hide)       │    │
//! │  └─────────────┘    └──────────────────┘    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`world`]: World query trait and a scripted simulation
//! - [`display`]: Display surface trait, frame rendering and an in-memory surface

pub mod display;
pub mod world;
