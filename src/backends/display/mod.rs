// SPDX-License-Identifier: GPL-3.0-only

//! Display surface abstraction
//!
//! A display session is a live gauge bound to one subject. The engine only
//! records a session after [`DisplaySurface::show`] succeeded, so a failed
//! show never leaves a phantom session behind.

pub mod frame;
pub mod memory;

pub use frame::{DisplayFrame, FieldUpdate, ReferenceLine};
pub use memory::{DisplayEvent, MemoryDisplay};

use crate::backends::world::SubjectId;
use crate::errors::DisplayResult;

/// Handle to a live display session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    id: u64,
    subject: SubjectId,
}

impl SessionHandle {
    pub fn new(id: u64, subject: SubjectId) -> Self {
        Self { id, subject }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn subject(&self) -> SubjectId {
        self.subject
    }
}

impl std::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session#{}", self.id)
    }
}

/// Remote display that paints the gauge for a subject
pub trait DisplaySurface: Send {
    /// Create a display for a subject, seeded with the first frame
    fn show(&mut self, subject: SubjectId, frame: &DisplayFrame) -> DisplayResult<SessionHandle>;

    /// Push a new frame to a live session
    fn update(&mut self, session: &SessionHandle, frame: &DisplayFrame) -> DisplayResult<()>;

    /// Remove the display; the handle is consumed either way
    fn hide(&mut self, session: SessionHandle) -> DisplayResult<()>;
}
