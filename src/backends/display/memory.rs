// SPDX-License-Identifier: GPL-3.0-only

//! In-memory display surface
//!
//! Keeps the current field values of every live session and a log of the
//! show/update/hide directives it received. Failures can be injected to
//! exercise the engine's recovery paths. Clones share state.

use super::{DisplayFrame, DisplaySurface, SessionHandle};
use crate::backends::world::SubjectId;
use crate::errors::{DisplayError, DisplayResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Directive received by the surface
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    Shown {
        session: u64,
        subject: SubjectId,
        frame: DisplayFrame,
    },
    Updated {
        session: u64,
        frame: DisplayFrame,
    },
    Hidden {
        session: u64,
    },
}

#[derive(Debug, Default)]
struct Session {
    subject: SubjectId,
    fields: HashMap<String, String>,
}

#[derive(Debug, Default)]
struct SurfaceState {
    next_session: u64,
    sessions: HashMap<u64, Session>,
    events: Vec<DisplayEvent>,
    failing_shows: u32,
    failing_updates: u32,
}

/// Display surface that records everything in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryDisplay {
    state: Arc<Mutex<SurfaceState>>,
}

impl MemoryDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut SurfaceState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Make the next `count` show calls fail
    pub fn fail_next_shows(&self, count: u32) {
        self.with_state(|state| state.failing_shows = count);
    }

    /// Make the next `count` update calls fail
    pub fn fail_next_updates(&self, count: u32) {
        self.with_state(|state| state.failing_updates = count);
    }

    /// All directives received so far
    pub fn events(&self) -> Vec<DisplayEvent> {
        self.with_state(|state| state.events.clone())
    }

    pub fn show_count(&self) -> usize {
        self.count(|event| matches!(event, DisplayEvent::Shown { .. }))
    }

    pub fn update_count(&self) -> usize {
        self.count(|event| matches!(event, DisplayEvent::Updated { .. }))
    }

    pub fn hide_count(&self) -> usize {
        self.count(|event| matches!(event, DisplayEvent::Hidden { .. }))
    }

    fn count(&self, predicate: impl Fn(&DisplayEvent) -> bool) -> usize {
        self.with_state(|state| state.events.iter().filter(|e| predicate(e)).count())
    }

    /// Frame of the most recent show or update
    pub fn last_frame(&self) -> Option<DisplayFrame> {
        self.with_state(|state| {
            state.events.iter().rev().find_map(|event| match event {
                DisplayEvent::Shown { frame, .. } | DisplayEvent::Updated { frame, .. } => {
                    Some(frame.clone())
                }
                DisplayEvent::Hidden { .. } => None,
            })
        })
    }

    /// Subjects that currently have a live session
    pub fn active_subjects(&self) -> Vec<SubjectId> {
        self.with_state(|state| state.sessions.values().map(|s| s.subject).collect())
    }

    /// Current value of a field in the subject's live session
    pub fn field(&self, subject: SubjectId, field: &str) -> Option<String> {
        self.with_state(|state| {
            state
                .sessions
                .values()
                .find(|session| session.subject == subject)
                .and_then(|session| session.fields.get(field).cloned())
        })
    }
}

fn apply(session: &mut Session, frame: &DisplayFrame) {
    for update in frame.field_updates() {
        session.fields.insert(update.field, update.value);
    }
}

impl DisplaySurface for MemoryDisplay {
    fn show(&mut self, subject: SubjectId, frame: &DisplayFrame) -> DisplayResult<SessionHandle> {
        self.with_state(|state| {
            if state.failing_shows > 0 {
                state.failing_shows -= 1;
                return Err(DisplayError::ShowFailed("injected show failure".to_string()));
            }

            state.next_session += 1;
            let id = state.next_session;
            let mut session = Session {
                subject,
                fields: HashMap::new(),
            };
            apply(&mut session, frame);
            state.sessions.insert(id, session);
            state.events.push(DisplayEvent::Shown {
                session: id,
                subject,
                frame: frame.clone(),
            });
            debug!(
                session = id,
                subject = %subject,
                label = %frame.gauge.label_text,
                "Display shown"
            );
            Ok(SessionHandle::new(id, subject))
        })
    }

    fn update(&mut self, session: &SessionHandle, frame: &DisplayFrame) -> DisplayResult<()> {
        self.with_state(|state| {
            if state.failing_updates > 0 {
                state.failing_updates -= 1;
                return Err(DisplayError::UpdateFailed("injected update failure".to_string()));
            }

            let live = state
                .sessions
                .get_mut(&session.id())
                .ok_or(DisplayError::UnknownSession(session.id()))?;
            apply(live, frame);
            state.events.push(DisplayEvent::Updated {
                session: session.id(),
                frame: frame.clone(),
            });
            Ok(())
        })
    }

    fn hide(&mut self, session: SessionHandle) -> DisplayResult<()> {
        self.with_state(|state| {
            if state.sessions.remove(&session.id()).is_none() {
                return Err(DisplayError::UnknownSession(session.id()));
            }
            state.events.push(DisplayEvent::Hidden {
                session: session.id(),
            });
            debug!(session = session.id(), subject = %session.subject(), "Display hidden");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SubjectConfig;
    use crate::tracking::Direction;
    use uuid::Uuid;

    fn frame(depth: f64) -> DisplayFrame {
        DisplayFrame::compose(depth, None, Direction::Steady, &SubjectConfig::default())
    }

    #[test]
    fn test_show_update_hide() {
        let mut display = MemoryDisplay::new();
        let subject = Uuid::new_v4();

        let session = display.show(subject, &frame(2.0)).unwrap();
        display.update(&session, &frame(3.0)).unwrap();
        assert_eq!(display.active_subjects(), vec![subject]);

        display.hide(session.clone()).unwrap();
        assert!(display.active_subjects().is_empty());
        assert_eq!(display.hide(session), Err(DisplayError::UnknownSession(1)));
        assert_eq!((display.show_count(), display.update_count(), display.hide_count()), (1, 1, 1));
    }

    #[test]
    fn test_injected_show_failure_records_nothing() {
        let mut display = MemoryDisplay::new();
        display.fail_next_shows(1);
        assert!(display.show(Uuid::new_v4(), &frame(1.0)).is_err());
        assert!(display.events().is_empty());
        assert!(display.show(Uuid::new_v4(), &frame(1.0)).is_ok());
    }
}
