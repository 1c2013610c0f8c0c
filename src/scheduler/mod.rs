// SPDX-License-Identifier: GPL-3.0-only

//! Periodic cycle scheduling
//!
//! The [`Scheduler`] owns a small current-thread tokio runtime on its own OS
//! thread. On every interval tick it hands one tracking cycle to the
//! [`WorldThread`] and waits for it to finish. A cycle that outlives the
//! period stays in flight; no new cycle is dispatched until it completes, so
//! cycles never overlap.

pub mod world_thread;

pub use world_thread::{WorldHandle, WorldRuntime, WorldThread};

use crate::constants::timing::UPDATE_LOG_INTERVAL;
use crate::errors::{AppError, AppResult};
use crate::tracking::CycleReport;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

/// Counters shared between the scheduler thread and its owner
#[derive(Debug, Default)]
pub struct SchedulerStats {
    cycles_completed: AtomicU64,
    cycles_delayed: AtomicU64,
}

impl SchedulerStats {
    /// Cycles that ran to completion
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed.load(Ordering::Relaxed)
    }

    /// Ticks on which the previous cycle was still running
    pub fn cycles_delayed(&self) -> u64 {
        self.cycles_delayed.load(Ordering::Relaxed)
    }
}

/// Controller for the periodic scheduler thread
pub struct Scheduler {
    stop_sender: Option<oneshot::Sender<()>>,
    thread_handle: Option<JoinHandle<()>>,
    stats: Arc<SchedulerStats>,
}

impl Scheduler {
    /// Start dispatching one cycle per `period` to the world thread
    pub fn start(world: WorldHandle, period: Duration) -> AppResult<Self> {
        if period.is_zero() {
            return Err(AppError::Other("scheduler period must be non-zero".to_string()));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;

        let (stop_sender, stop_receiver) = oneshot::channel();
        let stats = Arc::new(SchedulerStats::default());
        let stats_clone = Arc::clone(&stats);

        info!(period_ms = period.as_millis() as u64, "Starting scheduler");

        let thread_handle = std::thread::Builder::new()
            .name("depth-scheduler".to_string())
            .spawn(move || {
                runtime.block_on(run_loop(world, period, stop_receiver, stats_clone));
                debug!("Scheduler thread exiting");
            })?;

        Ok(Self {
            stop_sender: Some(stop_sender),
            thread_handle: Some(thread_handle),
            stats,
        })
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Check if the thread is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Stop dispatching and wait for the thread
    ///
    /// A cycle that is in flight is abandoned; it still runs to completion
    /// on the world thread but its result is dropped.
    pub fn stop(&mut self) {
        if let Some(sender) = self.stop_sender.take() {
            let _ = sender.send(());
        }
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                warn!("Scheduler thread panicked: {:?}", e);
            } else {
                debug!(
                    cycles = self.stats.cycles_completed(),
                    delayed = self.stats.cycles_delayed(),
                    "Scheduler stopped"
                );
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!("Scheduler dropped, stopping");
            self.stop();
        }
    }
}

async fn run_loop(
    world: WorldHandle,
    period: Duration,
    mut stop_receiver: oneshot::Receiver<()>,
    stats: Arc<SchedulerStats>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut in_flight: Option<oneshot::Receiver<Option<CycleReport>>> = None;

    loop {
        tokio::select! {
            _ = &mut stop_receiver => break,
            _ = ticker.tick() => {}
        }

        let mut pending = match in_flight.take() {
            Some(pending) => pending,
            None => world.execute(WorldRuntime::run_cycle),
        };

        tokio::select! {
            _ = &mut stop_receiver => break,
            result = tokio::time::timeout(period, &mut pending) => match result {
                Ok(Ok(Some(report))) => {
                    let completed = stats.cycles_completed.fetch_add(1, Ordering::Relaxed) + 1;
                    log_report(completed, &report);
                }
                Ok(Ok(None)) => {
                    debug!("World runtime closed, scheduler exiting");
                    break;
                }
                Ok(Err(_)) => {
                    warn!("World thread stopped, scheduler exiting");
                    break;
                }
                Err(_) => {
                    stats.cycles_delayed.fetch_add(1, Ordering::Relaxed);
                    debug!("Cycle still running, delaying next dispatch");
                    in_flight = Some(pending);
                }
            }
        }
    }
}

fn log_report(completed: u64, report: &CycleReport) {
    if completed % UPDATE_LOG_INTERVAL == 0 {
        debug!(
            cycle = completed,
            regions = report.regions_scanned,
            subjects = report.subjects_processed,
            shown = report.shown,
            updated = report.updated,
            hidden = report.hidden,
            "Tracking cycle"
        );
    } else {
        trace!(cycle = completed, subjects = report.subjects_processed, "Tracking cycle");
    }
}
