// SPDX-License-Identifier: GPL-3.0-only
//! World thread lifecycle management
//!
//! The host world and the display must only be touched from one thread.
//! [`WorldThread`] owns both, together with the tracking engine, on a
//! dedicated OS thread and runs submitted jobs strictly in order. Every job
//! reports back through a oneshot channel, so callers always observe
//! completion instead of firing and forgetting.

use crate::backends::world::WorldQuery;
use crate::errors::{AppError, AppResult};
use crate::tracking::{CycleReport, TrackingEngine};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// State owned by the world thread
pub struct WorldRuntime {
    world: Box<dyn WorldQuery>,
    engine: TrackingEngine,
    closed: bool,
}

impl WorldRuntime {
    pub fn new(world: Box<dyn WorldQuery>, engine: TrackingEngine) -> Self {
        Self {
            world,
            engine,
            closed: false,
        }
    }

    pub fn engine(&self) -> &TrackingEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TrackingEngine {
        &mut self.engine
    }

    /// Run one tracking cycle; `None` once the runtime is closed
    pub fn run_cycle(&mut self) -> Option<CycleReport> {
        if self.closed {
            return None;
        }
        Some(self.engine.tick(self.world.as_mut()))
    }

    /// Clear all tracking state; later cycles become no-ops
    pub fn close(&mut self) {
        self.closed = true;
        self.engine.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

type WorldJob = Box<dyn FnOnce(&mut WorldRuntime) + Send>;

/// Cloneable handle for submitting jobs to the world thread
#[derive(Clone)]
pub struct WorldHandle {
    sender: mpsc::UnboundedSender<WorldJob>,
}

impl WorldHandle {
    /// Queue a job and get a receiver for its result
    ///
    /// If the world thread is gone the receiver resolves to an error.
    pub fn execute<R, F>(&self, job: F) -> oneshot::Receiver<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut WorldRuntime) -> R + Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let job: WorldJob = Box::new(move |runtime| {
            let _ = result_tx.send(job(runtime));
        });
        if self.sender.send(job).is_err() {
            debug!("World thread closed, dropping job");
        }
        result_rx
    }

    /// Run a job and block until it finished
    ///
    /// Must not be called from inside an async runtime.
    pub fn call<R, F>(&self, job: F) -> AppResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut WorldRuntime) -> R + Send + 'static,
    {
        self.execute(job)
            .blocking_recv()
            .map_err(|_| AppError::Shutdown("world thread is not running".to_string()))
    }

    /// Run a job and wait at most `timeout` for it to finish
    ///
    /// Must not be called from inside an async runtime.
    pub fn call_timeout<R, F>(&self, job: F, timeout: Duration) -> AppResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut WorldRuntime) -> R + Send + 'static,
    {
        let receiver = self.execute(job);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;

        match runtime.block_on(tokio::time::timeout(timeout, receiver)) {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(_)) => Err(AppError::Shutdown("world thread is not running".to_string())),
            Err(_) => Err(AppError::Shutdown(format!(
                "world thread did not answer within {:?}",
                timeout
            ))),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Controller for the world thread
pub struct WorldThread {
    handle: Option<WorldHandle>,
    thread_handle: Option<JoinHandle<()>>,
    name: String,
}

impl WorldThread {
    /// Move the runtime onto a new thread and start processing jobs
    pub fn start(name: &str, mut runtime: WorldRuntime) -> AppResult<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<WorldJob>();
        let name_clone = name.to_string();

        info!(name = %name, "Starting world thread");

        let thread_handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                debug!(name = %name_clone, "World thread started");
                while let Some(job) = receiver.blocking_recv() {
                    job(&mut runtime);
                }
                info!(name = %name_clone, "World thread exiting");
            })?;

        Ok(Self {
            handle: Some(WorldHandle { sender }),
            thread_handle: Some(thread_handle),
            name: name.to_string(),
        })
    }

    /// Handle for submitting jobs; `None` after `stop`
    pub fn handle(&self) -> Option<WorldHandle> {
        self.handle.clone()
    }

    /// Run a job and block until it finished
    pub fn call<R, F>(&self, job: F) -> AppResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut WorldRuntime) -> R + Send + 'static,
    {
        match &self.handle {
            Some(handle) => handle.call(job),
            None => Err(AppError::Shutdown(format!("{} stopped", self.name))),
        }
    }

    /// Check if the thread is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Close the queue, let queued jobs drain and wait for the thread
    ///
    /// Other `WorldHandle` clones keep the queue open; drop them first.
    pub fn stop(&mut self) {
        self.handle = None;
        if let Some(handle) = self.thread_handle.take() {
            debug!(name = %self.name, "Waiting for world thread to finish");
            if let Err(e) = handle.join() {
                warn!(name = %self.name, "World thread panicked: {:?}", e);
            } else {
                debug!(name = %self.name, "World thread finished");
            }
        }
    }
}

impl Drop for WorldThread {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!(name = %self.name, "WorldThread dropped, stopping");
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::display::MemoryDisplay;
    use crate::backends::world::{Sample, SimulatedWorld};
    use crate::config::ConfigStore;
    use crate::tracking::EngineSettings;
    use std::sync::Arc;
    use uuid::Uuid;

    fn runtime(world: SimulatedWorld) -> WorldRuntime {
        let engine = TrackingEngine::new(
            Box::new(MemoryDisplay::new()),
            Arc::new(ConfigStore::new()),
            EngineSettings::default(),
        );
        WorldRuntime::new(Box::new(world), engine)
    }

    #[test]
    fn test_jobs_run_in_order() {
        let mut thread = WorldThread::start("test-world", runtime(SimulatedWorld::new())).unwrap();
        let handle = thread.handle().unwrap();

        let first = handle.execute(|_| 1);
        let second = handle.execute(|_| 2);
        assert_eq!(first.blocking_recv().unwrap(), 1);
        assert_eq!(second.blocking_recv().unwrap(), 2);

        drop(handle);
        thread.stop();
        assert!(!thread.is_running());
    }

    #[test]
    fn test_cycle_runs_on_world_thread() {
        let world = SimulatedWorld::new();
        let id = Uuid::new_v4();
        world.add_subject("default", id, vec![Sample::wet(100.0)]);

        let thread = WorldThread::start("test-world", runtime(world)).unwrap();
        let report = thread.call(WorldRuntime::run_cycle).unwrap().unwrap();
        assert_eq!(report.subjects_processed, 1);
        assert_eq!(thread.call(|rt| rt.engine().subject_count()).unwrap(), 1);
    }

    #[test]
    fn test_closed_runtime_ignores_cycles() {
        let world = SimulatedWorld::new();
        world.add_subject("default", Uuid::new_v4(), vec![Sample::wet(100.0)]);

        let thread = WorldThread::start("test-world", runtime(world)).unwrap();
        thread.call(WorldRuntime::run_cycle).unwrap();
        thread.call(WorldRuntime::close).unwrap();

        assert!(thread.call(WorldRuntime::run_cycle).unwrap().is_none());
        assert_eq!(thread.call(|rt| rt.engine().subject_count()).unwrap(), 0);
    }

    #[test]
    fn test_call_timeout_expires() {
        let thread = WorldThread::start("test-world", runtime(SimulatedWorld::new())).unwrap();
        let handle = thread.handle().unwrap();

        let _busy = handle.execute(|_| std::thread::sleep(Duration::from_millis(500)));
        let started = std::time::Instant::now();
        let result = handle.call_timeout(|_| (), Duration::from_millis(20));
        assert!(matches!(result, Err(AppError::Shutdown(_))));
        assert!(started.elapsed() < Duration::from_millis(400));

        assert!(handle.call_timeout(|_| 5, Duration::from_secs(5)).unwrap() == 5);
    }

    #[test]
    fn test_call_timeout_reports_dead_thread() {
        let world_thread =
            WorldThread::start("test-world", runtime(SimulatedWorld::new())).unwrap();
        let handle = world_thread.handle().unwrap();

        // A job that panics takes the thread down with it
        let crashed =
            handle.call_timeout::<(), _>(|_| panic!("world thread crash"), Duration::from_secs(5));
        assert!(matches!(crashed, Err(AppError::Shutdown(_))));

        let started = std::time::Instant::now();
        let result = handle.call_timeout(|_| (), Duration::from_secs(5));
        assert!(matches!(result, Err(AppError::Shutdown(_))));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_call_after_stop_fails() {
        let mut thread = WorldThread::start("test-world", runtime(SimulatedWorld::new())).unwrap();
        thread.stop();
        assert!(matches!(thread.call(|_| ()), Err(AppError::Shutdown(_))));
    }
}
