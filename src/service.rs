// SPDX-License-Identifier: GPL-3.0-only

//! Depth gauge service
//!
//! Wires the tracking engine, the world thread and the scheduler together
//! and exposes the host-facing entry points: region and disconnect
//! notifications, player commands and an ordered shutdown.

use crate::backends::display::DisplaySurface;
use crate::backends::world::{RegionId, SubjectId, WorldQuery};
use crate::commands::{self, CommandReply};
use crate::config::ConfigStore;
use crate::constants::timing::SHUTDOWN_TIMEOUT;
use crate::errors::{AppError, AppResult};
use crate::scheduler::{Scheduler, SchedulerStats, WorldRuntime, WorldThread};
use crate::tracking::{EngineSettings, TestMeasurement, TrackingEngine};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Running depth gauge
pub struct TrackingService {
    world_thread: WorldThread,
    scheduler: Option<Scheduler>,
    configs: Arc<ConfigStore>,
    settings_path: Option<PathBuf>,
    stopped: bool,
}

impl TrackingService {
    /// Start the world thread and the periodic scheduler
    ///
    /// When `settings_path` is given the settings store is saved there on
    /// shutdown.
    pub fn start(
        world: Box<dyn WorldQuery>,
        display: Box<dyn DisplaySurface>,
        configs: Arc<ConfigStore>,
        settings: EngineSettings,
        settings_path: Option<PathBuf>,
    ) -> AppResult<Self> {
        let period = settings.tick_interval;
        let engine = TrackingEngine::new(display, Arc::clone(&configs), settings);
        let world_thread = WorldThread::start("depth-world", WorldRuntime::new(world, engine))?;
        let handle = world_thread
            .handle()
            .ok_or_else(|| AppError::Shutdown("world thread stopped during start".to_string()))?;
        let scheduler = Scheduler::start(handle, period)?;

        info!("Depth gauge service started");
        Ok(Self {
            world_thread,
            scheduler: Some(scheduler),
            configs,
            settings_path,
            stopped: false,
        })
    }

    pub fn configs(&self) -> &Arc<ConfigStore> {
        &self.configs
    }

    pub fn scheduler_stats(&self) -> Option<&SchedulerStats> {
        self.scheduler.as_ref().map(Scheduler::stats)
    }

    /// A subject joined a region; scan it on every following cycle
    pub fn region_joined(&self, region: RegionId) -> AppResult<()> {
        self.world_thread
            .call(move |runtime| runtime.engine_mut().add_known_region(region))
    }

    /// A subject left; drop its tracking state
    ///
    /// Settings are kept so a reconnect finds them again.
    pub fn subject_disconnected(&self, id: SubjectId) -> AppResult<bool> {
        self.world_thread
            .call(move |runtime| runtime.engine_mut().remove_subject(id))
    }

    /// Show a fixed depth on the subject's gauge
    pub fn force_measurement(&self, id: SubjectId, depth: f64) -> AppResult<TestMeasurement> {
        let measurement = self
            .world_thread
            .call(move |runtime| runtime.engine_mut().force_measurement(id, depth))??;
        Ok(measurement)
    }

    /// Run a read-only query against the engine on the world thread
    pub fn inspect<R, F>(&self, query: F) -> AppResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&TrackingEngine) -> R + Send + 'static,
    {
        self.world_thread.call(move |runtime| query(runtime.engine()))
    }

    /// Handle a `wdepth` command line for a subject
    pub fn apply_command(&self, id: SubjectId, input: &str) -> CommandReply {
        commands::run_wdepth(&self.configs, id, input)
    }

    /// Handle a `testdepth` command line for a subject
    pub fn test_depth(&self, id: SubjectId, input: &str) -> AppResult<CommandReply> {
        let depth = match commands::parse_test_depth(input) {
            Ok(depth) => depth,
            Err(err) => return Ok(CommandReply::from_error(&err)),
        };
        let measurement = self.force_measurement(id, depth)?;
        Ok(commands::test_depth_reply(&measurement))
    }

    /// Stop everything and save settings
    pub fn shutdown(mut self) -> AppResult<()> {
        self.stop()
    }

    fn stop(&mut self) -> AppResult<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        info!("Stopping depth gauge service");

        // Any in-flight cycle is abandoned with the scheduler
        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.stop();
        }

        let cleared = match self.world_thread.handle() {
            Some(handle) => handle.call_timeout(WorldRuntime::close, SHUTDOWN_TIMEOUT),
            None => Ok(()),
        };
        if let Err(e) = &cleared {
            warn!(error = %e, "Failed to clear tracking state");
        }
        self.world_thread.stop();

        if let Some(path) = &self.settings_path {
            match self.configs.save_to_path(path) {
                Ok(count) => info!(count, path = %path.display(), "Saved subject settings"),
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "Failed to save subject settings");
                    return Err(e.into());
                }
            }
        } else {
            debug!("No settings path, skipping save");
        }

        cleared
    }
}

impl Drop for TrackingService {
    fn drop(&mut self) {
        if !self.stopped {
            debug!("TrackingService dropped, stopping");
            let _ = self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::display::MemoryDisplay;
    use crate::backends::world::{Sample, SimulatedWorld};
    use std::time::{Duration, Instant};
    use uuid::Uuid;

    fn settings() -> EngineSettings {
        EngineSettings {
            tick_interval: Duration::from_millis(10),
            ..EngineSettings::default()
        }
    }

    fn wait_for(mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < Duration::from_secs(5) {
            if done() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_service_tracks_and_shuts_down() {
        let world = SimulatedWorld::new();
        let id = Uuid::new_v4();
        world.add_subject(
            "default",
            id,
            vec![Sample::dry(100.0), Sample::wet(100.0), Sample::wet(97.0)],
        );
        let display = MemoryDisplay::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let service = TrackingService::start(
            Box::new(world),
            Box::new(display.clone()),
            Arc::new(ConfigStore::new()),
            settings(),
            Some(path.clone()),
        )
        .unwrap();

        assert!(wait_for(|| display.show_count() == 1));
        service.apply_command(id, "decimal on");
        service.shutdown().unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.contains("\"decimalEnabled\": true"));
    }

    #[test]
    fn test_disconnect_and_test_depth() {
        let world = SimulatedWorld::new();
        let display = MemoryDisplay::new();
        let service = TrackingService::start(
            Box::new(world),
            Box::new(display.clone()),
            Arc::new(ConfigStore::new()),
            settings(),
            None,
        )
        .unwrap();

        let id = Uuid::new_v4();
        let reply = service.test_depth(id, "testdepth 150").unwrap();
        assert_eq!(reply.lines[0].text, "Depth HUD shown with depth: 115m");
        assert_eq!(display.show_count(), 1);

        let reply = service.test_depth(id, "--depth=3").unwrap();
        assert_eq!(reply.lines[0].text, "Depth HUD shown with depth: 3m");
        assert_eq!(display.show_count(), 1);
        assert_eq!(display.update_count(), 1);

        assert!(service.subject_disconnected(id).unwrap());
        assert!(!service.subject_disconnected(id).unwrap());
        assert_eq!(display.hide_count(), 0);

        service.region_joined(RegionId::new("cavern")).unwrap();
        let regions = service
            .inspect(|engine| engine.known_regions().cloned().collect::<Vec<_>>())
            .unwrap();
        assert!(regions.contains(&RegionId::new("cavern")));
    }
}
