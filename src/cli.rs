// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Running the gauge against a scripted dive
//! - Printing the gauge for a single depth
//! - Editing stored subject settings
//! - Forcing a test measurement

use depth_gauge::backends::display::{DisplayEvent, DisplayFrame};
use depth_gauge::commands;
use depth_gauge::constants::default_settings_path;
use depth_gauge::errors::CommandError;
use depth_gauge::{
    ConfigStore, EngineSettings, MemoryDisplay, RegionId, Sample, SimulatedWorld, SubjectId,
    TrackingEngine, TrackingService, map_to_gauge,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use uuid::Uuid;

fn parse_subject(raw: &str) -> Result<SubjectId, CommandError> {
    Uuid::parse_str(raw).map_err(|_| CommandError::InvalidSubject(raw.to_string()))
}

/// Descend from 100 to 80, hold, come back up and climb out
fn diver_script() -> Vec<Sample> {
    let mut samples = vec![Sample::dry(101.0); 3];
    samples.extend([Sample::wet(100.0); 2]);
    samples.extend((1..=40).map(|step| Sample::wet(100.0 - step as f64 * 0.5)));
    samples.extend([Sample::wet(80.0); 10]);
    samples.extend((1..=40).map(|step| Sample::wet(80.0 + step as f64 * 0.5)));
    samples.extend([Sample::dry(100.5); 3]);
    samples
}

/// Bob around the display threshold without going deep
fn swimmer_script() -> Vec<Sample> {
    let mut samples = vec![Sample::dry(64.0); 2];
    samples.push(Sample::wet(64.0));
    for _ in 0..6 {
        samples.extend([Sample::wet(63.6), Sample::wet(63.4), Sample::wet(63.8)]);
    }
    samples.extend([Sample::dry(64.2); 2]);
    samples
}

fn describe_frame(frame: &DisplayFrame) -> String {
    let mut text = format!(
        "{:>6} {} slot {:>2}",
        frame.gauge.label_text, frame.gauge.color, frame.gauge.slot_index
    );
    if let Some(line) = &frame.reference {
        text.push_str(&format!("  {} {}", line.caption, line.value));
    }
    text.push_str(&format!("  {:?}", frame.direction));
    text
}

fn print_event(event: &DisplayEvent) {
    match event {
        DisplayEvent::Shown {
            session,
            subject,
            frame,
        } => println!("[session#{}] show   {} {}", session, subject, describe_frame(frame)),
        DisplayEvent::Updated { session, frame } => {
            println!("[session#{}] update {}", session, describe_frame(frame))
        }
        DisplayEvent::Hidden { session } => println!("[session#{}] hide", session),
    }
}

/// Run the service against the simulated dive until Ctrl+C or the end of the script
pub fn run_simulation(
    settings_path: Option<PathBuf>,
    interval_ms: u64,
    sea_level: Option<f64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings_path = settings_path.unwrap_or_else(default_settings_path);
    let configs = Arc::new(ConfigStore::new());
    let loaded = configs.load_from_path(&settings_path);
    println!("Settings: {} ({} subjects)", settings_path.display(), loaded);

    let world = SimulatedWorld::new();
    let diver = Uuid::new_v4();
    let swimmer = Uuid::new_v4();
    world.add_subject("default", diver, diver_script());
    world.add_subject("cavern", swimmer, swimmer_script());
    println!("Diver:   {}", diver);
    println!("Swimmer: {}", swimmer);

    let display = MemoryDisplay::new();
    let settings = EngineSettings {
        tick_interval: Duration::from_millis(interval_ms.max(1)),
        reference_level: sea_level,
    };

    let service = TrackingService::start(
        Box::new(world.clone()),
        Box::new(display.clone()),
        configs,
        settings,
        Some(settings_path),
    )?;
    // Same path a join notification from the host takes
    service.region_joined(RegionId::new("cavern"))?;

    // Set up Ctrl+C handler
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })?;

    println!();
    println!("Diving... (press Ctrl+C to stop early)");

    let mut printed = 0;
    loop {
        let events = display.events();
        for event in &events[printed..] {
            print_event(event);
        }
        printed = events.len();

        if stop_flag.load(Ordering::SeqCst) {
            println!();
            println!("Stopping early...");
            break;
        }
        if world.is_finished() {
            // One more cycle so the final samples are processed
            std::thread::sleep(Duration::from_millis(interval_ms.max(1) * 2));
            for event in &display.events()[printed..] {
                print_event(event);
            }
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    let cycles = service
        .scheduler_stats()
        .map(|stats| stats.cycles_completed())
        .unwrap_or(0);
    service.shutdown()?;

    println!();
    println!(
        "Cycles: {}  shown: {}  updated: {}  hidden: {}",
        cycles,
        display.show_count(),
        display.update_count(),
        display.hide_count()
    );
    Ok(())
}

/// Print the gauge computed for one depth
pub fn print_gauge(depth: f64, decimal: bool) -> Result<(), Box<dyn std::error::Error>> {
    let frame = map_to_gauge(depth, decimal);

    println!("Depth:     {}", depth);
    println!("Label:     {}", frame.label_text);
    println!("Color:     {}", frame.color);
    println!("Slot:      {}", frame.slot_index);
    println!("Range:     {}-{}", frame.base_range, frame.base_range.saturating_add(20));
    println!("Inverted:  {}", frame.is_inverted);
    println!("Ticks:     {}", frame.tick_labels.join(" "));
    Ok(())
}

/// Apply a wdepth command to the settings file
pub fn apply_settings(
    subject: &str,
    args: &[String],
    settings_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let subject = parse_subject(subject)?;
    let settings_path = settings_path.unwrap_or_else(default_settings_path);

    let configs = ConfigStore::new();
    configs.load_from_path(&settings_path);

    let reply = commands::run_wdepth(&configs, subject, &args.join(" "));
    println!("{}", reply);

    if reply.rejected {
        return Err(Box::new(CommandError::Usage(commands::usage::WDEPTH)));
    }
    configs.save_to_path(&settings_path)?;
    Ok(())
}

/// Show a forced measurement on an in-memory display
pub fn test_depth(subject: &str, depth: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let subject = parse_subject(subject)?;
    let depth = commands::parse_test_depth(depth.unwrap_or(""))?;

    let display = MemoryDisplay::new();
    let mut engine = TrackingEngine::new(
        Box::new(display.clone()),
        Arc::new(ConfigStore::new()),
        EngineSettings::default(),
    );
    let measurement = engine.force_measurement(subject, depth)?;
    println!("{}", commands::test_depth_reply(&measurement));

    if let Some(frame) = display.last_frame() {
        println!();
        for update in frame
            .field_updates()
            .into_iter()
            .filter(|update| !update.value.is_empty())
        {
            println!("  {:<28} {}", update.field, update.value);
        }
    }
    Ok(())
}
