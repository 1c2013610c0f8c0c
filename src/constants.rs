// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// World geometry
pub mod world {
    /// Absolute height of the water surface in the default world
    pub const SEA_LEVEL: f64 = 115.0;

    /// Deepest depth accepted by the forced test measurement (sea level to bedrock)
    pub const MAX_TEST_DEPTH: f64 = 115.0;
}

/// Depth thresholds used by the tracking engine
///
/// These values are tuned by hand against surface swimming and must keep
/// their literal values for behavioural compatibility.
pub mod thresholds {
    /// Local depths closer to the entry point than this snap to zero
    pub const SURFACE_DEAD_ZONE: f64 = 0.3;

    /// Minimum absolute local depth before a gauge is shown
    pub const DISPLAY_THRESHOLD: f64 = 0.5;

    /// Depth change between ticks required to report a direction
    pub const DIRECTION_THRESHOLD: f64 = 0.1;

    /// Offset added to the rounded-up entry height to estimate the surface
    pub const SURFACE_COMPENSATION: f64 = 1.0;

    // The dead zone must sit inside the display threshold or the gauge flickers
    const _: () = assert!(SURFACE_DEAD_ZONE < DISPLAY_THRESHOLD);
    const _: () = assert!(DIRECTION_THRESHOLD < SURFACE_DEAD_ZONE);
}

/// Gauge layout constants
pub mod gauge {
    /// Depth covered by one gauge range
    pub const RANGE_WIDTH: f64 = 20.0;

    /// Number of discrete marker slots on the gauge
    pub const SLOT_COUNT: usize = 60;

    /// Highest marker slot index
    pub const MAX_SLOT: usize = SLOT_COUNT - 1;

    /// Tick label offsets from the start of the current range
    pub const TICK_OFFSETS: [u32; 6] = [3, 6, 9, 12, 15, 18];

    /// Absolute depth at which an above-entry reading flips the gauge
    pub const INVERSION_THRESHOLD: f64 = 1.0;

    /// Interval that receives the highlight color
    pub const HIGHLIGHT_INTERVAL: f64 = 5.0;

    /// Labels saturate here, matching the saturated `base_range`
    pub const MAX_LABEL_DEPTH: f64 = u32::MAX as f64;

    /// Unit suffix for every depth label
    pub const UNIT_SUFFIX: &str = "m";

    const _: () = assert!(SLOT_COUNT > 1);
}

/// HUD colors and fixed texts
pub mod ui {
    /// Pale orange used for depths on a highlight interval
    pub const HIGHLIGHT_COLOR: &str = "#FFE6B5";

    /// Plain marker color
    pub const NEUTRAL_COLOR: &str = "#ffffff";

    /// Caption above the local depth marker
    pub const LOCAL_DEPTH_CAPTION: &str = "Local Water Depth:";

    /// Direction glyph while descending
    pub const DESCENDING_GLYPH: &str = "v";

    /// Direction glyph while rising
    pub const RISING_GLYPH: &str = "^";
}

/// Timing constants
pub mod timing {
    use super::Duration;

    /// Default scheduler period
    pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

    /// Maximum time to wait for the world thread during shutdown
    pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

    /// Display updates between periodic debug log lines
    pub const UPDATE_LOG_INTERVAL: u64 = 50;
}

/// Settings file naming
pub mod files {
    /// Directory under the user config dir
    pub const APP_DIR: &str = "depth-gauge";

    /// Per-subject settings file
    pub const PLAYER_SETTINGS_FILE: &str = "player_settings.json";
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}

/// Default per-subject settings file location
pub fn default_settings_path() -> std::path::PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| std::path::PathBuf::from(".")))
        .join(files::APP_DIR)
        .join(files::PLAYER_SETTINGS_FILE)
}
