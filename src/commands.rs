// SPDX-License-Identifier: GPL-3.0-only

//! Player-facing commands
//!
//! Two commands reach the gauge from chat:
//! - `wdepth` queries or changes the per-subject configuration
//! - `testdepth` forces a measurement onto the display
//!
//! Parsing is case-insensitive and tolerates a leading command name, so both
//! `"sea on"` and `"/wdepth SEA on"` are accepted.

use crate::config::{ConfigStore, SubjectConfig};
use crate::constants::app_info;
use crate::constants::world::MAX_TEST_DEPTH;
use crate::errors::CommandError;
use crate::gauge::round_half_up;
use crate::tracking::TestMeasurement;
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

/// Name of the configuration command
pub const WDEPTH: &str = "wdepth";

/// Name of the forced measurement command
pub const TESTDEPTH: &str = "testdepth";

/// Usage lines shown on malformed input
pub mod usage {
    pub const WDEPTH: &str = "/wdepth <on | off | sea | decimal | credits> [value]";
    pub const SEA: &str = "/wdepth sea <on | off>";
    pub const DECIMAL: &str = "/wdepth decimal <on | off>";
    pub const TESTDEPTH: &str = "/testdepth [depth]";
}

/// Depth used by `testdepth` without an argument
pub const DEFAULT_TEST_DEPTH: f64 = 10.0;

/// Color class of a reply line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Failure,
    Info,
    Title,
}

impl Tone {
    pub fn hex(&self) -> &'static str {
        match self {
            Tone::Success => "#55ff55",
            Tone::Failure => "#ff5555",
            Tone::Info => "#aaaaaa",
            Tone::Title => "#ffaa00",
        }
    }
}

/// One line of a command reply
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyLine {
    pub text: String,
    pub tone: Tone,
}

impl ReplyLine {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// Lines sent back to the player
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandReply {
    pub lines: Vec<ReplyLine>,
    /// Input was rejected and nothing changed
    pub rejected: bool,
}

impl CommandReply {
    fn single(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            lines: vec![ReplyLine::new(text, tone)],
            rejected: false,
        }
    }

    fn push(&mut self, text: impl Into<String>, tone: Tone) {
        self.lines.push(ReplyLine::new(text, tone));
    }

    /// Reply for a rejected command
    pub fn from_error(err: &CommandError) -> Self {
        let mut reply = Self {
            rejected: true,
            ..Self::default()
        };
        match err {
            CommandError::UnknownSubcommand(_) => {
                reply.push(err.to_string(), Tone::Failure);
                reply.push(format!("Usage: {}", usage::WDEPTH), Tone::Info);
            }
            _ => reply.push(err.to_string(), Tone::Failure),
        }
        reply
    }
}

impl fmt::Display for CommandReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", line.text)?;
        }
        Ok(())
    }
}

/// Parsed `wdepth` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthCommand {
    ShowSettings,
    SetEnabled(bool),
    SetReferenceLevel(bool),
    SetDecimal(bool),
    Credits,
}

/// Split input into lowercase words without the leading command name
fn arguments(input: &str, command: &str) -> Vec<String> {
    let mut args: Vec<String> = input.split_whitespace().map(str::to_lowercase).collect();
    if let Some(first) = args.first() {
        if first.trim_start_matches('/') == command {
            args.remove(0);
        }
    }
    args
}

fn parse_switch(value: Option<&String>, usage: &'static str) -> Result<bool, CommandError> {
    match value.map(String::as_str) {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        _ => Err(CommandError::Usage(usage)),
    }
}

/// Parse a `wdepth` command line
pub fn parse_wdepth(input: &str) -> Result<DepthCommand, CommandError> {
    let args = arguments(input, WDEPTH);
    let Some(subcommand) = args.first() else {
        return Ok(DepthCommand::ShowSettings);
    };

    match subcommand.as_str() {
        "on" => Ok(DepthCommand::SetEnabled(true)),
        "off" => Ok(DepthCommand::SetEnabled(false)),
        "credits" => Ok(DepthCommand::Credits),
        "sea" => parse_switch(args.get(1), usage::SEA).map(DepthCommand::SetReferenceLevel),
        "decimal" => parse_switch(args.get(1), usage::DECIMAL).map(DepthCommand::SetDecimal),
        other => Err(CommandError::UnknownSubcommand(other.to_string())),
    }
}

fn on_off(value: bool) -> &'static str {
    if value { "ON" } else { "OFF" }
}

fn tone_for(value: bool) -> Tone {
    if value { Tone::Success } else { Tone::Failure }
}

/// Settings summary for a subject
pub fn settings_summary(config: &SubjectConfig) -> CommandReply {
    let mut reply = CommandReply::single("=== Underwater Depth HUD Settings ===", Tone::Title);
    let enabled = config.effective_enabled();
    reply.push(format!("HUD Enabled: {}", on_off(enabled)), tone_for(enabled));
    reply.push(
        format!("Sea Level Display: {}", on_off(config.show_reference_level)),
        tone_for(config.show_reference_level),
    );
    reply.push(
        format!("Decimal Mode: {}", on_off(config.decimal_precision)),
        tone_for(config.decimal_precision),
    );
    reply.push(
        "Commands: /wdepth <on | off | sea | decimal | credits>",
        Tone::Info,
    );
    reply
}

/// Apply a parsed command to the subject's configuration
pub fn apply_wdepth(store: &ConfigStore, subject: Uuid, command: DepthCommand) -> CommandReply {
    debug!(subject = %subject, ?command, "Applying wdepth command");
    match command {
        DepthCommand::ShowSettings => settings_summary(&store.get_or_default(subject)),
        DepthCommand::Credits => CommandReply::single(
            format!("Water Depth Gauge {}", app_info::version()),
            Tone::Title,
        ),
        DepthCommand::SetEnabled(enabled) => {
            store.update(subject, |config| config.enabled = enabled);
            info!(subject = %subject, enabled, "Gauge toggled");
            if enabled {
                CommandReply::single("Underwater depth HUD enabled", Tone::Success)
            } else {
                CommandReply::single("Underwater depth HUD disabled", Tone::Failure)
            }
        }
        DepthCommand::SetReferenceLevel(enabled) => {
            store.update(subject, |config| config.show_reference_level = enabled);
            if enabled {
                CommandReply::single("Sea level display enabled", Tone::Success)
            } else {
                CommandReply::single("Sea level display disabled", Tone::Failure)
            }
        }
        DepthCommand::SetDecimal(enabled) => {
            store.update(subject, |config| config.decimal_precision = enabled);
            if enabled {
                CommandReply::single("Decimal display enabled (e.g., 3.1m)", Tone::Success)
            } else {
                CommandReply::single("Decimal display disabled (whole numbers only)", Tone::Failure)
            }
        }
    }
}

/// Parse and apply a `wdepth` command line; rejected input mutates nothing
pub fn run_wdepth(store: &ConfigStore, subject: Uuid, input: &str) -> CommandReply {
    match parse_wdepth(input) {
        Ok(command) => apply_wdepth(store, subject, command),
        Err(err) => {
            debug!(subject = %subject, error = %err, "Rejected wdepth command");
            CommandReply::from_error(&err)
        }
    }
}

/// Parse a `testdepth` command line and clamp the depth to the test range
///
/// Accepts `12`, `--depth=12` and `--depth 12`; no argument means 10.
pub fn parse_test_depth(input: &str) -> Result<f64, CommandError> {
    let args = arguments(input, TESTDEPTH);
    let raw = match args.as_slice() {
        [] => return Ok(DEFAULT_TEST_DEPTH),
        [flag, value] if flag == "--depth" => value.as_str(),
        [single] => single.strip_prefix("--depth=").unwrap_or(single.as_str()),
        _ => return Err(CommandError::Usage(usage::TESTDEPTH)),
    };

    let depth: f64 = raw
        .parse()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))?;
    if depth.is_nan() {
        return Err(CommandError::InvalidNumber(raw.to_string()));
    }
    Ok(depth.clamp(0.0, MAX_TEST_DEPTH))
}

/// Reply after a forced measurement reached the display
pub fn test_depth_reply(measurement: &TestMeasurement) -> CommandReply {
    let mut reply = CommandReply::single(
        format!(
            "Depth HUD shown with depth: {}m",
            round_half_up(measurement.depth) as i64
        ),
        Tone::Success,
    );
    reply.push("Use /testdepth --depth=0 to test surface", Tone::Info);
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wdepth() {
        assert_eq!(parse_wdepth("").unwrap(), DepthCommand::ShowSettings);
        assert_eq!(parse_wdepth("wdepth").unwrap(), DepthCommand::ShowSettings);
        assert_eq!(parse_wdepth("ON").unwrap(), DepthCommand::SetEnabled(true));
        assert_eq!(parse_wdepth("/wdepth off").unwrap(), DepthCommand::SetEnabled(false));
        assert_eq!(
            parse_wdepth("wdepth Sea OFF").unwrap(),
            DepthCommand::SetReferenceLevel(false)
        );
        assert_eq!(parse_wdepth("decimal on").unwrap(), DepthCommand::SetDecimal(true));
        assert_eq!(parse_wdepth("credits").unwrap(), DepthCommand::Credits);
    }

    #[test]
    fn test_parse_wdepth_errors() {
        assert_eq!(parse_wdepth("sea"), Err(CommandError::Usage(usage::SEA)));
        assert_eq!(parse_wdepth("decimal maybe"), Err(CommandError::Usage(usage::DECIMAL)));
        assert_eq!(
            parse_wdepth("loud"),
            Err(CommandError::UnknownSubcommand("loud".to_string()))
        );
    }

    #[test]
    fn test_rejected_command_mutates_nothing() {
        let store = ConfigStore::new();
        let id = Uuid::new_v4();

        let reply = run_wdepth(&store, id, "sea sideways");
        assert!(reply.rejected);
        assert_eq!(reply.to_string(), "Usage: /wdepth sea <on | off>");
        assert!(store.get(id).is_none());

        let reply = run_wdepth(&store, id, "volume 3");
        assert_eq!(reply.lines.len(), 2);
        assert_eq!(reply.lines[0].text, "Unknown subcommand: volume");
        assert!(store.get(id).is_none());
    }

    #[test]
    fn test_apply_toggles() {
        let store = ConfigStore::new();
        let id = Uuid::new_v4();

        run_wdepth(&store, id, "off");
        assert!(!store.get_or_default(id).enabled);

        run_wdepth(&store, id, "sea off");
        run_wdepth(&store, id, "decimal on");
        let config = store.get_or_default(id);
        assert!(!config.show_reference_level);
        assert!(config.decimal_precision);

        let summary = run_wdepth(&store, id, "").to_string();
        assert!(summary.contains("HUD Enabled: OFF"));
        assert!(summary.contains("Sea Level Display: OFF"));
        assert!(summary.contains("Decimal Mode: ON"));
    }

    #[test]
    fn test_summary_reports_zero_opacity_as_off() {
        let store = ConfigStore::new();
        let id = Uuid::new_v4();
        store.update(id, |config| config.set_opacity(0));
        assert!(store.get_or_default(id).enabled);

        let summary = run_wdepth(&store, id, "wdepth").to_string();
        assert!(summary.contains("HUD Enabled: OFF"));
    }

    #[test]
    fn test_parse_test_depth() {
        assert_eq!(parse_test_depth("").unwrap(), DEFAULT_TEST_DEPTH);
        assert_eq!(parse_test_depth("testdepth 12.5").unwrap(), 12.5);
        assert_eq!(parse_test_depth("--depth=30").unwrap(), 30.0);
        assert_eq!(parse_test_depth("--depth 40").unwrap(), 40.0);
        assert_eq!(parse_test_depth("200").unwrap(), MAX_TEST_DEPTH);
        assert_eq!(parse_test_depth("-3").unwrap(), 0.0);
        assert!(matches!(
            parse_test_depth("deep"),
            Err(CommandError::InvalidNumber(_))
        ));
        assert!(parse_test_depth("1 2 3").is_err());
    }

    #[test]
    fn test_test_depth_reply_rounds() {
        let reply = test_depth_reply(&TestMeasurement {
            depth: 12.5,
            created: true,
        });
        assert_eq!(reply.lines[0].text, "Depth HUD shown with depth: 13m");
    }
}
