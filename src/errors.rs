// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the depth gauge

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result of a world collaborator query
pub type WorldResult<T> = Result<T, WorldError>;

/// Result of a display collaborator call
pub type DisplayResult<T> = Result<T, DisplayError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// World query errors
    World(WorldError),
    /// Display surface errors
    Display(DisplayError),
    /// Settings persistence errors
    Config(ConfigError),
    /// Malformed user command
    Command(CommandError),
    /// The world thread or scheduler is gone
    Shutdown(String),
    /// Generic error with message
    Other(String),
}

/// Failures reported by the host world
#[derive(Debug, Clone, PartialEq)]
pub enum WorldError {
    /// Region cannot be listed right now
    RegionUnavailable(String),
    /// Subject is not present in the world
    SubjectNotFound(String),
    /// Subject exists but a component could not be read
    ComponentUnavailable(String),
    /// Backend error
    Backend(String),
}

/// Failures reported by the display surface
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayError {
    /// Creating the display session failed
    ShowFailed(String),
    /// Pushing field updates failed
    UpdateFailed(String),
    /// Removing the display failed
    HideFailed(String),
    /// Session handle is not known to the surface
    UnknownSession(u64),
}

/// Settings persistence errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Reading or writing the settings file failed
    Io(String),
    /// Settings file is not valid JSON for the expected shape
    Parse(String),
}

/// Rejected user command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Subcommand not recognised
    UnknownSubcommand(String),
    /// Missing or invalid argument; carries the usage line
    Usage(&'static str),
    /// Numeric argument could not be parsed
    InvalidNumber(String),
    /// Subject identifier could not be parsed
    InvalidSubject(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::World(e) => write!(f, "World error: {}", e),
            AppError::Display(e) => write!(f, "Display error: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Command(e) => write!(f, "Command error: {}", e),
            AppError::Shutdown(msg) => write!(f, "Shut down: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::RegionUnavailable(msg) => write!(f, "Region unavailable: {}", msg),
            WorldError::SubjectNotFound(msg) => write!(f, "Subject not found: {}", msg),
            WorldError::ComponentUnavailable(msg) => write!(f, "Component unavailable: {}", msg),
            WorldError::Backend(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::ShowFailed(msg) => write!(f, "Failed to show display: {}", msg),
            DisplayError::UpdateFailed(msg) => write!(f, "Failed to update display: {}", msg),
            DisplayError::HideFailed(msg) => write!(f, "Failed to hide display: {}", msg),
            DisplayError::UnknownSession(id) => write!(f, "Unknown display session {}", id),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "I/O error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownSubcommand(sub) => write!(f, "Unknown subcommand: {}", sub),
            CommandError::Usage(usage) => write!(f, "Usage: {}", usage),
            CommandError::InvalidNumber(arg) => write!(f, "Not a number: {}", arg),
            CommandError::InvalidSubject(arg) => write!(f, "Not a valid subject id: {}", arg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for WorldError {}
impl std::error::Error for DisplayError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for CommandError {}

// Conversions from sub-errors to AppError
impl From<WorldError> for AppError {
    fn from(err: WorldError) -> Self {
        AppError::World(err)
    }
}

impl From<DisplayError> for AppError {
    fn from(err: DisplayError) -> Self {
        AppError::Display(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<CommandError> for AppError {
    fn from(err: CommandError) -> Self {
        AppError::Command(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

// Conversions for I/O and JSON errors
impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Config(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::from(WorldError::RegionUnavailable("default".to_string()));
        assert_eq!(err.to_string(), "World error: Region unavailable: default");

        let err = AppError::from(DisplayError::UnknownSession(7));
        assert_eq!(err.to_string(), "Display error: Unknown display session 7");

        let err = CommandError::Usage("/wdepth sea <on | off>");
        assert_eq!(err.to_string(), "Usage: /wdepth sea <on | off>");
    }

    #[test]
    fn test_json_error_converts_to_parse() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(ConfigError::from(err), ConfigError::Parse(_)));
    }
}
