//! Runtime configuration for the maintenance engine.
//!
//! The values here mirror the `[CONFIG]` section of the plugin's INI file;
//! loading/parsing lives in `upkeep-core`, this crate only carries the types.

use serde::{Deserialize, Serialize};

/// Log verbosity as exposed to users in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Parse the config-file spelling. Case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Some(Self::Off),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

/// Engine configuration, loaded from the `[CONFIG]` INI section.
///
/// Missing file or keys fall back to these defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log verbosity.
    pub log_level: LogLevel,
    /// Suppress persistent visual effects on maintained variants.
    pub silence_fx: bool,
    /// Abort a persisted record on a malformed identity instead of
    /// defaulting it to zero.
    pub strict_parse: bool,
    /// Enable the stricter reconciliation audit (effect-count parity and
    /// the practically-infinite duration gate).
    pub strict_audit: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            silence_fx: false,
            strict_parse: true,
            strict_audit: false,
        }
    }
}
