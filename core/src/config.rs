//! Engine configuration loading.
//!
//! A separate INI file from the mapping store, `[CONFIG]` section only.
//! Missing file or keys fall back to [`EngineConfig::default`]; malformed
//! values are logged and ignored rather than failing the load.

use std::path::Path;

use upkeep_types::{EngineConfig, LogLevel};

use crate::ini::{parse_bool, IniDocument, IniError};

pub const CONFIG_SECTION: &str = "CONFIG";

pub const KEY_LOG_LEVEL: &str = "LogLevel";
pub const KEY_SILENCE_FX: &str = "bSilenceFX";
pub const KEY_STRICT_PARSE: &str = "bStrictParse";
pub const KEY_STRICT_AUDIT: &str = "bStrictAudit";

pub fn load_config(path: &Path) -> Result<EngineConfig, IniError> {
    let doc = IniDocument::load(path)?;
    Ok(config_from_document(&doc))
}

pub fn config_from_document(doc: &IniDocument) -> EngineConfig {
    let mut config = EngineConfig::default();

    if let Some(value) = doc.get(CONFIG_SECTION, KEY_LOG_LEVEL) {
        match LogLevel::parse(value) {
            Some(level) => config.log_level = level,
            None => tracing::warn!("ignoring unknown {KEY_LOG_LEVEL} value `{value}`"),
        }
    }

    let mut read_flag = |key: &str, slot: &mut bool| {
        if let Some(value) = doc.get(CONFIG_SECTION, key) {
            match parse_bool(value) {
                Some(flag) => *slot = flag,
                None => tracing::warn!("ignoring non-boolean {key} value `{value}`"),
            }
        }
    };
    read_flag(KEY_SILENCE_FX, &mut config.silence_fx);
    read_flag(KEY_STRICT_PARSE, &mut config.strict_parse);
    read_flag(KEY_STRICT_AUDIT, &mut config.strict_audit);

    config
}
