//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`WayfareSettings::default()`]
//! 2. If `~/.wayfare/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::WayfareSettings;

/// Resolve the path to the settings file (`~/.wayfare/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".wayfare").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<WayfareSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<WayfareSettings> {
    let defaults = serde_json::to_value(WayfareSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: WayfareSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Integers must parse and fall within range; invalid values are silently
/// ignored (fall back to file/default).
pub fn apply_env_overrides(settings: &mut WayfareSettings) {
    if let Some(v) = read_env_string("WAYFARE_IFLYTEK_APP_ID") {
        settings.speech.app_id = v;
    }
    if let Some(v) = read_env_string("WAYFARE_IFLYTEK_API_KEY") {
        settings.speech.api_key = v;
    }
    if let Some(v) = read_env_string("WAYFARE_IFLYTEK_API_SECRET") {
        settings.speech.api_secret = v;
    }
    if let Some(v) = read_env_string("WAYFARE_SPEECH_HOST") {
        settings.speech.host = v;
    }
    if let Some(v) = read_env_string("WAYFARE_SPEECH_LANGUAGE") {
        settings.speech.language = v;
    }
    if let Some(v) = read_env_usize("WAYFARE_SPEECH_FRAME_SIZE", 1, 65_536) {
        settings.speech.frame_size = v;
    }
    if let Some(v) = read_env_u64("WAYFARE_SPEECH_FRAME_INTERVAL_MS", 1, 10_000) {
        settings.speech.frame_interval_ms = v;
    }
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    parse_bounded_u64(std::env::var(name).ok().as_deref(), min, max)
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    parse_bounded_u64(
        std::env::var(name).ok().as_deref(),
        min as u64,
        max as u64,
    )
    .map(|v| v as usize)
}

fn parse_bounded_u64(value: Option<&str>, min: u64, max: u64) -> Option<u64> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| (min..=max).contains(v))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
