//! Settings types with compiled defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root settings for the Wayfare backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WayfareSettings {
    /// Settings schema version.
    pub version: String,
    /// Product name, used in log output.
    pub name: String,
    /// Speech recognizer settings.
    pub speech: SpeechSettings,
}

impl Default for WayfareSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: "wayfare".to_string(),
            speech: SpeechSettings::default(),
        }
    }
}

/// Speech recognizer connection, credential, and framing settings.
///
/// Credentials default to empty strings; an empty value means "not
/// configured" and routes transcription to the static fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpeechSettings {
    /// Recognizer application identifier.
    pub app_id: String,
    /// Recognizer API key (embedded in the authorization header).
    pub api_key: String,
    /// Recognizer API secret (HMAC signing key).
    pub api_secret: String,
    /// Recognizer WebSocket host.
    pub host: String,
    /// Recognizer endpoint path.
    pub path: String,
    /// Bytes of audio per outbound frame.
    pub frame_size: usize,
    /// Pacing delay between outbound frames, in milliseconds.
    pub frame_interval_ms: u64,
    /// Recognition language.
    pub language: String,
    /// Recognition domain.
    pub domain: String,
    /// Recognition accent.
    pub accent: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            host: "iat.xf-yun.com".to_string(),
            path: "/v1".to_string(),
            frame_size: 1280,
            frame_interval_ms: 40,
            language: "zh_cn".to_string(),
            domain: "slm".to_string(),
            accent: "mandarin".to_string(),
        }
    }
}

impl SpeechSettings {
    /// Pacing delay between outbound frames.
    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Whether all three recognizer credentials are present.
    ///
    /// A partially configured credential set counts as unconfigured: the
    /// live path needs every value, so "any missing" gates to the fallback.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.app_id.trim().is_empty()
            && !self.api_key.trim().is_empty()
            && !self.api_secret.trim().is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
