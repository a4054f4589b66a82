//! Transcription facade.
//!
//! [`SpeechService`] is the one entry point callers use: it gates on
//! configured credentials, signs a fresh endpoint per attempt, runs the
//! streaming session, and collapses every failure into a single opaque
//! user-facing error. The underlying cause is logged, never surfaced.

use chrono::Utc;
use tracing::{error, info};
use wayfare_settings::SpeechSettings;

use crate::audio;
use crate::session::{SessionConfig, StreamingSession};
use crate::signer::{Credentials, signed_endpoint};
use crate::transport::{RecognizerConnector, WsConnector};
use crate::types::SpeechError;

/// Transcript returned when recognizer credentials are not configured.
pub const FALLBACK_TRANSCRIPT: &str = "请在设置中配置科大讯飞语音识别密钥后重新尝试。";

/// Opaque message for any transcription failure.
pub const TRANSCRIPTION_FAILED: &str = "语音识别失败，请稍后重试。";

/// Speech transcription entry point.
pub struct SpeechService {
    settings: SpeechSettings,
    connector: Box<dyn RecognizerConnector>,
}

impl SpeechService {
    /// Create a service backed by a live WebSocket connector.
    #[must_use]
    pub fn new(settings: SpeechSettings) -> Self {
        Self::with_connector(settings, Box::new(WsConnector))
    }

    /// Create a service with an explicit connector.
    #[must_use]
    pub fn with_connector(settings: SpeechSettings, connector: Box<dyn RecognizerConnector>) -> Self {
        Self {
            settings,
            connector,
        }
    }

    /// Transcribe one uploaded audio buffer.
    ///
    /// Without configured credentials this resolves immediately with
    /// [`FALLBACK_TRANSCRIPT`] and never opens a connection. Every failure
    /// on the live path collapses to [`SpeechError::TranscriptionFailed`]
    /// carrying [`TRANSCRIPTION_FAILED`]; the cause goes to the log.
    pub async fn transcribe(&self, data: &[u8], mime_type: &str) -> Result<String, SpeechError> {
        if !self.settings.has_credentials() {
            info!("recognizer credentials not configured, returning fallback transcript");
            return Ok(FALLBACK_TRANSCRIPT.to_string());
        }

        match self.transcribe_inner(data, mime_type).await {
            Ok(transcript) => {
                info!(chars = transcript.chars().count(), "transcription completed");
                Ok(transcript)
            }
            Err(e) => {
                error!(error = %e, "transcription failed");
                Err(SpeechError::TranscriptionFailed(
                    TRANSCRIPTION_FAILED.to_string(),
                ))
            }
        }
    }

    async fn transcribe_inner(
        &self,
        data: &[u8],
        mime_type: &str,
    ) -> Result<String, SpeechError> {
        let payload = audio::normalize(data, mime_type)?;

        // Signatures are date-scoped; sign fresh for every attempt.
        let credentials = Credentials {
            app_id: self.settings.app_id.clone(),
            api_key: self.settings.api_key.clone(),
            api_secret: self.settings.api_secret.clone(),
        };
        let endpoint = signed_endpoint(
            &credentials,
            &self.settings.host,
            &self.settings.path,
            Utc::now(),
        );

        let session = StreamingSession::new(SessionConfig::from_settings(&self.settings));
        session
            .transcribe(self.connector.as_ref(), &endpoint, &payload)
            .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
