//! One streaming exchange with the recognizer.
//!
//! A session connects, paces the audio out in fixed-size frames, folds the
//! inbound partial results into a [`TranscriptAccumulator`], and resolves
//! exactly once: either the trimmed final transcript or the first error
//! observed. Whichever terminal event arrives first wins; everything after
//! it is ignored.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio::time::sleep;
use tracing::{debug, trace};
use wayfare_settings::SpeechSettings;

use crate::audio::AudioPayload;
use crate::merge::TranscriptAccumulator;
use crate::protocol::{
    AudioFrame, FrameHeader, FramePayload, IatParameter, OutboundFrame, RecognitionParameter,
    RecognizerEvent, ResultFormat, STATUS_CONTINUE, STATUS_FIRST, STATUS_LAST,
};
use crate::signer::SignedEndpoint;
use crate::transport::{RecognizerConnector, WireEvent};
use crate::types::SpeechError;

/// Lifecycle of a session. Transitions are strictly forward; `Completed`
/// and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the WebSocket handshake.
    Connecting,
    /// Frames going out, results coming in.
    Streaming,
    /// Final result received; transcript resolved.
    Completed,
    /// Terminal error observed before the final result.
    Failed,
}

/// Framing and engine parameters for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Application id sent in every frame header.
    pub app_id: String,
    /// Bytes of audio per frame.
    pub frame_size: usize,
    /// Pacing delay between frames.
    pub frame_interval: Duration,
    /// Recognition language.
    pub language: String,
    /// Recognition domain.
    pub domain: String,
    /// Recognition accent.
    pub accent: String,
}

impl SessionConfig {
    /// Build a session config from the speech settings.
    #[must_use]
    pub fn from_settings(settings: &SpeechSettings) -> Self {
        Self {
            app_id: settings.app_id.clone(),
            frame_size: settings.frame_size,
            frame_interval: settings.frame_interval(),
            language: settings.language.clone(),
            domain: settings.domain.clone(),
            accent: settings.accent.clone(),
        }
    }
}

/// Driver for a single transcription exchange.
#[derive(Debug)]
pub struct StreamingSession {
    config: SessionConfig,
}

impl StreamingSession {
    /// Create a session with the given framing parameters.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run the exchange to completion and return the final transcript.
    ///
    /// Resolves on the first terminal event: the recognizer's last result,
    /// a non-zero recognizer code, a premature close, or a transport
    /// failure. The connection is closed best-effort afterwards.
    pub async fn transcribe(
        &self,
        connector: &dyn RecognizerConnector,
        endpoint: &SignedEndpoint,
        payload: &AudioPayload,
    ) -> Result<String, SpeechError> {
        let mut state = SessionState::Connecting;
        debug!(?state, "session started");

        let frames = self.build_frames(payload)?;
        let (mut sink, mut events) = match connector.connect(endpoint).await {
            Ok(halves) => halves,
            Err(e) => {
                advance(&mut state, SessionState::Failed);
                return Err(e);
            }
        };
        advance(&mut state, SessionState::Streaming);

        let mut accumulator = TranscriptAccumulator::new();
        let interval = self.config.frame_interval;

        let outcome = {
            let send = async {
                for (index, frame) in frames.iter().enumerate() {
                    if index > 0 {
                        sleep(interval).await;
                    }
                    sink.send_frame(frame.clone()).await?;
                }
                trace!(frames = frames.len(), "all frames sent");
                Ok::<(), SpeechError>(())
            };
            tokio::pin!(send);
            let mut send_done = false;

            loop {
                tokio::select! {
                    sent = &mut send, if !send_done => {
                        send_done = true;
                        if let Err(e) = sent {
                            break Err(e);
                        }
                    }
                    event = events.next_event() => match event {
                        Some(Ok(WireEvent::Message(text))) => {
                            match handle_message(&text, &mut accumulator) {
                                Ok(false) => {}
                                Ok(true) => break Ok(accumulator.text().trim().to_string()),
                                Err(e) => break Err(e),
                            }
                        }
                        Some(Ok(WireEvent::Closed { code })) => {
                            break Err(SpeechError::ClosedPrematurely { code });
                        }
                        Some(Err(e)) => break Err(e),
                        None => break Err(SpeechError::ClosedPrematurely { code: None }),
                    }
                }
            }
        };

        advance(
            &mut state,
            if outcome.is_ok() {
                SessionState::Completed
            } else {
                SessionState::Failed
            },
        );

        if let Err(e) = sink.close().await {
            debug!(error = %e, "close after resolution failed");
        }
        outcome
    }

    /// Serialize the full outbound frame sequence for a payload.
    ///
    /// The first frame carries the engine parameter block and the payload's
    /// PCM parameters; a trailing empty frame with the last status ends the
    /// stream. An empty payload still produces one (empty) audio frame so
    /// the parameter block is always sent.
    pub(crate) fn build_frames(&self, payload: &AudioPayload) -> Result<Vec<String>, SpeechError> {
        let frame_size = self.config.frame_size.max(1);
        let chunks: Vec<&[u8]> = if payload.data.is_empty() {
            vec![&[]]
        } else {
            payload.data.chunks(frame_size).collect()
        };

        let mut frames = Vec::with_capacity(chunks.len() + 1);
        for (index, chunk) in chunks.iter().enumerate() {
            let status = if index == 0 { STATUS_FIRST } else { STATUS_CONTINUE };
            frames.push(self.serialize_frame(
                status,
                index as u32,
                BASE64.encode(chunk),
                payload,
                index == 0,
            )?);
        }
        frames.push(self.serialize_frame(
            STATUS_LAST,
            chunks.len() as u32,
            String::new(),
            payload,
            false,
        )?);
        Ok(frames)
    }

    fn serialize_frame(
        &self,
        status: u8,
        seq: u32,
        audio: String,
        payload: &AudioPayload,
        with_parameter: bool,
    ) -> Result<String, SpeechError> {
        let frame = OutboundFrame {
            header: FrameHeader {
                app_id: self.config.app_id.clone(),
                status,
            },
            parameter: with_parameter.then(|| RecognitionParameter {
                iat: IatParameter {
                    domain: self.config.domain.clone(),
                    language: self.config.language.clone(),
                    accent: self.config.accent.clone(),
                    dwa: "wpgs".to_string(),
                    result: ResultFormat::utf8_json(),
                },
            }),
            payload: FramePayload {
                audio: AudioFrame {
                    encoding: payload.encoding.as_str().to_string(),
                    seq,
                    status,
                    audio,
                    sample_rate: payload.sample_rate,
                    channels: payload.channels,
                    bit_depth: payload.bit_depth,
                },
            },
        };
        serde_json::to_string(&frame)
            .map_err(|e| SpeechError::Protocol(format!("frame serialization: {e}")))
    }
}

fn advance(state: &mut SessionState, next: SessionState) {
    debug!(from = ?state, to = ?next, "session state");
    *state = next;
}

/// Fold one inbound message into the accumulator.
///
/// Returns `Ok(true)` when the message carried the terminal result.
fn handle_message(
    text: &str,
    accumulator: &mut TranscriptAccumulator,
) -> Result<bool, SpeechError> {
    let event: RecognizerEvent = serde_json::from_str(text)
        .map_err(|e| SpeechError::Protocol(format!("event JSON: {e}")))?;

    if event.header.code != 0 {
        return Err(SpeechError::Recognizer {
            code: event.header.code,
            message: event.header.message.unwrap_or_default(),
        });
    }

    let Some(result) = event.payload.and_then(|p| p.result) else {
        return Ok(false);
    };
    if let Some(decoded) = result.decode_text()? {
        accumulator.apply(&decoded);
        trace!(transcript = %accumulator.text(), "partial result applied");
    }
    Ok(result.is_last())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
