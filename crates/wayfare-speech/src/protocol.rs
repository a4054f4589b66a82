//! Wire types for the recognizer's JSON framing.
//!
//! Outbound: audio frames with a header (app id + stream status), an
//! optional parameter block on the first frame, and a base64 audio payload.
//! Inbound: recognition events whose result text is itself base64-encoded
//! JSON carrying the word sequence and replace-range markers.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::types::SpeechError;

/// First frame of a stream: carries the engine parameter block.
pub const STATUS_FIRST: u8 = 0;
/// Continuation frame.
pub const STATUS_CONTINUE: u8 = 1;
/// Final frame (outbound: empty audio; inbound: terminal result).
pub const STATUS_LAST: u8 = 2;

// ─────────────────────────────────────────────────────────────────────────────
// Outbound frames
// ─────────────────────────────────────────────────────────────────────────────

/// One outbound message in the audio stream.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundFrame {
    /// Stream header: application id and frame status.
    pub header: FrameHeader,
    /// Engine configuration, present only on the first frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<RecognitionParameter>,
    /// Audio chunk payload.
    pub payload: FramePayload,
}

/// Header of an outbound frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameHeader {
    /// Recognizer application identifier.
    pub app_id: String,
    /// Frame status (`STATUS_FIRST` / `STATUS_CONTINUE` / `STATUS_LAST`).
    pub status: u8,
}

/// Engine configuration block sent with the first frame.
#[derive(Debug, Clone, Serialize)]
pub struct RecognitionParameter {
    /// Recognition engine settings.
    pub iat: IatParameter,
}

/// Recognition engine settings.
#[derive(Debug, Clone, Serialize)]
pub struct IatParameter {
    /// Recognition domain.
    pub domain: String,
    /// Recognition language.
    pub language: String,
    /// Accent variant.
    pub accent: String,
    /// Dynamic correction mode; `wpgs` enables revisable partial results.
    pub dwa: String,
    /// Result delivery format.
    pub result: ResultFormat,
}

/// Requested encoding of inbound results.
#[derive(Debug, Clone, Serialize)]
pub struct ResultFormat {
    /// Text encoding.
    pub encoding: String,
    /// Compression of the result payload.
    pub compress: String,
    /// Serialization format.
    pub format: String,
}

impl ResultFormat {
    /// Plain UTF-8 JSON, uncompressed.
    #[must_use]
    pub fn utf8_json() -> Self {
        Self {
            encoding: "utf8".to_string(),
            compress: "raw".to_string(),
            format: "json".to_string(),
        }
    }
}

/// Payload wrapper of an outbound frame.
#[derive(Debug, Clone, Serialize)]
pub struct FramePayload {
    /// The audio chunk.
    pub audio: AudioFrame,
}

/// One base64-encoded audio chunk with its framing metadata.
#[derive(Debug, Clone, Serialize)]
pub struct AudioFrame {
    /// Codec identifier (`raw` or `lame`).
    pub encoding: String,
    /// Strictly increasing sequence number, starting at 0.
    pub seq: u32,
    /// Frame status, mirrors the header status.
    pub status: u8,
    /// Base64 audio bytes; empty on the final frame.
    pub audio: String,
    /// Sample rate, when the container declared one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    /// Channel count, when the container declared one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u16>,
    /// Bit depth, when the container declared one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_depth: Option<u16>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Inbound events
// ─────────────────────────────────────────────────────────────────────────────

/// One inbound recognition event.
#[derive(Debug, Deserialize)]
pub struct RecognizerEvent {
    /// Response header with the recognizer's status code.
    pub header: EventHeader,
    /// Result payload, absent on pure status messages.
    #[serde(default)]
    pub payload: Option<EventPayload>,
}

/// Header of an inbound event.
#[derive(Debug, Deserialize)]
pub struct EventHeader {
    /// Response code; anything non-zero is a recognizer failure.
    #[serde(default)]
    pub code: i64,
    /// Human-readable message accompanying a failure code.
    #[serde(default)]
    pub message: Option<String>,
}

/// Payload of an inbound event.
#[derive(Debug, Deserialize)]
pub struct EventPayload {
    /// Recognition result, when the event carries one.
    #[serde(default)]
    pub result: Option<EventResult>,
}

/// Recognition result envelope.
#[derive(Debug, Deserialize)]
pub struct EventResult {
    /// Base64-encoded JSON result body.
    #[serde(default)]
    pub text: Option<String>,
    /// Stream status; `STATUS_LAST` marks the terminal result.
    #[serde(default)]
    pub status: Option<u8>,
}

impl EventResult {
    /// Decode the base64 result body into a [`ResultText`].
    ///
    /// Returns `Ok(None)` when the event carries no text.
    pub fn decode_text(&self) -> Result<Option<ResultText>, SpeechError> {
        let Some(text) = self.text.as_deref() else {
            return Ok(None);
        };
        let raw = BASE64
            .decode(text)
            .map_err(|e| SpeechError::Protocol(format!("result text base64: {e}")))?;
        let decoded = serde_json::from_slice(&raw)
            .map_err(|e| SpeechError::Protocol(format!("result text JSON: {e}")))?;
        Ok(Some(decoded))
    }

    /// Whether this result signals stream completion.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.status == Some(STATUS_LAST)
    }
}

/// Decoded result body: the word sequence plus replace-range markers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultText {
    /// Word slices in utterance order.
    #[serde(default)]
    pub ws: Vec<WordSlice>,
    /// Partial-result mode marker; `rpl` signals a replace operation.
    #[serde(default)]
    pub pgs: Option<String>,
    /// Replace range `[start, end]`, segment indices inclusive. Kept as
    /// raw JSON numbers; non-integer values are truncated rather than
    /// rejected.
    #[serde(default)]
    pub rg: Option<Vec<serde_json::Number>>,
}

/// One slice of the word sequence.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WordSlice {
    /// Candidate words; the recognizer lists the best candidate first.
    #[serde(default)]
    pub cw: Vec<CandidateWord>,
}

/// A single candidate word.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateWord {
    /// The word text.
    #[serde(default)]
    pub w: String,
}

impl ResultText {
    /// Flatten the word sequence into a single text fragment.
    #[must_use]
    pub fn fragment(&self) -> String {
        self.ws
            .iter()
            .flat_map(|slice| slice.cw.iter())
            .map(|cw| cw.w.as_str())
            .collect()
    }

    /// Clamped replace range, when this result signals a well-formed
    /// replace operation.
    ///
    /// Start is clamped to `>= 0` and end to `>= start`. A `pgs` of `rpl`
    /// without a two-element range yields `None`, falling back to the
    /// growth/redundancy handling.
    #[must_use]
    pub fn replace_range(&self) -> Option<(usize, usize)> {
        if self.pgs.as_deref() != Some("rpl") {
            return None;
        }
        let rg = self.rg.as_deref()?;
        if rg.len() != 2 {
            return None;
        }
        let start = usize::try_from(range_index(&rg[0]).max(0)).ok()?;
        let end = usize::try_from(range_index(&rg[1]).max(0)).ok()?.max(start);
        Some((start, end))
    }
}

/// Coerce a JSON number to a segment index, truncating fractions.
#[allow(clippy::cast_possible_truncation)]
fn range_index(n: &serde_json::Number) -> i64 {
    n.as_i64()
        .unwrap_or_else(|| n.as_f64().map_or(0, |v| v as i64))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
