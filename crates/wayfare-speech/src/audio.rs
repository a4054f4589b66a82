//! Upload normalization: extract PCM parameters from WAV containers,
//! pass everything else through untouched.

use crate::types::SpeechError;

/// Size of the fixed RIFF/WAVE header stripped before framing.
pub const WAV_HEADER_LEN: usize = 44;

/// Codec identifier sent to the recognizer alongside each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    /// Uncompressed PCM (also the default for unknown containers).
    Raw,
    /// MP3-compressed audio.
    Lame,
}

impl AudioEncoding {
    /// Wire name of the encoding.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Lame => "lame",
        }
    }
}

/// Normalized audio ready for framing. Immutable once built.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    /// Audio bytes with any container header stripped.
    pub data: Vec<u8>,
    /// Codec identifier for the recognizer.
    pub encoding: AudioEncoding,
    /// Sample rate declared by the container, if known.
    pub sample_rate: Option<u32>,
    /// Channel count declared by the container, if known.
    pub channels: Option<u16>,
    /// Bit depth declared by the container, if known.
    pub bit_depth: Option<u16>,
}

/// Normalize an uploaded audio buffer for streaming.
///
/// WAV uploads have their 44-byte header parsed (channel count, sample rate,
/// bit depth at the fixed RIFF offsets) and stripped. MP3 uploads pass
/// through marked `lame`. Anything else passes through as `raw` with no
/// declared parameters — the recognizer applies its own defaults.
pub fn normalize(data: &[u8], mime_type: &str) -> Result<AudioPayload, SpeechError> {
    if mime_type.contains("wav") {
        if data.len() <= WAV_HEADER_LEN {
            return Err(SpeechError::InvalidAudioPayload);
        }

        let channels = u16::from_le_bytes([data[22], data[23]]);
        let sample_rate = u32::from_le_bytes([data[24], data[25], data[26], data[27]]);
        let bit_depth = u16::from_le_bytes([data[34], data[35]]);

        return Ok(AudioPayload {
            data: data[WAV_HEADER_LEN..].to_vec(),
            encoding: AudioEncoding::Raw,
            sample_rate: Some(sample_rate),
            channels: Some(channels),
            bit_depth: Some(bit_depth),
        });
    }

    if mime_type.contains("mp3") {
        return Ok(AudioPayload {
            data: data.to_vec(),
            encoding: AudioEncoding::Lame,
            sample_rate: None,
            channels: None,
            bit_depth: None,
        });
    }

    Ok(AudioPayload {
        data: data.to_vec(),
        encoding: AudioEncoding::Raw,
        sample_rate: None,
        channels: None,
        bit_depth: None,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
