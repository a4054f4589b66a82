//! Core types for the speech transcription pipeline.

/// Errors that can occur during speech transcription.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// Malformed or too-short uncompressed audio container.
    #[error("invalid WAV audio payload")]
    InvalidAudioPayload,

    /// The recognizer connection could not be established or errored mid-flight.
    #[error("recognizer connection error: {0}")]
    Transport(String),

    /// The recognizer closed the connection before a terminal result arrived.
    #[error("recognizer connection closed unexpectedly (code: {})", fmt_close_code(*code))]
    ClosedPrematurely {
        /// WebSocket close code, if the peer supplied one.
        code: Option<u16>,
    },

    /// The recognizer reported a non-zero response code.
    #[error("recognizer error {code}: {message}")]
    Recognizer {
        /// Recognizer-supplied response code.
        code: i64,
        /// Recognizer-supplied error message.
        message: String,
    },

    /// A recognizer message could not be decoded.
    #[error("malformed recognizer message: {0}")]
    Protocol(String),

    /// User-facing failure emitted by the facade after logging the cause.
    #[error("{0}")]
    TranscriptionFailed(String),
}

fn fmt_close_code(code: Option<u16>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}
