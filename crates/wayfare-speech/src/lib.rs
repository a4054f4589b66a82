//! # wayfare-speech
//!
//! Streaming speech transcription for the Wayfare travel planner.
//!
//! One transcription request runs a single bidirectional WebSocket exchange
//! with the recognizer and resolves exactly once:
//!
//! ```text
//! audio bytes + MIME → normalize (strip WAV header / passthrough)
//! → sign connection URL (HMAC-SHA256, date-scoped)
//! → stream paced base64 audio frames (status 0 / 1 / 2)
//! → merge incremental partial results (replace ranges, growth, duplicates)
//! → final transcript string
//! ```
//!
//! When recognizer credentials are not configured, [`SpeechService`] returns
//! a fixed placeholder transcript without touching the network.

pub mod audio;
pub mod merge;
pub mod protocol;
pub mod service;
pub mod session;
pub mod signer;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use service::SpeechService;
pub use types::SpeechError;
