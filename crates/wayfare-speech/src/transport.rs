//! Recognizer transport: trait seams plus the tokio-tungstenite
//! implementation.
//!
//! The session talks to the recognizer through [`FrameSink`] and
//! [`EventSource`] trait objects produced by a [`RecognizerConnector`], so
//! tests drive it with an in-process scripted recognizer instead of a live
//! connection.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

use crate::signer::SignedEndpoint;
use crate::types::SpeechError;

/// One inbound transport event.
#[derive(Debug)]
pub enum WireEvent {
    /// A text message from the recognizer.
    Message(String),
    /// The peer closed the connection.
    Closed {
        /// Close code, if the peer supplied a close frame.
        code: Option<u16>,
    },
}

/// Outbound half of a recognizer connection.
#[async_trait]
pub trait FrameSink: Send {
    /// Send one serialized frame.
    async fn send_frame(&mut self, frame: String) -> Result<(), SpeechError>;
    /// Close the connection.
    async fn close(&mut self) -> Result<(), SpeechError>;
}

/// Inbound half of a recognizer connection.
#[async_trait]
pub trait EventSource: Send {
    /// Next transport event; `None` once the stream is exhausted.
    async fn next_event(&mut self) -> Option<Result<WireEvent, SpeechError>>;
}

/// Opens recognizer connections for signed endpoints.
#[async_trait]
pub trait RecognizerConnector: Send + Sync {
    /// Establish one connection, returning its two halves.
    async fn connect(
        &self,
        endpoint: &SignedEndpoint,
    ) -> Result<(Box<dyn FrameSink>, Box<dyn EventSource>), SpeechError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// WebSocket implementation
// ─────────────────────────────────────────────────────────────────────────────

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connector backed by tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl RecognizerConnector for WsConnector {
    async fn connect(
        &self,
        endpoint: &SignedEndpoint,
    ) -> Result<(Box<dyn FrameSink>, Box<dyn EventSource>), SpeechError> {
        let (stream, _response) = connect_async(endpoint.url.as_str())
            .await
            .map_err(|e| SpeechError::Transport(e.to_string()))?;
        debug!("recognizer connection established");

        let (write, read) = stream.split();
        Ok((
            Box::new(WsFrameSink { write }),
            Box::new(WsEventSource { read }),
        ))
    }
}

struct WsFrameSink {
    write: SplitSink<WsStream, Message>,
}

#[async_trait]
impl FrameSink for WsFrameSink {
    async fn send_frame(&mut self, frame: String) -> Result<(), SpeechError> {
        self.write
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| SpeechError::Transport(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), SpeechError> {
        self.write
            .close()
            .await
            .map_err(|e| SpeechError::Transport(e.to_string()))
    }
}

struct WsEventSource {
    read: SplitStream<WsStream>,
}

#[async_trait]
impl EventSource for WsEventSource {
    async fn next_event(&mut self) -> Option<Result<WireEvent, SpeechError>> {
        loop {
            return match self.read.next().await? {
                Ok(Message::Text(text)) => Some(Ok(WireEvent::Message(text.to_string()))),
                Ok(Message::Close(frame)) => Some(Ok(WireEvent::Closed {
                    code: frame.map(|f| u16::from(f.code)),
                })),
                // Ping/pong are handled by tungstenite; binary frames are
                // not part of this protocol.
                Ok(_) => continue,
                Err(e) => Some(Err(SpeechError::Transport(e.to_string()))),
            };
        }
    }
}
