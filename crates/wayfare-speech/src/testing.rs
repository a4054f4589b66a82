//! Scripted recognizer doubles for session and service tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio::time::sleep;

use crate::signer::SignedEndpoint;
use crate::transport::{EventSource, FrameSink, RecognizerConnector, WireEvent};
use crate::types::SpeechError;

/// One scripted inbound event with the delay before it is delivered.
pub(crate) struct ScriptedEvent {
    delay: Duration,
    event: Result<WireEvent, SpeechError>,
}

pub(crate) fn scripted_message(delay: Duration, text: &str) -> ScriptedEvent {
    ScriptedEvent {
        delay,
        event: Ok(WireEvent::Message(text.to_string())),
    }
}

pub(crate) fn scripted_close(delay: Duration, code: Option<u16>) -> ScriptedEvent {
    ScriptedEvent {
        delay,
        event: Ok(WireEvent::Closed { code }),
    }
}

pub(crate) fn scripted_transport_error(delay: Duration, message: &str) -> ScriptedEvent {
    ScriptedEvent {
        delay,
        event: Err(SpeechError::Transport(message.to_string())),
    }
}

/// Wire-shaped recognizer event carrying one result fragment.
pub(crate) fn recognizer_message(fragment: &str, last: bool) -> String {
    let body = serde_json::json!({"ws": [{"cw": [{"w": fragment}]}]});
    serde_json::json!({
        "header": {"code": 0},
        "payload": {"result": {
            "text": BASE64.encode(body.to_string()),
            "status": if last { 2 } else { 1 },
        }}
    })
    .to_string()
}

/// Wire-shaped recognizer failure event.
pub(crate) fn recognizer_error_message(code: i64, message: &str) -> String {
    serde_json::json!({"header": {"code": code, "message": message}}).to_string()
}

/// Connector that replays a scripted event sequence and records every
/// frame the session sends.
pub(crate) struct ScriptedConnector {
    script: Mutex<Option<VecDeque<ScriptedEvent>>>,
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
    endpoints: Mutex<Vec<String>>,
}

impl ScriptedConnector {
    pub(crate) fn new(events: Vec<ScriptedEvent>) -> Self {
        Self {
            script: Mutex::new(Some(events.into())),
            sent: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
            endpoints: Mutex::new(Vec::new()),
        }
    }

    /// Frames sent so far, in order.
    pub(crate) fn sent_frames(&self) -> Vec<String> {
        self.sent.lock().expect("sent frames lock").clone()
    }

    /// Whether the session closed the connection.
    pub(crate) fn close_requested(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// URLs this connector was asked to connect to.
    pub(crate) fn endpoints(&self) -> Vec<String> {
        self.endpoints.lock().expect("endpoints lock").clone()
    }
}

#[async_trait]
impl RecognizerConnector for ScriptedConnector {
    async fn connect(
        &self,
        endpoint: &SignedEndpoint,
    ) -> Result<(Box<dyn FrameSink>, Box<dyn EventSource>), SpeechError> {
        self.endpoints
            .lock()
            .expect("endpoints lock")
            .push(endpoint.url.clone());
        let script = self
            .script
            .lock()
            .expect("script lock")
            .take()
            .expect("scripted connector supports a single connection");
        Ok((
            Box::new(ScriptedSink {
                sent: Arc::clone(&self.sent),
                closed: Arc::clone(&self.closed),
            }),
            Box::new(ScriptedSource { script }),
        ))
    }
}

struct ScriptedSink {
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl FrameSink for ScriptedSink {
    async fn send_frame(&mut self, frame: String) -> Result<(), SpeechError> {
        self.sent.lock().expect("sent frames lock").push(frame);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SpeechError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct ScriptedSource {
    script: VecDeque<ScriptedEvent>,
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn next_event(&mut self) -> Option<Result<WireEvent, SpeechError>> {
        // Sleep before popping so a cancelled call does not lose the event,
        // matching the cancellation safety of the real transport.
        let delay = self.script.front()?.delay;
        sleep(delay).await;
        self.script.pop_front().map(|scripted| scripted.event)
    }
}

/// Connector whose handshake always fails.
pub(crate) struct FailingConnector;

#[async_trait]
impl RecognizerConnector for FailingConnector {
    async fn connect(
        &self,
        _endpoint: &SignedEndpoint,
    ) -> Result<(Box<dyn FrameSink>, Box<dyn EventSource>), SpeechError> {
        Err(SpeechError::Transport("handshake refused".to_string()))
    }
}
