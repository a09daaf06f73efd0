//! Progress events and the emitter channel.
//!
//! Each provisioning run owns exactly one emitter. Events arrive at the
//! observer strictly in emit order; the channel is terminal after the first
//! `error` or `success` and silently drops anything emitted afterward.
//! Delivery is at-most-once and best-effort: a disconnected observer makes
//! further emits report failure, which the orchestrator uses to stop
//! starting new steps.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Summary carried by the terminal `success` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploySummary {
    pub name: String,
    pub namespace: String,
    pub port: u16,
}

/// One orchestration progress event. Externally tagged, so the wire form is
/// a JSON object with exactly one of the keys `log`, `error` or `success`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressEvent {
    Log(String),
    Error(String),
    Success(DeploySummary),
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error(_) | Self::Success(_))
    }
}

/// Sending half of a progress channel.
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<ProgressEvent>,
    terminal: bool,
}

impl ProgressSender {
    /// Create a channel pair for one provisioning run.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                terminal: false,
            },
            rx,
        )
    }

    /// Emit a log event. Returns false if the observer is gone or the
    /// channel is already terminal.
    pub fn log(&mut self, message: impl Into<String>) -> bool {
        self.emit(ProgressEvent::Log(message.into()))
    }

    /// Emit the terminal error event.
    pub fn error(&mut self, message: impl Into<String>) -> bool {
        self.emit(ProgressEvent::Error(message.into()))
    }

    /// Emit the terminal success event.
    pub fn success(&mut self, summary: DeploySummary) -> bool {
        self.emit(ProgressEvent::Success(summary))
    }

    /// Whether a terminal event has been emitted.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn emit(&mut self, event: ProgressEvent) -> bool {
        if self.terminal {
            return false;
        }
        if event.is_terminal() {
            self.terminal = true;
        }
        self.tx.send(event).is_ok()
    }
}
