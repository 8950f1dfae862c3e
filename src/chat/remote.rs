//! Streaming chat backend. Speaks the same generator contract as the canned
//! generator: `begin` kicks off a request on a worker thread and token
//! increments arrive through `poll`, so the UI loop never blocks on the
//! network.

use std::collections::BTreeSet;
use std::io::{BufRead, BufReader};
use std::sync::mpsc::{self, Receiver, Sender as ChannelSender};
use std::thread;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;

use crate::chat::{Message, ReplyEvent, ResponseGenerator, Sender};
use crate::theme::PersonaKind;
use crate::window::WindowId;

/// End-of-stream marker sent by the chat endpoint as a data line.
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModelProvider {
    Openai,
    Anthropic,
}

impl ModelProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelProvider::Openai => "openai",
            ModelProvider::Anthropic => "anthropic",
        }
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum RemoteError {
    /// Non-success response: 400 for an invalid provider, 500 for missing
    /// credentials or an upstream failure, with a textual body either way.
    #[error("chat endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("stream read error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    messages: Vec<WireMessage>,
    #[serde(rename = "modelProvider")]
    model_provider: &'static str,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    sender: Sender,
    content: String,
}

/// Extracts the payload of one server-sent-event data line.
fn parse_sse_line(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

enum WorkerEvent {
    Reply(ReplyEvent),
    Finished(WindowId),
}

/// Remote streaming implementation of [`ResponseGenerator`].
///
/// Each `begin` spawns one worker thread that POSTs the conversation and
/// relays the SSE token stream back over a channel. `cancel` cannot reach
/// into an in-flight request, so it records the window and `poll` discards
/// that window's deliveries until its stream finishes.
pub struct RemoteGenerator {
    endpoint: String,
    provider: ModelProvider,
    tx: ChannelSender<WorkerEvent>,
    rx: Receiver<WorkerEvent>,
    cancelled: BTreeSet<WindowId>,
}

impl RemoteGenerator {
    pub fn new(endpoint: impl Into<String>, provider: ModelProvider) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            endpoint: endpoint.into(),
            provider,
            tx,
            rx,
            cancelled: BTreeSet::new(),
        }
    }
}

impl ResponseGenerator for RemoteGenerator {
    fn begin(&mut self, window: WindowId, history: &[Message], persona: PersonaKind) {
        let request = ChatRequest {
            messages: history
                .iter()
                .map(|m| WireMessage {
                    sender: m.sender,
                    content: m.content.clone(),
                })
                .collect(),
            model_provider: self.provider.as_str(),
        };
        let endpoint = self.endpoint.clone();
        let sender = persona.reply_sender();
        let tx = self.tx.clone();
        thread::spawn(move || {
            if let Err(err) = stream_chat(&endpoint, &request, window, sender, &tx) {
                tracing::warn!(window_id = ?window, error = %err, "remote generation failed");
                let _ = tx.send(WorkerEvent::Reply(ReplyEvent::Failed {
                    window,
                    error: err.to_string(),
                }));
            }
            let _ = tx.send(WorkerEvent::Finished(window));
        });
    }

    fn poll(&mut self, _now: Instant) -> Vec<ReplyEvent> {
        let mut events = Vec::new();
        for event in self.rx.try_iter() {
            match event {
                WorkerEvent::Finished(window) => {
                    self.cancelled.remove(&window);
                }
                WorkerEvent::Reply(reply) => {
                    let window = match &reply {
                        ReplyEvent::Append { window, .. }
                        | ReplyEvent::ExtendLast { window, .. }
                        | ReplyEvent::Failed { window, .. } => *window,
                    };
                    if !self.cancelled.contains(&window) {
                        events.push(reply);
                    }
                }
            }
        }
        events
    }

    fn cancel(&mut self, window: WindowId) {
        self.cancelled.insert(window);
    }
}

fn stream_chat(
    endpoint: &str,
    request: &ChatRequest,
    window: WindowId,
    sender: Sender,
    tx: &ChannelSender<WorkerEvent>,
) -> Result<(), RemoteError> {
    let client = reqwest::blocking::Client::new();
    let response = client.post(endpoint).json(request).send()?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let reader = BufReader::new(response);
    let mut started = false;
    for line in reader.lines() {
        let line = line?;
        let Some(chunk) = parse_sse_line(&line) else {
            continue;
        };
        if chunk == DONE_SENTINEL {
            break;
        }
        let event = if started {
            ReplyEvent::ExtendLast {
                window,
                chunk: chunk.to_string(),
            }
        } else {
            started = true;
            ReplyEvent::Append {
                window,
                content: chunk.to_string(),
                sender,
            }
        };
        if tx.send(WorkerEvent::Reply(event)).is_err() {
            // receiver is gone; the app is shutting down
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_lines_parse_and_pass_through_noise() {
        assert_eq!(parse_sse_line("data: hello"), Some("hello"));
        assert_eq!(parse_sse_line("data:hello"), Some("hello"));
        assert_eq!(parse_sse_line("data: [DONE]"), Some(DONE_SENTINEL));
        assert_eq!(parse_sse_line(": keepalive"), None);
        assert_eq!(parse_sse_line(""), None);
    }

    #[test]
    fn request_payload_uses_the_wire_field_names() {
        let request = ChatRequest {
            messages: vec![WireMessage {
                sender: Sender::User,
                content: "hi".to_string(),
            }],
            model_provider: ModelProvider::Anthropic.as_str(),
        };
        let value = serde_json::to_value(&request).expect("serializable");
        assert_eq!(value["modelProvider"], "anthropic");
        assert_eq!(value["messages"][0]["sender"], "user");
        assert_eq!(value["messages"][0]["content"], "hi");
    }

    #[test]
    fn cancelled_window_deliveries_are_discarded_until_finish() {
        let mut generator = RemoteGenerator::new("http://unused.invalid", ModelProvider::Openai);
        generator.cancel(WindowId::Npc);
        generator
            .tx
            .send(WorkerEvent::Reply(ReplyEvent::Append {
                window: WindowId::Npc,
                content: "late".to_string(),
                sender: Sender::Npc,
            }))
            .unwrap();
        generator
            .tx
            .send(WorkerEvent::Reply(ReplyEvent::Append {
                window: WindowId::Default,
                content: "ok".to_string(),
                sender: Sender::System,
            }))
            .unwrap();
        generator.tx.send(WorkerEvent::Finished(WindowId::Npc)).unwrap();

        let events = generator.poll(Instant::now());
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            ReplyEvent::Append { window: WindowId::Default, .. }
        ));
        assert!(generator.cancelled.is_empty());
    }
}
