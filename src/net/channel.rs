//! # Event Channel
//!
//! Bidirectional real-time channel to the chat server over a WebSocket.
//!
//! ```text
//!   ChannelHandle::emit ──► command queue ──► task ──► ws sink
//!   sink(ChannelEvent)  ◄────────────────────  task ◄── ws stream
//! ```
//!
//! The task owns the socket. It reports `Connected` on every successful
//! connection and additionally `Reconnected` on all but the first, then
//! `Disconnected(reason)` when the socket drops. After a drop it waits
//! `reconnect_delay` and dials again until the handle is closed or the sink
//! reports that nobody is listening.
//!
//! Emissions made while disconnected are dropped with a warning.

use std::fmt;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, Request, header::COOKIE};

use super::wire::{ChannelEvent, OutboundEvent, ServerEvent};

#[derive(Debug)]
pub enum ChannelError {
    /// The connection request could not be built.
    Connect(String),
    /// The channel task has exited.
    Closed,
    /// An outbound event failed to serialize.
    Encode(String),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::Connect(msg) => write!(f, "channel connect error: {msg}"),
            ChannelError::Closed => write!(f, "channel closed"),
            ChannelError::Encode(msg) => write!(f, "channel encode error: {msg}"),
        }
    }
}

impl std::error::Error for ChannelError {}

#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub url: String,
    pub reconnect_delay: Duration,
    pub session_cookie: Option<String>,
}

enum Command {
    Emit(OutboundEvent),
    Close,
}

/// Handle to a running channel task.
///
/// Dropping the handle aborts the task unless [`ChannelHandle::close`] was
/// called first; a closing task is left to send its Close frame and report
/// the disconnect.
pub struct ChannelHandle {
    commands: UnboundedSender<Command>,
    task: JoinHandle<()>,
    closing: bool,
}

impl ChannelHandle {
    /// Queue an event for the server.
    pub fn emit(&self, event: OutboundEvent) -> Result<(), ChannelError> {
        debug!("Emitting {}", event.name());
        self.commands
            .send(Command::Emit(event))
            .map_err(|_| ChannelError::Closed)
    }

    /// Close the socket and stop reconnecting.
    pub fn close(&mut self) {
        self.closing = true;
        let _ = self.commands.send(Command::Close);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        if !self.closing {
            self.task.abort();
        }
    }
}

/// Spawn the channel task. `sink` receives every `ChannelEvent` and returns
/// `false` once its receiver is gone, which stops the task.
///
/// Must be called from within a tokio runtime.
pub fn connect<F>(config: ChannelConfig, sink: F) -> Result<ChannelHandle, ChannelError>
where
    F: Fn(ChannelEvent) -> bool + Send + 'static,
{
    build_request(&config)?;
    let (commands, rx) = unbounded_channel();
    let task = tokio::spawn(run(config, rx, sink));
    Ok(ChannelHandle {
        commands,
        task,
        closing: false,
    })
}

fn build_request(config: &ChannelConfig) -> Result<Request<()>, ChannelError> {
    let mut request = config
        .url
        .as_str()
        .into_client_request()
        .map_err(|e| ChannelError::Connect(format!("{}: {e}", config.url)))?;
    if let Some(cookie) = &config.session_cookie {
        let value =
            HeaderValue::from_str(cookie).map_err(|e| ChannelError::Connect(e.to_string()))?;
        request.headers_mut().insert(COOKIE, value);
    }
    Ok(request)
}

async fn run<F>(config: ChannelConfig, mut commands: UnboundedReceiver<Command>, sink: F)
where
    F: Fn(ChannelEvent) -> bool + Send + 'static,
{
    let mut connected_before = false;

    loop {
        // Validated in `connect`; rebuilt per attempt since requests are consumed.
        let request = match build_request(&config) {
            Ok(request) => request,
            Err(e) => {
                warn!("{}", e);
                return;
            }
        };
        match connect_async(request).await {
            Ok((ws, _response)) => {
                info!("Channel connected to {}", config.url);
                if !sink(ChannelEvent::Connected) {
                    return;
                }
                if connected_before && !sink(ChannelEvent::Reconnected) {
                    return;
                }
                connected_before = true;

                let (mut write, mut read) = ws.split();
                let reason = loop {
                    tokio::select! {
                        frame = read.next() => match frame {
                            Some(Ok(Message::Text(text))) => {
                                match serde_json::from_str::<ServerEvent>(text.as_str()) {
                                    Ok(event) => {
                                        if !sink(ChannelEvent::Server(event)) {
                                            return;
                                        }
                                    }
                                    Err(e) => debug!("Ignoring unrecognized frame ({e}): {}", text.as_str()),
                                }
                            }
                            Some(Ok(Message::Close(_))) => break "server closed the connection".to_string(),
                            Some(Ok(_)) => {}
                            Some(Err(e)) => break e.to_string(),
                            None => break "stream ended".to_string(),
                        },
                        command = commands.recv() => match command {
                            Some(Command::Emit(event)) => {
                                let text = match serde_json::to_string(&event) {
                                    Ok(text) => text,
                                    Err(e) => {
                                        warn!("{}", ChannelError::Encode(e.to_string()));
                                        continue;
                                    }
                                };
                                if let Err(e) = write.send(Message::Text(text.into())).await {
                                    break e.to_string();
                                }
                            }
                            Some(Command::Close) | None => {
                                let _ = write.send(Message::Close(None)).await;
                                info!("Channel closed by client");
                                sink(ChannelEvent::Disconnected("client disconnect".to_string()));
                                return;
                            }
                        },
                    }
                };

                warn!("Channel disconnected: {}", reason);
                if !sink(ChannelEvent::Disconnected(reason)) {
                    return;
                }
            }
            Err(e) => warn!("Channel connect failed: {}", e),
        }

        let sleep = tokio::time::sleep(config.reconnect_delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => break,
                command = commands.recv() => match command {
                    Some(Command::Emit(event)) => {
                        warn!("Dropping {} while disconnected", event.name());
                    }
                    Some(Command::Close) | None => return,
                },
            }
        }
        debug!("Reconnecting channel");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_request_sets_cookie() {
        let config = ChannelConfig {
            url: "ws://localhost:5000/ws".to_string(),
            reconnect_delay: Duration::from_millis(10),
            session_cookie: Some("session=abc".to_string()),
        };
        let request = build_request(&config).unwrap();
        assert_eq!(request.headers().get(COOKIE).unwrap(), "session=abc");
    }

    #[test]
    fn build_request_rejects_bad_url() {
        let config = ChannelConfig {
            url: "not a url".to_string(),
            reconnect_delay: Duration::from_millis(10),
            session_cookie: None,
        };
        assert!(matches!(build_request(&config), Err(ChannelError::Connect(_))));
    }
}
