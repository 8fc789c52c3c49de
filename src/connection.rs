use crate::command::Command;
use crate::error::{Result, StreamDeckError};
use crate::events::{Event, EventReceiver};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// WebSocket connection state
struct ConnectionState {
    /// Waiters for the next `didReceiveGlobalSettings` event; the protocol
    /// has no correlation ids, so one response fulfills all of them
    pending_global_settings: Vec<oneshot::Sender<serde_json::Value>>,
    /// Channel for sending outgoing messages
    ws_tx: mpsc::UnboundedSender<Message>,
}

/// Low-level WebSocket connection handler
pub(crate) struct Connection {
    state: Arc<Mutex<ConnectionState>>,
    /// Broadcast channel for inbound events (outside mutex to allow non-blocking subscribe)
    event_tx: broadcast::Sender<Event>,
    /// Flips to true when the socket is gone, so receivers can report closure
    closed_rx: watch::Receiver<bool>,
}

impl Connection {
    /// Connect to a WebSocket URL
    pub async fn connect(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        tracing::info!("Connecting to {}", url);

        let (ws_stream, _) = connect_async(&url).await?;
        let (mut write, mut read) = ws_stream.split();

        // Create channels
        let (ws_tx, mut ws_rx) = mpsc::unbounded_channel::<Message>();
        let (event_tx, _) = broadcast::channel(100);
        let (closed_tx, closed_rx) = watch::channel(false);

        let state = Arc::new(Mutex::new(ConnectionState {
            pending_global_settings: Vec::new(),
            ws_tx,
        }));

        // Spawn task to forward outgoing messages to WebSocket
        let write_handle = tokio::spawn(async move {
            while let Some(msg) = ws_rx.recv().await {
                if let Err(e) = write.send(msg).await {
                    tracing::error!("Failed to send message: {}", e);
                    break;
                }
            }
        });

        // Spawn task to receive and process incoming messages
        let state_clone = state.clone();
        let event_tx_clone = event_tx.clone();
        tokio::spawn(async move {
            while let Some(msg_result) = read.next().await {
                match msg_result {
                    Ok(Message::Text(text)) => {
                        if let Err(e) =
                            Self::handle_message(&state_clone, &event_tx_clone, text).await
                        {
                            // Parse failures and unknown events degrade to a
                            // log line, never to task termination
                            tracing::warn!("Discarding message: {}", e);
                        }
                    }
                    Ok(Message::Close(_)) => {
                        tracing::info!("WebSocket connection closed");
                        break;
                    }
                    Err(e) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }

            // Connection closed: cancel pending waiters and signal receivers
            let mut state = state_clone.lock().await;
            state.pending_global_settings.clear();
            let _ = closed_tx.send(true);
            write_handle.abort();
        });

        Ok(Self {
            state,
            event_tx,
            closed_rx,
        })
    }

    /// Handle an incoming text frame
    async fn handle_message(
        state: &Arc<Mutex<ConnectionState>>,
        event_tx: &broadcast::Sender<Event>,
        text: String,
    ) -> Result<()> {
        tracing::debug!("Received: {}", text);

        let event = Event::parse(&text)?;

        if let Event::DidReceiveGlobalSettings { payload } = &event {
            let mut state = state.lock().await;
            for tx in state.pending_global_settings.drain(..) {
                // A dropped receiver means the caller gave up; ignore it
                let _ = tx.send(payload.settings.clone());
            }
        }

        // No subscriber attached is a no-op
        let _ = event_tx.send(event);

        Ok(())
    }

    /// Serialize a command and queue it as a single text frame
    pub async fn send(&self, command: &Command) -> Result<()> {
        self.send_raw(command).await
    }

    /// Serialize any message and queue it as a single text frame
    pub async fn send_raw(&self, message: &impl Serialize) -> Result<()> {
        let state = self.state.lock().await;
        let json = serde_json::to_string(message)?;
        tracing::debug!("Sending: {}", json);

        state
            .ws_tx
            .send(Message::Text(json))
            .map_err(|_| StreamDeckError::ConnectionClosed)?;

        Ok(())
    }

    /// Register a waiter for the next `didReceiveGlobalSettings` event
    ///
    /// Must be called before sending `getGlobalSettings` so a fast response
    /// cannot slip past the waiter.
    pub async fn wait_global_settings(&self) -> oneshot::Receiver<serde_json::Value> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().await.pending_global_settings.push(tx);
        rx
    }

    /// Subscribe to inbound events
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver::new(self.event_tx.subscribe(), self.closed_rx.clone())
    }

    /// Start a graceful close handshake
    pub async fn close(&self) -> Result<()> {
        let state = self.state.lock().await;
        state
            .ws_tx
            .send(Message::Close(None))
            .map_err(|_| StreamDeckError::ConnectionClosed)?;

        Ok(())
    }
}
