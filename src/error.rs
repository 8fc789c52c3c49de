use thiserror::Error;

/// Result type for Stream Deck operations
pub type Result<T> = std::result::Result<T, StreamDeckError>;

/// Errors that can occur when talking to the Stream Deck application
#[derive(Error, Debug)]
pub enum StreamDeckError {
    /// WebSocket connection error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Connection was closed unexpectedly
    #[error("Connection closed")]
    ConnectionClosed,

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Inbound frame was not a JSON object with a string `event` field,
    /// or its payload did not match the shape for that event
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Inbound frame carried an event name outside the known vocabulary
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Channel receive error
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// A required registration launch argument was not supplied
    #[error("Missing launch argument: {0}")]
    MissingArgument(&'static str),

    /// A registration launch argument could not be parsed
    #[error("Invalid launch argument {name}: {reason}")]
    InvalidArgument {
        /// Argument flag name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}
