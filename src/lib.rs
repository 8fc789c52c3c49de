//! Rust client library for building Elgato Stream Deck plugins
//!
//! This library lets a plugin process talk to the Stream Deck application
//! over its local WebSocket API. It supports:
//!
//! - Registration handshake from the launch arguments the application passes
//! - Typed inbound events (key presses, appearance, settings, device and
//!   application lifecycle)
//! - Key visuals (title, image, state, alert/OK feedback)
//! - Per-instance and global settings, including the global-settings
//!   round trip
//! - Profile switching, property inspector messaging, URL opening and
//!   application-side logging
//!
//! # Quick Start
//!
//! ```no_run
//! use streamdeck_plugin::{Event, RegistrationParameters, StreamDeckClient, Target};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // The application passes the port, UUID and register event on the
//!     // command line at plugin launch
//!     let params = RegistrationParameters::from_args(std::env::args().skip(1))?;
//!     let client = StreamDeckClient::connect(&params).await?;
//!
//!     let mut events = client.events();
//!     loop {
//!         match events.recv().await {
//!             Ok(Event::KeyDown { context, .. }) => {
//!                 client.set_title(&context, "Pressed", Target::Both, None).await?;
//!             }
//!             Ok(Event::KeyUp { context, .. }) => {
//!                 client.set_title(&context, "", Target::Both, None).await?;
//!             }
//!             Ok(_) => {}
//!             // Connection loss; the application restarts plugins itself
//!             Err(_) => break,
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The library is organized into several layers:
//!
//! - **Client**: registration handshake and one method per outbound command
//! - **Events**: inbound vocabulary as a closed tagged union, plus the
//!   subscription receiver
//! - **Connection**: low-level WebSocket handling and message dispatch
//! - **Command**: outbound JSON envelope shapes
//! - **Types**: protocol payload records shared by both directions

mod client;
mod command;
mod connection;
mod error;
mod events;
mod registration;
mod types;

// Public exports
pub use client::StreamDeckClient;
pub use error::{Result, StreamDeckError};
pub use events::{Event, EventReceiver};
pub use registration::{
    ApplicationInfo, PluginInfo, RegisteredDevice, RegistrationInfo, RegistrationParameters,
};
pub use types::{
    ApplicationPayload, AppearancePayload, Coordinates, DeviceInfo, DeviceSize, DeviceType,
    GlobalSettingsPayload, KeyPayload, LogMessagePayload, OpenUrlPayload, SetImagePayload,
    SetStatePayload, SetTitlePayload, SettingsPayload, SwitchToProfilePayload, Target,
    TitleParameters, TitlePayload,
};
