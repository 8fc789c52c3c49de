use crate::command::{Command, Registration};
use crate::connection::Connection;
use crate::error::{Result, StreamDeckError};
use crate::events::EventReceiver;
use crate::registration::RegistrationParameters;
use crate::types::{
    LogMessagePayload, OpenUrlPayload, SetImagePayload, SetStatePayload, SetTitlePayload,
    SwitchToProfilePayload, Target,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Client for talking to the Stream Deck application
///
/// The `StreamDeckClient` owns the WebSocket connection to the application,
/// performs the registration handshake, and exposes one method per outbound
/// command plus a typed event subscription.
pub struct StreamDeckClient {
    connection: Arc<Connection>,
    plugin_uuid: String,
}

impl StreamDeckClient {
    /// Connect to the application and register this plugin
    ///
    /// Dials `ws://localhost:{port}/` and sends the registration handshake
    /// as the first outbound frame.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use streamdeck_plugin::{RegistrationParameters, StreamDeckClient};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let params = RegistrationParameters::from_args(std::env::args().skip(1))?;
    ///     let client = StreamDeckClient::connect(&params).await?;
    ///     client.log_message("plugin registered").await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(params: &RegistrationParameters) -> Result<Self> {
        let connection = Connection::connect(format!("ws://localhost:{}/", params.port)).await?;

        connection
            .send_raw(&Registration {
                event: params.register_event.clone(),
                uuid: params.plugin_uuid.clone(),
            })
            .await?;
        tracing::info!("Registered plugin {}", params.plugin_uuid);

        Ok(Self {
            connection: Arc::new(connection),
            plugin_uuid: params.plugin_uuid.clone(),
        })
    }

    /// The UUID the application assigned to this plugin instance
    pub fn plugin_uuid(&self) -> &str {
        &self.plugin_uuid
    }

    /// Subscribe to inbound events
    ///
    /// Multiple receivers can be active simultaneously; each sees every
    /// event.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use streamdeck_plugin::{Event, RegistrationParameters, StreamDeckClient, Target};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let params = RegistrationParameters::from_args(std::env::args().skip(1))?;
    ///     let client = StreamDeckClient::connect(&params).await?;
    ///
    ///     let mut events = client.events();
    ///     while let Ok(event) = events.recv().await {
    ///         if let Event::KeyDown { context, .. } = event {
    ///             client.set_title(&context, "Pressed", Target::Both, None).await?;
    ///         }
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn events(&self) -> EventReceiver {
        self.connection.subscribe()
    }

    // ========== Settings ==========

    /// Persist settings for one action instance
    pub async fn set_settings(&self, context: &str, settings: &impl Serialize) -> Result<()> {
        self.connection
            .send(&Command::SetSettings {
                context: context.to_string(),
                payload: serde_json::to_value(settings)?,
            })
            .await
    }

    /// Request settings for one action instance
    ///
    /// The reply arrives as a `didReceiveSettings` event on the event
    /// stream, addressed by `context`.
    pub async fn get_settings(&self, context: &str) -> Result<()> {
        self.connection
            .send(&Command::GetSettings {
                context: context.to_string(),
            })
            .await
    }

    /// Persist settings shared by all instances of this plugin
    pub async fn set_global_settings(&self, settings: &impl Serialize) -> Result<()> {
        self.connection
            .send(&Command::SetGlobalSettings {
                context: self.plugin_uuid.clone(),
                payload: serde_json::to_value(settings)?,
            })
            .await
    }

    /// Fetch the plugin's global settings
    ///
    /// Resolves when the matching `didReceiveGlobalSettings` event arrives.
    /// The protocol carries no correlation ids, so concurrent calls are all
    /// fulfilled by the next response. There is no library timeout; drop the
    /// future (e.g. via `tokio::time::timeout`) to cancel.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use streamdeck_plugin::{RegistrationParameters, StreamDeckClient};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let params = RegistrationParameters::from_args(std::env::args().skip(1))?;
    /// # let client = StreamDeckClient::connect(&params).await?;
    /// let settings: serde_json::Value = client.get_global_settings().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_global_settings<T: DeserializeOwned>(&self) -> Result<T> {
        // Register the waiter before sending so a fast response cannot be missed
        let rx = self.connection.wait_global_settings().await;

        self.connection
            .send(&Command::GetGlobalSettings {
                context: self.plugin_uuid.clone(),
            })
            .await?;

        let settings = rx.await.map_err(|_| StreamDeckError::ConnectionClosed)?;
        Ok(serde_json::from_value(settings)?)
    }

    // ========== Key Visuals ==========

    /// Set the title shown on a key
    ///
    /// An empty title restores the title from the user's configuration.
    /// `state` limits the update to one state of a multi-state action;
    /// `None` applies it to all states.
    pub async fn set_title(
        &self,
        context: &str,
        title: &str,
        target: Target,
        state: Option<u8>,
    ) -> Result<()> {
        self.connection
            .send(&Command::SetTitle {
                context: context.to_string(),
                payload: SetTitlePayload {
                    title: title.to_string(),
                    target,
                    state,
                },
            })
            .await
    }

    /// Set the image shown on a key
    ///
    /// `image` is a base64 data URI; an empty string restores the image from
    /// the plugin manifest.
    pub async fn set_image(
        &self,
        context: &str,
        image: &str,
        target: Target,
        state: Option<u8>,
    ) -> Result<()> {
        self.connection
            .send(&Command::SetImage {
                context: context.to_string(),
                payload: SetImagePayload {
                    image: image.to_string(),
                    target,
                    state,
                },
            })
            .await
    }

    /// Flash the warning triangle on a key
    pub async fn show_alert(&self, context: &str) -> Result<()> {
        self.connection
            .send(&Command::ShowAlert {
                context: context.to_string(),
            })
            .await
    }

    /// Flash the OK checkmark on a key
    pub async fn show_ok(&self, context: &str) -> Result<()> {
        self.connection
            .send(&Command::ShowOk {
                context: context.to_string(),
            })
            .await
    }

    /// Change the displayed state of a multi-state action
    pub async fn set_state(&self, context: &str, state: u8) -> Result<()> {
        self.connection
            .send(&Command::SetState {
                context: context.to_string(),
                payload: SetStatePayload { state },
            })
            .await
    }

    // ========== Application ==========

    /// Switch a device to one of this plugin's preconfigured profiles
    ///
    /// `None` switches back to the previously selected profile.
    pub async fn switch_to_profile(&self, device: &str, profile: Option<&str>) -> Result<()> {
        self.connection
            .send(&Command::SwitchToProfile {
                context: self.plugin_uuid.clone(),
                device: device.to_string(),
                payload: SwitchToProfilePayload {
                    profile: profile.map(str::to_string),
                },
            })
            .await
    }

    /// Send a message to the property inspector of an action instance
    pub async fn send_to_property_inspector(
        &self,
        context: &str,
        payload: &impl Serialize,
    ) -> Result<()> {
        self.connection
            .send(&Command::SendToPropertyInspector {
                context: context.to_string(),
                payload: serde_json::to_value(payload)?,
            })
            .await
    }

    /// Open a URL in the default browser
    pub async fn open_url(&self, url: &str) -> Result<()> {
        self.connection
            .send(&Command::OpenUrl {
                payload: OpenUrlPayload {
                    url: url.to_string(),
                },
            })
            .await
    }

    /// Write a line to the application's plugin log file
    pub async fn log_message(&self, message: &str) -> Result<()> {
        self.connection
            .send(&Command::LogMessage {
                payload: LogMessagePayload {
                    message: message.to_string(),
                },
            })
            .await
    }

    /// Close the connection gracefully
    ///
    /// Event receivers drain anything already buffered and then report
    /// `ConnectionClosed`.
    pub async fn disconnect(&self) -> Result<()> {
        self.connection.close().await
    }
}
