use crate::error::{Result, StreamDeckError};
use crate::types::{DeviceSize, DeviceType};
use serde::{Deserialize, Serialize};

/// Parameters the Stream Deck application passes on the plugin command line
///
/// The application launches each plugin process with four `-flag value`
/// pairs: the WebSocket port to dial, the plugin's assigned UUID, the event
/// name to use in the registration handshake, and a JSON snapshot of the
/// application and connected devices. Parsed once at startup, read-only
/// thereafter.
#[derive(Debug, Clone)]
pub struct RegistrationParameters {
    /// Local port the application listens on
    pub port: u16,
    /// Opaque identifier assigned to this plugin instance
    pub plugin_uuid: String,
    /// Event name for the registration handshake
    pub register_event: String,
    /// Application/device snapshot taken at launch
    pub info: RegistrationInfo,
}

impl RegistrationParameters {
    /// Build parameters directly, for tests and embedded hosts
    pub fn new(
        port: u16,
        plugin_uuid: impl Into<String>,
        register_event: impl Into<String>,
        info: RegistrationInfo,
    ) -> Self {
        Self {
            port,
            plugin_uuid: plugin_uuid.into(),
            register_event: register_event.into(),
            info,
        }
    }

    /// Parse the argument vector the application supplies at launch
    ///
    /// Expects `-port`, `-pluginUUID`, `-registerEvent` and `-info` in any
    /// order. Pass `std::env::args().skip(1)`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use streamdeck_plugin::RegistrationParameters;
    ///
    /// let params = RegistrationParameters::from_args(std::env::args().skip(1))?;
    /// # Ok::<(), streamdeck_plugin::StreamDeckError>(())
    /// ```
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut port = None;
        let mut plugin_uuid = None;
        let mut register_event = None;
        let mut info = None;

        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            match flag.as_str() {
                "-port" => {
                    let value = args.next().ok_or(StreamDeckError::MissingArgument("-port"))?;
                    port = Some(value.parse::<u16>().map_err(|e| {
                        StreamDeckError::InvalidArgument {
                            name: "-port",
                            reason: e.to_string(),
                        }
                    })?);
                }
                "-pluginUUID" => {
                    plugin_uuid =
                        Some(args.next().ok_or(StreamDeckError::MissingArgument("-pluginUUID"))?);
                }
                "-registerEvent" => {
                    register_event =
                        Some(args.next().ok_or(StreamDeckError::MissingArgument("-registerEvent"))?);
                }
                "-info" => {
                    let value = args.next().ok_or(StreamDeckError::MissingArgument("-info"))?;
                    info = Some(serde_json::from_str(&value).map_err(|e| {
                        StreamDeckError::InvalidArgument {
                            name: "-info",
                            reason: e.to_string(),
                        }
                    })?);
                }
                // Unrecognized flags from newer application versions are skipped
                _ => {}
            }
        }

        Ok(Self {
            port: port.ok_or(StreamDeckError::MissingArgument("-port"))?,
            plugin_uuid: plugin_uuid.ok_or(StreamDeckError::MissingArgument("-pluginUUID"))?,
            register_event: register_event
                .ok_or(StreamDeckError::MissingArgument("-registerEvent"))?,
            info: info.ok_or(StreamDeckError::MissingArgument("-info"))?,
        })
    }
}

/// Snapshot of the application and connected devices at plugin launch
///
/// Every field defaults so newer application versions can add keys without
/// breaking registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationInfo {
    pub application: ApplicationInfo,
    pub plugin: PluginInfo,
    pub device_pixel_ratio: f64,
    pub devices: Vec<RegisteredDevice>,
}

/// Host application details from the registration info
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationInfo {
    pub language: String,
    pub platform: String,
    pub version: String,
}

/// This plugin's manifest details from the registration info
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginInfo {
    pub uuid: String,
    pub version: String,
}

/// A device already connected at plugin launch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisteredDevice {
    pub id: String,
    pub name: Option<String>,
    pub size: DeviceSize,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args<'a>(v: &'a [&'a str]) -> impl Iterator<Item = String> + 'a {
        v.iter().map(|s| s.to_string())
    }

    #[test]
    fn parses_launch_arguments_in_any_order() {
        let info = r#"{"application":{"language":"en","platform":"mac","version":"6.5.0"},
                       "devices":[{"id":"dev1","name":"Deck","size":{"columns":5,"rows":3},"type":0}]}"#;
        let params = RegistrationParameters::from_args(args(&[
            "-registerEvent",
            "registerPlugin",
            "-info",
            info,
            "-port",
            "28196",
            "-pluginUUID",
            "ABC123",
        ]))
        .unwrap();

        assert_eq!(params.port, 28196);
        assert_eq!(params.plugin_uuid, "ABC123");
        assert_eq!(params.register_event, "registerPlugin");
        assert_eq!(params.info.application.version, "6.5.0");
        assert_eq!(params.info.devices.len(), 1);
        assert_eq!(params.info.devices[0].size.columns, 5);
        assert_eq!(params.info.devices[0].device_type, DeviceType::StreamDeck);
    }

    #[test]
    fn reports_missing_argument_by_name() {
        let err = RegistrationParameters::from_args(args(&[
            "-port",
            "28196",
            "-pluginUUID",
            "ABC123",
            "-registerEvent",
            "registerPlugin",
        ]))
        .unwrap_err();
        assert!(matches!(err, StreamDeckError::MissingArgument("-info")));
    }

    #[test]
    fn rejects_non_numeric_port() {
        let err =
            RegistrationParameters::from_args(args(&["-port", "not-a-port"])).unwrap_err();
        assert!(matches!(err, StreamDeckError::InvalidArgument { name: "-port", .. }));
    }
}
