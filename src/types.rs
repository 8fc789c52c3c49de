use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Position of an action instance on the key grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub column: u8,
    pub row: u8,
}

/// Which display a visual update applies to
///
/// Serialized as a bare integer on the wire: 0 = both, 1 = hardware,
/// 2 = software.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// Hardware keys and the software emulator
    #[default]
    Both,
    /// Hardware keys only
    Hardware,
    /// Software emulator only
    Software,
}

impl Target {
    fn as_u8(self) -> u8 {
        match self {
            Target::Both => 0,
            Target::Hardware => 1,
            Target::Software => 2,
        }
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(Target::Both),
            1 => Ok(Target::Hardware),
            2 => Ok(Target::Software),
            other => Err(D::Error::custom(format!("target out of range: {other}"))),
        }
    }
}

/// Kind of Stream Deck hardware, as reported by the application
///
/// Serialized as a bare integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceType {
    #[default]
    StreamDeck,
    StreamDeckMini,
    StreamDeckXl,
    StreamDeckMobile,
    CorsairGKeys,
    /// A device kind newer than this library
    Unknown(u8),
}

impl DeviceType {
    fn as_u8(self) -> u8 {
        match self {
            DeviceType::StreamDeck => 0,
            DeviceType::StreamDeckMini => 1,
            DeviceType::StreamDeckXl => 2,
            DeviceType::StreamDeckMobile => 3,
            DeviceType::CorsairGKeys => 4,
            DeviceType::Unknown(other) => other,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => DeviceType::StreamDeck,
            1 => DeviceType::StreamDeckMini,
            2 => DeviceType::StreamDeckXl,
            3 => DeviceType::StreamDeckMobile,
            4 => DeviceType::CorsairGKeys,
            other => DeviceType::Unknown(other),
        }
    }
}

impl Serialize for DeviceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for DeviceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(DeviceType::from_u8(u8::deserialize(deserializer)?))
    }
}

/// Key grid dimensions of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeviceSize {
    pub columns: u8,
    pub rows: u8,
}

/// Description of a connected device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// User-assigned device name (older application versions omit it)
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub size: DeviceSize,

    #[serde(rename = "type")]
    pub device_type: DeviceType,
}

/// Title rendering settings reported by `titleParametersDidChange`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleParameters {
    pub font_family: String,
    pub font_size: u32,
    pub font_style: String,
    pub font_underline: bool,
    pub show_title: bool,
    pub title_alignment: String,
    pub title_color: String,
}

/// Payload of `applicationDidLaunch` / `applicationDidTerminate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationPayload {
    /// Monitored application identifier (bundle id / exe name)
    pub application: String,
}

/// Payload of `didReceiveGlobalSettings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettingsPayload {
    pub settings: Value,
}

/// Payload of `didReceiveSettings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    pub settings: Value,

    /// Absent when the action sits inside a multi-action
    #[serde(default)]
    pub coordinates: Option<Coordinates>,

    #[serde(default)]
    pub is_in_multi_action: bool,
}

/// Payload of `keyDown` / `keyUp`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPayload {
    pub settings: Value,

    /// Absent when the action sits inside a multi-action
    #[serde(default)]
    pub coordinates: Option<Coordinates>,

    /// Current state of a multi-state action
    #[serde(default)]
    pub state: Option<u8>,

    /// State requested by a multi-action step
    #[serde(default)]
    pub user_desired_state: Option<u8>,

    #[serde(default)]
    pub is_in_multi_action: bool,
}

/// Payload of `willAppear` / `willDisappear`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearancePayload {
    pub settings: Value,

    #[serde(default)]
    pub coordinates: Option<Coordinates>,

    #[serde(default)]
    pub state: Option<u8>,

    #[serde(default)]
    pub is_in_multi_action: bool,
}

/// Payload of `titleParametersDidChange`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitlePayload {
    pub settings: Value,

    #[serde(default)]
    pub coordinates: Option<Coordinates>,

    #[serde(default)]
    pub state: Option<u8>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub title_parameters: TitleParameters,
}

/// Outbound payload of `setTitle`
///
/// `state` serializes as an explicit `null` when absent, matching what the
/// application expects for "all states".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetTitlePayload {
    pub title: String,
    pub target: Target,
    pub state: Option<u8>,
}

/// Outbound payload of `setImage`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetImagePayload {
    /// Image as a base64 data URI, or empty to restore the manifest image
    pub image: String,
    pub target: Target,
    pub state: Option<u8>,
}

/// Outbound payload of `setState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetStatePayload {
    pub state: u8,
}

/// Outbound payload of `switchToProfile`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchToProfilePayload {
    /// Profile name from the plugin manifest; `null` switches back to the
    /// previously selected profile
    pub profile: Option<String>,
}

/// Outbound payload of `openUrl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenUrlPayload {
    pub url: String,
}

/// Outbound payload of `logMessage`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessagePayload {
    pub message: String,
}
