use crate::types::{
    LogMessagePayload, OpenUrlPayload, SetImagePayload, SetStatePayload, SetTitlePayload,
    SwitchToProfilePayload,
};
use serde::Serialize;
use serde_json::Value;

/// Registration handshake, the first frame sent after connecting
///
/// The event name is assigned by the application at launch, so this message
/// sits outside the fixed `Command` vocabulary.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Registration {
    pub event: String,
    pub uuid: String,
}

/// Outbound command vocabulary
///
/// Serializes to the application's envelope shapes: the `event` tag at the
/// top level, then `context`/`device`/`payload` as the command requires.
/// `context` carries the plugin UUID for plugin-scoped commands and an
/// action instance id for key-scoped ones.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub(crate) enum Command {
    SetSettings {
        context: String,
        payload: Value,
    },
    GetSettings {
        context: String,
    },
    SetGlobalSettings {
        context: String,
        payload: Value,
    },
    GetGlobalSettings {
        context: String,
    },
    OpenUrl {
        payload: OpenUrlPayload,
    },
    LogMessage {
        payload: LogMessagePayload,
    },
    SetTitle {
        context: String,
        payload: SetTitlePayload,
    },
    SetImage {
        context: String,
        payload: SetImagePayload,
    },
    ShowAlert {
        context: String,
    },
    ShowOk {
        context: String,
    },
    SetState {
        context: String,
        payload: SetStatePayload,
    },
    SwitchToProfile {
        context: String,
        device: String,
        payload: SwitchToProfilePayload,
    },
    SendToPropertyInspector {
        context: String,
        payload: Value,
    },
}
