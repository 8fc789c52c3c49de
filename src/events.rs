use crate::error::{Result, StreamDeckError};
use crate::types::{
    ApplicationPayload, AppearancePayload, DeviceInfo, GlobalSettingsPayload, KeyPayload,
    SettingsPayload, TitlePayload,
};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{broadcast, watch};

/// Inbound event vocabulary
///
/// One variant per event name the application can send. `action` identifies
/// the action type from the manifest, `context` the key instance, `device`
/// the hardware unit.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Event {
    /// A monitored application launched
    ApplicationDidLaunch { payload: ApplicationPayload },

    /// A monitored application terminated
    ApplicationDidTerminate { payload: ApplicationPayload },

    /// A device was plugged in
    #[serde(rename_all = "camelCase")]
    DeviceDidConnect {
        device: String,
        device_info: DeviceInfo,
    },

    /// A device was unplugged
    DeviceDidDisconnect { device: String },

    /// Global settings sent in response to `getGlobalSettings`
    DidReceiveGlobalSettings { payload: GlobalSettingsPayload },

    /// The machine woke from sleep
    SystemDidWakeUp,

    /// Per-instance settings sent in response to `getSettings`
    DidReceiveSettings {
        action: String,
        context: String,
        device: String,
        payload: SettingsPayload,
    },

    /// A key was pressed
    KeyDown {
        action: String,
        context: String,
        device: String,
        payload: KeyPayload,
    },

    /// A key was released
    KeyUp {
        action: String,
        context: String,
        device: String,
        payload: KeyPayload,
    },

    /// The property inspector for an action instance was opened
    PropertyInspectorDidAppear {
        action: String,
        context: String,
        device: String,
    },

    /// The property inspector for an action instance was closed
    PropertyInspectorDidDisappear {
        action: String,
        context: String,
        device: String,
    },

    /// The property inspector sent a message to this plugin
    SendToPlugin {
        action: String,
        context: String,
        payload: Value,
    },

    /// The user changed a key's title or title style
    TitleParametersDidChange {
        action: String,
        context: String,
        device: String,
        payload: TitlePayload,
    },

    /// An action instance is about to be displayed
    WillAppear {
        action: String,
        context: String,
        device: String,
        payload: AppearancePayload,
    },

    /// An action instance is about to be removed from view
    WillDisappear {
        action: String,
        context: String,
        device: String,
        payload: AppearancePayload,
    },
}

impl Event {
    const KNOWN_EVENTS: [&'static str; 15] = [
        "applicationDidLaunch",
        "applicationDidTerminate",
        "deviceDidConnect",
        "deviceDidDisconnect",
        "didReceiveGlobalSettings",
        "systemDidWakeUp",
        "didReceiveSettings",
        "keyDown",
        "keyUp",
        "propertyInspectorDidAppear",
        "propertyInspectorDidDisappear",
        "sendToPlugin",
        "titleParametersDidChange",
        "willAppear",
        "willDisappear",
    ];

    /// Parse one raw text frame into a typed event
    ///
    /// Distinguishes the two failure classes: `InvalidMessage` for frames
    /// that are not JSON objects with a string `event` field (or whose
    /// payload does not match the event's shape), and `UnknownEvent` for
    /// event names outside the vocabulary.
    pub fn parse(text: &str) -> Result<Event> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| StreamDeckError::InvalidMessage(e.to_string()))?;
        let name = value
            .get("event")
            .and_then(Value::as_str)
            .ok_or_else(|| StreamDeckError::InvalidMessage("missing event field".to_string()))?
            .to_owned();
        if !Self::KNOWN_EVENTS.contains(&name.as_str()) {
            return Err(StreamDeckError::UnknownEvent(name));
        }
        serde_json::from_value(value)
            .map_err(|e| StreamDeckError::InvalidMessage(format!("{name}: {e}")))
    }
}

/// Receiver for inbound events
///
/// Multiple receivers can be active at once; each sees every event. Once the
/// connection is gone, `recv` drains anything already buffered and then
/// yields `ConnectionClosed`.
pub struct EventReceiver {
    rx: broadcast::Receiver<Event>,
    closed: watch::Receiver<bool>,
}

impl EventReceiver {
    pub(crate) fn new(rx: broadcast::Receiver<Event>, closed: watch::Receiver<bool>) -> Self {
        Self { rx, closed }
    }

    /// Receive the next event
    pub async fn recv(&mut self) -> Result<Event> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Ok(event),
                Err(broadcast::error::TryRecvError::Empty) => {}
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(StreamDeckError::ConnectionClosed)
                }
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Err(StreamDeckError::ChannelError(format!(
                        "Lagged by {} messages",
                        n
                    )))
                }
            }

            if self.connection_gone() {
                return Err(StreamDeckError::ConnectionClosed);
            }

            tokio::select! {
                result = self.rx.recv() => {
                    return match result {
                        Ok(event) => Ok(event),
                        Err(broadcast::error::RecvError::Closed) => {
                            Err(StreamDeckError::ConnectionClosed)
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            Err(StreamDeckError::ChannelError(format!("Lagged by {} messages", n)))
                        }
                    };
                }
                _ = self.closed.changed() => {
                    // Loop back to drain anything buffered before the close
                }
            }
        }
    }

    /// Try to receive an event without blocking
    ///
    /// Returns `Ok(None)` if no event is waiting.
    pub fn try_recv(&mut self) -> Result<Option<Event>> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(broadcast::error::TryRecvError::Empty) => {
                if self.connection_gone() {
                    Err(StreamDeckError::ConnectionClosed)
                } else {
                    Ok(None)
                }
            }
            Err(broadcast::error::TryRecvError::Closed) => Err(StreamDeckError::ConnectionClosed),
            Err(broadcast::error::TryRecvError::Lagged(n)) => Err(StreamDeckError::ChannelError(
                format!("Lagged by {} messages", n),
            )),
        }
    }

    fn connection_gone(&self) -> bool {
        *self.closed.borrow() || self.closed.has_changed().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coordinates, DeviceType};
    use serde_json::json;

    #[test]
    fn key_down_deserializes_with_state_and_coordinates() {
        let text = r#"{"event":"keyDown","action":"a","context":"c","device":"d",
            "payload":{"coordinates":{"column":0,"row":0},"isInMultiAction":false,
            "settings":{},"state":0}}"#;
        match Event::parse(text).unwrap() {
            Event::KeyDown {
                action,
                context,
                device,
                payload,
            } => {
                assert_eq!(action, "a");
                assert_eq!(context, "c");
                assert_eq!(device, "d");
                assert_eq!(payload.state, Some(0));
                assert_eq!(payload.coordinates, Some(Coordinates { column: 0, row: 0 }));
                assert!(!payload.is_in_multi_action);
            }
            other => panic!("expected KeyDown, got {:?}", other),
        }
    }

    #[test]
    fn every_known_event_name_maps_to_its_variant() {
        let frames = [
            (
                json!({"event":"applicationDidLaunch","payload":{"application":"com.apple.music"}}),
                "applicationDidLaunch",
            ),
            (
                json!({"event":"applicationDidTerminate","payload":{"application":"com.apple.music"}}),
                "applicationDidTerminate",
            ),
            (
                json!({"event":"deviceDidConnect","device":"d1",
                    "deviceInfo":{"name":"Deck","size":{"columns":5,"rows":3},"type":0}}),
                "deviceDidConnect",
            ),
            (json!({"event":"deviceDidDisconnect","device":"d1"}), "deviceDidDisconnect"),
            (
                json!({"event":"didReceiveGlobalSettings","payload":{"settings":{"k":1}}}),
                "didReceiveGlobalSettings",
            ),
            (json!({"event":"systemDidWakeUp"}), "systemDidWakeUp"),
            (
                json!({"event":"didReceiveSettings","action":"a","context":"c","device":"d",
                    "payload":{"settings":{},"coordinates":{"column":1,"row":2},"isInMultiAction":false}}),
                "didReceiveSettings",
            ),
            (
                json!({"event":"keyDown","action":"a","context":"c","device":"d",
                    "payload":{"settings":{},"coordinates":{"column":0,"row":0},"state":0,"isInMultiAction":false}}),
                "keyDown",
            ),
            (
                json!({"event":"keyUp","action":"a","context":"c","device":"d",
                    "payload":{"settings":{},"coordinates":{"column":0,"row":0},"state":1,"isInMultiAction":false}}),
                "keyUp",
            ),
            (
                json!({"event":"propertyInspectorDidAppear","action":"a","context":"c","device":"d"}),
                "propertyInspectorDidAppear",
            ),
            (
                json!({"event":"propertyInspectorDidDisappear","action":"a","context":"c","device":"d"}),
                "propertyInspectorDidDisappear",
            ),
            (
                json!({"event":"sendToPlugin","action":"a","context":"c","payload":{"cmd":"refresh"}}),
                "sendToPlugin",
            ),
            (
                json!({"event":"titleParametersDidChange","action":"a","context":"c","device":"d",
                    "payload":{"settings":{},"coordinates":{"column":3,"row":1},"state":0,"title":"Hi",
                    "titleParameters":{"fontFamily":"Arial","fontSize":12,"fontStyle":"Bold",
                    "fontUnderline":false,"showTitle":true,"titleAlignment":"middle","titleColor":"#ffffff"}}}),
                "titleParametersDidChange",
            ),
            (
                json!({"event":"willAppear","action":"a","context":"c","device":"d",
                    "payload":{"settings":{},"coordinates":{"column":2,"row":0},"state":0,"isInMultiAction":false}}),
                "willAppear",
            ),
            (
                json!({"event":"willDisappear","action":"a","context":"c","device":"d",
                    "payload":{"settings":{},"coordinates":{"column":2,"row":0},"state":0,"isInMultiAction":false}}),
                "willDisappear",
            ),
        ];

        for (frame, name) in frames {
            let event = Event::parse(&frame.to_string())
                .unwrap_or_else(|e| panic!("{name} failed to parse: {e}"));
            let variant = match event {
                Event::ApplicationDidLaunch { .. } => "applicationDidLaunch",
                Event::ApplicationDidTerminate { .. } => "applicationDidTerminate",
                Event::DeviceDidConnect { .. } => "deviceDidConnect",
                Event::DeviceDidDisconnect { .. } => "deviceDidDisconnect",
                Event::DidReceiveGlobalSettings { .. } => "didReceiveGlobalSettings",
                Event::SystemDidWakeUp => "systemDidWakeUp",
                Event::DidReceiveSettings { .. } => "didReceiveSettings",
                Event::KeyDown { .. } => "keyDown",
                Event::KeyUp { .. } => "keyUp",
                Event::PropertyInspectorDidAppear { .. } => "propertyInspectorDidAppear",
                Event::PropertyInspectorDidDisappear { .. } => "propertyInspectorDidDisappear",
                Event::SendToPlugin { .. } => "sendToPlugin",
                Event::TitleParametersDidChange { .. } => "titleParametersDidChange",
                Event::WillAppear { .. } => "willAppear",
                Event::WillDisappear { .. } => "willDisappear",
            };
            assert_eq!(variant, name);
        }
    }

    #[test]
    fn device_connect_carries_typed_device_info() {
        let text = r#"{"event":"deviceDidConnect","device":"d1",
            "deviceInfo":{"name":"Kitchen Deck","size":{"columns":5,"rows":3},"type":2}}"#;
        match Event::parse(text).unwrap() {
            Event::DeviceDidConnect { device, device_info } => {
                assert_eq!(device, "d1");
                assert_eq!(device_info.name.as_deref(), Some("Kitchen Deck"));
                assert_eq!(device_info.size.columns, 5);
                assert_eq!(device_info.device_type, DeviceType::StreamDeckXl);
            }
            other => panic!("expected DeviceDidConnect, got {:?}", other),
        }
    }

    #[test]
    fn title_change_deserializes_title_parameters() {
        let text = r##"{"event":"titleParametersDidChange","action":"a","context":"c","device":"d",
            "payload":{"settings":{},"coordinates":{"column":3,"row":1},"state":0,"title":"Hi",
            "titleParameters":{"fontFamily":"Arial","fontSize":12,"fontStyle":"Bold",
            "fontUnderline":false,"showTitle":true,"titleAlignment":"middle","titleColor":"#ffffff"}}}"##;
        match Event::parse(text).unwrap() {
            Event::TitleParametersDidChange { payload, .. } => {
                assert_eq!(payload.title, "Hi");
                assert_eq!(payload.title_parameters.font_family, "Arial");
                assert_eq!(payload.title_parameters.font_size, 12);
                assert!(payload.title_parameters.show_title);
            }
            other => panic!("expected TitleParametersDidChange, got {:?}", other),
        }
    }

    #[test]
    fn unknown_event_name_is_classified() {
        let err = Event::parse(r#"{"event":"didReceiveDeepLink","payload":{}}"#).unwrap_err();
        assert!(matches!(err, StreamDeckError::UnknownEvent(name) if name == "didReceiveDeepLink"));
    }

    #[test]
    fn malformed_frames_are_classified() {
        assert!(matches!(
            Event::parse("not json at all").unwrap_err(),
            StreamDeckError::InvalidMessage(_)
        ));
        assert!(matches!(
            Event::parse(r#"{"uuid":"no-event-field"}"#).unwrap_err(),
            StreamDeckError::InvalidMessage(_)
        ));
        // Known name, wrong payload shape
        assert!(matches!(
            Event::parse(r#"{"event":"applicationDidLaunch","payload":{"application":42}}"#)
                .unwrap_err(),
            StreamDeckError::InvalidMessage(_)
        ));
    }

    #[test]
    fn multi_action_key_press_has_no_coordinates() {
        let text = r#"{"event":"keyDown","action":"a","context":"c","device":"d",
            "payload":{"settings":{},"state":0,"userDesiredState":1,"isInMultiAction":true}}"#;
        match Event::parse(text).unwrap() {
            Event::KeyDown { payload, .. } => {
                assert_eq!(payload.coordinates, None);
                assert_eq!(payload.user_desired_state, Some(1));
                assert!(payload.is_in_multi_action);
            }
            other => panic!("expected KeyDown, got {:?}", other),
        }
    }
}
