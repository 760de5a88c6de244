//! Wire format of the host's plugin WebSocket.
//!
//! - Inbound: lifecycle events tagged by `event`, addressed by `context`.
//! - Outbound: display commands addressed by `context`.
//! - Registration: the first frame, naming the plugin UUID.

use serde::Deserialize;
use serde::Serialize;

use super::Surface;

/// Events delivered by the host.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Inbound {
    WillAppear(ActionEvent),
    WillDisappear(ActionEvent),
    DidReceiveSettings(ActionEvent),
    KeyDown(ActionEvent),
    SendToPlugin(PluginMessage),
    /// Anything this plugin does not react to.
    #[serde(other)]
    Ignored,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionEvent {
    /// Action UUID, e.g. `com.homedeck.toggle`.
    pub action: String,
    /// Opaque button instance id.
    pub context: String,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub payload: ActionPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionPayload {
    pub settings: serde_json::Value,
    /// `Keypad` or `Encoder`.
    pub controller: Option<String>,
    /// Present only for actions declaring multiple states.
    pub state: Option<u8>,
    pub is_in_multi_action: bool,
}

impl ActionPayload {
    pub fn surface(&self) -> Surface {
        if self.is_in_multi_action {
            Surface::MultiAction
        } else if self.state.is_some() {
            Surface::KeyWithState
        } else {
            Surface::Key
        }
    }
}

/// Message from a settings page.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginMessage {
    pub action: String,
    pub context: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImagePayload {
    pub image: String,
    pub target: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitlePayload {
    pub title: String,
    pub target: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatePayload {
    pub state: u8,
}

/// Commands sent to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Outbound {
    SetImage {
        context: String,
        payload: ImagePayload,
    },
    SetTitle {
        context: String,
        payload: TitlePayload,
    },
    SetState {
        context: String,
        payload: StatePayload,
    },
    ShowOk {
        context: String,
    },
    ShowAlert {
        context: String,
    },
    SendToPropertyInspector {
        action: String,
        context: String,
        payload: serde_json::Value,
    },
}

/// First frame sent after connecting.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub event: String,
    pub uuid: String,
}
