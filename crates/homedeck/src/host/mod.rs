//! Host-facing surface: button handles and the plugin WebSocket adapter.
//!
//! The host owns the physical keys. Actions only see [`Button`] handles,
//! which queue display commands on a channel drained by the adapter loop.

mod plugin;
pub mod protocol;
mod settings;

pub use plugin::HostError;
pub use plugin::Plugin;
pub use plugin::PluginArgs;
pub use settings::ButtonSettings;
pub use settings::SettingsStore;
use tokio::sync::mpsc;
use tracing::debug;

use self::protocol::ImagePayload;
use self::protocol::Outbound;
use self::protocol::StatePayload;
use self::protocol::TitlePayload;
use crate::icon;
use crate::presentation::Visual;

/// What a button instance is able to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Key with image, title and an integer state.
    KeyWithState,
    /// Key with image and title only.
    Key,
    /// Step of a multi-action; nothing is rendered.
    MultiAction,
}

impl Surface {
    pub fn can_render(self) -> bool {
        !matches!(self, Surface::MultiAction)
    }

    pub fn has_state(self) -> bool {
        matches!(self, Surface::KeyWithState)
    }
}

/// Sender half of the outbound command channel (unbounded: actions must not block).
pub type OutboundSender = mpsc::UnboundedSender<Outbound>;

/// Shared access to the host: outbound commands and the settings store.
#[derive(Debug, Clone)]
pub struct HostHandle {
    tx: OutboundSender,
    settings: SettingsStore,
}

impl HostHandle {
    pub fn new(tx: OutboundSender, settings: SettingsStore) -> Self {
        Self { tx, settings }
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    fn send(&self, command: Outbound) {
        if self.tx.send(command).is_err() {
            debug!("host connection closed, dropping display command");
        }
    }
}

/// Handle to one visible button instance.
#[derive(Debug, Clone)]
pub struct Button {
    action: String,
    context: String,
    surface: Surface,
    host: HostHandle,
}

impl Button {
    pub fn new(
        action: impl Into<String>,
        context: impl Into<String>,
        surface: Surface,
        host: HostHandle,
    ) -> Self {
        Self {
            action: action.into(),
            context: context.into(),
            surface,
            host,
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// Current settings of this button, read live from the store.
    pub fn settings(&self) -> ButtonSettings {
        self.host.settings.get(&self.context)
    }

    pub fn set_image(&self, image: String) {
        self.host.send(Outbound::SetImage {
            context: self.context.clone(),
            payload: ImagePayload { image, target: 0 },
        });
    }

    pub fn set_title(&self, title: &str) {
        self.host.send(Outbound::SetTitle {
            context: self.context.clone(),
            payload: TitlePayload {
                title: title.to_string(),
                target: 0,
            },
        });
    }

    pub fn set_state(&self, state: u8) {
        self.host.send(Outbound::SetState {
            context: self.context.clone(),
            payload: StatePayload { state },
        });
    }

    pub fn show_ok(&self) {
        self.host.send(Outbound::ShowOk {
            context: self.context.clone(),
        });
    }

    pub fn show_alert(&self) {
        self.host.send(Outbound::ShowAlert {
            context: self.context.clone(),
        });
    }

    pub fn send_to_property_inspector(&self, payload: serde_json::Value) {
        self.host.send(Outbound::SendToPropertyInspector {
            action: self.action.clone(),
            context: self.context.clone(),
            payload,
        });
    }

    /// Push a visual to the key, skipping what the surface cannot show.
    pub fn render(&self, visual: &Visual) {
        if !self.surface.can_render() {
            return;
        }
        self.set_image(icon::data_uri(&visual.icon));
        self.set_title(&visual.title);
        if self.surface.has_state() {
            self.set_state(visual.state);
        }
    }
}
