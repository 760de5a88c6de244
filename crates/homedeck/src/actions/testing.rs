//! Test harness: a scripted control server and a host that records what
//! buttons were told to display.

use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::mpsc;

use super::ActionContext;
use super::Capability;
use super::Controller;
use super::Timing;
use crate::client::ClientFactory;
use crate::client::ClientSlot;
use crate::client::ControlClient;
use crate::client::DeviceInfo;
use crate::client::Endpoint;
use crate::client::mock::MockControlClient;
use crate::host::Button;
use crate::host::ButtonSettings;
use crate::host::HostHandle;
use crate::host::SettingsStore;
use crate::host::Surface;
use crate::host::protocol::Outbound;

pub(crate) struct Harness {
    pub client: Arc<MockControlClient>,
    /// Ports the client factory was asked to bind, in order.
    pub ports: Arc<Mutex<Vec<u16>>>,
    host: HostHandle,
    rx: mpsc::UnboundedReceiver<Outbound>,
}

impl Harness {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client: Arc::new(MockControlClient::new()),
            ports: Arc::new(Mutex::new(Vec::new())),
            host: HostHandle::new(tx, SettingsStore::new()),
            rx,
        }
    }

    pub fn factory(&self) -> ClientFactory {
        let client = self.client.clone();
        let ports = self.ports.clone();
        Arc::new(move |endpoint: Endpoint| -> crate::client::Result<Arc<dyn ControlClient>> {
            ports.lock().unwrap().push(endpoint.port);
            Ok(client.clone() as Arc<dyn ControlClient>)
        })
    }

    pub fn context(&self) -> ActionContext {
        ActionContext {
            factory: self.factory(),
            endpoint: Endpoint::default(),
            timing: Timing::default(),
        }
    }

    pub fn controller<C: Capability>(&self, capability: C) -> Controller<C> {
        let slot = ClientSlot::new(self.factory(), Endpoint::default()).unwrap();
        Controller::new(capability, slot, Timing::default())
    }

    /// Store `settings` for `context`, as a settings page would.
    pub fn configure(&self, context: &str, settings: ButtonSettings) {
        self.host.settings().update(context, settings);
    }

    /// A keypad button with integer state support.
    pub fn button(&self, context: &str, settings: ButtonSettings) -> Button {
        self.button_on(context, settings, Surface::KeyWithState)
    }

    pub fn button_on(&self, context: &str, settings: ButtonSettings, surface: Surface) -> Button {
        self.configure(context, settings);
        Button::new("com.homedeck.test", context, surface, self.host.clone())
    }

    /// Everything sent to the host since the last call.
    pub fn sent(&mut self) -> Sent {
        let mut commands = Vec::new();
        while let Ok(command) = self.rx.try_recv() {
            commands.push(command);
        }
        Sent(commands)
    }
}

/// Display commands captured from the host channel.
#[derive(Debug)]
pub(crate) struct Sent(pub Vec<Outbound>);

impl Sent {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter_map(|c| match c {
                Outbound::SetTitle { payload, .. } => Some(payload.title.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_title(&self) -> Option<&str> {
        self.titles().last().copied()
    }

    pub fn states(&self) -> Vec<u8> {
        self.0
            .iter()
            .filter_map(|c| match c {
                Outbound::SetState { payload, .. } => Some(payload.state),
                _ => None,
            })
            .collect()
    }

    pub fn last_state(&self) -> Option<u8> {
        self.states().last().copied()
    }

    /// Contexts that were set to `state`.
    pub fn contexts_with_state(&self, state: u8) -> Vec<&str> {
        self.0
            .iter()
            .filter_map(|c| match c {
                Outbound::SetState { context, payload } if payload.state == state => {
                    Some(context.as_str())
                }
                _ => None,
            })
            .collect()
    }

    pub fn images(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter_map(|c| match c {
                Outbound::SetImage { payload, .. } => Some(payload.image.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn alerts(&self) -> usize {
        self.0
            .iter()
            .filter(|c| matches!(c, Outbound::ShowAlert { .. }))
            .count()
    }

    pub fn oks(&self) -> usize {
        self.0
            .iter()
            .filter(|c| matches!(c, Outbound::ShowOk { .. }))
            .count()
    }

    pub fn inspector_payloads(&self) -> Vec<&serde_json::Value> {
        self.0
            .iter()
            .filter_map(|c| match c {
                Outbound::SendToPropertyInspector { payload, .. } => Some(payload),
                _ => None,
            })
            .collect()
    }
}

pub(crate) fn device(value: serde_json::Value) -> DeviceInfo {
    serde_json::from_value(value).unwrap()
}

/// Let spawned tasks run to their next await point.
pub(crate) async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
