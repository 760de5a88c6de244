//! Button actions, one controller per device capability.
//!
//! Every action kind is served by a single handler instance shared by all
//! buttons of that kind. Polled kinds use the generic [`Controller`] with a
//! [`Capability`] describing device specifics; scenes are fire-once and have
//! their own handler.

mod blinds;
mod brightness;
mod capability;
mod controller;
mod garage;
mod group;
mod inspector;
mod lock;
mod scene;
mod security;
mod status;
mod switch;
#[cfg(test)]
pub(crate) mod testing;
mod thermostat;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
pub use capability::Capability;
pub use capability::Command;
pub use controller::Controller;
use strum::Display;
use strum::EnumIter;
use strum::EnumString;
use tracing::error;
use tracing::info;

use crate::client::ClientFactory;
use crate::client::ClientSlot;
use crate::client::Endpoint;
use crate::host::Button;

/// Prefix of every action UUID registered with the host.
pub const UUID_PREFIX: &str = "com.homedeck.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum ActionKind {
    Toggle,
    Brightness,
    Lock,
    Thermostat,
    Blinds,
    GarageDoor,
    Fan,
    Humidifier,
    Security,
    Group,
    Scene,
    Status,
}

impl ActionKind {
    /// `com.homedeck.<kind>`
    pub fn uuid(self) -> String {
        format!("{}{}", UUID_PREFIX, self)
    }

    pub fn from_uuid(uuid: &str) -> Option<Self> {
        uuid.strip_prefix(UUID_PREFIX)?.parse().ok()
    }
}

/// Lifecycle callbacks the host adapter delivers to an action.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    fn kind(&self) -> ActionKind;

    /// Client this action talks to, rebound on port overrides.
    fn client_slot(&self) -> &ClientSlot;

    /// Button became visible.
    async fn will_appear(&self, button: Button);

    /// Button went away. Never performs I/O.
    fn will_disappear(&self, context: &str);

    async fn did_receive_settings(&self, button: Button);

    async fn key_down(&self, button: Button);

    /// Catalog request from the button's settings page.
    async fn inspector_request(&self, button: Button, payload: serde_json::Value) {
        let slot = self.client_slot();
        slot.rebind(button.settings().port);
        inspector::answer(slot.current().as_ref(), &button, payload).await;
    }
}

/// Poll cadence and optimistic hold window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub poll_interval: Duration,
    pub hold: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(3000),
            hold: Duration::from_secs(30),
        }
    }
}

/// Everything an action factory needs.
#[derive(Clone)]
pub struct ActionContext {
    pub factory: ClientFactory,
    pub endpoint: Endpoint,
    pub timing: Timing,
}

pub type ActionFactoryResult = anyhow::Result<Arc<dyn ActionHandler>>;

type ActionFactory = fn(&ActionContext) -> ActionFactoryResult;

fn toggle(ctx: &ActionContext) -> ActionFactoryResult {
    Controller::create(switch::Switch::toggle(), ctx)
}

fn brightness(ctx: &ActionContext) -> ActionFactoryResult {
    Controller::create(brightness::Brightness, ctx)
}

fn lock(ctx: &ActionContext) -> ActionFactoryResult {
    Controller::create(lock::Lock, ctx)
}

fn thermostat(ctx: &ActionContext) -> ActionFactoryResult {
    Controller::create(thermostat::Thermostat, ctx)
}

fn blinds(ctx: &ActionContext) -> ActionFactoryResult {
    Controller::create(blinds::Blinds, ctx)
}

fn garage_door(ctx: &ActionContext) -> ActionFactoryResult {
    Controller::create(garage::GarageDoor, ctx)
}

fn fan(ctx: &ActionContext) -> ActionFactoryResult {
    Controller::create(switch::Switch::fan(), ctx)
}

fn humidifier(ctx: &ActionContext) -> ActionFactoryResult {
    Controller::create(switch::Switch::humidifier(), ctx)
}

fn security(ctx: &ActionContext) -> ActionFactoryResult {
    Controller::create(security::Security, ctx)
}

fn group(ctx: &ActionContext) -> ActionFactoryResult {
    Controller::create(group::Group, ctx)
}

fn status(ctx: &ActionContext) -> ActionFactoryResult {
    Controller::create(status::Status, ctx)
}

/// Every action the plugin offers, in manifest order.
pub static REGISTRY: &[(ActionKind, ActionFactory)] = &[
    (ActionKind::Toggle, toggle),
    (ActionKind::Brightness, brightness),
    (ActionKind::Lock, lock),
    (ActionKind::Thermostat, thermostat),
    (ActionKind::Blinds, blinds),
    (ActionKind::GarageDoor, garage_door),
    (ActionKind::Fan, fan),
    (ActionKind::Humidifier, humidifier),
    (ActionKind::Security, security),
    (ActionKind::Group, group),
    (ActionKind::Scene, scene::SceneAction::create),
    (ActionKind::Status, status),
];

/// Action handlers by UUID, built once at start-up.
#[derive(Default)]
pub struct ActionRegistry {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    /// Instantiate every registered action. A factory that fails is logged
    /// and skipped; its buttons stay inert.
    pub fn from_context(ctx: &ActionContext) -> Self {
        let mut registry = Self::default();
        for (kind, constr) in REGISTRY {
            match constr(ctx) {
                Ok(handler) => registry.register(handler),
                Err(e) => error!("failed to set up action {}: {:#}", kind, e),
            }
        }
        info!("Registered {} actions", registry.handlers.len());
        registry
    }

    pub fn register(&mut self, handler: Arc<dyn ActionHandler>) {
        self.handlers.insert(handler.kind().uuid(), handler);
    }

    pub fn get(&self, uuid: &str) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(uuid).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
