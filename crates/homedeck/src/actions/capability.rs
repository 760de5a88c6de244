use std::fmt;

use super::ActionKind;
use crate::client;
use crate::client::ActionResponse;
use crate::client::ArmMode;
use crate::client::ControlClient;
use crate::client::DeviceInfo;
use crate::host::ButtonSettings;
use crate::presentation::Visual;

/// A command a key press sends to the control server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    TurnOn,
    TurnOff,
    Brightness(u8),
    Position(u8),
    Arm(ArmMode),
    Disarm,
}

impl Command {
    pub async fn send(
        &self,
        client: &dyn ControlClient,
        target: &str,
    ) -> client::Result<ActionResponse> {
        match *self {
            Command::Toggle => client.toggle(target).await,
            Command::TurnOn => client.turn_on(target).await,
            Command::TurnOff => client.turn_off(target).await,
            Command::Brightness(level) => client.set_brightness(target, level).await,
            Command::Position(position) => client.set_position(target, position).await,
            Command::Arm(mode) => client.arm_security(target, mode).await,
            Command::Disarm => client.disarm_security(target).await,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Toggle => write!(f, "toggle"),
            Command::TurnOn => write!(f, "on"),
            Command::TurnOff => write!(f, "off"),
            Command::Brightness(level) => write!(f, "brightness {}", level),
            Command::Position(position) => write!(f, "position {}", position),
            Command::Arm(mode) => write!(f, "arm {:?}", mode),
            Command::Disarm => write!(f, "disarm"),
        }
    }
}

/// Device-specific half of a polled action.
///
/// [`super::Controller`] owns the lifecycle, polling and caching; a capability
/// only says how snapshots become state, how state looks, and what a press
/// does.
pub trait Capability: Send + Sync + 'static {
    /// Derived state kept in the controller cache, one entry per target.
    type State: Clone + fmt::Debug + Send + Sync + 'static;

    fn kind(&self) -> ActionKind;

    /// Derive state from a non-empty list of snapshots, applying the
    /// capability's defaults for absent fields.
    fn derive(&self, devices: &[DeviceInfo]) -> Self::State;

    fn present(&self, state: &Self::State, settings: &ButtonSettings) -> Visual;

    /// Visual for a button with no target configured.
    fn unconfigured(&self, settings: &ButtonSettings) -> Visual;

    /// Visual shown while the first fetch is in flight, if any.
    fn pending(&self, _settings: &ButtonSettings) -> Option<Visual> {
        None
    }

    /// What a press sends; `None` for read-only actions.
    fn command(&self, state: Option<&Self::State>, settings: &ButtonSettings) -> Option<Command>;

    /// Expected state after `command` succeeds.
    fn predict(&self, state: &Self::State, command: Command) -> Self::State;

    /// Slow physical actuation: protect optimistic state from polls for the hold window.
    fn holds(&self) -> bool {
        false
    }

    /// Show the predicted state before the command is sent and revert on failure.
    fn flips_early(&self) -> bool {
        false
    }
}
