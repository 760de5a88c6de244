use strum::EnumString;

use super::ActionKind;
use super::Capability;
use super::Command;
use crate::client::DeviceInfo;
use crate::host::ButtonSettings;
use crate::presentation;
use crate::presentation::Glyph;
use crate::presentation::Icon;
use crate::presentation::Visual;

/// Reported `doorState`. Anything unrecognised reads as closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DoorState {
    Open,
    Opening,
    Closing,
    #[default]
    Closed,
}

impl DoorState {
    /// In-motion states are shown as where the door is heading.
    pub fn is_open(self) -> bool {
        matches!(self, DoorState::Open | DoorState::Opening)
    }
}

/// Garage door openers. Key states: 0 closed, 1 open.
pub struct GarageDoor;

impl Capability for GarageDoor {
    type State = DoorState;

    fn kind(&self) -> ActionKind {
        ActionKind::GarageDoor
    }

    fn derive(&self, devices: &[DeviceInfo]) -> DoorState {
        devices[0]
            .state
            .door_state
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or_default()
    }

    fn present(&self, state: &DoorState, settings: &ButtonSettings) -> Visual {
        let open = state.is_open();
        let glyph = if open {
            Glyph::GarageOpen
        } else {
            Glyph::GarageClosed
        };
        Visual {
            icon: Icon::new(glyph, presentation::tint(settings, open, presentation::ORANGE)),
            title: presentation::compose_title(settings.label(), ""),
            state: u8::from(open),
        }
    }

    fn unconfigured(&self, settings: &ButtonSettings) -> Visual {
        self.present(&DoorState::Closed, settings)
    }

    fn pending(&self, settings: &ButtonSettings) -> Option<Visual> {
        Some(self.present(&DoorState::Closed, settings))
    }

    fn command(&self, _state: Option<&DoorState>, _settings: &ButtonSettings) -> Option<Command> {
        Some(Command::Toggle)
    }

    fn predict(&self, state: &DoorState, _command: Command) -> DoorState {
        if state.is_open() {
            DoorState::Closing
        } else {
            DoorState::Opening
        }
    }

    fn holds(&self) -> bool {
        true
    }
}
