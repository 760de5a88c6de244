use super::ActionKind;
use super::Capability;
use super::Command;
use crate::client::DeviceInfo;
use crate::client::DeviceState;
use crate::host::ButtonSettings;
use crate::presentation;
use crate::presentation::Glyph;
use crate::presentation::Icon;
use crate::presentation::Visual;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupState {
    pub on: usize,
    pub total: usize,
}

impl GroupState {
    pub fn any_on(self) -> bool {
        self.on > 0
    }

    /// `"{on}/{total}"` while partially on, blank otherwise.
    pub fn count(self) -> String {
        if self.on > 0 && self.on < self.total {
            format!("{}/{}", self.on, self.total)
        } else {
            String::new()
        }
    }
}

/// A member without an `on` field counts as on when it reports brightness.
fn member_on(state: &DeviceState) -> bool {
    state
        .on
        .unwrap_or_else(|| state.brightness.is_some_and(|b| b > 0.0))
}

/// Device groups: on while any member is on. A press switches the whole
/// group off if anything is on, else on.
pub struct Group;

impl Capability for Group {
    type State = GroupState;

    fn kind(&self) -> ActionKind {
        ActionKind::Group
    }

    fn derive(&self, devices: &[DeviceInfo]) -> GroupState {
        GroupState {
            on: devices.iter().filter(|d| member_on(&d.state)).count(),
            total: devices.len(),
        }
    }

    fn present(&self, state: &GroupState, settings: &ButtonSettings) -> Visual {
        let on = state.any_on();
        Visual {
            icon: Icon::new(Glyph::Group, presentation::tint(settings, on, presentation::AMBER)),
            title: presentation::compose_title(settings.label(), &state.count()),
            state: u8::from(on),
        }
    }

    fn unconfigured(&self, settings: &ButtonSettings) -> Visual {
        self.present(&GroupState { on: 0, total: 0 }, settings)
    }

    fn command(&self, state: Option<&GroupState>, _settings: &ButtonSettings) -> Option<Command> {
        if state.is_some_and(|s| s.any_on()) {
            Some(Command::TurnOff)
        } else {
            Some(Command::TurnOn)
        }
    }

    fn predict(&self, state: &GroupState, command: Command) -> GroupState {
        match command {
            Command::TurnOn => GroupState {
                on: state.total,
                total: state.total,
            },
            Command::TurnOff => GroupState {
                on: 0,
                total: state.total,
            },
            _ => *state,
        }
    }
}
