use super::ActionKind;
use super::Capability;
use super::Command;
use crate::client::DeviceInfo;
use crate::host::ButtonSettings;
use crate::presentation;
use crate::presentation::Glyph;
use crate::presentation::Icon;
use crate::presentation::Visual;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockState {
    pub locked: bool,
}

/// Door locks. Unknown state is shown as locked.
///
/// Key states: 0 locked, 1 unlocked.
pub struct Lock;

impl Capability for Lock {
    type State = LockState;

    fn kind(&self) -> ActionKind {
        ActionKind::Lock
    }

    fn derive(&self, devices: &[DeviceInfo]) -> LockState {
        LockState {
            locked: devices[0].state.locked.unwrap_or(true),
        }
    }

    fn present(&self, state: &LockState, settings: &ButtonSettings) -> Visual {
        let glyph = if state.locked {
            Glyph::Lock
        } else {
            Glyph::LockOpen
        };
        Visual {
            icon: Icon::new(
                glyph,
                presentation::tint(settings, state.locked, presentation::GREEN),
            ),
            title: presentation::compose_title(settings.label(), ""),
            state: u8::from(!state.locked),
        }
    }

    fn unconfigured(&self, settings: &ButtonSettings) -> Visual {
        self.present(&LockState { locked: true }, settings)
    }

    fn command(&self, _state: Option<&LockState>, _settings: &ButtonSettings) -> Option<Command> {
        Some(Command::Toggle)
    }

    fn predict(&self, state: &LockState, _command: Command) -> LockState {
        LockState {
            locked: !state.locked,
        }
    }

    fn holds(&self) -> bool {
        true
    }
}
