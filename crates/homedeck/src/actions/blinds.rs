use super::ActionKind;
use super::Capability;
use super::Command;
use crate::client::DeviceInfo;
use crate::host::ButtonSettings;
use crate::presentation;
use crate::presentation::Glyph;
use crate::presentation::Icon;
use crate::presentation::Visual;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlindsState {
    pub position: Option<f64>,
}

/// Window coverings. The key is either an "open" or a "close" button,
/// chosen by the `direction` setting; its icon follows that setting rather
/// than the reported position.
///
/// Key states: 0 open button, 1 close button.
pub struct Blinds;

fn closes(settings: &ButtonSettings) -> bool {
    settings
        .direction
        .as_deref()
        .is_some_and(|d| d.eq_ignore_ascii_case("close") || d.eq_ignore_ascii_case("closed"))
}

impl Capability for Blinds {
    type State = BlindsState;

    fn kind(&self) -> ActionKind {
        ActionKind::Blinds
    }

    fn derive(&self, devices: &[DeviceInfo]) -> BlindsState {
        BlindsState {
            position: devices[0].state.position,
        }
    }

    fn present(&self, state: &BlindsState, settings: &ButtonSettings) -> Visual {
        let close = closes(settings);
        let glyph = if close {
            Glyph::BlindsClosed
        } else {
            Glyph::BlindsOpen
        };
        let value = state.position.map(presentation::percent).unwrap_or_default();
        Visual {
            icon: Icon::new(glyph, presentation::tint(settings, true, presentation::BLUE)),
            title: presentation::compose_title(settings.label(), &value),
            state: u8::from(close),
        }
    }

    fn unconfigured(&self, settings: &ButtonSettings) -> Visual {
        self.present(&BlindsState { position: None }, settings)
    }

    fn command(&self, _state: Option<&BlindsState>, settings: &ButtonSettings) -> Option<Command> {
        let fallback = if closes(settings) { 0 } else { 100 };
        Some(Command::Position(settings.position.unwrap_or(fallback)))
    }

    fn predict(&self, state: &BlindsState, command: Command) -> BlindsState {
        match command {
            Command::Position(position) => BlindsState {
                position: Some(f64::from(position)),
            },
            _ => *state,
        }
    }
}
