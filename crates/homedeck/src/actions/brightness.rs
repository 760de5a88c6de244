use super::ActionKind;
use super::Capability;
use super::Command;
use super::switch::hinted_glyph;
use crate::client::DeviceInfo;
use crate::host::ButtonSettings;
use crate::presentation;
use crate::presentation::Glyph;
use crate::presentation::Icon;
use crate::presentation::Visual;

const FULL: u8 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct BrightnessState {
    pub on: bool,
    pub level: Option<f64>,
    pub icon: Option<Glyph>,
}

/// Sets a light to the level configured on the button.
pub struct Brightness;

impl Capability for Brightness {
    type State = BrightnessState;

    fn kind(&self) -> ActionKind {
        ActionKind::Brightness
    }

    fn derive(&self, devices: &[DeviceInfo]) -> BrightnessState {
        let device = &devices[0];
        BrightnessState {
            on: device.state.on.unwrap_or(false),
            level: device.state.brightness,
            icon: hinted_glyph(device),
        }
    }

    fn present(&self, state: &BrightnessState, settings: &ButtonSettings) -> Visual {
        let value = match state.level {
            Some(level) if state.on => presentation::percent(level),
            _ => String::new(),
        };
        Visual {
            icon: Icon::new(
                state.icon.unwrap_or(Glyph::Lightbulb),
                presentation::tint(settings, state.on, presentation::AMBER),
            ),
            title: presentation::compose_title(settings.label(), &value),
            state: u8::from(state.on),
        }
    }

    fn unconfigured(&self, settings: &ButtonSettings) -> Visual {
        self.present(
            &BrightnessState {
                on: false,
                level: None,
                icon: None,
            },
            settings,
        )
    }

    fn command(&self, _state: Option<&BrightnessState>, settings: &ButtonSettings) -> Option<Command> {
        Some(Command::Brightness(settings.brightness.unwrap_or(FULL)))
    }

    fn predict(&self, state: &BrightnessState, command: Command) -> BrightnessState {
        match command {
            Command::Brightness(level) => BrightnessState {
                on: level > 0,
                level: Some(f64::from(level)),
                icon: state.icon,
            },
            _ => state.clone(),
        }
    }
}
