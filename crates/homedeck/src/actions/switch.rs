use super::ActionKind;
use super::Capability;
use super::Command;
use crate::client::DeviceInfo;
use crate::client::DeviceState;
use crate::host::ButtonSettings;
use crate::presentation;
use crate::presentation::Glyph;
use crate::presentation::Icon;
use crate::presentation::Palette;
use crate::presentation::Visual;

/// Secondary reading shown next to an on/off device while it is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reading {
    Brightness,
    Speed,
    Humidity,
}

impl Reading {
    fn of(self, state: &DeviceState) -> Option<f64> {
        match self {
            Reading::Brightness => state.brightness,
            Reading::Speed => state.speed,
            Reading::Humidity => state.humidity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchState {
    pub on: bool,
    pub level: Option<f64>,
    /// Glyph picked from the device's icon hint, if it named a known one.
    pub icon: Option<Glyph>,
}

/// Plain on/off devices: lights and switches, fans, humidifiers.
pub struct Switch {
    kind: ActionKind,
    glyph: Glyph,
    palette: Palette,
    reading: Reading,
    flips_early: bool,
}

impl Switch {
    pub fn toggle() -> Self {
        Self {
            kind: ActionKind::Toggle,
            glyph: Glyph::Lightbulb,
            palette: presentation::AMBER,
            reading: Reading::Brightness,
            flips_early: true,
        }
    }

    pub fn fan() -> Self {
        Self {
            kind: ActionKind::Fan,
            glyph: Glyph::Fan,
            palette: presentation::BLUE,
            reading: Reading::Speed,
            flips_early: false,
        }
    }

    pub fn humidifier() -> Self {
        Self {
            kind: ActionKind::Humidifier,
            glyph: Glyph::Droplet,
            palette: presentation::BLUE,
            reading: Reading::Humidity,
            flips_early: false,
        }
    }
}

/// Glyph named by a snapshot's icon hint, falling back to its device type.
pub(super) fn hinted_glyph(device: &DeviceInfo) -> Option<Glyph> {
    device
        .icon
        .as_deref()
        .and_then(Glyph::from_hint)
        .or_else(|| Glyph::from_hint(&device.kind))
}

impl Capability for Switch {
    type State = SwitchState;

    fn kind(&self) -> ActionKind {
        self.kind
    }

    fn derive(&self, devices: &[DeviceInfo]) -> SwitchState {
        let device = &devices[0];
        SwitchState {
            on: device.state.on.unwrap_or(false),
            level: self.reading.of(&device.state),
            icon: hinted_glyph(device),
        }
    }

    fn present(&self, state: &SwitchState, settings: &ButtonSettings) -> Visual {
        let value = match state.level {
            Some(level) if state.on => presentation::percent(level),
            _ => String::new(),
        };
        Visual {
            icon: Icon::new(
                state.icon.unwrap_or(self.glyph),
                presentation::tint(settings, state.on, self.palette),
            ),
            title: presentation::compose_title(settings.label(), &value),
            state: u8::from(state.on),
        }
    }

    fn unconfigured(&self, settings: &ButtonSettings) -> Visual {
        self.present(
            &SwitchState {
                on: false,
                level: None,
                icon: None,
            },
            settings,
        )
    }

    fn command(&self, _state: Option<&SwitchState>, _settings: &ButtonSettings) -> Option<Command> {
        Some(Command::Toggle)
    }

    fn predict(&self, state: &SwitchState, _command: Command) -> SwitchState {
        SwitchState {
            on: !state.on,
            ..state.clone()
        }
    }

    fn flips_early(&self) -> bool {
        self.flips_early
    }
}
