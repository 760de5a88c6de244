use super::ActionKind;
use super::Capability;
use super::Command;
use crate::client::DeviceInfo;
use crate::host::ButtonSettings;
use crate::presentation;
use crate::presentation::Glyph;
use crate::presentation::Icon;
use crate::presentation::Visual;

const NEUTRAL: &str = "#9E9E9E";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusState {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

/// Read-only sensor display. Pressing the key does nothing.
pub struct Status;

/// The configured sensor, or without one whichever reading the device
/// reports, temperature first.
fn shows_humidity(state: &StatusState, settings: &ButtonSettings) -> bool {
    match settings.sensor.as_deref() {
        Some(sensor) => sensor.eq_ignore_ascii_case("humidity"),
        None => state.temperature.is_none() && state.humidity.is_some(),
    }
}

impl Capability for Status {
    type State = StatusState;

    fn kind(&self) -> ActionKind {
        ActionKind::Status
    }

    fn derive(&self, devices: &[DeviceInfo]) -> StatusState {
        let state = &devices[0].state;
        StatusState {
            temperature: state.temperature,
            humidity: state.humidity,
        }
    }

    fn present(&self, state: &StatusState, settings: &ButtonSettings) -> Visual {
        let (glyph, value) = if shows_humidity(state, settings) {
            (Glyph::Droplet, state.humidity.map(presentation::percent))
        } else {
            (
                Glyph::Thermometer,
                state.temperature.map(presentation::degrees_one_decimal),
            )
        };
        Visual {
            icon: Icon::new(glyph, NEUTRAL),
            title: presentation::compose_title(settings.label(), &value.unwrap_or_default()),
            state: 0,
        }
    }

    fn unconfigured(&self, settings: &ButtonSettings) -> Visual {
        self.present(
            &StatusState {
                temperature: None,
                humidity: None,
            },
            settings,
        )
    }

    fn command(&self, _state: Option<&StatusState>, _settings: &ButtonSettings) -> Option<Command> {
        None
    }

    fn predict(&self, state: &StatusState, _command: Command) -> StatusState {
        *state
    }
}
