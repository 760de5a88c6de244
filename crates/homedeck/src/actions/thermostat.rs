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

/// What the thermostat title shows, from the `display` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum DisplayMode {
    #[default]
    CurrentTarget,
    Current,
    Target,
}

impl DisplayMode {
    fn from_settings(settings: &ButtonSettings) -> Self {
        settings
            .display
            .as_deref()
            .and_then(|d| d.parse().ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThermostatState {
    pub on: bool,
    pub current: Option<f64>,
    pub target: Option<f64>,
}

pub struct Thermostat;

impl Thermostat {
    fn reading(state: &ThermostatState, display: DisplayMode) -> String {
        let degrees = |v: Option<f64>| v.map(presentation::degrees).unwrap_or_default();
        match display {
            DisplayMode::Current => degrees(state.current),
            DisplayMode::Target => degrees(state.target),
            DisplayMode::CurrentTarget => match (state.current, state.target) {
                (Some(current), Some(target)) => format!(
                    "{}/{}",
                    presentation::degrees(current),
                    presentation::degrees(target)
                ),
                (current, _) => degrees(current),
            },
        }
    }
}

impl Capability for Thermostat {
    type State = ThermostatState;

    fn kind(&self) -> ActionKind {
        ActionKind::Thermostat
    }

    fn derive(&self, devices: &[DeviceInfo]) -> ThermostatState {
        let state = &devices[0].state;
        ThermostatState {
            on: state.on.unwrap_or(false),
            current: state.temperature,
            target: state.target_temperature,
        }
    }

    fn present(&self, state: &ThermostatState, settings: &ButtonSettings) -> Visual {
        let value = Self::reading(state, DisplayMode::from_settings(settings));
        Visual {
            icon: Icon::new(
                Glyph::Thermometer,
                presentation::tint(settings, state.on, presentation::ORANGE),
            ),
            title: presentation::compose_title(settings.label(), &value),
            state: u8::from(state.on),
        }
    }

    fn unconfigured(&self, settings: &ButtonSettings) -> Visual {
        self.present(
            &ThermostatState {
                on: false,
                current: None,
                target: None,
            },
            settings,
        )
    }

    fn command(&self, _state: Option<&ThermostatState>, _settings: &ButtonSettings) -> Option<Command> {
        Some(Command::Toggle)
    }

    fn predict(&self, state: &ThermostatState, _command: Command) -> ThermostatState {
        ThermostatState {
            on: !state.on,
            ..state.clone()
        }
    }

    fn flips_early(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::actions::testing::device;

    fn title(snapshot: serde_json::Value, display: Option<&str>) -> String {
        let settings = ButtonSettings {
            display: display.map(str::to_string),
            ..ButtonSettings::default()
        };
        let state = Thermostat.derive(&[device(snapshot)]);
        Thermostat.present(&state, &settings).title
    }

    #[test]
    fn test_display_modes() {
        let both = json!({"state": {"on": true, "temperature": 22.5, "targetTemperature": 24}});
        let current_only = json!({"state": {"temperature": 19.4}});
        let target_only = json!({"state": {"targetTemperature": 21}});

        assert_eq!(title(both.clone(), Some("current-target")), "23°/24°");
        assert_eq!(title(both.clone(), None), "23°/24°");
        assert_eq!(title(both.clone(), Some("current")), "23°");
        assert_eq!(title(both, Some("target")), "24°");
        assert_eq!(title(current_only.clone(), None), "19°");
        assert_eq!(title(current_only, Some("target")), "");
        assert_eq!(title(target_only.clone(), None), "");
        assert_eq!(title(target_only, Some("bogus")), "");
    }

    #[test]
    fn test_label_and_state() {
        let settings = ButtonSettings {
            label: Some("Hall".to_string()),
            ..ButtonSettings::default()
        };
        let state = Thermostat.derive(&[device(json!({"state": {"on": true, "temperature": 20}}))]);
        let visual = Thermostat.present(&state, &settings);
        assert_eq!(visual.title, "Hall\n20°");
        assert_eq!(visual.state, 1);

        let off = Thermostat.predict(&state, Command::Toggle);
        assert_eq!(Thermostat.present(&off, &settings).state, 0);
    }
}
