use super::ActionKind;
use super::Capability;
use super::Command;
use crate::client::ArmMode;
use crate::client::DeviceInfo;
use crate::host::ButtonSettings;
use crate::presentation;
use crate::presentation::Glyph;
use crate::presentation::Icon;
use crate::presentation::Visual;

const DISARMED: u8 = 3;
const TRIGGERED: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityState {
    /// 0 stay, 1 away, 2 night, 3 disarmed, 4 alarm triggered.
    pub state: u8,
}

impl SecurityState {
    pub fn is_armed(self) -> bool {
        self.state != DISARMED
    }

    fn label(self) -> &'static str {
        match self.state {
            0 => "Stay",
            1 => "Away",
            2 => "Night",
            TRIGGERED => "Alarm!",
            _ => "Off",
        }
    }
}

/// Alarm system: arms when disarmed, disarms otherwise.
pub struct Security;

impl Capability for Security {
    type State = SecurityState;

    fn kind(&self) -> ActionKind {
        ActionKind::Security
    }

    fn derive(&self, devices: &[DeviceInfo]) -> SecurityState {
        SecurityState {
            state: devices[0].state.security_state.unwrap_or(DISARMED),
        }
    }

    fn present(&self, state: &SecurityState, settings: &ButtonSettings) -> Visual {
        let icon = if state.state == TRIGGERED {
            Icon::new(Glyph::ShieldAlert, presentation::ALARM_RED)
        } else {
            Icon::new(
                Glyph::Shield,
                presentation::tint(settings, state.is_armed(), presentation::GREEN),
            )
        };
        Visual {
            icon,
            title: presentation::compose_title(settings.label(), state.label()),
            state: u8::from(state.is_armed()),
        }
    }

    fn unconfigured(&self, settings: &ButtonSettings) -> Visual {
        self.present(&SecurityState { state: DISARMED }, settings)
    }

    fn command(&self, state: Option<&SecurityState>, settings: &ButtonSettings) -> Option<Command> {
        let armed = state.is_some_and(|s| s.is_armed());
        if armed {
            return Some(Command::Disarm);
        }
        let mode = settings
            .mode
            .and_then(ArmMode::from_index)
            .unwrap_or(ArmMode::Away);
        Some(Command::Arm(mode))
    }

    fn predict(&self, state: &SecurityState, command: Command) -> SecurityState {
        match command {
            Command::Arm(mode) => SecurityState { state: mode.index() },
            Command::Disarm => SecurityState { state: DISARMED },
            _ => *state,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::actions::ActionHandler;
    use crate::actions::testing::Harness;
    use crate::actions::testing::device;

    #[test]
    fn test_labels_per_state() {
        let titles: Vec<String> = (0..=4)
            .map(|state| Security.present(&SecurityState { state }, &ButtonSettings::default()).title)
            .collect();
        assert_eq!(titles, vec!["Stay", "Away", "Night", "Off", "Alarm!"]);

        let absent = Security.derive(&[device(json!({"state": {}}))]);
        assert!(!absent.is_armed());
    }

    #[test]
    fn test_alarm_visual() {
        let visual = Security.present(&SecurityState { state: 4 }, &ButtonSettings::default());
        assert_eq!(visual.icon, Icon::new(Glyph::ShieldAlert, "#F44336"));
        assert_eq!(visual.state, 1);
    }

    #[test]
    fn test_command_choice() {
        let settings = ButtonSettings::for_target("Home/Alarm");
        let disarmed = SecurityState { state: 3 };
        let away = SecurityState { state: 1 };

        assert_eq!(Security.command(None, &settings), Some(Command::Arm(ArmMode::Away)));
        assert_eq!(Security.command(Some(&disarmed), &settings), Some(Command::Arm(ArmMode::Away)));
        assert_eq!(Security.command(Some(&away), &settings), Some(Command::Disarm));

        let night = ButtonSettings {
            mode: Some(2),
            ..settings.clone()
        };
        assert_eq!(Security.command(Some(&disarmed), &night), Some(Command::Arm(ArmMode::Night)));

        let invalid = ButtonSettings {
            mode: Some(9),
            ..settings
        };
        assert_eq!(Security.command(None, &invalid), Some(Command::Arm(ArmMode::Away)));
    }

    #[tokio::test]
    async fn test_arm_then_disarm() {
        let mut h = Harness::new();
        h.client.set_devices("Home/Alarm", vec![device(json!({"state": {"securityState": 3}}))]);
        let controller = h.controller(Security);
        let settings = ButtonSettings {
            mode: Some(0),
            label: Some("Alarm".to_string()),
            ..ButtonSettings::for_target("Home/Alarm")
        };
        let button = h.button("a", settings);

        controller.will_appear(button.clone()).await;
        controller.key_down(button.clone()).await;
        assert_eq!(h.sent().last_title(), Some("Alarm\nStay"));

        controller.key_down(button).await;
        assert_eq!(h.sent().last_title(), Some("Alarm\nOff"));
        assert_eq!(h.client.count("arm 0 Home/Alarm"), 1);
        assert_eq!(h.client.count("disarm Home/Alarm"), 1);
    }
}
