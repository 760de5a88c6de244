use serde::Deserialize;
use serde::Serialize;

fn default_true() -> bool {
    true
}

/// Point-in-time state of a single device as reported by the control server.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DeviceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Device type as named by the server (e.g. "lightbulb", "lock").
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Optional icon hint chosen by the user on the server side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default = "default_true")]
    pub reachable: bool,

    #[serde(default)]
    pub state: DeviceState,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            name: None,
            kind: String::new(),
            icon: None,
            reachable: true,
            state: DeviceState::default(),
        }
    }
}

/// Type-specific state fields. Every field is optional; absence means unknown.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub door_state: Option<String>,
    /// Free-form mode reported by thermostats and fans; shape varies per device.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_state: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Success,
    Partial,
    Error,
}

/// Body returned by every mutating endpoint on HTTP 2xx.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ActionResponse {
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionResponse {
    pub fn success() -> Self {
        Self {
            status: ActionStatus::Success,
            message: None,
        }
    }

    /// The device rejected the command even though the request itself went through.
    pub fn is_rejected(&self) -> bool {
        self.status == ActionStatus::Error
    }
}

/// Entry of `GET /list/devices`.
///
/// Unknown fields are kept so the settings pages receive everything the server sent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ListDevice {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Entry of `GET /list/scenes`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SceneInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Entry of `GET /list/groups`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GroupInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Security system arm modes accepted by `/security/arm/{mode}/{target}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmMode {
    Stay = 0,
    Away = 1,
    Night = 2,
}

impl ArmMode {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(ArmMode::Stay),
            1 => Some(ArmMode::Away),
            2 => Some(ArmMode::Night),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Normalise an `/info` body into a list of snapshots.
///
/// The server answers with a bare object for single devices and an array for
/// groups. `null` and `[]` both mean "no data".
pub fn normalize_snapshots(value: serde_json::Value) -> Result<Vec<DeviceInfo>, serde_json::Error> {
    match value {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Array(_) => serde_json::from_value(value),
        other => Ok(vec![serde_json::from_value(other)?]),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalize_single_object() {
        let devices = normalize_snapshots(json!({
            "type": "lightbulb",
            "reachable": true,
            "state": {"on": true, "brightness": 40}
        }))
        .unwrap();

        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].kind, "lightbulb");
        assert_eq!(devices[0].state.on, Some(true));
        assert_eq!(devices[0].state.brightness, Some(40.0));
    }

    #[test]
    fn test_normalize_array_and_empty() {
        let devices = normalize_snapshots(json!([
            {"type": "lightbulb", "state": {"on": true}},
            {"type": "lightbulb", "state": {}}
        ]))
        .unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[1].state, DeviceState::default());

        assert!(normalize_snapshots(json!([])).unwrap().is_empty());
        assert!(normalize_snapshots(serde_json::Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_normalize_rejects_malformed_state() {
        let result = normalize_snapshots(json!({"type": "lock", "state": {"locked": "yes"}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_state_field_names() {
        let state: DeviceState = serde_json::from_value(json!({
            "targetTemperature": 21.5,
            "doorState": "opening",
            "securityState": 1
        }))
        .unwrap();

        assert_eq!(state.target_temperature, Some(21.5));
        assert_eq!(state.door_state.as_deref(), Some("opening"));
        assert_eq!(state.security_state, Some(1));
        assert_eq!(state.on, None);
    }

    #[test]
    fn test_action_response() {
        let ok: ActionResponse = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(!ok.is_rejected());

        let rejected: ActionResponse =
            serde_json::from_str(r#"{"status":"error","message":"device offline"}"#).unwrap();
        assert!(rejected.is_rejected());
        assert_eq!(rejected.message.as_deref(), Some("device offline"));

        let partial: ActionResponse = serde_json::from_str(r#"{"status":"partial"}"#).unwrap();
        assert_eq!(partial.status, ActionStatus::Partial);
    }

    #[test]
    fn test_catalog_keeps_unknown_fields() {
        let scene: SceneInfo =
            serde_json::from_value(json!({"name": "Movie", "icon": "film", "id": 7})).unwrap();
        assert_eq!(scene.icon.as_deref(), Some("film"));
        assert_eq!(serde_json::to_value(&scene).unwrap()["id"], 7);
    }
}
