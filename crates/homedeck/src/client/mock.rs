use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::ActionResponse;
use super::ActionStatus;
use super::ArmMode;
use super::ClientError;
use super::ControlClient;
use super::DeviceInfo;
use super::GroupInfo;
use super::ListDevice;
use super::Result;
use super::SceneInfo;

/// How the mock answers mutating calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reply {
    Status(ActionStatus),
    /// Non-2xx response with the given HTTP status.
    Fail(u16),
}

#[derive(Default)]
struct Script {
    devices: HashMap<String, std::result::Result<Vec<DeviceInfo>, u16>>,
    delays: HashMap<String, Duration>,
    reply: Option<Reply>,
    scenes: Option<Vec<SceneInfo>>,
    available: bool,
}

/// Scripted control server recording every call as `"<op> <argument>"`.
#[derive(Default)]
pub(crate) struct MockControlClient {
    script: Mutex<Script>,
    calls: Mutex<Vec<String>>,
}

impl MockControlClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_devices(&self, target: &str, devices: Vec<DeviceInfo>) {
        self.script
            .lock()
            .unwrap()
            .devices
            .insert(target.to_string(), Ok(devices));
    }

    pub fn fail_info(&self, target: &str, status: u16) {
        self.script
            .lock()
            .unwrap()
            .devices
            .insert(target.to_string(), Err(status));
    }

    pub fn delay_info(&self, target: &str, delay: Duration) {
        self.script
            .lock()
            .unwrap()
            .delays
            .insert(target.to_string(), delay);
    }

    pub fn reply_with(&self, reply: Reply) {
        self.script.lock().unwrap().reply = Some(reply);
    }

    pub fn set_scenes(&self, scenes: Vec<SceneInfo>) {
        self.script.lock().unwrap().scenes = Some(scenes);
    }

    pub fn set_available(&self, available: bool) {
        self.script.lock().unwrap().available = available;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn command(&self, call: String) -> Result<ActionResponse> {
        self.record(call);
        match self
            .script
            .lock()
            .unwrap()
            .reply
            .unwrap_or(Reply::Status(ActionStatus::Success))
        {
            Reply::Status(status) => Ok(ActionResponse {
                status,
                message: (status == ActionStatus::Error).then(|| "rejected".to_string()),
            }),
            Reply::Fail(status) => Err(ClientError::Api {
                status,
                body: "mock failure".to_string(),
            }),
        }
    }
}

#[async_trait]
impl ControlClient for MockControlClient {
    async fn list_devices(&self, room: Option<&str>) -> Result<Vec<ListDevice>> {
        self.record(format!("list_devices {}", room.unwrap_or("")));
        Ok(Vec::new())
    }

    async fn list_scenes(&self) -> Result<Vec<SceneInfo>> {
        self.record("list_scenes".to_string());
        self.script
            .lock()
            .unwrap()
            .scenes
            .clone()
            .ok_or(ClientError::Api {
                status: 503,
                body: "scenes unavailable".to_string(),
            })
    }

    async fn list_groups(&self) -> Result<Vec<GroupInfo>> {
        self.record("list_groups".to_string());
        Ok(Vec::new())
    }

    async fn get_device_info(&self, target: &str) -> Result<Vec<DeviceInfo>> {
        self.record(format!("info {}", target));

        let delay = self.script.lock().unwrap().delays.get(target).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.script.lock().unwrap().devices.get(target).cloned() {
            Some(Ok(devices)) => Ok(devices),
            Some(Err(status)) => Err(ClientError::Api {
                status,
                body: "mock failure".to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn toggle(&self, target: &str) -> Result<ActionResponse> {
        self.command(format!("toggle {}", target))
    }

    async fn turn_on(&self, target: &str) -> Result<ActionResponse> {
        self.command(format!("on {}", target))
    }

    async fn turn_off(&self, target: &str) -> Result<ActionResponse> {
        self.command(format!("off {}", target))
    }

    async fn set_brightness(&self, target: &str, level: u8) -> Result<ActionResponse> {
        self.command(format!("brightness {} {}", level, target))
    }

    async fn set_position(&self, target: &str, position: u8) -> Result<ActionResponse> {
        self.command(format!("position {} {}", position, target))
    }

    async fn execute_scene(&self, name: &str) -> Result<ActionResponse> {
        self.command(format!("scene {}", name))
    }

    async fn arm_security(&self, target: &str, mode: ArmMode) -> Result<ActionResponse> {
        self.command(format!("arm {} {}", mode.index(), target))
    }

    async fn disarm_security(&self, target: &str) -> Result<ActionResponse> {
        self.command(format!("disarm {}", target))
    }

    async fn is_available(&self) -> bool {
        self.record("is_available".to_string());
        self.script.lock().unwrap().available
    }
}
