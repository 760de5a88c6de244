//! Client for the local device-control server.
//!
//! Every operation is a GET against `http://{host}:{port}`. Mutating calls
//! return an [`ActionResponse`] on HTTP 2xx; anything else surfaces as
//! [`ClientError::Api`]. Callers must handle both channels: a
//! `status: "error"` body is a device rejection, an `Err` is a transport or
//! server failure.

mod http;
#[cfg(test)]
pub(crate) mod mock;
mod slot;
mod types;

use std::sync::Arc;

use async_trait::async_trait;
pub use http::HttpControlClient;
pub use http::encode_segment;
pub use slot::ClientSlot;
pub use types::ActionResponse;
pub use types::ActionStatus;
pub use types::ArmMode;
pub use types::DeviceInfo;
pub use types::DeviceState;
pub use types::GroupInfo;
pub use types::ListDevice;
pub use types::SceneInfo;
pub use types::normalize_snapshots;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8423;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("control server request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("control server returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed response from control server: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Address of a control server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Same host, different port.
    pub fn with_port(&self, port: u16) -> Self {
        Self {
            host: self.host.clone(),
            port,
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Operations offered by the control server.
///
/// This trait allows for mocking the server in controller tests.
#[async_trait]
pub trait ControlClient: Send + Sync {
    /// `GET /list/devices[/{room}]`
    async fn list_devices(&self, room: Option<&str>) -> Result<Vec<ListDevice>>;

    /// `GET /list/scenes`
    async fn list_scenes(&self) -> Result<Vec<SceneInfo>>;

    /// `GET /list/groups`
    async fn list_groups(&self) -> Result<Vec<GroupInfo>>;

    /// `GET /info/{target}`, normalised to a list (empty means no data).
    async fn get_device_info(&self, target: &str) -> Result<Vec<DeviceInfo>>;

    async fn toggle(&self, target: &str) -> Result<ActionResponse>;

    async fn turn_on(&self, target: &str) -> Result<ActionResponse>;

    async fn turn_off(&self, target: &str) -> Result<ActionResponse>;

    /// `level` is clamped to 0-100.
    async fn set_brightness(&self, target: &str, level: u8) -> Result<ActionResponse>;

    /// `position` is clamped to 0-100.
    async fn set_position(&self, target: &str, position: u8) -> Result<ActionResponse>;

    async fn execute_scene(&self, name: &str) -> Result<ActionResponse>;

    async fn arm_security(&self, target: &str, mode: ArmMode) -> Result<ActionResponse>;

    async fn disarm_security(&self, target: &str) -> Result<ActionResponse>;

    /// Best-effort liveness probe. Never fails.
    async fn is_available(&self) -> bool;
}

/// Builds a client bound to an endpoint.
pub type ClientFactory = Arc<dyn Fn(Endpoint) -> Result<Arc<dyn ControlClient>> + Send + Sync>;

/// Factory producing [`HttpControlClient`]s.
pub fn http_factory() -> ClientFactory {
    Arc::new(|endpoint| {
        let client = HttpControlClient::new(endpoint)?;
        Ok(Arc::new(client) as Arc<dyn ControlClient>)
    })
}
