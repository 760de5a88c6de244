//! Catalog queries from the settings pages.
//!
//! A page sends `{"request": "devices" | "scenes" | "groups" | "status"}` and
//! gets back `{"request", "ok", "data" | "error"}` through
//! `sendToPropertyInspector`.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client;
use crate::client::ControlClient;
use crate::host::Button;

#[derive(Debug, Deserialize)]
#[serde(tag = "request", rename_all = "lowercase")]
enum Request {
    Devices {
        #[serde(default)]
        room: Option<String>,
    },
    Scenes,
    Groups,
    Status,
}

impl Request {
    fn name(&self) -> &'static str {
        match self {
            Request::Devices { .. } => "devices",
            Request::Scenes => "scenes",
            Request::Groups => "groups",
            Request::Status => "status",
        }
    }

    async fn run(&self, client: &dyn ControlClient) -> client::Result<serde_json::Value> {
        Ok(match self {
            Request::Devices { room } => {
                let room = room.as_deref().map(str::trim).filter(|r| !r.is_empty());
                serde_json::to_value(client.list_devices(room).await?)?
            }
            Request::Scenes => serde_json::to_value(client.list_scenes().await?)?,
            Request::Groups => serde_json::to_value(client.list_groups().await?)?,
            Request::Status => json!(client.is_available().await),
        })
    }
}

pub(super) async fn answer(client: &dyn ControlClient, button: &Button, payload: serde_json::Value) {
    let request: Request = match serde_json::from_value(payload) {
        Ok(request) => request,
        Err(e) => {
            debug!("Ignoring settings page message: {}", e);
            return;
        }
    };

    let reply = match request.run(client).await {
        Ok(data) => json!({"request": request.name(), "ok": true, "data": data}),
        Err(e) => {
            debug!("Settings page {} request failed: {}", request.name(), e);
            json!({"request": request.name(), "ok": false, "error": e.to_string()})
        }
    };
    button.send_to_property_inspector(reply);
}
