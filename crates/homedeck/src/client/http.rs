use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::ActionResponse;
use super::ArmMode;
use super::ClientError;
use super::ControlClient;
use super::DeviceInfo;
use super::Endpoint;
use super::GroupInfo;
use super::ListDevice;
use super::Result;
use super::SceneInfo;
use super::normalize_snapshots;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Percent-encode one path segment.
///
/// Targets such as `"Living Room/Lamp"` embed `/` and spaces; every reserved
/// character is escaped so the whole target stays a single segment.
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// [`ControlClient`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpControlClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpControlClient {
    pub fn new(endpoint: Endpoint) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: endpoint.base_url(),
        })
    }

    /// Issue a GET and return the body of a 2xx response.
    async fn get(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "control request");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get(path).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ControlClient for HttpControlClient {
    async fn list_devices(&self, room: Option<&str>) -> Result<Vec<ListDevice>> {
        let path = match room {
            Some(room) => format!("/list/devices/{}", encode_segment(room)),
            None => "/list/devices".to_string(),
        };
        self.get_json(&path).await
    }

    async fn list_scenes(&self) -> Result<Vec<SceneInfo>> {
        self.get_json("/list/scenes").await
    }

    async fn list_groups(&self) -> Result<Vec<GroupInfo>> {
        self.get_json("/list/groups").await
    }

    async fn get_device_info(&self, target: &str) -> Result<Vec<DeviceInfo>> {
        let value: serde_json::Value = self
            .get_json(&format!("/info/{}", encode_segment(target)))
            .await?;
        Ok(normalize_snapshots(value)?)
    }

    async fn toggle(&self, target: &str) -> Result<ActionResponse> {
        self.get_json(&format!("/toggle/{}", encode_segment(target)))
            .await
    }

    async fn turn_on(&self, target: &str) -> Result<ActionResponse> {
        self.get_json(&format!("/on/{}", encode_segment(target)))
            .await
    }

    async fn turn_off(&self, target: &str) -> Result<ActionResponse> {
        self.get_json(&format!("/off/{}", encode_segment(target)))
            .await
    }

    async fn set_brightness(&self, target: &str, level: u8) -> Result<ActionResponse> {
        let level = level.min(100);
        self.get_json(&format!("/brightness/{}/{}", level, encode_segment(target)))
            .await
    }

    async fn set_position(&self, target: &str, position: u8) -> Result<ActionResponse> {
        let position = position.min(100);
        self.get_json(&format!(
            "/position/{}/{}",
            position,
            encode_segment(target)
        ))
        .await
    }

    async fn execute_scene(&self, name: &str) -> Result<ActionResponse> {
        self.get_json(&format!("/scene/{}", encode_segment(name)))
            .await
    }

    async fn arm_security(&self, target: &str, mode: ArmMode) -> Result<ActionResponse> {
        self.get_json(&format!(
            "/security/arm/{}/{}",
            mode.index(),
            encode_segment(target)
        ))
        .await
    }

    async fn disarm_security(&self, target: &str) -> Result<ActionResponse> {
        self.get_json(&format!("/security/disarm/{}", encode_segment(target)))
            .await
    }

    async fn is_available(&self) -> bool {
        match self.get("/list/devices").await {
            Ok(_) => true,
            Err(e) => {
                debug!("control server unavailable: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::Router;
    use axum::extract::OriginalUri;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use serde_json::json;

    use super::*;
    use crate::client::ActionStatus;

    async fn serve(router: Router) -> Endpoint {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Endpoint::new("127.0.0.1", port)
    }

    async fn echo_info(Path(target): Path<String>, OriginalUri(uri): OriginalUri) -> Json<serde_json::Value> {
        Json(json!({
            "name": target,
            "type": "lightbulb",
            "reachable": true,
            "state": {"on": true},
            "path": uri.path(),
        }))
    }

    async fn toggle(Path(target): Path<String>) -> axum::response::Response {
        match target.as_str() {
            "Garage/Door" => (StatusCode::FORBIDDEN, "Pro feature required").into_response(),
            "Office/Broken" => Json(json!({"status": "error", "message": "unreachable"})).into_response(),
            _ => Json(json!({"status": "success"})).into_response(),
        }
    }

    async fn brightness(Path((level, target)): Path<(u8, String)>) -> Json<serde_json::Value> {
        Json(json!({"status": "success", "message": format!("{target}={level}")}))
    }

    fn router() -> Router {
        Router::new()
            .route("/info/:target", get(echo_info))
            .route("/toggle/:target", get(toggle))
            .route("/brightness/:level/:target", get(brightness))
            .route(
                "/list/devices/:room",
                get(|Path(room): Path<String>| async move {
                    Json(json!([{"name": "Lamp", "room": room, "type": "lightbulb"}]))
                }),
            )
            .route(
                "/list/scenes",
                get(|| async { Json(json!([{"name": "Movie Night", "icon": "film"}])) }),
            )
    }

    #[tokio::test]
    async fn test_target_round_trips_through_percent_encoding() {
        let endpoint = serve(router()).await;
        let client = HttpControlClient::new(endpoint).unwrap();

        for target in ["Living Room/Floor Lamp", "group.Downstairs", "Küche/Licht #2", "Office/50% Lamp?"] {
            let devices = client.get_device_info(target).await.unwrap();
            assert_eq!(devices.len(), 1);
            assert_eq!(devices[0].name.as_deref(), Some(target));
        }
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("Living Room/Lamp"), "Living%20Room%2FLamp");
        assert_eq!(encode_segment("group.Kitchen"), "group.Kitchen");
        let encoded = encode_segment("Room/group.All Lights");
        assert!(!encoded.contains('/'));
        assert_eq!(urlencoding::decode(&encoded).unwrap(), "Room/group.All Lights");
    }

    #[tokio::test]
    async fn test_error_channels_are_distinct() {
        let endpoint = serve(router()).await;
        let client = HttpControlClient::new(endpoint).unwrap();

        let ok = client.toggle("Office/Lamp").await.unwrap();
        assert_eq!(ok.status, ActionStatus::Success);

        let rejected = client.toggle("Office/Broken").await.unwrap();
        assert!(rejected.is_rejected());
        assert_eq!(rejected.message.as_deref(), Some("unreachable"));

        match client.toggle("Garage/Door").await {
            Err(ClientError::Api { status, body }) => {
                assert_eq!(status, 403);
                assert_eq!(body, "Pro feature required");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_numeric_commands_are_clamped() {
        let endpoint = serve(router()).await;
        let client = HttpControlClient::new(endpoint).unwrap();

        let response = client.set_brightness("Office/Lamp", 250).await.unwrap();
        assert_eq!(response.message.as_deref(), Some("Office/Lamp=100"));
    }

    #[tokio::test]
    async fn test_catalog_queries() {
        let endpoint = serve(router()).await;
        let client = HttpControlClient::new(endpoint).unwrap();

        let devices = client.list_devices(Some("Living Room")).await.unwrap();
        assert_eq!(devices[0].room.as_deref(), Some("Living Room"));

        let scenes = client.list_scenes().await.unwrap();
        assert_eq!(scenes[0].name, "Movie Night");

        // No route registered for groups: surfaces as an API error.
        assert!(matches!(
            client.list_groups().await,
            Err(ClientError::Api { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_is_available() {
        let endpoint = serve(Router::new().route("/list/devices", get(|| async { Json(json!([])) }))).await;
        assert!(HttpControlClient::new(endpoint).unwrap().is_available().await);

        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = HttpControlClient::new(Endpoint::new("127.0.0.1", port)).unwrap();
        assert!(!client.is_available().await);
        assert!(matches!(
            client.get_device_info("Office/Lamp").await,
            Err(ClientError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let endpoint = serve(Router::new().route("/info/:target", get(|| async { "not json" }))).await;
        let client = HttpControlClient::new(endpoint).unwrap();

        assert!(matches!(
            client.get_device_info("Office/Lamp").await,
            Err(ClientError::Decode(_))
        ));
    }
}
