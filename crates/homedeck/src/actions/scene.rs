use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::ActionContext;
use super::ActionFactoryResult;
use super::ActionHandler;
use super::ActionKind;
use crate::client::ClientSlot;
use crate::host::Button;
use crate::host::ButtonSettings;
use crate::presentation;
use crate::presentation::Glyph;
use crate::presentation::Icon;
use crate::presentation::Visual;

/// Fire-once scene trigger. No polling and no cached state: the key only
/// shows the scene's icon and name, looked up in the live scene catalog.
pub struct SceneAction {
    client: ClientSlot,
}

impl SceneAction {
    pub fn new(client: ClientSlot) -> Self {
        Self { client }
    }

    pub fn create(ctx: &ActionContext) -> ActionFactoryResult {
        let client = ClientSlot::new(ctx.factory.clone(), ctx.endpoint.clone())
            .context("failed to build control client for scene")?;
        Ok(Arc::new(Self::new(client)))
    }

    /// `scene` setting, falling back to `target`.
    fn scene_name(settings: &ButtonSettings) -> Option<&str> {
        settings.scene.as_deref().or(settings.target())
    }

    fn visual(glyph: Glyph, name: &str, settings: &ButtonSettings) -> Visual {
        let title = match settings.label() {
            "" => name.to_string(),
            label => label.to_string(),
        };
        Visual {
            icon: Icon::new(glyph, presentation::tint(settings, true, presentation::AMBER)),
            title,
            state: 0,
        }
    }

    async fn refresh(&self, button: &Button) {
        let settings = button.settings();
        self.client.rebind(settings.port);

        let Some(name) = Self::scene_name(&settings) else {
            button.render(&Self::visual(Glyph::Play, "", &settings));
            return;
        };

        let glyph = match self.client.current().list_scenes().await {
            Ok(scenes) => scenes
                .iter()
                .find(|scene| scene.name == name)
                .and_then(|scene| scene.icon.as_deref())
                .and_then(Glyph::from_hint),
            Err(e) => {
                debug!("[scene] Catalog lookup failed: {}", e);
                None
            }
        };
        button.render(&Self::visual(glyph.unwrap_or(Glyph::Play), name, &settings));
    }
}

#[async_trait]
impl ActionHandler for SceneAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Scene
    }

    fn client_slot(&self) -> &ClientSlot {
        &self.client
    }

    async fn will_appear(&self, button: Button) {
        self.refresh(&button).await;
    }

    fn will_disappear(&self, _context: &str) {}

    async fn did_receive_settings(&self, button: Button) {
        self.refresh(&button).await;
    }

    async fn key_down(&self, button: Button) {
        let settings = button.settings();
        let Some(name) = Self::scene_name(&settings) else {
            button.show_alert();
            return;
        };

        self.client.rebind(settings.port);
        match self.client.current().execute_scene(name).await {
            Ok(response) if !response.is_rejected() => {
                info!("[scene] Executed {}", name);
                button.show_ok();
            }
            Ok(response) => {
                warn!(
                    "[scene] {} rejected: {}",
                    name,
                    response.message.as_deref().unwrap_or("no details")
                );
                button.show_alert();
            }
            Err(e) => {
                warn!("[scene] {} failed: {}", name, e);
                button.show_alert();
            }
        }
    }
}
