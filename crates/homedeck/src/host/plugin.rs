use std::sync::Arc;

use futures::FutureExt;
use futures::SinkExt;
use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::Button;
use super::ButtonSettings;
use super::HostHandle;
use super::SettingsStore;
use super::Surface;
use super::protocol::ActionEvent;
use super::protocol::Inbound;
use super::protocol::Registration;
use crate::actions::ActionHandler;
use crate::actions::ActionRegistry;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("failed to connect to host on port {port}: {source}")]
    Connect {
        port: u16,
        #[source]
        source: tungstenite::Error,
    },

    #[error("failed to send to host: {0}")]
    Send(#[source] tungstenite::Error),

    #[error("host connection failed: {0}")]
    Receive(#[source] tungstenite::Error),

    #[error("failed to encode host message: {0}")]
    Protocol(#[from] serde_json::Error),
}

/// Launch parameters the host passes on the command line.
#[derive(Debug, Clone)]
pub struct PluginArgs {
    pub port: u16,
    pub plugin_uuid: String,
    pub register_event: String,
}

/// Connection to the host: routes lifecycle events to action handlers and
/// forwards their display commands.
pub struct Plugin {
    registry: ActionRegistry,
    settings: SettingsStore,
}

impl Plugin {
    pub fn new(registry: ActionRegistry) -> Self {
        Self {
            registry,
            settings: SettingsStore::new(),
        }
    }

    /// Connect, register and serve until the host closes the socket.
    pub async fn run(self, args: PluginArgs) -> Result<(), HostError> {
        let url = format!("ws://127.0.0.1:{}", args.port);
        let (ws, _) = connect_async(url.as_str())
            .await
            .map_err(|source| HostError::Connect {
                port: args.port,
                source,
            })?;
        info!("Connected to host on port {}", args.port);

        let (mut sink, mut stream) = ws.split();
        let registration = Registration {
            event: args.register_event.clone(),
            uuid: args.plugin_uuid.clone(),
        };
        sink.send(Message::Text(serde_json::to_string(&registration)?))
            .await
            .map_err(HostError::Send)?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let host = HostHandle::new(tx, self.settings.clone());

        // Handlers are started in delivery order; their network work overlaps.
        let mut tasks: FuturesUnordered<BoxFuture<'static, ()>> = FuturesUnordered::new();

        loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(task) = self.dispatch(&text, &host) {
                            tasks.push(task);
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Host closed the connection");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(HostError::Receive(e)),
                },
                Some(command) = rx.recv() => {
                    trace!("-> {:?}", command);
                    sink.send(Message::Text(serde_json::to_string(&command)?))
                        .await
                        .map_err(HostError::Send)?;
                }
                Some(()) = tasks.next(), if !tasks.is_empty() => {}
            }
        }

        Ok(())
    }

    fn dispatch(&self, text: &str, host: &HostHandle) -> Option<BoxFuture<'static, ()>> {
        let event: Inbound = match serde_json::from_str(text) {
            Ok(event) => event,
            Err(e) => {
                warn!("Ignoring malformed host message: {}", e);
                return None;
            }
        };

        match event {
            Inbound::WillAppear(event) => {
                let (handler, button) = self.prepare(&event, host)?;
                Some(async move { handler.will_appear(button).await }.boxed())
            }
            Inbound::DidReceiveSettings(event) => {
                let (handler, button) = self.prepare(&event, host)?;
                Some(async move { handler.did_receive_settings(button).await }.boxed())
            }
            Inbound::KeyDown(event) => {
                let (handler, button) = self.prepare(&event, host)?;
                Some(async move { handler.key_down(button).await }.boxed())
            }
            Inbound::WillDisappear(event) => {
                let handler = self.handler(&event.action)?;
                let settings = self.settings.clone();
                Some(
                    async move {
                        handler.will_disappear(&event.context);
                        settings.remove(&event.context);
                    }
                    .boxed(),
                )
            }
            Inbound::SendToPlugin(message) => {
                let handler = self.handler(&message.action)?;
                let button = Button::new(message.action, message.context, Surface::Key, host.clone());
                Some(async move { handler.inspector_request(button, message.payload).await }.boxed())
            }
            Inbound::Ignored => None,
        }
    }

    fn handler(&self, action: &str) -> Option<Arc<dyn ActionHandler>> {
        let handler = self.registry.get(action);
        if handler.is_none() {
            debug!("No handler registered for {}", action);
        }
        handler
    }

    /// Record the event's settings and build the button handle.
    fn prepare(&self, event: &ActionEvent, host: &HostHandle) -> Option<(Arc<dyn ActionHandler>, Button)> {
        let handler = self.handler(&event.action)?;
        self.settings
            .update(&event.context, ButtonSettings::from_json(&event.payload.settings));
        let button = Button::new(
            event.action.as_str(),
            event.context.as_str(),
            event.payload.surface(),
            host.clone(),
        );
        Some((handler, button))
    }
}
