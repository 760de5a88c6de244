use std::sync::Arc;
use std::sync::Mutex;

use tracing::info;
use tracing::warn;

use super::ClientFactory;
use super::ControlClient;
use super::Endpoint;
use super::Result;

struct Bound {
    endpoint: Endpoint,
    client: Arc<dyn ControlClient>,
}

/// The client an action currently talks to.
///
/// A button may override the server port in its settings; the slot rebuilds
/// its client when that happens and otherwise hands out the existing one.
/// Clearing the override goes back to the configured endpoint.
pub struct ClientSlot {
    factory: ClientFactory,
    configured: Endpoint,
    bound: Mutex<Bound>,
}

impl ClientSlot {
    pub fn new(factory: ClientFactory, endpoint: Endpoint) -> Result<Self> {
        let client = factory(endpoint.clone())?;
        Ok(Self {
            factory,
            configured: endpoint.clone(),
            bound: Mutex::new(Bound { endpoint, client }),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Bound> {
        self.bound.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn current(&self) -> Arc<dyn ControlClient> {
        self.lock().client.clone()
    }

    pub fn endpoint(&self) -> Endpoint {
        self.lock().endpoint.clone()
    }

    /// Rebind to `port`, or to the configured port when `None`, if that
    /// differs from the current endpoint.
    ///
    /// A failed rebuild keeps the previous client.
    pub fn rebind(&self, port: Option<u16>) {
        let endpoint = match port {
            Some(port) => self.configured.with_port(port),
            None => self.configured.clone(),
        };

        let mut bound = self.lock();
        if bound.endpoint == endpoint {
            return;
        }

        match (self.factory)(endpoint.clone()) {
            Ok(client) => {
                info!("Control client rebound to {}", endpoint);
                *bound = Bound { endpoint, client };
            }
            Err(e) => {
                warn!("Failed to build control client for {}: {}", endpoint, e);
            }
        }
    }
}
