use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::Weak;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::ActionContext;
use super::ActionFactoryResult;
use super::ActionHandler;
use super::ActionKind;
use super::Timing;
use super::capability::Capability;
use crate::client::ActionStatus;
use crate::client::ClientSlot;
use crate::host::Button;
use crate::host::ButtonSettings;

/// Mutable per-controller state, guarded by one mutex that is never held
/// across an `.await`.
struct ControllerState<S> {
    /// Last known state per target.
    cache: HashMap<String, S>,
    /// Target -> instant until which polls leave it alone.
    holds: HashMap<String, Instant>,
    /// Visible buttons by context.
    active: HashMap<String, Button>,
    /// Poll timer; present iff `active` is non-empty.
    poller: Option<JoinHandle<()>>,
}

impl<S> Default for ControllerState<S> {
    fn default() -> Self {
        Self {
            cache: HashMap::new(),
            holds: HashMap::new(),
            active: HashMap::new(),
            poller: None,
        }
    }
}

struct Shared<C: Capability> {
    capability: C,
    client: ClientSlot,
    timing: Timing,
    state: Mutex<ControllerState<C::State>>,
}

/// Generic polled action: one instance serves every button of one action kind.
///
/// Lifecycle:
/// - Idle: no visible buttons, no timer.
/// - Polling: at least one visible button, exactly one timer re-fetching
///   every visible button's target each interval.
pub struct Controller<C: Capability> {
    shared: Arc<Shared<C>>,
}

impl<C: Capability> Controller<C> {
    pub fn new(capability: C, client: ClientSlot, timing: Timing) -> Self {
        Self {
            shared: Arc::new(Shared {
                capability,
                client,
                timing,
                state: Mutex::new(ControllerState::default()),
            }),
        }
    }

    /// Factory used by the action registry.
    pub fn create(capability: C, ctx: &ActionContext) -> ActionFactoryResult {
        let kind = capability.kind();
        let client = ClientSlot::new(ctx.factory.clone(), ctx.endpoint.clone())
            .with_context(|| format!("failed to build control client for {}", kind))?;
        Ok(Arc::new(Self::new(capability, client, ctx.timing)))
    }

    pub fn is_polling(&self) -> bool {
        self.shared.lock().poller.is_some()
    }

    pub fn active_count(&self) -> usize {
        self.shared.lock().active.len()
    }

    pub fn cached(&self, target: &str) -> Option<C::State> {
        self.shared.cached(target)
    }
}

impl<C: Capability> Shared<C> {
    fn lock(&self) -> MutexGuard<'_, ControllerState<C::State>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn kind(&self) -> ActionKind {
        self.capability.kind()
    }

    fn cached(&self, target: &str) -> Option<C::State> {
        self.lock().cache.get(target).cloned()
    }

    /// Register a visible button and make sure the poll timer runs.
    fn activate(self: &Arc<Self>, button: Button) {
        let mut state = self.lock();
        state.active.insert(button.context().to_string(), button);
        if state.poller.is_none() {
            debug!("[{}] Starting poll timer", self.kind());
            let shared = Arc::downgrade(self);
            state.poller = Some(tokio::spawn(poll_loop(shared, self.timing.poll_interval)));
        }
    }

    /// Forget a button; stop the timer once nothing is visible.
    fn deactivate(&self, context: &str) {
        let mut state = self.lock();
        state.active.remove(context);
        if state.active.is_empty() {
            if let Some(poller) = state.poller.take() {
                poller.abort();
                debug!("[{}] Stopped poll timer", self.kind());
            }
        }
    }

    /// One timer tick: re-fetch every visible button independently.
    fn poll_once(self: &Arc<Self>) {
        let now = Instant::now();
        let buttons: Vec<Button> = {
            let mut state = self.lock();
            state.holds.retain(|_, expiry| now < *expiry);
            state.active.values().cloned().collect()
        };

        for button in buttons {
            if !button.surface().can_render() {
                continue;
            }
            let settings = button.settings();
            let Some(target) = settings.target() else {
                continue;
            };
            if self.is_held(target, now) {
                trace!("[{}] {} is held, skipping poll", self.kind(), target);
                continue;
            }

            let shared = Arc::clone(self);
            tokio::spawn(async move {
                shared.refresh(&button, &settings).await;
            });
        }
    }

    fn is_held(&self, target: &str, now: Instant) -> bool {
        self.lock()
            .holds
            .get(target)
            .is_some_and(|expiry| now < *expiry)
    }

    /// Fetch the target's state, cache it and render it.
    ///
    /// Failures leave the previous visual in place: the control server is
    /// often simply not running, which must not turn into user-visible noise.
    async fn refresh(&self, button: &Button, settings: &ButtonSettings) {
        let Some(target) = settings.target() else {
            return;
        };

        let client = self.client.current();
        let devices = match client.get_device_info(target).await {
            Ok(devices) if !devices.is_empty() => devices,
            Ok(_) => {
                debug!("[{}] No state reported for {}", self.kind(), target);
                return;
            }
            Err(e) => {
                debug!("[{}] State fetch for {} failed: {}", self.kind(), target, e);
                return;
            }
        };

        let fetched = self.capability.derive(&devices);
        let state = {
            let mut state = self.lock();
            let held = state
                .holds
                .get(target)
                .is_some_and(|expiry| Instant::now() < *expiry);
            // A press landed while this fetch was in flight; its prediction wins.
            let predicted = state.cache.get(target).filter(|_| held).cloned();
            match predicted {
                Some(predicted) => {
                    trace!("[{}] {} is held, dropping fetched state", self.kind(), target);
                    predicted
                }
                None => {
                    state.cache.insert(target.to_string(), fetched.clone());
                    fetched
                }
            }
        };
        button.render(&self.capability.present(&state, settings));
    }

    async fn key_down(&self, button: &Button) {
        let settings = button.settings();
        let Some(target) = settings.target() else {
            button.show_alert();
            return;
        };

        let cached = self.cached(target);
        let Some(command) = self.capability.command(cached.as_ref(), &settings) else {
            return;
        };

        let predicted = cached
            .as_ref()
            .map(|state| self.capability.predict(state, command));
        let flips_early = self.capability.flips_early();
        if flips_early {
            if let Some(predicted) = &predicted {
                button.render(&self.capability.present(predicted, &settings));
            }
        }

        let client = self.client.current();
        let failure = match command.send(client.as_ref(), target).await {
            Ok(response) if !response.is_rejected() => {
                if response.status == ActionStatus::Partial {
                    info!(
                        "[{}] {} {} partially applied: {}",
                        self.kind(),
                        command,
                        target,
                        response.message.as_deref().unwrap_or("no details")
                    );
                }
                None
            }
            Ok(response) => Some(
                response
                    .message
                    .unwrap_or_else(|| "rejected by device".to_string()),
            ),
            Err(e) => Some(e.to_string()),
        };

        if let Some(reason) = failure {
            warn!("[{}] {} {} failed: {}", self.kind(), command, target, reason);
            if flips_early {
                if let Some(cached) = &cached {
                    button.render(&self.capability.present(cached, &settings));
                }
            }
            button.show_alert();
            return;
        }

        let Some(predicted) = predicted else {
            debug!(
                "[{}] No cached state for {}, skipping optimistic update",
                self.kind(),
                target
            );
            return;
        };

        let peers: Vec<Button> = {
            let mut state = self.lock();
            state.cache.insert(target.to_string(), predicted.clone());
            if self.capability.holds() {
                state
                    .holds
                    .insert(target.to_string(), Instant::now() + self.timing.hold);
            }
            state
                .active
                .values()
                .filter(|b| b.context() != button.context())
                .cloned()
                .collect()
        };

        if !flips_early {
            button.render(&self.capability.present(&predicted, &settings));
        }

        // Other visible buttons bound to the same target show the prediction too.
        for peer in peers {
            let peer_settings = peer.settings();
            if peer_settings.target() == Some(target) {
                peer.render(&self.capability.present(&predicted, &peer_settings));
            }
        }
    }
}

impl<C: Capability> Drop for Shared<C> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(poller) = state.poller.take() {
            poller.abort();
        }
    }
}

async fn poll_loop<C: Capability>(shared: Weak<Shared<C>>, period: Duration) {
    // The first tick is one period out: appearing already fetched once.
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };
        shared.poll_once();
    }
}

#[async_trait]
impl<C: Capability> ActionHandler for Controller<C> {
    fn kind(&self) -> ActionKind {
        self.shared.kind()
    }

    fn client_slot(&self) -> &ClientSlot {
        &self.shared.client
    }

    async fn will_appear(&self, button: Button) {
        let settings = button.settings();
        self.shared.activate(button.clone());
        self.shared.client.rebind(settings.port);

        if settings.target().is_none() {
            button.render(&self.shared.capability.unconfigured(&settings));
            return;
        }

        if let Some(pending) = self.shared.capability.pending(&settings) {
            button.render(&pending);
        }
        self.shared.refresh(&button, &settings).await;
    }

    fn will_disappear(&self, context: &str) {
        self.shared.deactivate(context);
    }

    async fn did_receive_settings(&self, button: Button) {
        let settings = button.settings();
        self.shared.client.rebind(settings.port);

        if settings.target().is_none() {
            button.render(&self.shared.capability.unconfigured(&settings));
            return;
        }
        self.shared.refresh(&button, &settings).await;
    }

    async fn key_down(&self, button: Button) {
        self.shared.key_down(&button).await;
    }
}
