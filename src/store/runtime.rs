//! Store runtime: dispatch loop, effect tasks, state publication.
//!
//! ARCHITECTURE
//! ============
//! A `Store` is built once by the composition root and owns every task it
//! spawns. Callers get a cloneable `StoreHandle`.
//!
//! ```text
//! dispatch() --mpsc--> dispatch loop --reduce--> watch<Arc<AppState>>
//!                           |                    history (bounded)
//!                           |                    broadcast<Action>
//!                           +--mpsc--> effect task (one per effect)
//!                                          |
//!                                          +--spawn--> async work --dispatch()-->
//! ```
//!
//! DESIGN
//! ======
//! - The dispatch loop is the only writer of state, so reductions are
//!   strictly ordered by arrival.
//! - Every effect sees every action in dispatch order. Matching actions
//!   produce an [`EffectFuture`] that is spawned so the inbox keeps
//!   draining; its output (if any) is dispatched as a follow-up action.
//! - Independent requests are not cancelled or sequenced: whichever
//!   completion is dispatched last wins.
//! - Queued actions and in-flight effect work each hold a `PendingGuard`.
//!   `StoreHandle::settle` waits for the count to reach zero, which is how
//!   the binary and tests wait for a cascade of actions to finish.

#[cfg(test)]
#[path = "runtime_test.rs"]
mod tests;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::BoxFuture;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, trace, warn};

use super::{Action, AppState, reduce};
use crate::config::DEFAULT_HISTORY_LIMIT;

const ACTION_BROADCAST_CAPACITY: usize = 256;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The dispatch loop has stopped; the action was not delivered.
    #[error("store is shut down")]
    Closed,
}

// =============================================================================
// EFFECTS
// =============================================================================

/// Async work started by an effect. Resolves to an optional follow-up action.
pub type EffectFuture = BoxFuture<'static, Option<Action>>;

/// A side-effect handler fed by the dispatch loop.
pub trait Effect: Send + Sync + 'static {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Inspect a reduced action. Return `Some` to start work for it.
    fn on_action(&self, action: &Action) -> Option<EffectFuture>;
}

struct FnEffect<F> {
    name: &'static str,
    handler: F,
}

impl<F> Effect for FnEffect<F>
where
    F: Fn(&Action) -> Option<EffectFuture> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn on_action(&self, action: &Action) -> Option<EffectFuture> {
        (self.handler)(action)
    }
}

/// Build an [`Effect`] from a closure.
pub fn effect_fn<F>(name: &'static str, handler: F) -> Arc<dyn Effect>
where
    F: Fn(&Action) -> Option<EffectFuture> + Send + Sync + 'static,
{
    Arc::new(FnEffect { name, handler })
}

// =============================================================================
// PENDING WORK
// =============================================================================

#[derive(Clone)]
struct Pending(Arc<watch::Sender<usize>>);

impl Pending {
    fn new() -> Self {
        Self(Arc::new(watch::Sender::new(0)))
    }

    fn acquire(&self) -> PendingGuard {
        self.0.send_modify(|n| *n += 1);
        PendingGuard(self.clone())
    }

    async fn idle(&self) {
        let mut rx = self.0.subscribe();
        if let Err(e) = rx.wait_for(|n| *n == 0).await {
            warn!(error = %e, "pending counter closed");
        }
    }
}

struct PendingGuard(Pending);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}

/// An action in flight, counted until it is dropped.
struct Envelope {
    action: Action,
    _guard: PendingGuard,
}

// =============================================================================
// HISTORY
// =============================================================================

/// One reduced action, as kept in the store history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRecord {
    /// 1-based position in the dispatch sequence.
    pub seq: u64,
    pub kind: &'static str,
}

struct History {
    records: Mutex<VecDeque<ActionRecord>>,
    limit: usize,
}

impl History {
    fn new(limit: usize) -> Self {
        Self { records: Mutex::new(VecDeque::with_capacity(limit)), limit }
    }

    fn push(&self, record: ActionRecord) {
        if self.limit == 0 {
            return;
        }
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        while records.len() >= self.limit {
            records.pop_front();
        }
        records.push_back(record);
    }

    fn snapshot(&self) -> Vec<ActionRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).iter().cloned().collect()
    }
}

// =============================================================================
// HANDLE
// =============================================================================

/// Cheap, cloneable access to a running store.
#[derive(Clone)]
pub struct StoreHandle {
    actions: mpsc::UnboundedSender<Envelope>,
    state: watch::Receiver<Arc<AppState>>,
    events: broadcast::Sender<Action>,
    history: Arc<History>,
    pending: Pending,
}

impl StoreHandle {
    /// Queue an action for the dispatch loop.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Closed`] if the store has been shut down.
    pub fn dispatch(&self, action: impl Into<Action>) -> Result<(), StoreError> {
        let action = action.into();
        trace!(action = action.kind(), "dispatch");
        let envelope = Envelope { action, _guard: self.pending.acquire() };
        self.actions.send(envelope).map_err(|_| StoreError::Closed)
    }

    /// Latest reduced state.
    #[must_use]
    pub fn state(&self) -> Arc<AppState> {
        self.state.borrow().clone()
    }

    /// Apply a selector to the latest state.
    pub fn select<T>(&self, selector: impl FnOnce(&AppState) -> T) -> T {
        selector(self.state.borrow().as_ref())
    }

    /// Receiver that is notified after every reduction.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Arc<AppState>> {
        self.state.clone()
    }

    /// Stream of reduced actions, in dispatch order.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Action> {
        self.events.subscribe()
    }

    /// Most recent action kinds, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<ActionRecord> {
        self.history.snapshot()
    }

    /// Wait until no actions are queued and no effect work is running.
    pub async fn settle(&self) {
        self.pending.idle().await;
    }
}

// =============================================================================
// STORE
// =============================================================================

pub struct StoreBuilder {
    initial: AppState,
    effects: Vec<Arc<dyn Effect>>,
    history_limit: usize,
}

impl StoreBuilder {
    #[must_use]
    pub fn initial_state(mut self, state: AppState) -> Self {
        self.initial = state;
        self
    }

    #[must_use]
    pub fn effect(mut self, effect: Arc<dyn Effect>) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn effects(mut self, effects: impl IntoIterator<Item = Arc<dyn Effect>>) -> Self {
        self.effects.extend(effects);
        self
    }

    /// Number of action records kept by [`StoreHandle::history`].
    #[must_use]
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Spawn the dispatch loop and effect tasks on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn build(self) -> Store {
        let pending = Pending::new();
        let (actions_tx, actions_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(Arc::new(self.initial.clone()));
        let (events_tx, _) = broadcast::channel(ACTION_BROADCAST_CAPACITY);
        let history = Arc::new(History::new(self.history_limit));

        let mut tasks = Vec::with_capacity(self.effects.len() + 1);
        let mut inboxes = Vec::with_capacity(self.effects.len());
        for effect in self.effects {
            let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
            inboxes.push((effect.name(), inbox_tx));
            tasks.push(tokio::spawn(run_effect(effect, inbox_rx, actions_tx.clone(), pending.clone())));
        }

        tasks.push(tokio::spawn(run_dispatch_loop(DispatchLoop {
            state: Arc::new(self.initial),
            actions: actions_rx,
            state_tx,
            events: events_tx.clone(),
            history: Arc::clone(&history),
            inboxes,
            pending: pending.clone(),
        })));

        debug!(effects = tasks.len() - 1, history_limit = self.history_limit, "store started");
        Store {
            handle: StoreHandle { actions: actions_tx, state: state_rx, events: events_tx, history, pending },
            tasks,
        }
    }
}

/// Owner of the dispatch loop and effect tasks. Dropping it stops them.
pub struct Store {
    handle: StoreHandle,
    tasks: Vec<JoinHandle<()>>,
}

impl Store {
    #[must_use]
    pub fn builder() -> StoreBuilder {
        StoreBuilder { initial: AppState::default(), effects: Vec::new(), history_limit: DEFAULT_HISTORY_LIMIT }
    }

    #[must_use]
    pub fn handle(&self) -> StoreHandle {
        self.handle.clone()
    }

    /// Stop the dispatch loop and all effect tasks. Outstanding handles
    /// fail further dispatches with [`StoreError::Closed`].
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        debug!("store stopped");
    }
}

// =============================================================================
// TASKS
// =============================================================================

struct DispatchLoop {
    state: Arc<AppState>,
    actions: mpsc::UnboundedReceiver<Envelope>,
    state_tx: watch::Sender<Arc<AppState>>,
    events: broadcast::Sender<Action>,
    history: Arc<History>,
    inboxes: Vec<(&'static str, mpsc::UnboundedSender<Envelope>)>,
    pending: Pending,
}

async fn run_dispatch_loop(mut ctx: DispatchLoop) {
    let mut seq = 0_u64;
    while let Some(envelope) = ctx.actions.recv().await {
        let action = envelope.action;
        seq += 1;
        let kind = action.kind();

        let next = Arc::new(reduce(&ctx.state, &action));
        ctx.state = Arc::clone(&next);
        ctx.state_tx.send_replace(next);
        ctx.history.push(ActionRecord { seq, kind });
        debug!(seq, action = kind, terminal = action.is_terminal(), "reduced");

        if ctx.events.send(action.clone()).is_err() {
            trace!(action = kind, "no action subscribers");
        }

        for (name, inbox) in &ctx.inboxes {
            let forwarded = Envelope { action: action.clone(), _guard: ctx.pending.acquire() };
            if inbox.send(forwarded).is_err() {
                warn!(effect = name, action = kind, "effect inbox closed");
            }
        }
        // `envelope._guard` drops here, after every inbox holds its own guard.
    }
    debug!("dispatch loop finished");
}

async fn run_effect(
    effect: Arc<dyn Effect>,
    mut inbox: mpsc::UnboundedReceiver<Envelope>,
    dispatcher: mpsc::UnboundedSender<Envelope>,
    pending: Pending,
) {
    let name = effect.name();
    let mut in_flight = JoinSet::new();
    loop {
        tokio::select! {
            received = inbox.recv() => {
                let Some(envelope) = received else { break };
                let Some(work) = effect.on_action(&envelope.action) else { continue };
                trace!(effect = name, action = envelope.action.kind(), "effect started");
                let guard = pending.acquire();
                let dispatcher = dispatcher.clone();
                let pending = pending.clone();
                in_flight.spawn(async move {
                    let _guard = guard;
                    if let Some(next) = work.await {
                        trace!(effect = name, action = next.kind(), "effect emitted");
                        let envelope = Envelope { action: next, _guard: pending.acquire() };
                        if dispatcher.send(envelope).is_err() {
                            debug!(effect = name, "store closed; follow-up action dropped");
                        }
                    }
                });
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = joined
                    && e.is_panic()
                {
                    warn!(effect = name, "effect work panicked");
                }
            }
        }
    }
}
