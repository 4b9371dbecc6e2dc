//! The domain event bus.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tmf683_core::clock::Clock;
use tmf683_core::event::{DomainEvent, EventType, NewEvent};
use tmf683_core::event_log::{EventLogRecord, EventLogStore};
use tmf683_core::handler::EventHandler;
use tmf683_core::id::IdGenerator;
use tracing::{debug, error, info};

use crate::config::EventBusConfig;
use crate::dispatch::{self, DispatchTracker};

type HandlerMap = HashMap<EventType, Vec<Arc<dyn EventHandler>>>;

/// Introspection snapshot of a bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusStats {
    /// Event types with at least one handler.
    pub registered_event_types: BTreeSet<EventType>,
    /// Handler count per registered event type.
    pub handler_stats: BTreeMap<EventType, usize>,
    /// Number of events currently held in history.
    pub total_history: usize,
}

/// In-process publish/subscribe hub for domain events.
///
/// Construct one at startup and share it behind an `Arc`. All operations take
/// `&self` and are safe to call concurrently.
pub struct DomainEventBus {
    config: EventBusConfig,
    event_log: Arc<dyn EventLogStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    handlers: RwLock<HandlerMap>,
    history: Mutex<VecDeque<Arc<DomainEvent>>>,
    dispatches: Arc<DispatchTracker>,
}

impl std::fmt::Debug for DomainEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainEventBus")
            .field("config", &self.config)
            .field("registered_event_types", &self.registered_event_types())
            .field("pending_dispatches", &self.pending_dispatches())
            .finish_non_exhaustive()
    }
}

impl DomainEventBus {
    /// Creates a bus with no handlers and an empty history.
    #[must_use]
    pub fn new(
        config: EventBusConfig,
        event_log: Arc<dyn EventLogStore>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            config,
            event_log,
            clock,
            ids,
            handlers: RwLock::new(HashMap::new()),
            history: Mutex::new(VecDeque::with_capacity(config.history_capacity.get())),
            dispatches: Arc::new(DispatchTracker::default()),
        }
    }

    /// Returns the configuration this bus was built with.
    #[must_use]
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    /// Appends `handler` to the list for `event_type`.
    ///
    /// Registering the same handler twice yields two invocations per event.
    pub fn subscribe(&self, event_type: EventType, handler: Arc<dyn EventHandler>) {
        let name = handler.name().to_owned();
        self.write_handlers()
            .entry(event_type)
            .or_default()
            .push(handler);
        info!(%event_type, handler = %name, "handler registered");
    }

    /// Like [`subscribe`](Self::subscribe), but skips the registration when
    /// this exact handler is already registered for `event_type`. Returns
    /// whether the handler was added.
    pub fn subscribe_unique(&self, event_type: EventType, handler: Arc<dyn EventHandler>) -> bool {
        let mut handlers = self.write_handlers();
        let list = handlers.entry(event_type).or_default();
        if list.iter().any(|existing| Arc::ptr_eq(existing, &handler)) {
            debug!(%event_type, handler = %handler.name(), "handler already registered");
            return false;
        }
        info!(%event_type, handler = %handler.name(), "handler registered");
        list.push(handler);
        true
    }

    /// Removes the first registration of `handler` for `event_type`.
    ///
    /// Handlers are matched by identity (the same `Arc` allocation). Returns
    /// whether anything was removed; an unknown handler or event type is a
    /// no-op.
    pub fn unsubscribe(&self, event_type: EventType, handler: &Arc<dyn EventHandler>) -> bool {
        let mut handlers = self.write_handlers();
        let Some(list) = handlers.get_mut(&event_type) else {
            return false;
        };
        let Some(index) = list.iter().position(|existing| Arc::ptr_eq(existing, handler)) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            handlers.remove(&event_type);
        }
        info!(%event_type, handler = %handler.name(), "handler removed");
        true
    }

    /// Publishes an event.
    ///
    /// Fills a missing id and timestamp, appends the event to the durable log
    /// (failures are logged, not returned), records it in history, and hands
    /// it to the registered handlers on a detached task. Returns once the
    /// event is logged and recorded; handler completion is never awaited.
    pub async fn publish(&self, event: NewEvent) -> Arc<DomainEvent> {
        let event = Arc::new(event.seal(self.clock.as_ref(), self.ids.as_ref()));
        info!(
            event_id = %event.id,
            event_type = %event.event_type,
            aggregate_id = %event.aggregate_id,
            "publishing event"
        );

        if let Err(e) = self.event_log.append(&EventLogRecord::from(event.as_ref())).await {
            error!(event_id = %event.id, error = %e, "failed to persist event to event log");
        }

        self.record_history(Arc::clone(&event));

        let handlers = self
            .read_handlers()
            .get(&event.event_type)
            .cloned()
            .unwrap_or_default();

        if handlers.is_empty() {
            debug!(event_id = %event.id, event_type = %event.event_type, "no handlers registered");
        } else {
            self.dispatch(Arc::clone(&event), handlers);
        }

        event
    }

    /// Returns a copy of the history in publish order, optionally filtered to
    /// one event type.
    #[must_use]
    pub fn history(&self, event_type: Option<EventType>) -> Vec<Arc<DomainEvent>> {
        self.lock_history()
            .iter()
            .filter(|event| event_type.is_none_or(|wanted| event.event_type == wanted))
            .cloned()
            .collect()
    }

    /// Empties the in-memory history. Registrations and the durable log are
    /// untouched.
    pub fn clear_history(&self) {
        self.lock_history().clear();
    }

    /// Number of registrations for `event_type`.
    #[must_use]
    pub fn handler_count(&self, event_type: EventType) -> usize {
        self.read_handlers().get(&event_type).map_or(0, Vec::len)
    }

    /// Event types that currently have at least one handler.
    #[must_use]
    pub fn registered_event_types(&self) -> BTreeSet<EventType> {
        self.read_handlers().keys().copied().collect()
    }

    /// Registration counts and history size in one snapshot.
    #[must_use]
    pub fn stats(&self) -> BusStats {
        let handler_stats: BTreeMap<EventType, usize> = self
            .read_handlers()
            .iter()
            .map(|(event_type, list)| (*event_type, list.len()))
            .collect();
        BusStats {
            registered_event_types: handler_stats.keys().copied().collect(),
            handler_stats,
            total_history: self.lock_history().len(),
        }
    }

    /// Number of dispatch tasks still running handlers.
    #[must_use]
    pub fn pending_dispatches(&self) -> usize {
        self.dispatches.in_flight()
    }

    /// Waits until every dispatch spawned so far has finished. Publishing is
    /// unaffected; this exists for shutdown draining and tests.
    pub async fn wait_for_dispatches(&self) {
        self.dispatches.wait_idle().await;
    }

    fn record_history(&self, event: Arc<DomainEvent>) {
        let mut history = self.lock_history();
        if history.len() == self.config.history_capacity.get() {
            history.pop_front();
        }
        history.push_back(event);
    }

    fn dispatch(&self, event: Arc<DomainEvent>, handlers: Vec<Arc<dyn EventHandler>>) {
        debug!(
            event_id = %event.id,
            handler_count = handlers.len(),
            "dispatching event to handlers"
        );
        let guard = self.dispatches.begin();
        let timeout = self.config.handler_timeout;
        tokio::spawn(async move {
            let _guard = guard;
            dispatch::run_handlers(event, handlers, timeout).await;
        });
    }

    // The guarded state is never left half-updated, so a poisoned lock is
    // still safe to use.
    fn read_handlers(&self) -> RwLockReadGuard<'_, HandlerMap> {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_handlers(&self) -> RwLockWriteGuard<'_, HandlerMap> {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_history(&self) -> MutexGuard<'_, VecDeque<Arc<DomainEvent>>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
