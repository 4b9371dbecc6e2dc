//! Test handlers: `EventHandler` implementations that record, fail, panic
//! or block, for exercising bus dispatch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tmf683_core::error::DomainError;
use tmf683_core::event::{DomainEvent, EventType};
use tmf683_core::handler::EventHandler;
use tokio::sync::watch;

/// One observed handler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Name of the handler that ran.
    pub handler: String,
    /// Id of the event it received.
    pub event_id: String,
    /// Type of the event it received.
    pub event_type: EventType,
}

/// Shared, ordered record of invocations across several handlers.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Invocation>>>);

impl CallLog {
    /// Create an empty call log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the invocations recorded so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn snapshot(&self) -> Vec<Invocation> {
        self.0.lock().unwrap().clone()
    }

    /// Returns just the handler names, in invocation order.
    pub fn handler_names(&self) -> Vec<String> {
        self.snapshot().into_iter().map(|i| i.handler).collect()
    }

    fn record(&self, handler: &str, event: &DomainEvent) {
        self.0.lock().unwrap().push(Invocation {
            handler: handler.to_owned(),
            event_id: event.id.clone(),
            event_type: event.event_type,
        });
    }
}

/// A handler that appends each invocation to a [`CallLog`] and succeeds.
#[derive(Debug)]
pub struct RecordingHandler {
    name: String,
    log: CallLog,
}

impl RecordingHandler {
    /// Create a handler named `name` that writes into `log`.
    #[must_use]
    pub fn new(name: impl Into<String>, log: &CallLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
        }
    }
}

#[async_trait]
impl EventHandler for RecordingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), DomainError> {
        self.log.record(&self.name, event);
        Ok(())
    }
}

/// A handler that records its invocation and then returns an error.
#[derive(Debug)]
pub struct FailingHandler {
    name: String,
    log: CallLog,
}

impl FailingHandler {
    /// Create a failing handler named `name` that writes into `log`.
    #[must_use]
    pub fn new(name: impl Into<String>, log: &CallLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
        }
    }
}

#[async_trait]
impl EventHandler for FailingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), DomainError> {
        self.log.record(&self.name, event);
        Err(DomainError::Infrastructure("listener unavailable".into()))
    }
}

/// A handler that records its invocation and then panics.
#[derive(Debug)]
pub struct PanickingHandler {
    name: String,
    log: CallLog,
}

impl PanickingHandler {
    /// Create a panicking handler named `name` that writes into `log`.
    #[must_use]
    pub fn new(name: impl Into<String>, log: &CallLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
        }
    }
}

#[async_trait]
impl EventHandler for PanickingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), DomainError> {
        self.log.record(&self.name, event);
        panic!("handler {} blew up on event {}", self.name, event.id);
    }
}

/// Releases every [`BlockingHandler`] created alongside it.
#[derive(Debug)]
pub struct HandlerGate(watch::Sender<bool>);

impl HandlerGate {
    /// Lets blocked handlers finish.
    pub fn release(&self) {
        self.0.send_replace(true);
    }
}

/// A handler that waits for its [`HandlerGate`] to be released before it
/// completes.
#[derive(Debug)]
pub struct BlockingHandler {
    gate: watch::Receiver<bool>,
    started: AtomicBool,
    finished: AtomicBool,
}

impl BlockingHandler {
    /// Create a blocked handler and the gate that releases it.
    #[must_use]
    pub fn new() -> (Arc<Self>, HandlerGate) {
        let (tx, rx) = watch::channel(false);
        let handler = Arc::new(Self {
            gate: rx,
            started: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        });
        (handler, HandlerGate(tx))
    }

    /// Whether the handler has been invoked.
    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Whether the handler ran to completion.
    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventHandler for BlockingHandler {
    fn name(&self) -> &str {
        "blocking"
    }

    async fn handle(&self, _event: &DomainEvent) -> Result<(), DomainError> {
        self.started.store(true, Ordering::SeqCst);
        let mut gate = self.gate.clone();
        gate.wait_for(|released| *released)
            .await
            .map_err(|_| DomainError::Infrastructure("gate dropped".into()))?;
        self.finished.store(true, Ordering::SeqCst);
        Ok(())
    }
}
