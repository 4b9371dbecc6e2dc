//! Background handler dispatch.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tmf683_core::event::DomainEvent;
use tmf683_core::handler::EventHandler;
use tokio::sync::Notify;
use tracing::{debug, error, warn};

/// Counts dispatch tasks that have been spawned but not yet finished.
#[derive(Debug, Default)]
pub(crate) struct DispatchTracker {
    in_flight: AtomicUsize,
    idle: Notify,
}

impl DispatchTracker {
    pub(crate) fn begin(self: &Arc<Self>) -> DispatchGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        DispatchGuard(Arc::clone(self))
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub(crate) async fn wait_idle(&self) {
        loop {
            // Registered before the load so a concurrent finish cannot be missed.
            let notified = self.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Marks one dispatch as finished when dropped, including on panic or
/// runtime shutdown.
#[derive(Debug)]
pub(crate) struct DispatchGuard(Arc<DispatchTracker>);

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        if self.0.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// Invokes `handlers` one after another in registration order. Each
/// invocation runs on its own task so a panic is caught as a join error and
/// cannot take its siblings down.
pub(crate) async fn run_handlers(
    event: Arc<DomainEvent>,
    handlers: Vec<Arc<dyn EventHandler>>,
    timeout: Option<Duration>,
) {
    for handler in handlers {
        invoke(handler, Arc::clone(&event), timeout).await;
    }
}

async fn invoke(handler: Arc<dyn EventHandler>, event: Arc<DomainEvent>, timeout: Option<Duration>) {
    let name = handler.name().to_owned();
    let event_id = event.id.clone();
    let event_type = event.event_type;

    let task = tokio::spawn(async move { handler.handle(&event).await });
    let abort = task.abort_handle();

    let joined = match timeout {
        None => task.await,
        Some(limit) => {
            if let Ok(joined) = tokio::time::timeout(limit, task).await {
                joined
            } else {
                abort.abort();
                warn!(
                    handler = %name,
                    %event_id,
                    %event_type,
                    timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    "event handler timed out and was aborted"
                );
                return;
            }
        }
    };

    match joined {
        Ok(Ok(())) => debug!(handler = %name, %event_id, %event_type, "event handler completed"),
        Ok(Err(e)) => error!(
            handler = %name,
            %event_id,
            %event_type,
            error = %e,
            "event handler failed"
        ),
        Err(e) if e.is_panic() => error!(
            handler = %name,
            %event_id,
            %event_type,
            "event handler panicked"
        ),
        Err(e) => warn!(
            handler = %name,
            %event_id,
            %event_type,
            error = %e,
            "event handler was cancelled"
        ),
    }
}
