//! Shared test mocks and utilities for the TMF683 Party Interaction service.

mod clock;
mod event_log;
mod handlers;
mod ids;

pub use clock::FixedClock;
pub use event_log::{FailingEventLog, RecordingEventLog};
pub use handlers::{
    BlockingHandler, CallLog, FailingHandler, HandlerGate, Invocation, PanickingHandler,
    RecordingHandler,
};
pub use ids::SequenceIdGenerator;
