//! TMF683 Core: shared domain abstractions.
//!
//! This crate defines the event model, the collaborator traits the event bus
//! depends on (event log, clock, id generator, handlers), and the domain error
//! type. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod event_log;
pub mod handler;
pub mod id;
