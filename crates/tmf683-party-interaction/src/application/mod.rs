//! Application layer: command and query handlers plus the event listeners
//! registered on the bus at startup.

pub mod command_handlers;
pub mod listeners;
pub mod query_handlers;
