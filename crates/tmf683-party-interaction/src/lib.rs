//! TMF683: Party Interaction bounded context.
//!
//! Responsible for recording interactions between parties (customers,
//! agents, systems) across channels, and for announcing every mutation as a
//! domain event on the bus.

pub mod application;
pub mod domain;
