//! Domain layer: the party interaction record, its commands, the events
//! built around each mutation, and the persistence contract.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod repository;
