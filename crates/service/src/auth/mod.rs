//! Access control for the one admin-only mutation (deleting an AU).

pub mod admin_gate;

pub use admin_gate::AdminGate;
