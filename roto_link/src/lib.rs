//! # Roto Link Library
//!
//! Network side of the positioner daemon: the station connectivity state
//! machine with its bounded retry budget, the startup readiness signal,
//! and the telemetry TCP endpoint serving position snapshots.
//!
//! Connectivity failure is never allowed to propagate into regulation —
//! the control loop runs the same whether the link comes up, retries, or
//! exhausts its budget.

pub mod station;
pub mod telemetry;
