//! # Roto Control Library
//!
//! Position regulation for the two-axis positioner: sensor sampling behind
//! a driver trait, linear calibration, per-axis deadband (bang-bang)
//! regulation, sensor fault supervision, and the fixed-period cycle that
//! ties them together over the shared [`roto_common::state::StateStore`].
//!
//! ## Regulation model
//!
//! No PID, no proportional response: each cycle computes
//! `error = value - target` per axis and drives the actuator full-on toward
//! the target outside the deadband, off inside it. The actuator command is
//! a single tri-state [`deadband::Drive`] per axis, so asserting both
//! directions at once is unrepresentable.
//!
//! ## Fault policy
//!
//! A failed sensor read never halts regulation. The last known good reading
//! is held for a bounded number of cycles; only repeated consecutive
//! failures force the axis to `Stop` until a good sample arrives.

pub mod cycle;
pub mod deadband;
pub mod sampler;
pub mod sim;
pub mod supervisor;
