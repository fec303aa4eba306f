//! Deadband (bang-bang) regulation.
//!
//! Holds the actuator off within a tolerance band around the target and
//! drives full-on in one direction outside it — no proportional response.
//! The per-axis command is a single tri-state [`Drive`], which makes the
//! both-directions-asserted fault unrepresentable.

use roto_common::state::Axis;

/// Tri-state actuator command for one axis.
///
/// Exactly one directional output can be asserted at any instant; `Stop`
/// de-asserts both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Drive {
    /// Both directional outputs de-asserted.
    #[default]
    Stop,
    /// Drive toward higher physical value (CW / UP).
    Increase,
    /// Drive toward lower physical value (CCW / DOWN).
    Decrease,
}

/// Decide the drive for one axis.
///
/// `error = value - target`. Inside the band (`|error| < deadband`,
/// boundary inclusive in the Stop direction: `|error| == deadband` stops)
/// the axis holds; below it drives `Increase`, above it `Decrease`.
///
/// The subtraction is widened to `i64` so extreme value/target pairs cannot
/// overflow.
#[inline]
pub fn decide(value: i32, target: i32, deadband: i32) -> Drive {
    let error = i64::from(value) - i64::from(target);
    if error.abs() <= i64::from(deadband) {
        Drive::Stop
    } else if error < 0 {
        Drive::Increase
    } else {
        Drive::Decrease
    }
}

/// Interface for directional actuator drivers (relay pairs or equivalent).
pub trait Actuator: Send {
    /// Assert the given drive on one axis, de-asserting the other direction.
    fn apply(&mut self, axis: Axis, drive: Drive);
}
