//! Position sampling seam and linear calibration.
//!
//! `PositionSampler` is the boundary to the transducer hardware (ADC,
//! encoder, simulation). Calibration is a pure integer mapping from raw
//! sensor units to physical position units; it lives here so the cycle can
//! be tested without any hardware behind it.

use roto_common::config::AxisConfig;
use roto_common::state::Axis;
use thiserror::Error;

/// Error types for position sampling.
#[derive(Debug, Clone, Error)]
pub enum SensorError {
    /// The underlying read could not complete (transient fault).
    #[error("axis {}: transducer read failed: {reason}", .axis.name())]
    ReadFailed {
        /// Affected axis.
        axis: Axis,
        /// Driver-reported reason.
        reason: String,
    },

    /// The driver produced a reading outside the sensor's native range.
    #[error("axis {}: reading {raw} outside sensor range 0..={max}", .axis.name())]
    OutOfRange {
        /// Affected axis.
        axis: Axis,
        /// Offending reading.
        raw: i32,
        /// Largest valid reading.
        max: i32,
    },
}

/// Interface for position transducer drivers.
///
/// A failed read is a transient fault, not fatal — the cycle's supervisor
/// decides when repeated failures escalate (see [`crate::supervisor`]).
pub trait PositionSampler: Send {
    /// Read the raw sensor value for one axis.
    fn sample(&mut self, axis: Axis) -> Result<i32, SensorError>;
}

/// Linear calibration constants for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    /// Physical units per raw unit.
    pub slope: i32,
    /// Physical-unit offset at raw zero.
    pub intercept: i32,
}

impl From<&AxisConfig> for Calibration {
    fn from(cfg: &AxisConfig) -> Self {
        Self {
            slope: cfg.slope,
            intercept: cfg.intercept,
        }
    }
}

/// Pure conversion from raw sensor units to physical units.
///
/// `value = raw * slope + intercept`, exact integer arithmetic. The
/// configured sensor range and calibration constants must keep the result
/// within `i32` (checked by configuration-level tests, not here).
#[inline]
pub const fn calibrate(raw: i32, cal: Calibration) -> i32 {
    raw * cal.slope + cal.intercept
}

#[cfg(test)]
mod tests {
    use super::*;
    use roto_common::consts::{AZIM_INTERCEPT, AZIM_SLOPE, SENSOR_RAW_MAX};

    const AZIM_CAL: Calibration = Calibration {
        slope: AZIM_SLOPE,
        intercept: AZIM_INTERCEPT,
    };

    #[test]
    fn calibrate_is_exact_linear_map() {
        for raw in [0, 1, 100, 2000, SENSOR_RAW_MAX] {
            assert_eq!(calibrate(raw, AZIM_CAL), raw * 125 - 210_000);
        }
    }

    #[test]
    fn reference_azimuth_scenario() {
        // raw 2000 with the reference azimuth calibration.
        assert_eq!(calibrate(2000, AZIM_CAL), 40_000);
    }

    #[test]
    fn reference_elevation_scenario() {
        let cal = Calibration {
            slope: 33,
            intercept: -10_000,
        };
        assert_eq!(calibrate(1000, cal), 23_000);
    }

    #[test]
    fn calibration_from_axis_config() {
        let cfg = AxisConfig {
            slope: 33,
            intercept: -10_000,
            deadband: 4_000,
        };
        let cal = Calibration::from(&cfg);
        assert_eq!(cal.slope, 33);
        assert_eq!(cal.intercept, -10_000);
    }

    #[test]
    fn sensor_error_names_the_axis() {
        let err = SensorError::ReadFailed {
            axis: Axis::Elev,
            reason: "adc timeout".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("elev"));
        assert!(msg.contains("adc timeout"));
    }
}
