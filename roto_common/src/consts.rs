//! System-wide constants for the roto workspace.
//!
//! Single source of truth for reference calibration, startup targets and
//! timing defaults. Imported by all crates — no duplication permitted.

/// Control cycle period in milliseconds.
pub const DEFAULT_CYCLE_PERIOD_MS: u64 = 100;

/// Highest raw reading the position transducers can produce (12-bit ADC).
pub const SENSOR_RAW_MAX: i32 = 4095;

/// Azimuth calibration: physical units = raw * slope + intercept.
pub const AZIM_SLOPE: i32 = 125;
/// Azimuth calibration intercept.
pub const AZIM_INTERCEPT: i32 = -210_000;
/// Azimuth deadband half-width [physical units].
pub const AZIM_DEADBAND: i32 = 4_000;

/// Elevation calibration slope.
pub const ELEV_SLOPE: i32 = 33;
/// Elevation calibration intercept.
pub const ELEV_INTERCEPT: i32 = -10_000;
/// Elevation deadband half-width [physical units].
pub const ELEV_DEADBAND: i32 = 4_000;

/// Startup azimuth target [physical units].
pub const DEFAULT_TGT_AZIM: i32 = 122_000;
/// Startup elevation target [physical units].
pub const DEFAULT_TGT_ELEV: i32 = 22_000;

/// Reconnection attempts before the link session is declared failed.
pub const DEFAULT_MAX_RETRIES: u32 = 100;

/// Consecutive sensor failures tolerated before an axis is forced to Stop.
pub const DEFAULT_FAULT_ESCALATION: u32 = 10;

/// Largest command frame a telemetry client may declare [bytes].
pub const DEFAULT_MAX_FRAME_LEN: u32 = 4096;

/// Default telemetry listen address.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:7070";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_consistent() {
        assert!(DEFAULT_CYCLE_PERIOD_MS > 0);
        assert!(SENSOR_RAW_MAX > 0);
        assert!(AZIM_DEADBAND > 0);
        assert!(ELEV_DEADBAND > 0);
        assert!(DEFAULT_MAX_RETRIES > 0);
        assert!(DEFAULT_MAX_FRAME_LEN > 0);
    }

    #[test]
    fn calibrated_range_fits_in_i32() {
        // val = raw * slope + intercept must not overflow over the sensor range.
        let azim_max = (SENSOR_RAW_MAX as i64) * (AZIM_SLOPE as i64) + (AZIM_INTERCEPT as i64);
        let elev_max = (SENSOR_RAW_MAX as i64) * (ELEV_SLOPE as i64) + (ELEV_INTERCEPT as i64);
        assert!(azim_max <= i32::MAX as i64 && azim_max >= i32::MIN as i64);
        assert!(elev_max <= i32::MAX as i64 && elev_max >= i32::MIN as i64);
    }
}
