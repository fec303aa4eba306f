//! Simulation positioner driver.
//!
//! Stands in for the ADC transducers and relay outputs when no hardware is
//! present: raw readings move toward the last asserted drive at a fixed
//! rate per sample, and read faults can be injected for supervision tests.
//! Clones share one underlying positioner, so the same instance can serve
//! as both the sampler and the actuator of a cycle runner.

use std::sync::Arc;

use parking_lot::Mutex;
use roto_common::consts::SENSOR_RAW_MAX;
use roto_common::state::{Axis, PerAxis};

use crate::deadband::{Actuator, Drive};
use crate::sampler::{PositionSampler, SensorError};

#[derive(Debug)]
struct SimInner {
    raw: PerAxis<i32>,
    drive: PerAxis<Drive>,
    rate: i32,
    queued_faults: PerAxis<u32>,
}

/// Shared-handle simulation driver implementing both driver traits.
#[derive(Debug, Clone)]
pub struct SimPositioner {
    inner: Arc<Mutex<SimInner>>,
}

impl SimPositioner {
    /// Create a positioner at the given raw readings, moving `rate` raw
    /// units per sample while driven.
    pub fn new(raw_azim: i32, raw_elev: i32, rate: i32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimInner {
                raw: PerAxis::new(raw_azim, raw_elev),
                drive: PerAxis::new(Drive::Stop, Drive::Stop),
                rate,
                queued_faults: PerAxis::new(0, 0),
            })),
        }
    }

    /// Force a raw reading.
    pub fn set_raw(&self, axis: Axis, raw: i32) {
        *self.inner.lock().raw.get_mut(axis) = raw;
    }

    /// Current raw reading.
    pub fn raw(&self, axis: Axis) -> i32 {
        *self.inner.lock().raw.get(axis)
    }

    /// Last drive applied to an axis.
    pub fn drive(&self, axis: Axis) -> Drive {
        *self.inner.lock().drive.get(axis)
    }

    /// Queue `n` read failures on an axis.
    pub fn inject_faults(&self, axis: Axis, n: u32) {
        *self.inner.lock().queued_faults.get_mut(axis) += n;
    }
}

impl PositionSampler for SimPositioner {
    fn sample(&mut self, axis: Axis) -> Result<i32, SensorError> {
        let mut inner = self.inner.lock();

        let queued = inner.queued_faults.get_mut(axis);
        if *queued > 0 {
            *queued -= 1;
            return Err(SensorError::ReadFailed {
                axis,
                reason: "injected fault".to_string(),
            });
        }

        // Advance the mechanics by the drive asserted last cycle.
        let delta = match inner.drive.get(axis) {
            Drive::Stop => 0,
            Drive::Increase => inner.rate,
            Drive::Decrease => -inner.rate,
        };
        let raw = inner.raw.get_mut(axis);
        *raw = (*raw + delta).clamp(0, SENSOR_RAW_MAX);
        Ok(*raw)
    }
}

impl Actuator for SimPositioner {
    fn apply(&mut self, axis: Axis, drive: Drive) {
        *self.inner.lock().drive.get_mut(axis) = drive;
    }
}
