//! Per-axis sensor fault supervision.
//!
//! A transient read failure must not halt motor control: the last known
//! good raw reading is held so regulation continues against slightly stale
//! data. The staleness is bounded — after `escalation_bound` consecutive
//! failures the axis is latched faulted and its drive forced to `Stop`
//! until a good sample clears the latch.

use roto_common::state::Axis;
use tracing::{error, info, warn};

use crate::sampler::SensorError;

/// Outcome of one supervised sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    /// A fresh raw reading from this cycle.
    Fresh(i32),
    /// The held last-good raw reading; `age` counts consecutive failures.
    Held {
        /// Held raw reading.
        raw: i32,
        /// Consecutive failed cycles this value has been held for.
        age: u32,
    },
    /// No usable reading: fault latched (or no good sample seen yet).
    /// The axis drive must be `Stop` this cycle.
    Faulted,
}

/// Supervision state for one axis.
#[derive(Debug)]
pub struct AxisSupervisor {
    axis: Axis,
    escalation_bound: u32,
    last_good: Option<i32>,
    consecutive_failures: u32,
    latched: bool,
}

impl AxisSupervisor {
    /// Create a supervisor latching after `escalation_bound` consecutive
    /// failures (must be > 0, enforced by config validation).
    pub fn new(axis: Axis, escalation_bound: u32) -> Self {
        Self {
            axis,
            escalation_bound,
            last_good: None,
            consecutive_failures: 0,
            latched: false,
        }
    }

    /// Feed one sample result, producing the reading the cycle should act on.
    pub fn observe(&mut self, result: Result<i32, SensorError>) -> Reading {
        match result {
            Ok(raw) => {
                if self.latched {
                    info!(axis = self.axis.name(), raw, "sensor recovered, fault cleared");
                }
                self.latched = false;
                self.consecutive_failures = 0;
                self.last_good = Some(raw);
                Reading::Fresh(raw)
            }
            Err(err) => {
                self.consecutive_failures += 1;

                if self.latched {
                    // Already escalated and reported; stay quiet until recovery.
                    return Reading::Faulted;
                }

                match self.last_good {
                    Some(raw) if self.consecutive_failures < self.escalation_bound => {
                        warn!(
                            axis = self.axis.name(),
                            failures = self.consecutive_failures,
                            %err,
                            "sensor read failed, holding last good value"
                        );
                        Reading::Held {
                            raw,
                            age: self.consecutive_failures,
                        }
                    }
                    // Bound reached, or no good sample to hold.
                    _ => {
                        self.latched = true;
                        error!(
                            axis = self.axis.name(),
                            failures = self.consecutive_failures,
                            %err,
                            "sensor fault latched, axis forced to Stop"
                        );
                        Reading::Faulted
                    }
                }
            }
        }
    }

    /// True while the fault latch is set.
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Consecutive failures since the last good sample.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}
