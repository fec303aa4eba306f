//! Fixed-period control cycle: sample → calibrate → decide → drive.
//!
//! The cycle runner owns the sampler and actuator drivers and is the only
//! writer of `raw_*`/`val_*` in the shared store. Each tick samples both
//! axes, commits the calibrated values, evaluates the deadband regulator
//! against the current targets and asserts the resulting drives. Pacing
//! uses monotonic instants; an overrun is logged and counted, never fatal
//! at this period.
//!
//! ## RT Setup
//!
//! With the `rt` feature the setup sequence locks pages, pins the thread
//! and switches to SCHED_FIFO before the loop is entered. Without the
//! feature all RT calls are no-ops.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use roto_common::config::{AxesConfig, ControlConfig};
use roto_common::state::{Axis, PerAxis, StateStore};
use thiserror::Error;
use tracing::{info, warn};

use crate::deadband::{Actuator, Drive, decide};
use crate::sampler::{Calibration, PositionSampler, calibrate};
use crate::supervisor::{AxisSupervisor, Reading};

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
///
/// Updated every cycle with no allocation.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Number of overruns detected.
    pub overruns: u64,
}

impl CycleStats {
    /// Create a new zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
        }
    }

    /// Record a cycle duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        if duration_ns < self.min_cycle_ns {
            self.min_cycle_ns = duration_ns;
        }
        if duration_ns > self.max_cycle_ns {
            self.max_cycle_ns = duration_ns;
        }
        self.sum_cycle_ns += duration_ns;
    }

    /// Average cycle time [ns] (returns 0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// RT setup failure (only reachable with the `rt` feature).
#[derive(Debug, Error)]
#[error("RT setup error: {0}")]
pub struct RtError(String);

/// Lock all current and future memory pages.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), RtError> {
    use nix::sys::mman::{MlockAllFlags, mlockall};
    mlockall(MlockAllFlags::MCL_CURRENT | MlockAllFlags::MCL_FUTURE)
        .map_err(|e| RtError(format!("mlockall failed: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), RtError> {
    Ok(()) // No-op in simulation mode
}

/// Pin the current thread to a specific CPU core.
#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), RtError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| RtError(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| RtError(format!("sched_setaffinity failed: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), RtError> {
    Ok(()) // No-op in simulation mode
}

/// Set SCHED_FIFO with the given RT priority.
#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), RtError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(RtError(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), RtError> {
    Ok(()) // No-op in simulation mode
}

/// Perform the RT setup sequence before entering the cycle loop.
///
/// In simulation mode (no `rt` feature) all calls are no-ops.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), RtError> {
    rt_mlockall()?;
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// The periodic regulation driver.
///
/// Owns the transducer and actuator drivers plus all per-axis regulation
/// state; shares only the [`StateStore`] with the rest of the process.
pub struct CycleRunner<S, A> {
    sampler: S,
    actuator: A,
    store: Arc<StateStore>,
    cal: PerAxis<Calibration>,
    deadband: PerAxis<i32>,
    supervisors: PerAxis<AxisSupervisor>,
    drives: PerAxis<Drive>,
    period: Duration,
    stats: CycleStats,
}

impl<S: PositionSampler, A: Actuator> CycleRunner<S, A> {
    /// Create a runner from validated configuration.
    pub fn new(
        control: &ControlConfig,
        axes: &AxesConfig,
        store: Arc<StateStore>,
        sampler: S,
        actuator: A,
    ) -> Self {
        Self {
            sampler,
            actuator,
            store,
            cal: PerAxis::new(
                Calibration::from(&axes.azim),
                Calibration::from(&axes.elev),
            ),
            deadband: PerAxis::new(axes.azim.deadband, axes.elev.deadband),
            supervisors: PerAxis::new(
                AxisSupervisor::new(Axis::Azim, control.fault_escalation),
                AxisSupervisor::new(Axis::Elev, control.fault_escalation),
            ),
            drives: PerAxis::new(Drive::Stop, Drive::Stop),
            period: Duration::from_millis(control.period_ms),
            stats: CycleStats::new(),
        }
    }

    /// Execute one cycle body: both axes sampled, committed, regulated.
    pub fn tick(&mut self) {
        for axis in Axis::ALL {
            let result = self.sampler.sample(axis);
            let reading = self.supervisors.get_mut(axis).observe(result);

            let drive = match reading {
                Reading::Fresh(raw) | Reading::Held { raw, .. } => {
                    let val = calibrate(raw, *self.cal.get(axis));
                    self.store.commit_sample(axis, raw, val);
                    let target = self.store.target(axis);
                    decide(val, target, *self.deadband.get(axis))
                }
                // No usable reading: hold position, outputs off.
                Reading::Faulted => Drive::Stop,
            };

            self.actuator.apply(axis, drive);
            *self.drives.get_mut(axis) = drive;
        }
    }

    /// Enter the paced cycle loop until `shutdown` is set.
    ///
    /// Network and telemetry activity run on other execution contexts; the
    /// loop never waits on them. On exit both axes are driven to `Stop`.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        info!(period_ms = self.period.as_millis() as u64, "control cycle starting");

        while !shutdown.load(Ordering::SeqCst) {
            let cycle_start = Instant::now();

            self.tick();

            let elapsed = cycle_start.elapsed();
            let duration_ns = elapsed.as_nanos() as i64;
            self.stats.record(duration_ns);

            if let Some(remaining) = self.period.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            } else {
                self.stats.overruns += 1;
                warn!(
                    actual_ns = duration_ns,
                    budget_ns = self.period.as_nanos() as i64,
                    "cycle overrun"
                );
            }
        }

        // Disengage on the way out.
        for axis in Axis::ALL {
            self.actuator.apply(axis, Drive::Stop);
            *self.drives.get_mut(axis) = Drive::Stop;
        }
        info!(
            cycles = self.stats.cycle_count,
            overruns = self.stats.overruns,
            "control cycle stopped"
        );
    }

    /// Timing statistics so far.
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Drive asserted for one axis by the most recent tick.
    pub fn drive(&self, axis: Axis) -> Drive {
        *self.drives.get(axis)
    }
}
