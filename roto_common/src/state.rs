//! Live position state and its synchronized store.
//!
//! `PositionState` is the single source of truth for raw/calibrated/target
//! positions. The control cycle writes `raw_*`/`val_*`, telemetry handlers
//! read the whole struct, and targets change only via explicit commands.
//! `StateStore` mediates every access: readers always observe a snapshot
//! written by exactly one completed cycle, never a torn mix of fields.

use parking_lot::RwLock;

/// Positioner axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Azimuth (horizontal rotation).
    Azim,
    /// Elevation (vertical tilt).
    Elev,
}

impl Axis {
    /// Both axes in sampling order.
    pub const ALL: [Axis; 2] = [Axis::Azim, Axis::Elev];

    /// Short lowercase name for logs.
    pub const fn name(self) -> &'static str {
        match self {
            Axis::Azim => "azim",
            Axis::Elev => "elev",
        }
    }
}

/// A value held once per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerAxis<T> {
    /// Azimuth slot.
    pub azim: T,
    /// Elevation slot.
    pub elev: T,
}

impl<T> PerAxis<T> {
    /// Construct from per-axis values.
    pub const fn new(azim: T, elev: T) -> Self {
        Self { azim, elev }
    }

    /// Shared access by axis.
    #[inline]
    pub fn get(&self, axis: Axis) -> &T {
        match axis {
            Axis::Azim => &self.azim,
            Axis::Elev => &self.elev,
        }
    }

    /// Mutable access by axis.
    #[inline]
    pub fn get_mut(&mut self, axis: Axis) -> &mut T {
        match axis {
            Axis::Azim => &mut self.azim,
            Axis::Elev => &mut self.elev,
        }
    }
}

/// Complete position state, field order matching the telemetry wire layout
/// (see [`crate::wire`]).
///
/// `val_* = raw_* * slope + intercept` holds for the most recent committed
/// sample; `tgt_*` is only ever written through [`StateStore::set_targets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct PositionState {
    /// Calibrated azimuth [physical units].
    pub val_azim: i32,
    /// Calibrated elevation [physical units].
    pub val_elev: i32,
    /// Raw azimuth sensor reading.
    pub raw_azim: i32,
    /// Raw elevation sensor reading.
    pub raw_elev: i32,
    /// Azimuth target [physical units].
    pub tgt_azim: i32,
    /// Elevation target [physical units].
    pub tgt_elev: i32,
}

impl PositionState {
    /// Calibrated value for one axis.
    #[inline]
    pub const fn val(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Azim => self.val_azim,
            Axis::Elev => self.val_elev,
        }
    }

    /// Raw reading for one axis.
    #[inline]
    pub const fn raw(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Azim => self.raw_azim,
            Axis::Elev => self.raw_elev,
        }
    }

    /// Target for one axis.
    #[inline]
    pub const fn tgt(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Azim => self.tgt_azim,
            Axis::Elev => self.tgt_elev,
        }
    }
}

/// Thread-safe owner of the live [`PositionState`].
///
/// The control cycle is the only writer of `raw_*`/`val_*`; telemetry
/// handlers snapshot the whole struct under the read lock. Acquisitions are
/// brief — no I/O ever happens under the lock — so the control task's cycle
/// timing is preserved.
#[derive(Debug)]
pub struct StateStore {
    inner: RwLock<PositionState>,
}

impl StateStore {
    /// Create a store with startup targets and zeroed readings.
    pub fn new(tgt_azim: i32, tgt_elev: i32) -> Self {
        Self {
            inner: RwLock::new(PositionState {
                tgt_azim,
                tgt_elev,
                ..Default::default()
            }),
        }
    }

    /// Full consistent copy of the current state.
    pub fn snapshot(&self) -> PositionState {
        *self.inner.read()
    }

    /// Commit one axis sample: raw reading and its calibrated value,
    /// updated together under a single lock acquisition.
    pub fn commit_sample(&self, axis: Axis, raw: i32, val: i32) {
        let mut state = self.inner.write();
        match axis {
            Axis::Azim => {
                state.raw_azim = raw;
                state.val_azim = val;
            }
            Axis::Elev => {
                state.raw_elev = raw;
                state.val_elev = val;
            }
        }
    }

    /// Current target for one axis.
    pub fn target(&self, axis: Axis) -> i32 {
        self.inner.read().tgt(axis)
    }

    /// Replace both targets (explicit command path only).
    pub fn set_targets(&self, tgt_azim: i32, tgt_elev: i32) {
        let mut state = self.inner.write();
        state.tgt_azim = tgt_azim;
        state.tgt_elev = tgt_elev;
    }
}
