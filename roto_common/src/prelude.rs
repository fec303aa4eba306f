//! Prelude module for common re-exports.
//!
//! ```rust
//! use roto_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, RotoConfig, SharedConfig};

// ─── State ──────────────────────────────────────────────────────────
pub use crate::state::{Axis, PerAxis, PositionState, StateStore};

// ─── Wire format ────────────────────────────────────────────────────
pub use crate::wire::{HEADER_LEN, SNAPSHOT_LEN, WireError};
