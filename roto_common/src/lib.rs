//! Roto Common Library
//!
//! This crate provides the shared data model, configuration loading and
//! telemetry wire format for all roto workspace crates.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - System-wide constants
//! - [`state`] - Live position state and its synchronized store
//! - [`wire`] - Telemetry frame encoding
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use roto_common::prelude::*;
//! ```

pub mod config;
pub mod consts;
pub mod prelude;
pub mod state;
pub mod wire;
