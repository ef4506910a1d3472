//! Parlink Common Library
//!
//! This crate provides the shared register-bank abstraction, protocol
//! constants and configuration loading utilities for all parlink
//! workspace crates.
//!
//! # Module Structure
//!
//! - [`bank`] - Shared parameter register bank
//! - [`consts`] - Register map and protocol sentinels
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use parlink_common::prelude::*;
//!
//! let bank = SharedParamBank::new();
//! bank.set(MEASURE_CHANNEL, 2);
//! assert_eq!(bank.get(MEASURE_CHANNEL), 2);
//! ```

pub mod bank;
pub mod config;
pub mod consts;
pub mod prelude;
