//! Prelude module for common re-exports.
//!
//! Consumers can do `use parlink_common::prelude::*;` and get the most
//! important types without listing individual paths.

// ─── Register Bank ──────────────────────────────────────────────────
pub use crate::bank::{ParamBank, SharedParamBank};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, DeviceConfig, DoneSlot};

// ─── Protocol Constants ─────────────────────────────────────────────
pub use crate::consts::{
    DEFAULT_PROCESS_DELAY, DUPLEX_CHANNEL, DUPLEX_DONE, DUPLEX_MODE, DUPLEX_VALUE, FAULT_SENTINEL,
    FLAG_BUSY, FLAG_DONE, MEASURE_CHANNEL, MEASURE_DONE_ALTERNATE, MEASURE_DONE_PRIMARY,
    MEASURE_VALUE, MODE_DRIVE, MODE_MEASURE, PAR_COUNT, SAMPLE_MASK,
};
