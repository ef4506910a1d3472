//! Event-dispatch processes.
//!
//! This module defines:
//! - `Process` trait - the timer-driven handler interface
//! - [`measure::MeasureProcess`] - fixed-direction ADC read
//! - [`duplex::DuplexProcess`] - mode-switched DAC write / ADC read
//!
//! # Lifecycle
//!
//! 1. `init()` - called once before the timer starts
//! 2. `tick()` - called once per timer period
//!
//! # Timing Contracts
//!
//! `tick()` runs to completion with no suspension points and must be
//! deterministic (no loops, no blocking I/O). Re-entrancy is excluded
//! by the timer source, a precondition the surrounding runtime upholds.

use parlink_common::bank::ParamBank;

pub mod duplex;
pub mod measure;

pub use duplex::DuplexProcess;
pub use measure::MeasureProcess;

/// A timer-driven register-protocol handler.
///
/// Implementations never block waiting for the host and never carry
/// state across invocations except what is explicitly persisted in
/// registers or reset by `init`.
pub trait Process: Send {
    /// Short identifier for logging.
    fn name(&self) -> &'static str;

    /// Reset the internal working value. Called once before the timer
    /// starts; the registers themselves are owned by the host/runtime
    /// and are not touched.
    fn init(&mut self);

    /// Execute one invocation of the handler.
    fn tick(&mut self, bank: &dyn ParamBank);
}
