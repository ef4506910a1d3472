//! # Parlink Device Library
//!
//! Coprocessor core for the parlink shared-register control protocol.
//! The device side owns no thread and no loop: each installed process
//! exposes a single tick entry point, invoked externally once per timer
//! period. A tick reads the command registers, performs at most one
//! conversion operation, writes the result and the completion flag, and
//! returns. No state is carried across ticks beyond what the registers
//! hold and the explicitly reset working value.
//!
//! ## Processes
//!
//! - [`process::MeasureProcess`] — fixed-direction ADC read
//! - [`process::DuplexProcess`] — mode-switched DAC write / ADC read
//!
//! ## Harness
//!
//! [`tick::TickDriver`] simulates the periodic timer for tests and the
//! demo binary; [`sim::SimBus`] provides loopback converters so the
//! protocol can be exercised without hardware.

pub mod convert;
pub mod process;
pub mod sim;
pub mod tick;
