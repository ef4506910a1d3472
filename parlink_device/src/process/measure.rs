//! Fixed-direction measurement process.
//!
//! Every tick samples the channel selected in `MEASURE_CHANNEL`, writes
//! the 24-bit result into `MEASURE_VALUE`, and clears the completion
//! flag. The flag slot differs between the two deployed wirings
//! ([`DoneSlot`]), so it is part of the process construction.

use tracing::{debug, warn};

use parlink_common::bank::ParamBank;
use parlink_common::config::DoneSlot;
use parlink_common::consts::{FLAG_DONE, MEASURE_CHANNEL, MEASURE_VALUE, SAMPLE_MASK};

use crate::convert::{AdcReader, FAULT_SENTINEL};
use crate::process::Process;

/// Single-purpose ADC read process.
pub struct MeasureProcess<A: AdcReader> {
    adc: A,
    /// Completion flag register index, fixed per deployment.
    done_slot: usize,
    /// Working value, reset at init. Holds the last published sample.
    measured: i32,
}

impl<A: AdcReader> MeasureProcess<A> {
    /// Create a measure process wired to the given completion slot.
    pub fn new(adc: A, done_slot: DoneSlot) -> Self {
        Self {
            adc,
            done_slot: done_slot.index(),
            measured: 0,
        }
    }
}

impl<A: AdcReader> Process for MeasureProcess<A> {
    fn name(&self) -> &'static str {
        "measure"
    }

    fn init(&mut self) {
        self.measured = 0;
    }

    fn tick(&mut self, bank: &dyn ParamBank) {
        let channel = bank.get(MEASURE_CHANNEL);

        match self.adc.sample(channel) {
            Ok(raw) => {
                // Samples occupy the low 24 bits of the slot.
                self.measured = raw & SAMPLE_MASK;
                debug!(channel, sample = self.measured, "measure tick");
                bank.set(MEASURE_VALUE, self.measured);
            }
            Err(e) => {
                warn!(channel, error = %e, "sample failed, publishing fault sentinel");
                self.measured = FAULT_SENTINEL;
                bank.set(MEASURE_VALUE, FAULT_SENTINEL);
            }
        }

        // Cleared every tick regardless of what the host requested.
        bank.set(self.done_slot, FLAG_DONE);
    }
}
