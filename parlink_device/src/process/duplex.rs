//! Bidirectional voltage process.
//!
//! One process serves both directions, selected per tick by the mode
//! register: `MODE_DRIVE` applies `DUPLEX_VALUE` to the DAC,
//! `MODE_MEASURE` overwrites `DUPLEX_VALUE` with a fresh ADC sample.
//! Any other mode value performs no conversion at all — deployed host
//! software relies on that silent skip, so it is preserved rather than
//! rejected. The completion flag is cleared unconditionally.

use tracing::{debug, warn};

use parlink_common::bank::ParamBank;
use parlink_common::consts::{
    DUPLEX_CHANNEL, DUPLEX_DONE, DUPLEX_MODE, DUPLEX_VALUE, FLAG_DONE, MODE_DRIVE, MODE_MEASURE,
    SAMPLE_MASK,
};

use crate::convert::{AdcReader, DacWriter, FAULT_SENTINEL};
use crate::process::Process;

/// Mode-switched DAC write / ADC read process.
pub struct DuplexProcess<A: AdcReader, D: DacWriter> {
    adc: A,
    dac: D,
    /// Working value, reset at init. Holds the last published sample.
    measured: i32,
}

impl<A: AdcReader, D: DacWriter> DuplexProcess<A, D> {
    /// Create a duplex process over the given converter pair.
    pub fn new(adc: A, dac: D) -> Self {
        Self {
            adc,
            dac,
            measured: 0,
        }
    }
}

impl<A: AdcReader, D: DacWriter> Process for DuplexProcess<A, D> {
    fn name(&self) -> &'static str {
        "duplex"
    }

    fn init(&mut self) {
        self.measured = 0;
    }

    fn tick(&mut self, bank: &dyn ParamBank) {
        let mode = bank.get(DUPLEX_MODE);

        // Drive is exactly 1; measure is exactly 0; everything else
        // skips conversion. The drive check comes first.
        if mode == MODE_DRIVE {
            let channel = bank.get(DUPLEX_CHANNEL);
            let value = bank.get(DUPLEX_VALUE);
            debug!(channel, value, "duplex drive tick");
            // The value slot already holds what was applied; on a
            // failed drive it is left untouched as well.
            if let Err(e) = self.dac.drive(channel, value) {
                warn!(channel, error = %e, "drive failed");
            }
        } else if mode == MODE_MEASURE {
            let channel = bank.get(DUPLEX_CHANNEL);
            match self.adc.sample(channel) {
                Ok(raw) => {
                    self.measured = raw & SAMPLE_MASK;
                    debug!(channel, sample = self.measured, "duplex measure tick");
                    bank.set(DUPLEX_VALUE, self.measured);
                }
                Err(e) => {
                    warn!(channel, error = %e, "sample failed, publishing fault sentinel");
                    self.measured = FAULT_SENTINEL;
                    bank.set(DUPLEX_VALUE, FAULT_SENTINEL);
                }
            }
        }

        bank.set(DUPLEX_DONE, FLAG_DONE);
    }
}
