//! Host command issue and completion polling.
//!
//! One operation at a time: write the command registers, arm the
//! completion flag, poll until the device clears it, read the result.
//! Command registers are never rewritten between arming and observing
//! done — the single-writer contract the protocol relies on.
//!
//! The device clears the flag on every tick whether or not a fresh
//! request arrived, so a single completion can be stale: a tick already
//! in flight when the arm lands clears the flag without having read
//! the new command. The link therefore arms twice per operation; the
//! tick answering the second arm necessarily started after the first
//! completion and so consumed the command.
//!
//! Because the device free-runs, a multi-register duplex command must
//! not be consumed half-written. The host parks the mode selector on a
//! value outside {0, 1} — which skips conversion entirely — while it
//! stages channel and value, and selects the real mode only afterwards.
//!
//! Polling is bounded host-side only; the device core has no timeouts.

use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace};

use parlink_common::bank::{ParamBank, SharedParamBank};
use parlink_common::config::DoneSlot;
use parlink_common::consts::{
    DUPLEX_CHANNEL, DUPLEX_DONE, DUPLEX_MODE, DUPLEX_VALUE, FAULT_SENTINEL, FLAG_BUSY,
    MEASURE_CHANNEL, MEASURE_VALUE, MODE_DRIVE, MODE_MEASURE,
};

use crate::scale::VoltageScale;

/// Mode value the host parks the selector on while staging a command.
/// Any value outside {0, 1} makes the tick skip conversion.
const MODE_PARK: i32 = -1;

/// Error types for host operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The device did not clear the completion flag in time.
    #[error("device did not complete within {0} polls")]
    Timeout(u32),

    /// The device published the fault sentinel instead of a sample.
    #[error("device reported a conversion fault")]
    ConversionFault,
}

/// Host endpoint of the shared register bank.
pub struct HostLink {
    bank: SharedParamBank,
    measure_done: usize,
    poll_interval: Duration,
    poll_budget: u32,
    adc_scale: VoltageScale,
    dac_scale: VoltageScale,
}

impl HostLink {
    /// Create a link over the given bank, with the measure process
    /// completion flag at the given wiring.
    pub fn new(bank: SharedParamBank, measure_done: DoneSlot) -> Self {
        Self {
            bank,
            measure_done: measure_done.index(),
            poll_interval: Duration::from_micros(100),
            poll_budget: 10_000,
            adc_scale: VoltageScale::ADC_18BIT,
            dac_scale: VoltageScale::DAC_16BIT,
        }
    }

    /// Override the polling cadence and budget.
    pub fn with_polling(mut self, interval: Duration, budget: u32) -> Self {
        self.poll_interval = interval;
        self.poll_budget = budget;
        self
    }

    /// Poll `flag_slot` until the device clears it.
    fn await_done(&self, flag_slot: usize) -> Result<(), HostError> {
        for poll in 0..self.poll_budget {
            if self.bank.get(flag_slot) != FLAG_BUSY {
                trace!(flag_slot, polls = poll, "completion observed");
                return Ok(());
            }
            thread::sleep(self.poll_interval);
        }
        Err(HostError::Timeout(self.poll_budget))
    }

    /// Arm the completion flag and wait for the device to clear it,
    /// twice. A tick already in flight when the first arm lands may
    /// clear the flag without having consumed the freshly written
    /// command registers; the tick that answers the second arm started
    /// after the first completion was observed, so it did.
    fn request(&self, flag_slot: usize) -> Result<(), HostError> {
        for _ in 0..2 {
            self.bank.set(flag_slot, FLAG_BUSY);
            self.await_done(flag_slot)?;
        }
        Ok(())
    }

    /// Take a raw 24-bit sample of `channel` via the measure process.
    pub fn measure(&self, channel: i32) -> Result<i32, HostError> {
        self.bank.set(MEASURE_CHANNEL, channel);
        self.request(self.measure_done)?;

        let sample = self.bank.get(MEASURE_VALUE);
        if sample == FAULT_SENTINEL {
            return Err(HostError::ConversionFault);
        }
        debug!(channel, sample, "measure complete");
        Ok(sample)
    }

    /// Measure `channel` and scale the sample to volts.
    pub fn read_voltage(&self, channel: i32) -> Result<f64, HostError> {
        let sample = self.measure(channel)?;
        Ok(self.adc_scale.to_volts(self.adc_scale.from_sample(sample)))
    }

    /// Apply `volts` to `channel` via the duplex process.
    pub fn set_voltage(&self, channel: i32, volts: f64) -> Result<(), HostError> {
        let code = self.dac_scale.to_code(volts);
        self.bank.set(DUPLEX_MODE, MODE_PARK);
        self.bank.set(DUPLEX_CHANNEL, channel);
        self.bank.set(DUPLEX_VALUE, code);
        self.bank.set(DUPLEX_MODE, MODE_DRIVE);
        self.request(DUPLEX_DONE)?;
        debug!(channel, code, volts, "set voltage complete");
        Ok(())
    }

    /// Take a raw 24-bit sample of `channel` via the duplex process.
    pub fn measure_via_duplex(&self, channel: i32) -> Result<i32, HostError> {
        self.bank.set(DUPLEX_MODE, MODE_PARK);
        self.bank.set(DUPLEX_CHANNEL, channel);
        self.bank.set(DUPLEX_MODE, MODE_MEASURE);
        self.request(DUPLEX_DONE)?;

        let sample = self.bank.get(DUPLEX_VALUE);
        if sample == FAULT_SENTINEL {
            return Err(HostError::ConversionFault);
        }
        debug!(channel, sample, "duplex measure complete");
        Ok(sample)
    }

    /// Apply `volts` to `out_channel`, then read back `in_channel`.
    ///
    /// The classic settle-and-verify flow: output update first, fresh
    /// measurement second.
    pub fn set_and_measure(
        &self,
        out_channel: i32,
        in_channel: i32,
        volts: f64,
    ) -> Result<f64, HostError> {
        self.set_voltage(out_channel, volts)?;
        self.read_voltage(in_channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlink_common::consts::{FLAG_DONE, MEASURE_DONE_PRIMARY};
    use std::thread::JoinHandle;

    /// Stand-in for a ticking device: clears the flag each time the
    /// host marks it busy, `ticks` times in total.
    fn scripted_device(bank: SharedParamBank, flag_slot: usize, ticks: u32) -> JoinHandle<()> {
        std::thread::spawn(move || {
            let mut remaining = ticks;
            while remaining > 0 {
                if bank.get(flag_slot) == FLAG_BUSY {
                    bank.set(flag_slot, FLAG_DONE);
                    remaining -= 1;
                } else {
                    std::thread::yield_now();
                }
            }
        })
    }

    #[test]
    fn measure_times_out_without_device() {
        let bank = SharedParamBank::new();
        let link =
            HostLink::new(bank, DoneSlot::Par5).with_polling(Duration::from_micros(10), 5);

        assert_eq!(link.measure(1), Err(HostError::Timeout(5)));
    }

    #[test]
    fn measure_reads_result_once_flag_clears() {
        let bank = SharedParamBank::new();
        bank.set(MEASURE_VALUE, 4_500_000);

        let device = scripted_device(bank.clone(), MEASURE_DONE_PRIMARY, 2);
        let link = HostLink::new(bank, DoneSlot::Par5);

        assert_eq!(link.measure(2), Ok(4_500_000));
        device.join().unwrap();
    }

    #[test]
    fn fault_sentinel_surfaces_as_error() {
        let bank = SharedParamBank::new();
        bank.set(MEASURE_VALUE, FAULT_SENTINEL);

        let device = scripted_device(bank.clone(), MEASURE_DONE_PRIMARY, 2);
        let link = HostLink::new(bank, DoneSlot::Par5);

        assert_eq!(link.measure(1), Err(HostError::ConversionFault));
        device.join().unwrap();
    }
}
