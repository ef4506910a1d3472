//! Loopback converter simulation.
//!
//! Software stand-in for the analog electronics, for development and
//! testing without hardware: the DAC latches the last code driven per
//! channel, and the ADC samples that latch back. Both converters span
//! ±10 V, so the 16-bit output code maps onto the 18-bit input code by
//! a left shift of two; the 18-bit code sits left-justified in the
//! 24-bit sample field, as delivered by the input converter.

use std::sync::Arc;

use parking_lot::Mutex;

use parlink_common::consts::SAMPLE_MASK;

use crate::convert::{AdcReader, ConvertError, DacWriter};

/// Number of simulated channels. Channels are numbered 1..=SIM_CHANNELS.
pub const SIM_CHANNELS: usize = 8;

/// DAC code corresponding to 0 V on a 16-bit ±10 V converter.
const DAC_MIDSCALE: i32 = 1 << 15;

/// Output codes are 16 bits wide; excess host bits are discarded.
const DAC_CODE_MASK: i32 = 0xFFFF;

/// Shared latch state behind the simulated converter pair.
///
/// Cloning yields another handle to the same latches, so a `SimAdc`
/// and a `SimDac` handed to different processes stay in loopback.
#[derive(Clone)]
pub struct SimBus {
    driven: Arc<Mutex<[i32; SIM_CHANNELS]>>,
}

impl SimBus {
    /// Create a bus with every channel latched at mid-scale (0 V).
    pub fn new() -> Self {
        Self {
            driven: Arc::new(Mutex::new([DAC_MIDSCALE; SIM_CHANNELS])),
        }
    }

    /// An ADC view of this bus.
    pub fn adc(&self) -> SimAdc {
        SimAdc { bus: self.clone() }
    }

    /// A DAC view of this bus.
    pub fn dac(&self) -> SimDac {
        SimDac { bus: self.clone() }
    }

    fn slot(channel: i32) -> Result<usize, ConvertError> {
        if (1..=SIM_CHANNELS as i32).contains(&channel) {
            Ok((channel - 1) as usize)
        } else {
            Err(ConvertError::ChannelFault(channel))
        }
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulated analog input: samples the latched output code.
pub struct SimAdc {
    bus: SimBus,
}

impl AdcReader for SimAdc {
    fn sample(&mut self, channel: i32) -> Result<i32, ConvertError> {
        let slot = SimBus::slot(channel)?;
        let code = self.bus.driven.lock()[slot];
        // 16-bit output code → 18-bit input code (<< 2), left-justified
        // in the 24-bit frame (<< 6).
        Ok((code << 8) & SAMPLE_MASK)
    }
}

/// Simulated analog output: latches the driven code per channel.
pub struct SimDac {
    bus: SimBus,
}

impl DacWriter for SimDac {
    fn drive(&mut self, channel: i32, value: i32) -> Result<(), ConvertError> {
        let slot = SimBus::slot(channel)?;
        self.bus.driven.lock()[slot] = value & DAC_CODE_MASK;
        Ok(())
    }
}
