//! Protocol-wide constants for the parlink workspace.
//!
//! Single source of truth for the register map and all protocol
//! sentinels. Imported by all crates — no duplication permitted.
//!
//! Register indices are fixed per deployed wiring and never renumbered
//! at runtime. The host addresses the same indices from its side of the
//! bus, so changing any value here is a wire-protocol break.

/// Number of shared parameter registers exposed by the coprocessor.
pub const PAR_COUNT: usize = 80;

// ─── Measure process registers (fixed-direction ADC read) ───────────

/// Input channel number, written by the host.
pub const MEASURE_CHANNEL: usize = 3;

/// 24-bit measured sample, written by the device.
pub const MEASURE_VALUE: usize = 4;

/// Completion flag slot used by the primary deployed wiring.
pub const MEASURE_DONE_PRIMARY: usize = 5;

/// Completion flag slot used by the alternate deployed wiring.
///
/// Two near-identical deployments exist that differ only in which slot
/// carries the flag. Both are kept as explicit configurations.
pub const MEASURE_DONE_ALTERNATE: usize = 6;

// ─── Duplex process registers (DAC write / ADC read) ────────────────

/// Mode selector: [`MODE_DRIVE`] or [`MODE_MEASURE`], written by the host.
pub const DUPLEX_MODE: usize = 11;

/// Channel number, written by the host.
pub const DUPLEX_CHANNEL: usize = 12;

/// Voltage value: input on drive, output on measure.
pub const DUPLEX_VALUE: usize = 13;

/// Completion flag, written by the device.
pub const DUPLEX_DONE: usize = 14;

// ─── Sentinels ──────────────────────────────────────────────────────

/// Completion flag value the device writes at the end of every tick.
pub const FLAG_DONE: i32 = 0;

/// Completion flag value the host writes before issuing a request.
/// The device never writes this value.
pub const FLAG_BUSY: i32 = 1;

/// Duplex mode selecting an ADC measurement.
pub const MODE_MEASURE: i32 = 0;

/// Duplex mode selecting a DAC output update.
pub const MODE_DRIVE: i32 = 1;

/// ADC samples occupy the low 24 bits of their register.
pub const SAMPLE_MASK: i32 = 0x00FF_FFFF;

/// Value the device publishes in a result slot when a conversion
/// capability faults. No 24-bit sample is negative, so the host can
/// tell a faulted measurement from a real one. Extension beyond the
/// original protocol, which left hardware faults undefined.
pub const FAULT_SENTINEL: i32 = -1;

/// Default handler period in native coprocessor clock units.
///
/// An environment parameter, not protocol logic; carried in the device
/// configuration.
pub const DEFAULT_PROCESS_DELAY: u32 = 3000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_map_fits_in_bank() {
        for idx in [
            MEASURE_CHANNEL,
            MEASURE_VALUE,
            MEASURE_DONE_PRIMARY,
            MEASURE_DONE_ALTERNATE,
            DUPLEX_MODE,
            DUPLEX_CHANNEL,
            DUPLEX_VALUE,
            DUPLEX_DONE,
        ] {
            assert!(idx < PAR_COUNT);
        }
    }

    #[test]
    fn process_maps_are_disjoint() {
        let measure = [
            MEASURE_CHANNEL,
            MEASURE_VALUE,
            MEASURE_DONE_PRIMARY,
            MEASURE_DONE_ALTERNATE,
        ];
        let duplex = [DUPLEX_MODE, DUPLEX_CHANNEL, DUPLEX_VALUE, DUPLEX_DONE];
        for m in measure {
            assert!(!duplex.contains(&m));
        }
    }

    #[test]
    fn sentinels_are_distinct() {
        assert_ne!(FLAG_DONE, FLAG_BUSY);
        assert_ne!(MODE_MEASURE, MODE_DRIVE);
        assert_eq!(SAMPLE_MASK, (1 << 24) - 1);
        assert!(DEFAULT_PROCESS_DELAY > 0);
    }

    #[test]
    fn fault_sentinel_is_not_a_sample() {
        assert!(FAULT_SENTINEL < 0);
        assert_ne!(FAULT_SENTINEL & SAMPLE_MASK, FAULT_SENTINEL);
    }
}
