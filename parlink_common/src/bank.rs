//! Shared parameter register bank.
//!
//! The bank is the entire wire protocol between the host and the
//! coprocessor: a fixed array of 32-bit signed slots with compile-time
//! assigned roles (see [`crate::consts`]). The host writes command
//! registers before a tick fires; the device writes result and
//! completion registers during the tick; the host polls the completion
//! flag and only then trusts the result.
//!
//! ## Lock-Free Protocol
//!
//! Each register has a single writer at any point of the protocol
//! (command slots: host; result/flag slots: device). There is no mutex
//! and no busy state set by the device — correctness relies on the
//! flag-register gating, not on multi-register atomicity. Individual
//! slot accesses use release/acquire ordering so that a completion-flag
//! read observes every earlier result write.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use static_assertions::const_assert;

use crate::consts::{
    DUPLEX_CHANNEL, DUPLEX_DONE, DUPLEX_MODE, DUPLEX_VALUE, MEASURE_CHANNEL,
    MEASURE_DONE_ALTERNATE, MEASURE_DONE_PRIMARY, MEASURE_VALUE, PAR_COUNT,
};

// Register roles are fixed at build time; an index outside the bank is
// a deployment error, never a runtime condition.
const_assert!(MEASURE_CHANNEL < PAR_COUNT);
const_assert!(MEASURE_VALUE < PAR_COUNT);
const_assert!(MEASURE_DONE_PRIMARY < PAR_COUNT);
const_assert!(MEASURE_DONE_ALTERNATE < PAR_COUNT);
const_assert!(DUPLEX_MODE < PAR_COUNT);
const_assert!(DUPLEX_CHANNEL < PAR_COUNT);
const_assert!(DUPLEX_VALUE < PAR_COUNT);
const_assert!(DUPLEX_DONE < PAR_COUNT);

/// Named, typed access to the fixed register slots.
///
/// Injectable so that processes can be driven against a deterministic
/// bank in tests. Implementations must accept every index below
/// [`PAR_COUNT`]; both operations always succeed for in-range indices.
pub trait ParamBank {
    /// Read the current value of a slot.
    fn get(&self, index: usize) -> i32;

    /// Store a value into a slot. The side effect is visible to the
    /// other side of the bus on its next poll.
    fn set(&self, index: usize, value: i32);
}

/// Process-shared register bank backed by atomics.
///
/// Cloning yields another handle to the same slots, so the host thread
/// and the device tick thread each hold a `SharedParamBank` and observe
/// each other's writes. All slots start at zero.
#[derive(Clone)]
pub struct SharedParamBank {
    slots: Arc<[AtomicI32; PAR_COUNT]>,
}

impl SharedParamBank {
    /// Create a new bank with all slots zeroed.
    pub fn new() -> Self {
        Self {
            slots: Arc::new(std::array::from_fn(|_| AtomicI32::new(0))),
        }
    }
}

impl Default for SharedParamBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamBank for SharedParamBank {
    #[inline]
    fn get(&self, index: usize) -> i32 {
        self.slots[index].load(Ordering::Acquire)
    }

    #[inline]
    fn set(&self, index: usize, value: i32) {
        self.slots[index].store(value, Ordering::Release);
    }
}

impl fmt::Debug for SharedParamBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only the mapped slots are interesting; dumping all 80 is noise.
        f.debug_struct("SharedParamBank")
            .field("measure_channel", &self.get(MEASURE_CHANNEL))
            .field("measure_value", &self.get(MEASURE_VALUE))
            .field("duplex_mode", &self.get(DUPLEX_MODE))
            .field("duplex_value", &self.get(DUPLEX_VALUE))
            .finish_non_exhaustive()
    }
}
