//! # Parlink Host Library
//!
//! Reference host side of the shared-register protocol, used to verify
//! the device end to end. The host writes command registers, marks the
//! completion flag busy, polls until the device clears it, and only
//! then trusts the result register.
//!
//! The deployed host application is an external collaborator; this
//! crate exists as the verification harness and carries the voltage
//! scaling the host performs around the raw register protocol.

pub mod link;
pub mod scale;
