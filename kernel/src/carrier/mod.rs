//! Carrier module: the object roster and the `WorldState` it constrains.
//!
//! This is the foundational layer. No other kernel module is imported here
//! except the shared error type.

pub mod roster;
pub mod state;
