//! Operators module: the closed `Action` type, legality, and `apply()`.
//!
//! Depends on `carrier`. Does not import from `proof`.

pub mod action;
pub mod apply;
pub mod legal;
