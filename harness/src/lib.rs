//! Stackplan harness: scenarios, built-in worlds and artifact bundles.
//!
//! The harness loads a scenario, runs it through the search crate, checks
//! the extracted plan by replaying it through the kernel, and packages the
//! result as a self-contained artifact bundle.
//!
//! Worlds provide domain data only; the harness owns orchestration.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bundle;
pub mod bundle_dir;
pub mod contract;
pub mod runner;
pub mod scenario;
pub mod worlds;
