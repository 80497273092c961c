//! Utility functions and helpers for the translator client.
//!
//! # Submodules
//!
//! - `clock`: Time source used for credential expiry, with a manual clock
//!   for simulated time.
//! - `logging`: Tracing initialization and token redaction.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod clock;
pub mod logging;
