//! Text Post-Processing
//!
//! Deterministic cleanup utilities applied to every provider's raw output.

pub mod sanitize;

pub use sanitize::{sanitize, sanitize_body};
