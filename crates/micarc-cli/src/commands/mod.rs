//! CLI command implementations.

pub mod analyze;
mod common;
pub mod export;
pub mod info;
pub mod peak_freq;
