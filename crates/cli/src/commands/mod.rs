//! CLI command implementations.

pub mod lockers;
pub mod migrate;
