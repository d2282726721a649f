//! Pufff Core - Shared types library.
//!
//! This crate provides common types used across all Pufff components:
//! - `server` - Storefront API server (lockers, admin session)
//! - `cli` - Command-line tools for migrations and locker imports
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Emails, user IDs, coordinates, and locker records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
