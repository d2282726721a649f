//! Integration tests for Pufff.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! pufff-cli migrate
//!
//! # Start the server
//! cargo run -p pufff-server
//!
//! # Run the ignored end-to-end tests
//! cargo test -p pufff-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `lockers_api` - Locker directory query tests
//! - `admin_session` - Admin session gate tests
//!
//! Tests target a running server at `PUFFF_BASE_URL` (default
//! `http://localhost:3000`).

#![cfg_attr(not(test), forbid(unsafe_code))]
