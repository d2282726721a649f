//! Pufff server library.
//!
//! This crate provides the server functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
