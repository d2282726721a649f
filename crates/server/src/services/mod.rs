//! Server-side services.

pub mod auth;
