//! Core types for Pufff.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod coords;
pub mod email;
pub mod id;
pub mod locker;
pub mod role;

pub use coords::{CoordinateError, Coordinates, EARTH_RADIUS_KM, haversine_km};
pub use email::{Email, EmailError};
pub use id::UserId;
pub use locker::{Locker, LockerRecord};
pub use role::{ADMIN_ROLE, ProfileRole};
