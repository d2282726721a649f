//! Request gating for admin surfaces.
//!
//! Two layers with very different trust levels:
//!
//! 1. [`RequireAdmin`] - authoritative. Re-derives the verdict from the
//!    bearer token on every call; used by every state-changing admin API.
//! 2. [`AdminHint`] - optimistic. Reads only the `pufff_is_admin` cookie to
//!    decide whether to show protected UI without a network round trip.
//!    Never trusted for privilege.

pub mod admin;

pub use admin::{AdminHint, RequireAdmin, bearer_token};
