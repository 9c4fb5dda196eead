//! Names for the throwaway records the flows create.
//!
//! Uniqueness is only as good as the clock: two runs in the same millisecond
//! (or microsecond, for execution ids) collide and the second create fails.

use chrono::{DateTime, Utc};

pub const ORGANIZATION_PREFIX: &str = "z-org-apitest-";

/// `z-org-apitest-{unix millis}` for the current time.
pub fn test_organization_name() -> String {
    organization_name_at(Utc::now())
}

pub fn organization_name_at(now: DateTime<Utc>) -> String {
    format!("{ORGANIZATION_PREFIX}{}", now.timestamp_millis())
}

/// Tag shared by every name created in one tour, e.g.
/// `apitest-2024-0315-134501-123456`.
pub fn execution_id() -> String {
    execution_id_at(Utc::now())
}

pub fn execution_id_at(now: DateTime<Utc>) -> String {
    format!("apitest-{}", now.format("%Y-%m%d-%H%M%S-%6f"))
}
