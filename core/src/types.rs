//! Payload and result DTOs for the actions this workspace uses.
//!
//! # Design
//! Only the fields the example flows read or write are modelled. Result types
//! use `#[serde(default)]` on everything optional because CKAN sites differ in
//! which extra fields they return, and unknown fields are ignored.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload for `organization_create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrganization {
    pub name: String,
    pub title: String,
}

impl NewOrganization {
    /// A throwaway organization titled after its own name.
    pub fn test(name: &str) -> Self {
        Self {
            name: name.to_string(),
            title: format!("Z CKAN API {name}"),
        }
    }
}

/// Payload for the `*_show` and `*_delete` actions. CKAN accepts either the
/// id or the name here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: String,
}

impl IdRef {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

/// Payload for `package_list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageListQuery {
    pub limit: u32,
    pub offset: u32,
}

/// A free-form key/value pair attached to a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extra {
    pub key: String,
    pub value: String,
}

/// Payload for `package_create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDataset {
    pub name: String,
    pub title: String,
    pub owner_org: String,
    pub notes: String,
    pub license_id: String,
    pub collection_type: String,
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_string: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<Extra>,
}

/// Body of `GET /data/api/{n}`. Nothing besides `version` is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiVersion {
    pub version: u32,
}

/// An organization as returned by `organization_create` / `organization_show`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// A dataset as returned by `package_create` / `package_show`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub owner_org: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}
