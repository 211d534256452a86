//! Inventory file policy source
//!
//! An inventory is a JSON export of resource and role policies:
//!
//! ```json
//! {
//!   "resources": [
//!     {"arn": "arn:aws:s3:::bucket", "policy": {"Statement": [...]}}
//!   ],
//!   "roles": [
//!     {"arn": "arn:aws:iam::123456789012:role/ci", "trust_policy": "%7B%22Statement..."}
//!   ]
//! }
//! ```
//!
//! Policies may be inline objects or JSON strings, the form most AWS APIs
//! return them in.

use super::{PolicySource, ResourcePolicy, RoleTrustPolicy};
use crate::error::Result;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ResourceEntry {
    arn: String,
    #[serde(default)]
    policy: Value,
}

#[derive(Debug, Deserialize)]
struct RoleEntry {
    arn: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    trust_policy: Value,
}

#[derive(Debug, Default, Deserialize)]
struct Inventory {
    #[serde(default)]
    resources: Vec<ResourceEntry>,
    #[serde(default)]
    roles: Vec<RoleEntry>,
}

/// Policy source backed by an inventory JSON document
#[derive(Debug, Clone, Default)]
pub struct InventorySource {
    resources: Vec<ResourcePolicy>,
    roles: Vec<RoleTrustPolicy>,
}

impl InventorySource {
    pub fn from_json(json: &str) -> Result<Self> {
        let inventory: Inventory = serde_json::from_str(json)?;

        let resources = inventory
            .resources
            .into_iter()
            .map(|entry| ResourcePolicy::new(entry.arn, document_text(entry.policy)))
            .collect::<Vec<_>>();

        let roles = inventory
            .roles
            .into_iter()
            .map(|entry| {
                let mut role = RoleTrustPolicy::new(entry.arn, document_text(entry.trust_policy));
                if let Some(name) = entry.name {
                    role.name = name;
                }
                role
            })
            .collect::<Vec<_>>();

        debug!(
            resources = resources.len(),
            roles = roles.len(),
            "Loaded policy inventory"
        );

        Ok(InventorySource { resources, roles })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }
}

/// Inline objects are re-serialized; strings are kept as the API returned them
fn document_text(value: Value) -> String {
    match value {
        Value::Null => "{}".to_string(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

impl PolicySource for InventorySource {
    fn resource_policies(&self) -> Result<Vec<ResourcePolicy>> {
        Ok(self.resources.clone())
    }

    fn role_trust_policies(&self) -> Result<Vec<RoleTrustPolicy>> {
        Ok(self.roles.clone())
    }
}
