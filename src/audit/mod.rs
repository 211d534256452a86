//! Resource and role trust audits
//!
//! Auditors receive their policies through a [`PolicySource`] passed in at
//! construction. Production callers back the source with cloud API
//! enumeration; tests and the CLI use in-memory data or an inventory file.

mod inventory;
mod resource;
mod role;

pub use inventory::InventorySource;
pub use resource::{ResourceAuditReport, ResourceFinding, ResourceTrustAuditor};
pub use role::{RoleAuditReport, RoleFinding, RoleTrustAuditor};

use crate::error::Result;
use serde::Serialize;

/// A resource and the policy document attached to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourcePolicy {
    pub arn: String,
    /// Raw JSON policy document
    pub document: String,
}

impl ResourcePolicy {
    pub fn new(arn: impl Into<String>, document: impl Into<String>) -> Self {
        ResourcePolicy {
            arn: arn.into(),
            document: document.into(),
        }
    }
}

/// A role and its trust policy document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleTrustPolicy {
    pub arn: String,
    pub name: String,
    /// Trust policy as returned by IAM (plain or URL-encoded JSON)
    pub document: String,
}

impl RoleTrustPolicy {
    pub fn new(arn: impl Into<String>, document: impl Into<String>) -> Self {
        let arn = arn.into();
        let name = arn.rsplit('/').next().unwrap_or_default().to_string();
        RoleTrustPolicy {
            arn,
            name,
            document: document.into(),
        }
    }
}

/// Where auditors get their policies from
pub trait PolicySource {
    /// Resource policies (buckets, queues, topics, keys, ...)
    fn resource_policies(&self) -> Result<Vec<ResourcePolicy>>;

    /// Role trust policies
    fn role_trust_policies(&self) -> Result<Vec<RoleTrustPolicy>>;
}

impl<T: PolicySource + ?Sized> PolicySource for &T {
    fn resource_policies(&self) -> Result<Vec<ResourcePolicy>> {
        (**self).resource_policies()
    }

    fn role_trust_policies(&self) -> Result<Vec<RoleTrustPolicy>> {
        (**self).role_trust_policies()
    }
}
