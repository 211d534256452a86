//! # policyfox - AWS IAM Policy Exposure Analysis
//!
//! `policyfox` parses AWS IAM resource policies and role trust policies and
//! answers the questions a cloud security assessment asks of them:
//!
//! - **Is this resource public?** A policy allowing `"*"` with no condition
//! - **Is it public behind a weak condition?** Allowing `"*"` under a
//!   condition that does not pin an AWS account or organization
//! - **Who can assume this role?** AWS principals, services, and federated
//!   identities (GitHub Actions, EKS service accounts, SAML, Cognito)
//!
//! ## Quick Start
//!
//! ```rust
//! use policyfox::{Exposure, Policy, Result};
//!
//! # fn main() -> Result<()> {
//! let policy = Policy::from_json(r#"{
//!     "Version": "2012-10-17",
//!     "Statement": [{
//!         "Effect": "Allow",
//!         "Principal": "*",
//!         "Action": "sqs:SendMessage",
//!         "Resource": "arn:aws:sqs:us-east-1:123456789012:jobs",
//!         "Condition": {"IpAddress": {"aws:SourceIp": "192.0.2.0/24"}}
//!     }]
//! }"#)?;
//!
//! assert!(!policy.is_public());
//! assert!(policy.is_conditionally_public());
//! assert_eq!(policy.exposure(), Exposure::ConditionallyPublic);
//! # Ok(())
//! # }
//! ```
//!
//! ## Auditing many policies
//!
//! ```rust
//! use policyfox::audit::{InventorySource, ResourceTrustAuditor};
//! use policyfox::{AuditConfig, Result};
//!
//! # fn main() -> Result<()> {
//! let source = InventorySource::from_json(r#"{"resources": [
//!     {"arn": "arn:aws:s3:::site", "policy": {"Statement": [
//!         {"Effect": "Allow", "Principal": "*", "Action": "s3:GetObject", "Resource": "arn:aws:s3:::site/*"}
//!     ]}}
//! ]}"#)?;
//!
//! let report = ResourceTrustAuditor::new(source, AuditConfig::default()).audit()?;
//! assert_eq!(report.findings.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod config;
pub mod core;
pub mod error;

pub use crate::core::{iam, trust};

pub use crate::config::AuditConfig;
pub use crate::core::iam::{
    account_id_in_arn, ConditionBlock, Effect, Exposure, Policy, Principal, Statement, StringList,
};
pub use crate::core::trust::{FederatedProvider, TrustAnalysis, TrustPolicy};
pub use crate::error::{PolicyError, Result};
