//! Resource policy exposure audit

use super::PolicySource;
use crate::config::AuditConfig;
use crate::core::iam::{Exposure, Policy};
use crate::error::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

/// A resource whose policy grants access to the world
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceFinding {
    pub arn: String,
    pub exposure: Exposure,
    /// English summaries of the statements behind the verdict
    pub statements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceAuditReport {
    /// Most exposed first
    pub findings: Vec<ResourceFinding>,
    pub scanned: usize,
    /// Policies that failed to parse
    pub skipped: Vec<String>,
}

/// Flags public and conditionally public resource policies
pub struct ResourceTrustAuditor<S> {
    source: S,
    config: AuditConfig,
}

impl<S: PolicySource> ResourceTrustAuditor<S> {
    pub fn new(source: S, config: AuditConfig) -> Self {
        ResourceTrustAuditor { source, config }
    }

    /// Classify every resource policy the source yields
    ///
    /// Documents that fail to parse are logged and listed in
    /// [`ResourceAuditReport::skipped`]; a failing source aborts the audit.
    pub fn audit(&self) -> Result<ResourceAuditReport> {
        let policies = self.source.resource_policies()?;
        let mut report = ResourceAuditReport {
            scanned: policies.len(),
            ..Default::default()
        };

        for resource in policies {
            let policy = match Policy::from_json(&resource.document) {
                Ok(policy) => policy,
                Err(e) => {
                    warn!(arn = %resource.arn, error = %e, "Skipping unparsable resource policy");
                    report.skipped.push(resource.arn);
                    continue;
                }
            };

            let exposure = policy.exposure();
            debug!(arn = %resource.arn, %exposure, "Classified resource policy");

            let reportable = match exposure {
                Exposure::Public => true,
                Exposure::ConditionallyPublic => self.config.report_conditionally_public,
                Exposure::Restricted | Exposure::Empty => false,
            };
            if !reportable {
                continue;
            }

            let caller = self.config.caller_account.as_deref();
            let statements = policy
                .exposing_statements()
                .map(|s| s.summary(caller))
                .collect();

            report.findings.push(ResourceFinding {
                arn: resource.arn,
                exposure,
                statements,
            });
        }

        report
            .findings
            .sort_by(|a, b| b.exposure.cmp(&a.exposure).then_with(|| a.arn.cmp(&b.arn)));

        info!(
            scanned = report.scanned,
            findings = report.findings.len(),
            skipped = report.skipped.len(),
            "Resource policy audit complete"
        );

        Ok(report)
    }
}
