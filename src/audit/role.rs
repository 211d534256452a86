//! Role trust audit

use super::PolicySource;
use crate::config::AuditConfig;
use crate::core::iam::account_id_in_arn;
use crate::core::trust::{TrustAnalysis, TrustPolicy};
use crate::error::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleFinding {
    pub arn: String,
    pub name: String,
    pub analysis: TrustAnalysis,
    /// Trusted AWS principals outside the home and trusted accounts
    pub cross_account: Vec<String>,
    pub trusts_everyone: bool,
    /// A GitHub/EKS/Cognito trust that admits any identity of the provider
    pub unrestricted_federation: bool,
}

impl RoleFinding {
    /// Worth an attacker's attention
    pub fn is_notable(&self) -> bool {
        self.trusts_everyone || self.unrestricted_federation || !self.cross_account.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleAuditReport {
    pub findings: Vec<RoleFinding>,
    pub scanned: usize,
    pub skipped: Vec<String>,
}

/// Reports who can assume each role
pub struct RoleTrustAuditor<S> {
    source: S,
    config: AuditConfig,
}

impl<S: PolicySource> RoleTrustAuditor<S> {
    pub fn new(source: S, config: AuditConfig) -> Self {
        RoleTrustAuditor { source, config }
    }

    pub fn audit(&self) -> Result<RoleAuditReport> {
        let roles = self.source.role_trust_policies()?;
        let mut report = RoleAuditReport {
            scanned: roles.len(),
            ..Default::default()
        };

        for role in roles {
            let policy = match TrustPolicy::parse(&role.document) {
                Ok(policy) => policy,
                Err(e) => {
                    warn!(arn = %role.arn, error = %e, "Skipping unparsable trust policy");
                    report.skipped.push(role.arn);
                    continue;
                }
            };

            let analysis = policy.analyze();
            let home = self
                .config
                .caller_account
                .as_deref()
                .or_else(|| account_id_in_arn(&role.arn))
                .unwrap_or_default();

            let cross_account = analysis
                .cross_account_principals(home)
                .filter(|p| p.account_id().map_or(true, |a| !self.config.is_trusted_account(a)))
                .map(|p| p.arn.clone())
                .collect::<Vec<_>>();

            let trusts_everyone = analysis.trusts_everyone();
            let unrestricted_federation = analysis.unrestricted_federation().next().is_some();

            let finding = RoleFinding {
                trusts_everyone,
                unrestricted_federation,
                cross_account,
                arn: role.arn,
                name: role.name,
                analysis,
            };
            debug!(arn = %finding.arn, notable = finding.is_notable(), "Analyzed role trust policy");
            report.findings.push(finding);
        }

        info!(
            scanned = report.scanned,
            notable = report.findings.iter().filter(|f| f.is_notable()).count(),
            skipped = report.skipped.len(),
            "Role trust audit complete"
        );

        Ok(report)
    }
}
