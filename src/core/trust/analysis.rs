//! Who can assume a role
//!
//! Splits the `Allow` statements of a trust policy into trusted AWS
//! principals, trusted AWS services and trusted federated identity
//! providers, pulling the provider-specific subject and audience conditions
//! out of each statement.

use super::document::{
    TrustPolicy, TrustStatement, COGNITO_AMR, COGNITO_AUD, GITHUB_AUD, GITHUB_SUB, OIDC_EKS_AUD,
    OIDC_EKS_SUB, SAML_AUD, STS_EXTERNAL_ID,
};
use crate::core::iam::account_id_of_principal;
use serde::Serialize;
use std::fmt;

/// Identity provider behind a federated trust
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FederatedProvider {
    /// GitHub Actions OIDC (`token.actions.githubusercontent.com`)
    GitHub,
    /// EKS cluster OIDC issuer (IRSA)
    Eks,
    Saml,
    /// Cognito identity pools
    Cognito,
    Other,
}

impl FederatedProvider {
    /// Classify a `Principal.Federated` entry
    pub fn from_principal(federated: &str) -> Self {
        if federated.contains("token.actions.githubusercontent.com") {
            FederatedProvider::GitHub
        } else if federated.contains("oidc.eks.") {
            FederatedProvider::Eks
        } else if federated.contains(":saml-provider/") {
            FederatedProvider::Saml
        } else if federated == "cognito-identity.amazonaws.com" {
            FederatedProvider::Cognito
        } else {
            FederatedProvider::Other
        }
    }
}

impl fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FederatedProvider::GitHub => "GitHub",
            FederatedProvider::Eks => "EKS",
            FederatedProvider::Saml => "SAML",
            FederatedProvider::Cognito => "Cognito",
            FederatedProvider::Other => "Other",
        };
        f.write_str(name)
    }
}

/// An AWS principal allowed to assume the role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustedPrincipal {
    pub arn: String,
    /// `sts:ExternalId` values required by the statement
    pub external_ids: Vec<String>,
}

impl TrustedPrincipal {
    pub fn is_public(&self) -> bool {
        self.arn == "*"
    }

    pub fn account_id(&self) -> Option<&str> {
        account_id_of_principal(&self.arn)
    }

    /// Principal lives outside `home_account` (a wildcard always does)
    pub fn is_cross_account(&self, home_account: &str) -> bool {
        self.is_public() || self.account_id().is_some_and(|account| account != home_account)
    }
}

/// A federated identity provider allowed to assume the role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FederatedTrust {
    pub provider: FederatedProvider,
    pub provider_arn: String,
    /// Who within the provider: repositories, service accounts, Cognito `amr`
    pub subjects: Vec<String>,
    /// Audiences or Cognito identity pools the statement pins
    pub audiences: Vec<String>,
}

impl FederatedTrust {
    fn from_statement(provider_arn: &str, statement: &TrustStatement) -> Self {
        let provider = FederatedProvider::from_principal(provider_arn);
        let condition = &statement.condition;
        let collect = |key: &str| -> Vec<String> {
            condition.values(key).into_iter().map(str::to_string).collect()
        };

        let (subjects, audiences) = match provider {
            FederatedProvider::GitHub => (collect(GITHUB_SUB), collect(GITHUB_AUD)),
            FederatedProvider::Eks => (collect(OIDC_EKS_SUB), collect(OIDC_EKS_AUD)),
            FederatedProvider::Saml => (Vec::new(), collect(SAML_AUD)),
            FederatedProvider::Cognito => (collect(COGNITO_AMR), collect(COGNITO_AUD)),
            FederatedProvider::Other => (Vec::new(), Vec::new()),
        };

        FederatedTrust {
            provider,
            provider_arn: provider_arn.to_string(),
            subjects,
            audiences,
        }
    }

    /// Any identity of the provider can assume the role
    ///
    /// GitHub and EKS trusts admit every repository or service account
    /// behind the issuer when no subject is pinned, or when some subject
    /// pattern leaves the owner (`repo:*/app`) or namespace
    /// (`system:serviceaccount:*`) to a wildcard. A Cognito trust without an
    /// audience admits every identity pool.
    pub fn is_unrestricted(&self) -> bool {
        let open_subject = |prefix: &str| {
            self.subjects.is_empty()
                || self.subjects.iter().any(|s| leaves_scope_open(s, prefix))
        };

        match self.provider {
            FederatedProvider::GitHub => open_subject(GITHUB_SUBJECT_PREFIX),
            FederatedProvider::Eks => open_subject(EKS_SUBJECT_PREFIX),
            FederatedProvider::Cognito => self.audiences.is_empty(),
            FederatedProvider::Saml | FederatedProvider::Other => false,
        }
    }
}

/// GitHub subjects read `repo:<owner>/<repo>:<context>`
const GITHUB_SUBJECT_PREFIX: &str = "repo:";
/// EKS subjects read `system:serviceaccount:<namespace>:<name>`
const EKS_SUBJECT_PREFIX: &str = "system:serviceaccount:";

const WILDCARDS: &[char] = &['*', '?'];

/// Whether the first segment after `prefix` (owner or namespace) is a
/// wildcard pattern, or a wildcard already sits inside the prefix
fn leaves_scope_open(subject: &str, prefix: &str) -> bool {
    match subject.strip_prefix(prefix) {
        Some(rest) => rest
            .split(&['/', ':'][..])
            .next()
            .unwrap_or_default()
            .contains(WILDCARDS),
        None => subject.contains(WILDCARDS),
    }
}

impl fmt::Display for FederatedTrust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.provider, self.provider_arn)?;
        if self.is_unrestricted() {
            f.write_str(" unrestricted")?;
        } else if !self.subjects.is_empty() {
            write!(f, " subjects: {}", self.subjects.join(", "))?;
        }
        if !self.audiences.is_empty() {
            write!(f, " audiences: {}", self.audiences.join(", "))?;
        }
        Ok(())
    }
}

/// Everything a trust policy lets assume the role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrustAnalysis {
    pub principals: Vec<TrustedPrincipal>,
    pub services: Vec<String>,
    pub federated: Vec<FederatedTrust>,
}

impl TrustAnalysis {
    pub fn is_empty(&self) -> bool {
        self.principals.is_empty() && self.services.is_empty() && self.federated.is_empty()
    }

    /// Any AWS principal is allowed (`"Principal": "*"` or `AWS: "*"`)
    pub fn trusts_everyone(&self) -> bool {
        self.principals.iter().any(TrustedPrincipal::is_public)
    }

    pub fn cross_account_principals<'a>(
        &'a self,
        home_account: &'a str,
    ) -> impl Iterator<Item = &'a TrustedPrincipal> + 'a {
        self.principals
            .iter()
            .filter(move |p| p.is_cross_account(home_account))
    }

    pub fn unrestricted_federation(&self) -> impl Iterator<Item = &FederatedTrust> {
        self.federated.iter().filter(|f| f.is_unrestricted())
    }
}

impl TrustPolicy {
    /// Collect trusted principals, services and identity providers from
    /// the `Allow` statements
    pub fn analyze(&self) -> TrustAnalysis {
        let mut analysis = TrustAnalysis::default();

        for statement in self.statement.iter().filter(|s| s.is_allow()) {
            let Some(principal) = &statement.principal else {
                continue;
            };

            let Some(specified) = principal.specified() else {
                analysis.principals.push(TrustedPrincipal {
                    arn: "*".to_string(),
                    external_ids: external_ids(statement),
                });
                continue;
            };

            for arn in &specified.aws {
                analysis.principals.push(TrustedPrincipal {
                    arn: arn.clone(),
                    external_ids: external_ids(statement),
                });
            }

            for service in &specified.service {
                if !analysis.services.contains(service) {
                    analysis.services.push(service.clone());
                }
            }

            for provider in &specified.federated {
                analysis
                    .federated
                    .push(FederatedTrust::from_statement(provider, statement));
            }
        }

        analysis
    }
}

fn external_ids(statement: &TrustStatement) -> Vec<String> {
    statement
        .condition
        .values(STS_EXTERNAL_ID)
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(json: &str) -> TrustAnalysis {
        TrustPolicy::parse(json).unwrap().analyze()
    }

    #[test]
    fn test_provider_classification() {
        assert_eq!(
            FederatedProvider::from_principal(
                "arn:aws:iam::123456789012:oidc-provider/token.actions.githubusercontent.com"
            ),
            FederatedProvider::GitHub
        );
        assert_eq!(
            FederatedProvider::from_principal(
                "arn:aws:iam::123456789012:oidc-provider/oidc.eks.eu-west-1.amazonaws.com/id/ABC"
            ),
            FederatedProvider::Eks
        );
        assert_eq!(
            FederatedProvider::from_principal("arn:aws:iam::123456789012:saml-provider/Okta"),
            FederatedProvider::Saml
        );
        assert_eq!(
            FederatedProvider::from_principal("cognito-identity.amazonaws.com"),
            FederatedProvider::Cognito
        );
        assert_eq!(
            FederatedProvider::from_principal("accounts.google.com"),
            FederatedProvider::Other
        );
    }

    #[test]
    fn test_aws_principals_and_external_id() {
        let analysis = analyze(
            r#"{"Statement": [{
                "Effect": "Allow",
                "Principal": {"AWS": ["arn:aws:iam::999999999999:root", "arn:aws:iam::123456789012:role/admin"]},
                "Action": "sts:AssumeRole",
                "Condition": {"StringEquals": {"sts:ExternalId": "vendor-42"}}
            }]}"#,
        );

        assert_eq!(analysis.principals.len(), 2);
        assert_eq!(analysis.principals[0].external_ids, vec!["vendor-42"]);
        let cross: Vec<_> = analysis.cross_account_principals("123456789012").collect();
        assert_eq!(cross.len(), 1);
        assert_eq!(cross[0].arn, "arn:aws:iam::999999999999:root");
        assert!(!analysis.trusts_everyone());
    }

    #[test]
    fn test_wildcard_principal() {
        let analysis = analyze(
            r#"{"Statement": [{"Effect": "Allow", "Principal": "*", "Action": "sts:AssumeRole"}]}"#,
        );
        assert!(analysis.trusts_everyone());
        assert!(analysis.principals[0].is_cross_account("123456789012"));
    }

    #[test]
    fn test_services_deduplicated() {
        let analysis = analyze(
            r#"{"Statement": [
                {"Effect": "Allow", "Principal": {"Service": ["lambda.amazonaws.com", "ec2.amazonaws.com"]}, "Action": "sts:AssumeRole"},
                {"Effect": "Allow", "Principal": {"Service": "lambda.amazonaws.com"}, "Action": "sts:AssumeRole"}
            ]}"#,
        );
        assert_eq!(analysis.services, vec!["lambda.amazonaws.com", "ec2.amazonaws.com"]);
    }

    #[test]
    fn test_deny_statements_skipped() {
        let analysis = analyze(
            r#"{"Statement": [{"Effect": "Deny", "Principal": {"AWS": "*"}, "Action": "sts:AssumeRole"}]}"#,
        );
        assert!(analysis.is_empty());
    }

    fn federated(provider: FederatedProvider, subjects: &[&str]) -> FederatedTrust {
        FederatedTrust {
            provider,
            provider_arn: "arn:aws:iam::123456789012:oidc-provider/issuer".to_string(),
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            audiences: vec!["sts.amazonaws.com".to_string()],
        }
    }

    #[test]
    fn test_wildcard_owner_is_unrestricted() {
        for subject in ["*", "repo:*", "repo:*/*", "repo:*/infra:ref:refs/heads/main", "repo:acme*/app:*", "re*"] {
            assert!(
                federated(FederatedProvider::GitHub, &[subject]).is_unrestricted(),
                "subject {}",
                subject
            );
        }
        for subject in ["repo:acme/app:*", "repo:acme/*", "repo:acme/app:ref:refs/heads/main"] {
            assert!(
                !federated(FederatedProvider::GitHub, &[subject]).is_unrestricted(),
                "subject {}",
                subject
            );
        }
    }

    #[test]
    fn test_wildcard_namespace_is_unrestricted() {
        assert!(federated(FederatedProvider::Eks, &["system:serviceaccount:*"]).is_unrestricted());
        assert!(federated(FederatedProvider::Eks, &["system:serviceaccount:*:deployer"]).is_unrestricted());
        assert!(federated(FederatedProvider::Eks, &["system:*"]).is_unrestricted());
        assert!(!federated(FederatedProvider::Eks, &["system:serviceaccount:ci:*"]).is_unrestricted());
        assert!(!federated(FederatedProvider::Eks, &["system:serviceaccount:ci:deployer"]).is_unrestricted());
    }

    #[test]
    fn test_one_open_subject_opens_the_trust() {
        let trust = federated(FederatedProvider::GitHub, &["repo:acme/app:*", "repo:*"]);
        assert!(trust.is_unrestricted());
    }

    #[test]
    fn test_github_without_subject_is_unrestricted() {
        let analysis = analyze(
            r#"{"Statement": [{
                "Effect": "Allow",
                "Principal": {"Federated": "arn:aws:iam::123456789012:oidc-provider/token.actions.githubusercontent.com"},
                "Action": "sts:AssumeRoleWithWebIdentity",
                "Condition": {"StringEquals": {"token.actions.githubusercontent.com:aud": "sts.amazonaws.com"}}
            }]}"#,
        );

        let trust = &analysis.federated[0];
        assert_eq!(trust.provider, FederatedProvider::GitHub);
        assert!(trust.subjects.is_empty());
        assert_eq!(trust.audiences, vec!["sts.amazonaws.com"]);
        assert!(trust.is_unrestricted());
        assert_eq!(analysis.unrestricted_federation().count(), 1);
    }

    #[test]
    fn test_github_with_repo_subject() {
        let analysis = analyze(
            r#"{"Statement": [{
                "Effect": "Allow",
                "Principal": {"Federated": "arn:aws:iam::123456789012:oidc-provider/token.actions.githubusercontent.com"},
                "Action": "sts:AssumeRoleWithWebIdentity",
                "Condition": {"StringLike": {"token.actions.githubusercontent.com:sub": "repo:acme/deploy:*"}}
            }]}"#,
        );

        let trust = &analysis.federated[0];
        assert_eq!(trust.subjects, vec!["repo:acme/deploy:*"]);
        assert!(!trust.is_unrestricted());
        assert_eq!(
            trust.to_string(),
            "GitHub (arn:aws:iam::123456789012:oidc-provider/token.actions.githubusercontent.com) subjects: repo:acme/deploy:*"
        );
    }

    #[test]
    fn test_eks_service_account() {
        let analysis = analyze(
            r#"{"Statement": [{
                "Effect": "Allow",
                "Principal": {"Federated": "arn:aws:iam::123456789012:oidc-provider/oidc.eks.us-east-1.amazonaws.com/id/ABCDEF"},
                "Action": "sts:AssumeRoleWithWebIdentity",
                "Condition": {"StringEquals": {
                    "oidc.eks.us-east-1.amazonaws.com/id/ABCDEF:sub": "system:serviceaccount:default:app",
                    "oidc.eks.us-east-1.amazonaws.com/id/ABCDEF:aud": "sts.amazonaws.com"
                }}
            }]}"#,
        );

        let trust = &analysis.federated[0];
        assert_eq!(trust.provider, FederatedProvider::Eks);
        assert_eq!(trust.subjects, vec!["system:serviceaccount:default:app"]);
        assert!(!trust.is_unrestricted());
    }

    #[test]
    fn test_eks_only_audience_is_unrestricted() {
        let analysis = analyze(
            r#"{"Statement": [{
                "Effect": "Allow",
                "Principal": {"Federated": "arn:aws:iam::123456789012:oidc-provider/oidc.eks.us-east-1.amazonaws.com/id/ABCDEF"},
                "Action": "sts:AssumeRoleWithWebIdentity",
                "Condition": {"StringEquals": {"oidc.eks.us-east-1.amazonaws.com/id/ABCDEF:aud": "sts.amazonaws.com"}}
            }]}"#,
        );
        assert!(analysis.federated[0].is_unrestricted());
    }

    #[test]
    fn test_cognito_identity_pool() {
        let analysis = analyze(
            r#"{"Statement": [{
                "Effect": "Allow",
                "Principal": {"Federated": "cognito-identity.amazonaws.com"},
                "Action": "sts:AssumeRoleWithWebIdentity",
                "Condition": {
                    "StringEquals": {"cognito-identity.amazonaws.com:aud": "us-east-1:1111-2222"},
                    "ForAnyValue:StringLike": {"cognito-identity.amazonaws.com:amr": "unauthenticated"}
                }
            }]}"#,
        );

        let trust = &analysis.federated[0];
        assert_eq!(trust.provider, FederatedProvider::Cognito);
        assert_eq!(trust.subjects, vec!["unauthenticated"]);
        assert_eq!(trust.audiences, vec!["us-east-1:1111-2222"]);
        assert!(!trust.is_unrestricted());
    }

    #[test]
    fn test_saml_audience() {
        let analysis = analyze(
            r#"{"Statement": [{
                "Effect": "Allow",
                "Principal": {"Federated": "arn:aws:iam::123456789012:saml-provider/Okta"},
                "Action": "sts:AssumeRoleWithSAML",
                "Condition": {"StringEquals": {"SAML:aud": "https://signin.aws.amazon.com/saml"}}
            }]}"#,
        );

        let trust = &analysis.federated[0];
        assert_eq!(trust.provider, FederatedProvider::Saml);
        assert_eq!(trust.audiences, vec!["https://signin.aws.amazon.com/saml"]);
        assert!(!trust.is_unrestricted());
    }
}
