//! Role trust policies
//!
//! Parses the `AssumeRolePolicyDocument` attached to IAM roles and works out
//! who can assume the role: AWS principals (with their `sts:ExternalId`),
//! AWS services, and federated identity providers such as GitHub Actions,
//! EKS service accounts, SAML and Cognito.

mod analysis;
mod document;

pub use analysis::{FederatedProvider, FederatedTrust, TrustAnalysis, TrustedPrincipal};
pub use document::{
    rewrite_eks_oidc_keys, TrustCondition, TrustPolicy, TrustStatement, COGNITO_AMR, COGNITO_AUD,
    GITHUB_AUD, GITHUB_SUB, OIDC_EKS_AUD, OIDC_EKS_SUB, SAML_AUD, STS_EXTERNAL_ID,
};
