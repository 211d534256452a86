//! Role trust policy documents
//!
//! Trust policies (the `AssumeRolePolicyDocument` of a role) use a narrower
//! schema than resource policies. The condition keys that matter come from
//! federated identity providers, and EKS names its keys after the cluster's
//! OIDC issuer:
//!
//! ```json
//! "StringEquals": {
//!     "oidc.eks.us-east-1.amazonaws.com/id/ABC123:sub": "system:serviceaccount:ns:sa"
//! }
//! ```
//!
//! The issuer id differs per cluster, so those keys are rewritten to the
//! fixed `OidcEksSub` / `OidcEksAud` before deserialization.

use crate::core::iam::object::{object_serde, one_or_many};
use crate::core::iam::{ConditionBlock, Effect, Principal, StringList};
use crate::error::{PolicyError, Result};
use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::OnceLock;
use tracing::debug;

/// Placeholder key for `oidc.eks.<region>.amazonaws.com/id/<id>:sub`
pub const OIDC_EKS_SUB: &str = "OidcEksSub";
/// Placeholder key for `oidc.eks.<region>.amazonaws.com/id/<id>:aud`
pub const OIDC_EKS_AUD: &str = "OidcEksAud";

pub const STS_EXTERNAL_ID: &str = "sts:ExternalId";
pub const SAML_AUD: &str = "SAML:aud";
pub const GITHUB_SUB: &str = "token.actions.githubusercontent.com:sub";
pub const GITHUB_AUD: &str = "token.actions.githubusercontent.com:aud";
pub const COGNITO_AUD: &str = "cognito-identity.amazonaws.com:aud";
pub const COGNITO_AMR: &str = "cognito-identity.amazonaws.com:amr";

/// Operators whose values say which identities may assume the role
const IDENTITY_OPERATORS: [&str; 3] = ["StringEquals", "StringLike", "ForAnyValue:StringLike"];

/// `Condition` element of a trust statement
///
/// Operators and keys are matched case-insensitively, as IAM matches them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustCondition(ConditionBlock);

impl TrustCondition {
    /// Values of `key` under `StringEquals`, `StringLike` and `ForAnyValue:StringLike`
    pub fn values(&self, key: &str) -> Vec<&str> {
        IDENTITY_OPERATORS
            .iter()
            .filter_map(|operator| self.0.get(operator, key))
            .flat_map(|values| values.iter().map(String::as_str))
            .collect()
    }

    pub fn block(&self) -> &ConditionBlock {
        &self.0
    }

    fn is_unset(&self) -> bool {
        self.0.is_unset()
    }
}

impl From<ConditionBlock> for TrustCondition {
    fn from(block: ConditionBlock) -> Self {
        TrustCondition(block)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "PascalCase")]
pub struct TrustStatement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,

    #[serde(default, skip_serializing_if = "StringList::is_empty")]
    pub action: StringList,

    #[serde(default, skip_serializing_if = "TrustCondition::is_unset")]
    pub condition: TrustCondition,
}

object_serde!(TrustStatement, "a trust policy statement object");

impl TrustStatement {
    pub fn is_allow(&self) -> bool {
        self.effect == Some(Effect::Allow)
    }
}

/// Parsed role trust policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "PascalCase")]
pub struct TrustPolicy {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// A lone statement object is accepted too
    #[serde(default, deserialize_with = "one_or_many")]
    pub statement: Vec<TrustStatement>,
}

object_serde!(TrustPolicy, "a trust policy document object");

impl TrustPolicy {
    /// Parse a trust policy as returned by IAM
    ///
    /// Accepts plain JSON, URL-encoded JSON (the `GetRole`/`ListRoles` form)
    /// and JSON wrapped in a JSON string.
    ///
    /// # Examples
    ///
    /// ```
    /// use policyfox::trust::TrustPolicy;
    ///
    /// let policy = TrustPolicy::parse(
    ///     "%7B%22Statement%22%3A%5B%7B%22Effect%22%3A%22Allow%22%2C%22Principal%22%3A%7B%22Service%22%3A%22ec2.amazonaws.com%22%7D%2C%22Action%22%3A%22sts%3AAssumeRole%22%7D%5D%7D",
    /// ).unwrap();
    /// assert_eq!(policy.statement.len(), 1);
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let decoded = decode_document(raw)?;
        let rewritten = rewrite_eks_oidc_keys(&decoded);
        let policy: TrustPolicy = serde_json::from_str(&rewritten)?;
        debug!(statements = policy.statement.len(), "Parsed trust policy");
        Ok(policy)
    }
}

fn decode_document(raw: &str) -> Result<Cow<'_, str>> {
    let trimmed = raw.trim();
    let decoded = if trimmed.starts_with('{') {
        Cow::Borrowed(trimmed)
    } else {
        percent_decode_str(trimmed)
            .decode_utf8()
            .map_err(|e| PolicyError::Decode(e.to_string()))?
    };

    if decoded.starts_with('"') {
        let inner: String = serde_json::from_str(&decoded)?;
        return Ok(Cow::Owned(inner));
    }

    Ok(decoded)
}

fn eks_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)"oidc\.eks\.[a-z0-9-]+\.amazonaws\.com/id/[a-z0-9]+:(sub|aud)""#)
            .expect("EKS OIDC key regex is valid")
    })
}

/// Replace per-cluster EKS OIDC condition keys with fixed placeholders
pub fn rewrite_eks_oidc_keys(document: &str) -> Cow<'_, str> {
    eks_key_regex().replace_all(document, |caps: &Captures<'_>| {
        if caps[1].eq_ignore_ascii_case("sub") {
            format!("\"{}\"", OIDC_EKS_SUB)
        } else {
            format!("\"{}\"", OIDC_EKS_AUD)
        }
    })
}
