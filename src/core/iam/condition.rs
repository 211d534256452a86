//! Condition blocks and account/organization scope analysis
//!
//! A condition block maps a condition operator to a map of condition keys
//! and their values:
//!
//! ```json
//! "Condition": {
//!     "StringEquals": { "aws:PrincipalOrgID": "o-abc123" },
//!     "IpAddress": { "aws:SourceIp": ["192.0.2.0/24"] }
//! }
//! ```
//!
//! The scope analyzer decides whether a block limits access to a specific
//! AWS account or organization. Only the operator/key pairs known to do so
//! count; everything else (source IP, VPC endpoint, TLS, ...) is treated as
//! not scoping, so such statements are still reported for manual review.

use super::list::ConditionValues;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Condition key -> values, for one operator
pub type ConditionKeys = BTreeMap<String, ConditionValues>;

/// `Condition` element of a statement: operator -> key -> values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionBlock(BTreeMap<String, ConditionKeys>);

impl ConditionBlock {
    pub fn new() -> Self {
        ConditionBlock(BTreeMap::new())
    }

    /// True when the `Condition` element itself was absent or `{}`
    pub(crate) fn is_unset(&self) -> bool {
        self.0.is_empty()
    }

    /// True when no operator carries any key
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|keys| keys.is_empty())
    }

    /// Add `values` for `key` under `operator`, replacing previous values
    pub fn insert<I, S>(&mut self, operator: &str, key: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(operator.to_string())
            .or_default()
            .insert(key.to_string(), values.into_iter().collect());
    }

    /// Builder form of [`ConditionBlock::insert`]
    pub fn with<I, S>(mut self, operator: &str, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(operator, key, values);
        self
    }

    /// Look up values, comparing operator and key case-insensitively
    pub fn get(&self, operator: &str, key: &str) -> Option<&ConditionValues> {
        self.0
            .iter()
            .filter(|(op, _)| op.eq_ignore_ascii_case(operator))
            .flat_map(|(_, keys)| keys.iter())
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, values)| values)
    }

    /// Iterate `(operator, key, values)` triples
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &ConditionValues)> {
        self.0.iter().flat_map(|(op, keys)| {
            keys.iter()
                .map(move |(key, values)| (op.as_str(), key.as_str(), values))
        })
    }

    /// Whether this block restricts access to a specific AWS account or organization
    ///
    /// Conditions are ANDed, so one scoping entry scopes the whole block.
    pub fn is_scoped_on_account_or_organization(&self) -> bool {
        self.entries()
            .any(|(operator, key, values)| entry_scopes(operator, key, values))
    }

    /// English rendering, e.g. `aws:SourceIp IpAddress 192.0.2.0/24`
    pub fn describe(&self) -> String {
        self.entries()
            .map(|(operator, key, values)| {
                format!("{} {} {}", key, operator, values.as_slice().join(", "))
            })
            .collect::<Vec<_>>()
            .join(" and ")
    }
}

fn entry_scopes(operator: &str, key: &str, values: &ConditionValues) -> bool {
    if values.is_empty() {
        return false;
    }

    let operator = operator.to_ascii_lowercase();
    let key = key.to_ascii_lowercase();

    match (operator.as_str(), key.as_str()) {
        (
            "stringequals",
            "aws:sourceowner"
            | "aws:sourceaccount"
            | "aws:principalaccount"
            | "aws:principalorgid"
            | "sns:endpoint",
        ) => true,
        ("stringlike", "sns:endpoint") => true,
        ("arnequals" | "stringequals", "aws:sourcearn") => true,
        // A wildcard ARN only scopes while every pattern still pins an account
        ("arnlike" | "stringlike", "aws:sourcearn") => values
            .iter()
            .all(|arn| account_id_in_arn(arn).is_some()),
        _ => false,
    }
}

fn arn_account_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^arn:aws[a-z-]*:[^:]*:[^:]*:([0-9]{12}):").expect("ARN account regex is valid")
    })
}

/// Extract the 12-digit account id embedded in an ARN (or ARN pattern)
///
/// # Examples
///
/// ```
/// use policyfox::iam::account_id_in_arn;
///
/// assert_eq!(account_id_in_arn("arn:aws:iam::123456789012:role/x"), Some("123456789012"));
/// assert_eq!(account_id_in_arn("arn:aws:sns:*:123456789012:topic"), Some("123456789012"));
/// assert_eq!(account_id_in_arn("arn:aws:s3:::bucket"), None);
/// assert_eq!(account_id_in_arn("not-an-arn"), None);
/// ```
pub fn account_id_in_arn(arn: &str) -> Option<&str> {
    arn_account_regex()
        .captures(arn)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Account id of an AWS principal, written either as an ARN or a bare account id
pub fn account_id_of_principal(principal: &str) -> Option<&str> {
    if principal.len() == 12 && principal.bytes().all(|b| b.is_ascii_digit()) {
        Some(principal)
    } else {
        account_id_in_arn(principal)
    }
}
