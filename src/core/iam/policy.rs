//! IAM policy document structure
//!
//! Policies are parsed fresh from JSON on every call and treated as
//! immutable values afterwards. The exposure questions (`is_public`,
//! `is_conditionally_public`) are answered statement by statement.

use super::object::{object_serde, one_or_many};
use super::statement::{Effect, Statement};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Exposure classification of a resource policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Exposure {
    /// No policy attached (or an all-default document)
    Empty,
    /// No statement grants access to a public principal without account/org scoping
    Restricted,
    /// A public grant sits behind a condition that does not pin an account or org
    ConditionallyPublic,
    /// A public grant with no condition
    Public,
}

impl Exposure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exposure::Empty => "empty",
            Exposure::Restricted => "restricted",
            Exposure::ConditionallyPublic => "conditionally-public",
            Exposure::Public => "public",
        }
    }
}

impl fmt::Display for Exposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete IAM policy document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "PascalCase")]
pub struct Policy {
    /// Policy language version, usually "2012-10-17"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Statements in document order; a lone statement object is accepted too
    #[serde(default, deserialize_with = "one_or_many")]
    pub statement: Vec<Statement>,
}

object_serde!(Policy, "a policy document object");

impl Policy {
    /// Create a new empty policy
    pub fn new() -> Self {
        Policy::default()
    }

    /// Add a statement to this policy
    pub fn add_statement(&mut self, statement: Statement) {
        self.statement.push(statement);
    }

    /// Parse a policy from raw JSON bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use policyfox::iam::Policy;
    ///
    /// let policy = Policy::parse(br#"{
    ///     "Version": "2012-10-17",
    ///     "Statement": [{
    ///         "Effect": "Allow",
    ///         "Principal": "*",
    ///         "Action": "s3:GetObject",
    ///         "Resource": "arn:aws:s3:::public-bucket/*"
    ///     }]
    /// }"#).unwrap();
    ///
    /// assert!(policy.is_public());
    /// assert!(!policy.is_conditionally_public());
    /// ```
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let policy: Policy = serde_json::from_slice(bytes)?;
        debug!(
            version = %policy.version,
            statements = policy.statement.len(),
            "Parsed policy document"
        );
        Ok(policy)
    }

    /// Parse policy from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Self::parse(json.as_bytes())
    }

    /// Serialize policy to JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// True when the document has no statements, or only all-default ones
    ///
    /// `Version` and `Id` carry no grant, so they do not count.
    pub fn is_empty(&self) -> bool {
        self.statement.iter().all(Statement::is_empty)
    }

    /// Any statement allows a public principal with no condition
    pub fn is_public(&self) -> bool {
        self.statement.iter().any(Statement::is_public)
    }

    /// Any statement allows a public principal behind a condition that is not
    /// scoped to an account or organization
    pub fn is_conditionally_public(&self) -> bool {
        self.statement.iter().any(Statement::is_conditionally_public)
    }

    /// Overall classification; `Public` wins over `ConditionallyPublic`
    pub fn exposure(&self) -> Exposure {
        if self.is_empty() {
            Exposure::Empty
        } else if self.is_public() {
            Exposure::Public
        } else if self.is_conditionally_public() {
            Exposure::ConditionallyPublic
        } else {
            Exposure::Restricted
        }
    }

    /// Statements responsible for a public or conditionally public verdict
    pub fn exposing_statements(&self) -> impl Iterator<Item = &Statement> {
        self.statement
            .iter()
            .filter(|s| s.is_public() || s.is_conditionally_public())
    }

    /// Whether some statement with `effect` covers both `action` and `resource`
    pub fn has_matching_statement(&self, effect: Effect, action: &str, resource: &str) -> bool {
        self.statement.iter().any(|s| {
            s.effect == Some(effect) && s.matches_action(action) && s.matches_resource(resource)
        })
    }

    /// All `Action` entries across statements, sorted and de-duplicated
    pub fn all_actions(&self) -> Vec<String> {
        self.statement
            .iter()
            .flat_map(|s| s.action.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
