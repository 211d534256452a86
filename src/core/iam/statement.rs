//! Policy statements
//!
//! A statement grants or denies a set of actions on a set of resources to a
//! principal, optionally under a condition block.

use super::condition::{account_id_of_principal, ConditionBlock};
use super::list::StringList;
use super::object::object_serde;
use super::pattern::PatternMatcher;
use super::principal::Principal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Effect of a policy statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Allow the action
    Allow,
    /// Deny the action (takes precedence over Allow)
    Deny,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Allow => f.write_str("Allow"),
            Effect::Deny => f.write_str("Deny"),
        }
    }
}

/// A single policy statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "PascalCase")]
pub struct Statement {
    /// Statement ID (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_principal: Option<Principal>,

    #[serde(default, skip_serializing_if = "StringList::is_empty")]
    pub action: StringList,

    #[serde(default, skip_serializing_if = "StringList::is_empty")]
    pub not_action: StringList,

    #[serde(default, skip_serializing_if = "StringList::is_empty")]
    pub resource: StringList,

    #[serde(default, skip_serializing_if = "StringList::is_empty")]
    pub not_resource: StringList,

    #[serde(default, skip_serializing_if = "ConditionBlock::is_unset")]
    pub condition: ConditionBlock,
}

object_serde!(Statement, "a policy statement object");

impl Statement {
    /// Create a new statement with actions and resources
    pub fn new<A, R>(effect: Effect, action: A, resource: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Statement {
            effect: Some(effect),
            action: action.into_iter().collect(),
            resource: resource.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn with_condition(mut self, condition: ConditionBlock) -> Self {
        self.condition = condition;
        self
    }

    pub fn is_allow(&self) -> bool {
        self.effect == Some(Effect::Allow)
    }

    pub fn is_deny(&self) -> bool {
        self.effect == Some(Effect::Deny)
    }

    /// True when every field is absent or empty
    pub fn is_empty(&self) -> bool {
        self.sid.as_deref().map_or(true, str::is_empty)
            && self.effect.is_none()
            && self.principal.as_ref().map_or(true, Principal::is_empty)
            && self.not_principal.as_ref().map_or(true, Principal::is_empty)
            && self.action.is_empty()
            && self.not_action.is_empty()
            && self.resource.is_empty()
            && self.not_resource.is_empty()
            && self.condition.is_empty()
    }

    /// Principal is `"*"` or names `AWS: "*"`
    pub fn has_public_principal(&self) -> bool {
        self.principal.as_ref().is_some_and(Principal::is_public)
    }

    /// Allow to a public principal with no condition at all
    pub fn is_public(&self) -> bool {
        self.is_allow() && self.has_public_principal() && self.condition.is_empty()
    }

    /// Allow to a public principal behind a condition that does not pin an
    /// account or organization
    pub fn is_conditionally_public(&self) -> bool {
        self.is_allow()
            && self.has_public_principal()
            && !self.condition.is_empty()
            && !self.condition.is_scoped_on_account_or_organization()
    }

    /// Whether `action` falls under `Action` (or outside `NotAction`)
    pub fn matches_action(&self, action: &str) -> bool {
        if !self.action.is_empty() {
            self.action
                .iter()
                .any(|pattern| PatternMatcher::matches_action(pattern, action))
        } else if !self.not_action.is_empty() {
            !self
                .not_action
                .iter()
                .any(|pattern| PatternMatcher::matches_action(pattern, action))
        } else {
            false
        }
    }

    /// Whether `resource` falls under `Resource` (or outside `NotResource`)
    pub fn matches_resource(&self, resource: &str) -> bool {
        if !self.resource.is_empty() {
            self.resource
                .iter()
                .any(|pattern| PatternMatcher::matches_resource(pattern, resource))
        } else if !self.not_resource.is_empty() {
            !self
                .not_resource
                .iter()
                .any(|pattern| PatternMatcher::matches_resource(pattern, resource))
        } else {
            false
        }
    }

    /// One-line English summary of the statement
    ///
    /// With `caller_account` set, AWS principals outside that account are
    /// flagged as cross-account.
    pub fn summary(&self, caller_account: Option<&str>) -> String {
        let mut who = match &self.principal {
            Some(principal) => principal.describe(),
            None => match &self.not_principal {
                Some(not_principal) => format!("Everyone except {}", not_principal.describe()),
                None => "The attached identity".to_string(),
            },
        };

        if let (Some(caller), Some(principal)) = (caller_account, self.principal.as_ref()) {
            let cross_account = principal.specified().is_some_and(|p| {
                p.aws
                    .iter()
                    .filter_map(|arn| account_id_of_principal(arn))
                    .any(|account| account != caller)
            });
            if cross_account {
                who.push_str(" (cross-account)");
            }
        }

        let verb = if self.is_deny() { "cannot" } else { "can" };
        let what = describe_list(&self.action, &self.not_action, "perform any action");
        let on = describe_list(&self.resource, &self.not_resource, "any resource");

        let mut summary = format!("{} {} {} on {}", who, verb, what, on);
        if !self.condition.is_empty() {
            summary.push_str(" when ");
            summary.push_str(&self.condition.describe());
        }
        summary
    }
}

fn describe_list(list: &StringList, not_list: &StringList, fallback: &str) -> String {
    if !list.is_empty() {
        list.as_slice().join(", ")
    } else if !not_list.is_empty() {
        format!("everything except {}", not_list.as_slice().join(", "))
    } else {
        fallback.to_string()
    }
}
