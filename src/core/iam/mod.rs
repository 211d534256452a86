//! AWS IAM policy documents
//!
//! Provides the typed policy model and the exposure questions asked of it:
//! - JSON parsing that normalizes string-or-list fields
//! - Public / conditionally public detection for resource policies
//! - Account and organization scope analysis of condition blocks
//! - Wildcard matching of actions and resources

mod condition;
mod list;
pub(crate) mod object;
mod pattern;
mod policy;
mod principal;
mod statement;

pub use condition::{account_id_in_arn, account_id_of_principal, ConditionBlock, ConditionKeys};
pub use list::{ConditionValues, StringList};
pub use pattern::PatternMatcher;
pub use policy::{Exposure, Policy};
pub use principal::{Principal, SpecifiedPrincipal};
pub use statement::{Effect, Statement};
