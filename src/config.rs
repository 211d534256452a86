//! Audit configuration
//!
//! Loaded from a TOML file:
//!
//! ```toml
//! caller_account = "123456789012"
//! trusted_accounts = ["111122223333"]
//! report_conditionally_public = true
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_accounts"))]
pub struct AuditConfig {
    /// Account the audited resources belong to; used to flag cross-account principals
    pub caller_account: Option<String>,

    /// Accounts that are not reported as cross-account (e.g. the rest of the org)
    pub trusted_accounts: Vec<String>,

    /// Report resources that are public behind an unscoped condition
    pub report_conditionally_public: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig {
            caller_account: None,
            trusted_accounts: Vec::new(),
            report_conditionally_public: true,
        }
    }
}

impl AuditConfig {
    /// Parse and validate a TOML configuration
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: AuditConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading audit configuration");
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Whether `account` is the caller's own account or explicitly trusted
    pub fn is_trusted_account(&self, account: &str) -> bool {
        self.caller_account.as_deref() == Some(account)
            || self.trusted_accounts.iter().any(|a| a == account)
    }
}

fn is_account_id(value: &str) -> bool {
    value.len() == 12 && value.bytes().all(|b| b.is_ascii_digit())
}

fn validate_accounts(config: &AuditConfig) -> std::result::Result<(), ValidationError> {
    let invalid = config
        .caller_account
        .iter()
        .chain(config.trusted_accounts.iter())
        .find(|account| !is_account_id(account));

    match invalid {
        Some(account) => {
            let mut err = ValidationError::new("account_id");
            err.message = Some(Cow::Owned(format!(
                "'{}' is not a 12-digit AWS account id",
                account
            )));
            Err(err)
        }
        None => Ok(()),
    }
}
