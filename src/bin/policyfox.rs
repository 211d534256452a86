//! policyfox CLI
//!
//! Classifies IAM resource policies and role trust policies exported from an
//! AWS account.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use policyfox::audit::{InventorySource, ResourceTrustAuditor, RoleTrustAuditor};
use policyfox::{AuditConfig, Policy, TrustPolicy};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "policyfox")]
#[command(about = "Find public resources and risky role trusts in AWS IAM policies")]
struct Args {
    /// Enable debug logging (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify resource policy documents
    Check {
        /// Policy JSON files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Account the resources belong to
        #[arg(long)]
        caller_account: Option<String>,
    },

    /// Show who can assume roles given their trust policies
    Trust {
        /// Trust policy files (plain or URL-encoded JSON)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Audit an inventory export of resource and role policies
    Audit {
        /// Inventory JSON file
        #[arg(short, long)]
        inventory: PathBuf,

        /// TOML audit configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::default().add_directive(level.into())
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Check {
            files,
            caller_account,
        } => check(&files, caller_account.as_deref()),
        Command::Trust { files } => trust(&files),
        Command::Audit {
            inventory,
            config,
            json,
        } => audit(&inventory, config.as_deref(), json),
    }
}

fn check(files: &[PathBuf], caller_account: Option<&str>) -> Result<()> {
    for path in files {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let policy =
            Policy::parse(&bytes).with_context(|| format!("parsing {}", path.display()))?;

        println!("{}: {}", path.display(), policy.exposure());
        for statement in policy.exposing_statements() {
            println!("  {}", statement.summary(caller_account));
        }
    }
    Ok(())
}

fn trust(files: &[PathBuf]) -> Result<()> {
    for path in files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let analysis = TrustPolicy::parse(&text)
            .with_context(|| format!("parsing {}", path.display()))?
            .analyze();

        println!("{}:", path.display());
        for principal in &analysis.principals {
            if principal.external_ids.is_empty() {
                println!("  AWS {}", principal.arn);
            } else {
                println!(
                    "  AWS {} (ExternalId: {})",
                    principal.arn,
                    principal.external_ids.join(", ")
                );
            }
        }
        for service in &analysis.services {
            println!("  Service {}", service);
        }
        for federated in &analysis.federated {
            println!("  Federated {}", federated);
        }
    }
    Ok(())
}

fn audit(inventory: &Path, config: Option<&Path>, json: bool) -> Result<()> {
    let config = match config {
        Some(path) => {
            AuditConfig::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => AuditConfig::default(),
    };
    let source = InventorySource::load(inventory)
        .with_context(|| format!("loading {}", inventory.display()))?;

    info!(inventory = %inventory.display(), "Starting audit");

    let resources = ResourceTrustAuditor::new(&source, config.clone()).audit()?;
    let roles = RoleTrustAuditor::new(&source, config).audit()?;

    if json {
        let combined = serde_json::json!({
            "resources": resources,
            "roles": roles,
        });
        println!("{}", serde_json::to_string_pretty(&combined)?);
        return Ok(());
    }

    for finding in &resources.findings {
        println!("{} [{}]", finding.arn, finding.exposure);
        for statement in &finding.statements {
            println!("  {}", statement);
        }
    }

    for finding in roles.findings.iter().filter(|f| f.is_notable()) {
        println!("{} [role]", finding.arn);
        if finding.trusts_everyone {
            println!("  trusts every AWS principal");
        }
        for arn in &finding.cross_account {
            println!("  cross-account: {}", arn);
        }
        for federated in finding.analysis.unrestricted_federation() {
            println!("  {}", federated);
        }
    }

    Ok(())
}
