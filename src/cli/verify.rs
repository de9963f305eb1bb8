//! `cloudlab-verify` — run the role batteries against a provisioned host.
//!
//! The human report follows the check-list layout of the role batteries:
//! one section per role, one `✓`/`✗` line per check, failure details
//! dimmed underneath. `--json` swaps the whole report for one document.

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;

use crate::application::services::verify::{
    DEFAULT_INSTANCE, DEFAULT_OVERLAY_NETWORK, VerifyConfig, run_battery,
};
use crate::domain::checks::{CheckOutcome, Role, VerifyReport, collect_failures};
use crate::infra::inspector::SystemInspector;
use crate::output::OutputContext;

// Parse rules for the domain `Role` enum, which carries no clap
// dependency itself.
impl clap::ValueEnum for Role {
    fn value_variants<'a>() -> &'a [Self] {
        &Role::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.name()))
    }
}

/// Verify a provisioned cloudlab host against its converged baseline
#[derive(Debug, Parser)]
#[command(name = "cloudlab-verify", version)]
pub struct VerifyCli {
    /// Role battery to run; repeatable (default: all, in provisioning order)
    #[arg(long = "role", value_enum, value_name = "ROLE")]
    pub roles: Vec<Role>,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Suppress passing checks and headers
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Overlay network expected on the swarm
    #[arg(long, value_name = "NAME", default_value = DEFAULT_OVERLAY_NETWORK)]
    pub overlay_network: String,

    /// Instance label expected in the Alloy configuration
    #[arg(long, value_name = "NAME", default_value = DEFAULT_INSTANCE)]
    pub instance: String,

    /// Filesystem root to read config files under (for mounted images)
    #[arg(long, value_name = "PATH", default_value = "/")]
    pub root: String,
}

impl VerifyCli {
    /// Roles to run, defaulting to the full battery in provisioning order.
    #[must_use]
    pub fn selected_roles(&self) -> Vec<Role> {
        if self.roles.is_empty() {
            Role::ALL.to_vec()
        } else {
            self.roles.clone()
        }
    }

    fn config(&self) -> VerifyConfig {
        VerifyConfig {
            overlay_network: self.overlay_network.clone(),
            instance: self.instance.clone(),
        }
    }
}

/// Run the selected batteries and render the report.
///
/// Returns whether every check passed; the caller maps `false` to exit
/// code 1 so the binary can gate deploy pipelines.
///
/// # Errors
///
/// Returns an error when the report cannot be serialized.
pub async fn run(cli: &VerifyCli) -> Result<bool> {
    let inspector = SystemInspector::default_runner().with_root(cli.root.as_str());
    let report = run_battery(&inspector, &cli.selected_roles(), &cli.config()).await;

    if cli.json {
        print_json(&report)?;
    } else {
        let ctx = OutputContext::new(cli.no_color, cli.quiet);
        print_human(&ctx, &report);
    }
    Ok(report.passed())
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn print_json(report: &VerifyReport) -> Result<()> {
    let status = if report.passed() { "passed" } else { "failed" };
    let out = serde_json::json!({
        "status": status,
        "completed_at": report.completed_at,
        "roles": report.roles,
        "failures": collect_failures(report),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("JSON serialization")?
    );
    Ok(())
}

fn print_human(ctx: &OutputContext, report: &VerifyReport) {
    if !ctx.quiet {
        println!();
        ctx.header("Cloudlab Host Verification");
        println!();
    }

    for role_report in &report.roles {
        if !ctx.quiet {
            println!("  {}:", role_report.role);
        }
        for check in &role_report.checks {
            print_check(ctx, check);
        }
        if !ctx.quiet {
            println!();
        }
    }

    let total = report.total_checks();
    let failed = report.failed_checks();
    if failed == 0 {
        println!("  {} {total} checks passed", "✓".style(ctx.styles.success));
    } else {
        println!(
            "  {} {failed} of {total} checks failed",
            "✗".style(ctx.styles.error)
        );
    }
}

fn print_check(ctx: &OutputContext, check: &CheckOutcome) {
    if check.passed {
        if !ctx.quiet {
            println!("    {} {}", "✓".style(ctx.styles.success), check.name);
        }
        return;
    }
    println!("    {} {}", "✗".style(ctx.styles.error), check.name);
    if let Some(detail) = &check.detail {
        println!("      {}", detail.style(ctx.styles.dim));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
