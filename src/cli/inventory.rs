//! `cloudlab-inventory` — the Ansible dynamic inventory surface.
//!
//! Ansible invokes the binary with exactly one of two modes: `--list` for
//! the whole inventory, `--host <name>` for one host's variables. The
//! document centralizes all variables under `_meta.hostvars`, so the
//! `--host` answer is always an empty object and never touches Terraform.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};

use crate::application::services::inventory::{collect_inventory, host_vars};
use crate::infra::terraform::TerraformCli;

/// Ansible dynamic inventory backed by Terraform outputs
#[derive(Debug, Parser)]
#[command(
    name = "cloudlab-inventory",
    version,
    group(ArgGroup::new("mode").required(true).args(["list", "host"]))
)]
pub struct InventoryCli {
    /// Print the full inventory document as indented JSON
    #[arg(long)]
    pub list: bool,

    /// Print the variables of a single host (always an empty object)
    #[arg(long, value_name = "HOSTNAME")]
    pub host: Option<String>,
}

/// Execute the parsed invocation.
///
/// # Errors
///
/// Returns an error when the Terraform outputs cannot be fetched or do
/// not contain a usable address. The caller maps any error to a stderr
/// diagnostic and exit code 1, which Ansible treats as "inventory
/// unavailable".
pub async fn run(cli: InventoryCli) -> Result<()> {
    if cli.host.is_some() {
        println!("{}", host_vars());
        return Ok(());
    }

    let terraform = TerraformCli::from_env();
    let document = collect_inventory(&terraform).await?;
    let rendered =
        serde_json::to_string_pretty(&document).context("serializing inventory document")?;
    println!("{rendered}");
    Ok(())
}
