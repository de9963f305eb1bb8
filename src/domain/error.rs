//! Typed domain error enum for the inventory pipeline.
//!
//! This module has zero imports from `crate::infra`, `crate::cli`,
//! `tokio`, `std::fs`, or `std::process`. The error type implements
//! `thiserror::Error` and converts to `anyhow::Error` via the `?` operator.

use std::io;

use thiserror::Error;

// ── Inventory errors ──────────────────────────────────────────────────────────

/// Failure modes of the `--list` pipeline.
///
/// Every variant is terminal: the binary prints the message to stderr and
/// exits non-zero so Ansible treats the inventory as unavailable rather
/// than empty.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The `terraform` binary is absent from `PATH`.
    #[error("Terraform binary not found in PATH")]
    ToolInvocation(#[source] io::Error),

    /// The `terraform` binary exists but could not be started
    /// (permissions, exec format).
    #[error("Failed to start Terraform: {0}")]
    ToolSpawn(io::Error),

    /// `terraform output -json` ran but exited non-zero.
    #[error("Failed to fetch Terraform outputs: {stderr}")]
    ToolExecution { stderr: String },

    /// `terraform output -json` was killed after running past its deadline.
    #[error("Terraform output command timed out: {0}")]
    ToolTimeout(io::Error),

    /// The tool exited zero but its stdout was not the expected JSON shape.
    #[error("Terraform outputs are not valid JSON: {0}")]
    MalformedOutput(#[from] serde_json::Error),

    /// A required output is absent, empty, or not a string.
    #[error("{key} not found in Terraform outputs")]
    MissingRequiredOutput { key: &'static str },
}
