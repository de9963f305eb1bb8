//! Port trait definitions for the application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::cli`, or `crate::output`.

use std::io;
use std::path::Path;
use std::process::Output;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
///
/// Errors are plain `io::Error` so callers can classify on `ErrorKind`:
/// `NotFound` means the program is absent, `TimedOut` means the runner
/// killed it after its deadline; other kinds pass through from the spawn.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    async fn run(&self, program: &str, args: &[&str]) -> io::Result<Output>;

    /// Run a program with `cwd` as its working directory.
    async fn run_in(&self, program: &str, args: &[&str], cwd: &Path) -> io::Result<Output>;
}

// ── Terraform Port ────────────────────────────────────────────────────────────

/// Abstracts the Terraform CLI so the inventory pipeline can be fed fixed
/// JSON in tests instead of a real binary and state directory.
#[allow(async_fn_in_trait)]
pub trait Terraform {
    /// Run `terraform output -json` against the configured state directory.
    ///
    /// A non-zero [`Output::status`] is a tool failure, not an `Err`; the
    /// `Err` path is reserved for not being able to run the tool at all.
    async fn show_outputs(&self) -> io::Result<Output>;
}

// ── Host Inspection Port ──────────────────────────────────────────────────────

/// Filesystem metadata for one path, as the battery asserts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub is_dir: bool,
    pub owner: String,
    pub group: String,
    /// Permission bits, e.g. `0o755`.
    pub mode: u32,
}

/// Login shell and group membership for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub shell: String,
    pub groups: Vec<String>,
}

/// Captured result of a probe command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub success: bool,
    pub stdout: String,
}

/// Read-only host state queries backing the verification battery.
///
/// Implementations degrade probe errors to `false`/`None` so one broken
/// probe reads as an unsatisfied assertion instead of aborting the run.
#[allow(async_fn_in_trait)]
pub trait HostInspector {
    /// Whether the named dpkg package is in the installed state.
    async fn package_installed(&self, name: &str) -> bool;

    /// Whether the systemd unit is enabled at boot.
    async fn service_enabled(&self, unit: &str) -> bool;

    /// Whether the systemd unit is currently active.
    async fn service_active(&self, unit: &str) -> bool;

    /// Metadata of `path`, or `None` when it does not exist.
    async fn file_stat(&self, path: &str) -> Option<FileStat>;

    /// UTF-8 contents of `path`, or `None` when unreadable.
    async fn file_contents(&self, path: &str) -> Option<String>;

    /// Shell and groups of the named account, or `None` when absent.
    async fn user_account(&self, name: &str) -> Option<UserAccount>;

    /// Run a read-only probe command and capture status plus stdout.
    async fn probe(&self, program: &str, args: &[&str]) -> Option<Probe>;
}
