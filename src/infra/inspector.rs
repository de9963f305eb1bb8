//! Infrastructure implementation of the `HostInspector` port.
//!
//! Read-only shell probes (`dpkg-query`, `systemctl`, `stat`, `getent`,
//! `id`) plus direct file reads. Every probe degrades to `false`/`None` on
//! error so the battery reports an unsatisfied assertion instead of
//! aborting.

use std::path::PathBuf;

use crate::application::ports::{CommandRunner, FileStat, HostInspector, Probe, UserAccount};
use crate::infra::command_runner::TokioCommandRunner;

/// Production inspector for the local host.
pub struct SystemInspector<R: CommandRunner> {
    runner: R,
    root: PathBuf,
}

impl<R: CommandRunner> SystemInspector<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            root: PathBuf::from("/"),
        }
    }

    /// Prefix file paths with `root`, for checking a mounted image or
    /// chroot instead of the live filesystem. Command probes are not
    /// affected.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    async fn probe_success(&self, program: &str, args: &[&str]) -> bool {
        self.runner
            .run(program, args)
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

impl SystemInspector<TokioCommandRunner> {
    /// Inspector wired for production: default runner and deadline.
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner::default())
    }
}

impl<R: CommandRunner> HostInspector for SystemInspector<R> {
    async fn package_installed(&self, name: &str) -> bool {
        let Ok(output) = self
            .runner
            .run("dpkg-query", &["-W", "-f=${Status}", name])
            .await
        else {
            return false;
        };
        output.status.success()
            && String::from_utf8_lossy(&output.stdout).contains("install ok installed")
    }

    async fn service_enabled(&self, unit: &str) -> bool {
        self.probe_success("systemctl", &["is-enabled", "--quiet", unit])
            .await
    }

    async fn service_active(&self, unit: &str) -> bool {
        self.probe_success("systemctl", &["is-active", "--quiet", unit])
            .await
    }

    async fn file_stat(&self, path: &str) -> Option<FileStat> {
        let resolved = self.resolve(path);
        let output = self
            .runner
            .run("stat", &["-c", "%F|%U|%G|%a", resolved.to_str()?])
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        parse_stat(String::from_utf8_lossy(&output.stdout).trim())
    }

    async fn file_contents(&self, path: &str) -> Option<String> {
        tokio::fs::read_to_string(self.resolve(path)).await.ok()
    }

    async fn user_account(&self, name: &str) -> Option<UserAccount> {
        let passwd = self.runner.run("getent", &["passwd", name]).await.ok()?;
        if !passwd.status.success() {
            return None;
        }
        let shell = parse_login_shell(&String::from_utf8_lossy(&passwd.stdout))?;

        let groups = match self.runner.run("id", &["-nG", name]).await {
            Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
                .split_whitespace()
                .map(str::to_owned)
                .collect(),
            _ => Vec::new(),
        };

        Some(UserAccount { shell, groups })
    }

    async fn probe(&self, program: &str, args: &[&str]) -> Option<Probe> {
        let output = self.runner.run(program, args).await.ok()?;
        Some(Probe {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

// ── Output parsing ────────────────────────────────────────────────────────────

/// Parse `stat -c %F|%U|%G|%a` output, e.g. `directory|deployer|deployer|755`.
fn parse_stat(line: &str) -> Option<FileStat> {
    let mut fields = line.split('|');
    let kind = fields.next()?;
    let owner = fields.next()?.to_string();
    let group = fields.next()?.to_string();
    let mode = u32::from_str_radix(fields.next()?, 8).ok()?;
    Some(FileStat {
        is_dir: kind == "directory",
        owner,
        group,
        mode,
    })
}

/// Login shell from a passwd line, e.g.
/// `deployer:x:1000:1000::/home/deployer:/bin/bash`.
fn parse_login_shell(line: &str) -> Option<String> {
    line.trim_end().split(':').nth(6).map(str::to_owned)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
