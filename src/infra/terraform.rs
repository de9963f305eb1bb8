//! Infrastructure implementation of the `Terraform` port.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Output;

use crate::application::ports::{CommandRunner, Terraform};
use crate::infra::command_runner::TokioCommandRunner;

/// Environment variable overriding the Terraform state directory.
pub const STATE_DIR_ENV: &str = "CLOUDLAB_TERRAFORM_DIR";

/// Production Terraform adapter: shells out to `terraform` with the state
/// directory as its working directory, so no `-chdir` handling is needed
/// and relative backend paths resolve the same way as a manual run.
pub struct TerraformCli<R: CommandRunner> {
    runner: R,
    state_dir: PathBuf,
}

impl<R: CommandRunner> TerraformCli<R> {
    pub fn new(runner: R, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            state_dir: state_dir.into(),
        }
    }

    #[must_use]
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }
}

impl TerraformCli<TokioCommandRunner> {
    /// Adapter wired for production: default runner and deadline, state
    /// directory resolved from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(TokioCommandRunner::default(), state_dir_from_env())
    }
}

impl<R: CommandRunner> Terraform for TerraformCli<R> {
    async fn show_outputs(&self) -> io::Result<Output> {
        self.runner
            .run_in("terraform", &["output", "-json"], &self.state_dir)
            .await
    }
}

/// Resolve the Terraform state directory.
///
/// `CLOUDLAB_TERRAFORM_DIR` wins when set. Otherwise the directory is
/// `../../terraform` relative to the executable, matching the repository
/// layout where the inventory binary sits under `ansible/inventory/` next
/// to a top-level `terraform/`. When the executable path cannot be read,
/// `terraform/` under the working directory is used.
#[must_use]
pub fn state_dir_from_env() -> PathBuf {
    if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
        return PathBuf::from(dir);
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("../../terraform")))
        .unwrap_or_else(|| PathBuf::from("terraform"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
