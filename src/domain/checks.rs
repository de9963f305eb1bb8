//! Check model for the host verification battery.
//!
//! A battery runs one [`RoleReport`] per provisioning role; each report is
//! a flat list of named [`CheckOutcome`]s. The types here only carry
//! results, the probing lives behind `application::ports::HostInspector`.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ── Roles ─────────────────────────────────────────────────────────────────────

/// A provisioning role whose converged state the battery asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Base packages, unattended upgrades, the deploy account and tree.
    Common,
    /// Docker engine, swarm membership, daemon configuration.
    Docker,
    /// Grafana Alloy collector and its apt source.
    Monitoring,
    /// Firewall, fail2ban, hardened sshd.
    Security,
}

impl Role {
    /// Every role, in provisioning order.
    pub const ALL: [Role; 4] = [Role::Common, Role::Docker, Role::Monitoring, Role::Security];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Role::Common => "common",
            Role::Docker => "docker",
            Role::Monitoring => "monitoring",
            Role::Security => "security",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// Result of one host assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    /// What was asserted, phrased as the satisfied state.
    pub name: String,
    pub passed: bool,
    /// How the host deviated. Only present on failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CheckOutcome {
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: None,
        }
    }

    #[must_use]
    pub fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail: Some(detail.into()),
        }
    }

    /// Outcome from a condition; `detail` is recorded only on failure.
    #[must_use]
    pub fn when(name: impl Into<String>, passed: bool, detail: &str) -> Self {
        if passed {
            Self::pass(name)
        } else {
            Self::fail(name, detail)
        }
    }
}

/// All outcomes of one role's battery.
#[derive(Debug, Clone, Serialize)]
pub struct RoleReport {
    pub role: Role,
    pub checks: Vec<CheckOutcome>,
}

impl RoleReport {
    /// Whether every check in this role passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }
}

/// The full battery result across the selected roles.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub completed_at: DateTime<Utc>,
    pub roles: Vec<RoleReport>,
}

impl VerifyReport {
    #[must_use]
    pub fn new(roles: Vec<RoleReport>) -> Self {
        Self {
            completed_at: Utc::now(),
            roles,
        }
    }

    /// Whether every check in every role passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.roles.iter().all(RoleReport::passed)
    }

    #[must_use]
    pub fn total_checks(&self) -> usize {
        self.roles.iter().map(|report| report.checks.len()).sum()
    }

    #[must_use]
    pub fn failed_checks(&self) -> usize {
        self.roles
            .iter()
            .flat_map(|report| &report.checks)
            .filter(|check| !check.passed)
            .count()
    }
}

// ── Failure collection ────────────────────────────────────────────────────────

/// Collect failed checks as `role: name (detail)` lines for summaries.
#[must_use]
pub fn collect_failures(report: &VerifyReport) -> Vec<String> {
    let mut failures = Vec::new();
    for role_report in &report.roles {
        for check in role_report.checks.iter().filter(|check| !check.passed) {
            let line = match &check.detail {
                Some(detail) => format!("{}: {} ({detail})", role_report.role, check.name),
                None => format!("{}: {}", role_report.role, check.name),
            };
            failures.push(line);
        }
    }
    failures
}

// ── Tests ─────────────────────────────────────────────────────────────────────
