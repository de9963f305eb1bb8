//! Application service — host verification use-case.
//!
//! One battery per provisioning role, asserting the converged state the
//! playbooks leave behind. Imports only from `crate::domain` and
//! `crate::application::ports`; every probe goes through the injected
//! [`HostInspector`].

use crate::application::ports::{HostInspector, Probe};
use crate::domain::checks::{CheckOutcome, Role, RoleReport, VerifyReport};
use crate::domain::inventory::{DEFAULT_SSH_PORT, SSH_USER};

// ── Converged baseline ────────────────────────────────────────────────────────

/// Packages the common role installs on every host.
pub const BASE_PACKAGES: [&str; 9] = [
    "apt-transport-https",
    "ca-certificates",
    "curl",
    "gnupg",
    "lsb-release",
    "unattended-upgrades",
    "fail2ban",
    "ufw",
    "jq",
];

/// Packages the docker role installs from the upstream Docker repository.
pub const DOCKER_PACKAGES: [&str; 5] = [
    "docker-ce",
    "docker-ce-cli",
    "containerd.io",
    "docker-buildx-plugin",
    "docker-compose-plugin",
];

/// Directory tree the common role creates for stacks and scripts.
pub const CLOUDLAB_DIRS: [&str; 3] = [
    "/opt/cloudlab",
    "/opt/cloudlab/scripts",
    "/opt/cloudlab/stacks",
];

/// Overlay network asserted when no override is given.
pub const DEFAULT_OVERLAY_NETWORK: &str = "test-network";

/// Alloy instance label asserted when no override is given.
pub const DEFAULT_INSTANCE: &str = "test-swarm";

/// Environment-specific names the batteries assert.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Overlay network expected on the swarm (docker battery).
    pub overlay_network: String,
    /// Instance label expected in the Alloy configuration (monitoring battery).
    pub instance: String,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            overlay_network: DEFAULT_OVERLAY_NETWORK.to_string(),
            instance: DEFAULT_INSTANCE.to_string(),
        }
    }
}

// ── Battery entry point ───────────────────────────────────────────────────────

/// Run the requested role batteries, in the order given.
pub async fn run_battery(
    host: &impl HostInspector,
    roles: &[Role],
    config: &VerifyConfig,
) -> VerifyReport {
    let mut reports = Vec::with_capacity(roles.len());
    for role in roles {
        let report = match role {
            Role::Common => check_common(host).await,
            Role::Docker => check_docker(host, config).await,
            Role::Monitoring => check_monitoring(host, config).await,
            Role::Security => check_security(host).await,
        };
        reports.push(report);
    }
    VerifyReport::new(reports)
}

// ── Role batteries ────────────────────────────────────────────────────────────

/// Common role: base packages, unattended upgrades, the `/opt/cloudlab`
/// tree, and the deploy account.
pub async fn check_common(host: &impl HostInspector) -> RoleReport {
    let mut checks = Vec::new();

    for package in BASE_PACKAGES {
        checks.push(package_check(host, package).await);
    }

    checks.push(
        config_check(
            host,
            "unattended upgrades configured",
            "/etc/apt/apt.conf.d/20auto-upgrades",
            &[
                r#"APT::Periodic::Update-Package-Lists "1""#,
                r#"APT::Periodic::Unattended-Upgrade "1""#,
            ],
        )
        .await,
    );

    for path in CLOUDLAB_DIRS {
        checks.push(directory_check(host, path, SSH_USER, Some(0o755)).await);
    }

    checks.push(deploy_account_check(host).await);

    RoleReport {
        role: Role::Common,
        checks,
    }
}

/// Docker role: engine packages, the daemon configuration, and an active
/// swarm with the expected overlay network.
pub async fn check_docker(host: &impl HostInspector, config: &VerifyConfig) -> RoleReport {
    let mut checks = Vec::new();

    for package in DOCKER_PACKAGES {
        checks.push(package_check(host, package).await);
    }
    checks.extend(service_checks(host, "docker").await);

    checks.push(
        config_check(
            host,
            "docker daemon config",
            "/etc/docker/daemon.json",
            &[
                r#""log-driver": "json-file""#,
                r#""max-size": "10m""#,
                r#""max-file": "3""#,
                r#""metrics-addr": "127.0.0.1:9323""#,
            ],
        )
        .await,
    );

    checks.push(group_membership_check(host, SSH_USER, "docker").await);

    let version = host.probe("docker", &["--version"]).await;
    checks.push(CheckOutcome::when(
        "docker client responds",
        probe_stdout_contains(version.as_ref(), "Docker version"),
        "docker --version failed",
    ));

    let info = host.probe("docker", &["info"]).await;
    checks.push(CheckOutcome::when(
        "docker daemon reachable",
        info.as_ref().is_some_and(|probe| probe.success),
        "docker info failed",
    ));
    checks.push(CheckOutcome::when(
        "swarm mode active",
        probe_stdout_contains(info.as_ref(), "Swarm: active"),
        "docker info does not report an active swarm",
    ));

    let nodes = host.probe("docker", &["node", "ls"]).await;
    checks.push(CheckOutcome::when(
        "node is a swarm manager",
        nodes.is_some_and(|probe| probe.success),
        "docker node ls failed",
    ));

    let networks = host.probe("docker", &["network", "ls"]).await;
    checks.push(CheckOutcome::when(
        format!("overlay network {} present", config.overlay_network),
        probe_stdout_contains(networks.as_ref(), &config.overlay_network),
        "network not listed",
    ));

    RoleReport {
        role: Role::Docker,
        checks,
    }
}

/// Monitoring role: the Grafana Alloy collector, its service account and
/// configuration, and the apt source it was installed from.
pub async fn check_monitoring(host: &impl HostInspector, config: &VerifyConfig) -> RoleReport {
    let mut checks = Vec::new();

    checks.push(package_check(host, "alloy").await);
    checks.push(alloy_account_check(host).await);
    checks.push(directory_check(host, "/var/lib/alloy/data", "alloy", None).await);

    checks.push(
        config_check(
            host,
            "alloy collector config",
            "/etc/alloy/config.alloy",
            &[
                config.instance.as_str(),
                "logging {",
                "prometheus.exporter.unix",
                "loki.write",
            ],
        )
        .await,
    );
    checks.push(
        config_check(
            host,
            "alloy environment file",
            "/etc/default/alloy",
            &[r#"CONFIG_FILE="/etc/alloy/config.alloy""#],
        )
        .await,
    );

    checks.extend(service_checks(host, "alloy").await);
    checks.push(grafana_repo_check(host).await);

    RoleReport {
        role: Role::Monitoring,
        checks,
    }
}

/// Security role: ufw posture, fail2ban jail, and the hardened sshd.
pub async fn check_security(host: &impl HostInspector) -> RoleReport {
    let mut checks = Vec::new();

    let status = host.probe("ufw", &["status"]).await;
    checks.push(CheckOutcome::when(
        "firewall active",
        probe_stdout_contains(status.as_ref(), "Status: active"),
        "ufw reports inactive",
    ));

    // `ufw status verbose` reports all three defaults on one line:
    // `Default: deny (incoming), allow (outgoing), disabled (routed)`.
    let verbose = host.probe("ufw", &["status", "verbose"]).await;
    checks.push(CheckOutcome::when(
        "firewall default policies",
        verbose.is_some_and(|probe| {
            probe.stdout.contains("deny (incoming)") && probe.stdout.contains("allow (outgoing)")
        }),
        "want deny incoming, allow outgoing",
    ));

    let rules = status.map(|probe| probe.stdout).unwrap_or_default();
    let ssh_port = DEFAULT_SSH_PORT.to_string();
    checks.push(CheckOutcome::when(
        format!("firewall allows ssh port {ssh_port}"),
        rules.contains(&ssh_port),
        "no matching rule",
    ));
    checks.push(CheckOutcome::when(
        "firewall allows web ports 80 and 443",
        rules.contains("80") && rules.contains("443"),
        "web rules missing",
    ));
    checks.push(CheckOutcome::when(
        "firewall allows service range 10000:10999",
        rules.contains("10000:10999"),
        "service range rule missing",
    ));

    checks.push(package_check(host, "fail2ban").await);
    checks.extend(service_checks(host, "fail2ban").await);

    let jail_port = format!("port = {DEFAULT_SSH_PORT}");
    checks.push(
        config_check(
            host,
            "fail2ban sshd jail",
            "/etc/fail2ban/jail.local",
            &[
                "[sshd]",
                "enabled = true",
                jail_port.as_str(),
                "maxretry = 5",
                "bantime = 3600",
            ],
        )
        .await,
    );

    let sshd_port = format!("Port {DEFAULT_SSH_PORT}");
    checks.push(
        config_check(
            host,
            "sshd hardening drop-in",
            "/etc/ssh/sshd_config.d/custom_port.conf",
            &[
                sshd_port.as_str(),
                "PermitRootLogin no",
                "PasswordAuthentication no",
            ],
        )
        .await,
    );

    checks.extend(service_checks(host, "ssh").await);

    RoleReport {
        role: Role::Security,
        checks,
    }
}

// ── Shared check helpers ──────────────────────────────────────────────────────

fn probe_stdout_contains(probe: Option<&Probe>, needle: &str) -> bool {
    probe.is_some_and(|probe| probe.success && probe.stdout.contains(needle))
}

async fn package_check(host: &impl HostInspector, name: &str) -> CheckOutcome {
    CheckOutcome::when(
        format!("package {name} installed"),
        host.package_installed(name).await,
        "not installed",
    )
}

async fn service_checks(host: &impl HostInspector, unit: &str) -> [CheckOutcome; 2] {
    [
        CheckOutcome::when(
            format!("service {unit} enabled"),
            host.service_enabled(unit).await,
            "disabled",
        ),
        CheckOutcome::when(
            format!("service {unit} running"),
            host.service_active(unit).await,
            "inactive",
        ),
    ]
}

/// Assert every needle appears in the file; the first absent one is named
/// in the failure detail.
async fn config_check(
    host: &impl HostInspector,
    name: &str,
    path: &str,
    needles: &[&str],
) -> CheckOutcome {
    let Some(contents) = host.file_contents(path).await else {
        return CheckOutcome::fail(name, format!("{path} missing"));
    };
    match needles.iter().find(|needle| !contents.contains(*needle)) {
        None => CheckOutcome::pass(name),
        Some(needle) => CheckOutcome::fail(name, format!("{path} lacks `{needle}`")),
    }
}

async fn directory_check(
    host: &impl HostInspector,
    path: &str,
    owner: &str,
    mode: Option<u32>,
) -> CheckOutcome {
    let name = format!("directory {path}");
    let Some(stat) = host.file_stat(path).await else {
        return CheckOutcome::fail(name, "missing");
    };
    if !stat.is_dir {
        return CheckOutcome::fail(name, "not a directory");
    }
    if stat.owner != owner || stat.group != owner {
        return CheckOutcome::fail(
            name,
            format!("owned by {}:{}, want {owner}:{owner}", stat.owner, stat.group),
        );
    }
    if let Some(want) = mode {
        if stat.mode != want {
            return CheckOutcome::fail(name, format!("mode {:o}, want {want:o}", stat.mode));
        }
    }
    CheckOutcome::pass(name)
}

async fn group_membership_check(
    host: &impl HostInspector,
    user: &str,
    group: &str,
) -> CheckOutcome {
    let member = host
        .user_account(user)
        .await
        .is_some_and(|account| account.groups.iter().any(|name| name == group));
    CheckOutcome::when(
        format!("user {user} in {group} group"),
        member,
        "not a member",
    )
}

async fn deploy_account_check(host: &impl HostInspector) -> CheckOutcome {
    let name = format!("user {SSH_USER} with bash shell");
    match host.user_account(SSH_USER).await {
        None => CheckOutcome::fail(name, "account missing"),
        Some(account) if account.shell != "/bin/bash" => {
            CheckOutcome::fail(name, format!("shell is {}", account.shell))
        }
        Some(_) => CheckOutcome::pass(name),
    }
}

async fn alloy_account_check(host: &impl HostInspector) -> CheckOutcome {
    let name = "alloy service account";
    match host.user_account("alloy").await {
        None => CheckOutcome::fail(name, "account missing"),
        Some(account) if account.shell != "/usr/sbin/nologin" => {
            CheckOutcome::fail(name, format!("shell is {}", account.shell))
        }
        Some(account) if !account.groups.iter().any(|group| group == "docker") => {
            CheckOutcome::fail(name, "not in docker group")
        }
        Some(_) => CheckOutcome::pass(name),
    }
}

async fn grafana_repo_check(host: &impl HostInspector) -> CheckOutcome {
    let name = "grafana apt repository";
    let list = host
        .file_contents("/etc/apt/sources.list.d/grafana.list")
        .await;
    if !list.is_some_and(|contents| contents.contains("https://apt.grafana.com")) {
        return CheckOutcome::fail(name, "source list missing or wrong URL");
    }
    if host.file_stat("/etc/apt/keyrings/grafana.gpg").await.is_none() {
        return CheckOutcome::fail(name, "signing key missing");
    }
    CheckOutcome::pass(name)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
