//! The Ansible inventory document and its fixed topology.
//!
//! The provisioned environment is a single DigitalOcean droplet acting as
//! its own Docker Swarm manager, so the document shape is closed: one
//! aliased host, one functional group, and the implicit `all` group. Only
//! the connection address and port vary between runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Fixed topology ────────────────────────────────────────────────────────────

/// Logical alias playbooks target instead of a raw IP.
pub const MANAGER_ALIAS: &str = "swarm_manager";

/// Functional group containing the manager alias.
pub const MANAGER_GROUP: &str = "swarm";

/// Ansible's implicit top-level group.
pub const ALL_GROUP: &str = "all";

/// Account playbooks connect as.
pub const SSH_USER: &str = "deployer";

/// Interpreter pinned so module execution does not depend on the remote
/// distribution's `python` symlink.
pub const PYTHON_INTERPRETER: &str = "/usr/bin/python3";

/// Connection port used when the state exposes no `ssh_port` output.
pub const DEFAULT_SSH_PORT: u16 = 1923;

/// Terraform output holding the droplet's public address. Required.
pub const ADDRESS_OUTPUT: &str = "droplet_ip";

/// Terraform output holding the hardened SSH port. Optional.
pub const PORT_OUTPUT: &str = "ssh_port";

// ── Document types ────────────────────────────────────────────────────────────

/// Connection variables for one host under `_meta.hostvars`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostVars {
    pub ansible_host: String,
    /// Kept as raw JSON: the port is relayed with exactly the type the
    /// Terraform state used, number or string.
    pub ansible_port: Value,
    pub ansible_user: String,
    pub ansible_python_interpreter: String,
}

impl HostVars {
    /// Variables for the manager host at `address`, reachable on `port`.
    #[must_use]
    pub fn new(address: impl Into<String>, port: Value) -> Self {
        Self {
            ansible_host: address.into(),
            ansible_port: port,
            ansible_user: SSH_USER.to_string(),
            ansible_python_interpreter: PYTHON_INTERPRETER.to_string(),
        }
    }
}

/// One inventory group: either a list of member hosts or a list of child
/// groups. Serializes to `{"hosts": [...]}` or `{"children": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Group {
    #[serde(rename = "hosts")]
    Hosts(Vec<String>),
    #[serde(rename = "children")]
    Children(Vec<String>),
}

/// Variables of every known host, keyed by alias.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub hostvars: BTreeMap<String, HostVars>,
}

/// The full `--list` document.
///
/// All connection variables live under `_meta.hostvars`, which is the
/// signal for Ansible to skip the per-host `--host` round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryDocument {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    #[serde(flatten)]
    pub groups: BTreeMap<String, Group>,
}

impl InventoryDocument {
    /// Document for the single swarm manager host.
    ///
    /// The alias is placed in the `swarm` group, the `swarm` group under
    /// `all`, and the connection variables under `_meta.hostvars`, so every
    /// alias a group references resolves.
    #[must_use]
    pub fn swarm_manager(vars: HostVars) -> Self {
        let mut hostvars = BTreeMap::new();
        hostvars.insert(MANAGER_ALIAS.to_string(), vars);

        let mut groups = BTreeMap::new();
        groups.insert(
            MANAGER_GROUP.to_string(),
            Group::Hosts(vec![MANAGER_ALIAS.to_string()]),
        );
        groups.insert(
            ALL_GROUP.to_string(),
            Group::Children(vec![MANAGER_GROUP.to_string()]),
        );

        Self {
            meta: Meta { hostvars },
            groups,
        }
    }

    /// Host aliases referenced by a `hosts` group but missing from
    /// `_meta.hostvars`. Empty on every well-formed document.
    #[must_use]
    pub fn unresolved_aliases(&self) -> Vec<&str> {
        self.groups
            .values()
            .filter_map(|group| match group {
                Group::Hosts(members) => Some(members),
                Group::Children(_) => None,
            })
            .flatten()
            .filter(|alias| !self.meta.hostvars.contains_key(alias.as_str()))
            .map(String::as_str)
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
