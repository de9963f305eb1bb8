//! Application service — dynamic inventory use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through the injected [`Terraform`] port.

use std::io;

use serde_json::Value;

use crate::application::ports::Terraform;
use crate::domain::error::InventoryError;
use crate::domain::inventory::{
    ADDRESS_OUTPUT, DEFAULT_SSH_PORT, HostVars, InventoryDocument, PORT_OUTPUT,
};
use crate::domain::outputs::TerraformOutputs;

/// Fetch and parse the current Terraform outputs.
///
/// # Errors
///
/// - [`InventoryError::ToolInvocation`] when the binary is not on `PATH`.
/// - [`InventoryError::ToolSpawn`] when it exists but cannot be started.
/// - [`InventoryError::ToolTimeout`] when the runner killed it.
/// - [`InventoryError::ToolExecution`] when the tool exited non-zero; the
///   tool's stderr is carried into the message.
/// - [`InventoryError::MalformedOutput`] when stdout is not valid JSON.
pub async fn fetch_outputs(terraform: &impl Terraform) -> Result<TerraformOutputs, InventoryError> {
    let output = match terraform.show_outputs().await {
        Ok(output) => output,
        Err(err) if err.kind() == io::ErrorKind::TimedOut => {
            return Err(InventoryError::ToolTimeout(err));
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(InventoryError::ToolInvocation(err));
        }
        Err(err) => return Err(InventoryError::ToolSpawn(err)),
    };

    if !output.status.success() {
        return Err(InventoryError::ToolExecution {
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        });
    }

    Ok(serde_json::from_slice(&output.stdout)?)
}

/// Build the inventory document from parsed outputs.
///
/// The address output must be a non-empty string. The port output is
/// optional and relayed with exactly the JSON type the state used; when
/// absent the fixed default port is filled in as a number.
///
/// # Errors
///
/// Returns [`InventoryError::MissingRequiredOutput`] when the address
/// output is absent, empty, or not a string.
pub fn build_inventory(outputs: &TerraformOutputs) -> Result<InventoryDocument, InventoryError> {
    let address = outputs
        .string(ADDRESS_OUTPUT)
        .filter(|address| !address.is_empty())
        .ok_or(InventoryError::MissingRequiredOutput {
            key: ADDRESS_OUTPUT,
        })?;

    let port = outputs
        .value(PORT_OUTPUT)
        .cloned()
        .unwrap_or_else(|| Value::from(DEFAULT_SSH_PORT));

    Ok(InventoryDocument::swarm_manager(HostVars::new(address, port)))
}

/// The full `--list` pipeline: fetch outputs, then build the document.
///
/// # Errors
///
/// Propagates every [`InventoryError`] from [`fetch_outputs`] and
/// [`build_inventory`]; each is terminal for the calling binary.
pub async fn collect_inventory(
    terraform: &impl Terraform,
) -> Result<InventoryDocument, InventoryError> {
    let outputs = fetch_outputs(terraform).await?;
    build_inventory(&outputs)
}

/// The `--host` document. Always an empty object: connection variables are
/// centralized under `_meta.hostvars` in the `--list` document, so there
/// is nothing host-specific to report and nothing to fetch.
#[must_use]
pub fn host_vars() -> &'static str {
    "{}"
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io;
    use std::os::unix::process::ExitStatusExt;
    use std::process::{ExitStatus, Output};

    use serde_json::json;

    use super::*;

    // -----------------------------------------------------------------------
    // Terraform fakes
    // -----------------------------------------------------------------------

    fn ok_output(stdout: &str) -> Output {
        Output {
            status: ExitStatus::from_raw(0),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        }
    }

    fn err_output(stderr: &str) -> Output {
        Output {
            // from_raw encodes "exited with code 1" as 1 << 8
            status: ExitStatus::from_raw(1 << 8),
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    /// Succeeds with fixed stdout.
    struct FixedOutputs(&'static str);

    impl Terraform for FixedOutputs {
        async fn show_outputs(&self) -> io::Result<Output> {
            Ok(ok_output(self.0))
        }
    }

    /// Runs, but exits non-zero with fixed stderr.
    struct FailingTool(&'static str);

    impl Terraform for FailingTool {
        async fn show_outputs(&self) -> io::Result<Output> {
            Ok(err_output(self.0))
        }
    }

    /// Cannot be started at all.
    struct MissingTool;

    impl Terraform for MissingTool {
        async fn show_outputs(&self) -> io::Result<Output> {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                "No such file or directory",
            ))
        }
    }

    /// Killed by the runner's deadline.
    struct HangingTool;

    impl Terraform for HangingTool {
        async fn show_outputs(&self) -> io::Result<Output> {
            Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "terraform did not finish within 30s",
            ))
        }
    }

    /// Present on disk but not executable.
    struct UnrunnableTool;

    impl Terraform for UnrunnableTool {
        async fn show_outputs(&self) -> io::Result<Output> {
            Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "Permission denied",
            ))
        }
    }

    fn outputs(entries: &[(&str, serde_json::Value)]) -> TerraformOutputs {
        entries
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // fetch_outputs
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_fetch_parses_terraform_document() {
        let terraform = FixedOutputs(
            r#"{"droplet_ip": {"sensitive": false, "type": "string", "value": "203.0.113.5"}}"#,
        );
        let outputs = fetch_outputs(&terraform).await.expect("fetch succeeds");
        assert_eq!(outputs.string("droplet_ip"), Some("203.0.113.5"));
    }

    #[tokio::test]
    async fn test_fetch_classifies_missing_binary_as_invocation_error() {
        let err = fetch_outputs(&MissingTool).await.expect_err("must fail");
        assert!(matches!(err, InventoryError::ToolInvocation(_)), "got: {err:?}");
        assert!(
            err.to_string().contains("not found in PATH"),
            "diagnostic should name the missing binary, got: {err}"
        );
    }

    #[tokio::test]
    async fn test_fetch_classifies_nonzero_exit_as_execution_error() {
        let terraform = FailingTool("Error: No state file was found!\n");
        let err = fetch_outputs(&terraform).await.expect_err("must fail");
        match &err {
            InventoryError::ToolExecution { stderr } => {
                assert!(stderr.contains("No state file"), "got: {stderr}");
            }
            other => panic!("expected ToolExecution, got: {other:?}"),
        }
        assert!(
            err.to_string().contains("No state file"),
            "tool stderr must surface in the diagnostic, got: {err}"
        );
    }

    #[tokio::test]
    async fn test_fetch_classifies_unrunnable_binary_as_spawn_error() {
        let err = fetch_outputs(&UnrunnableTool).await.expect_err("must fail");
        assert!(matches!(err, InventoryError::ToolSpawn(_)), "got: {err:?}");
        let message = err.to_string();
        assert!(message.contains("Permission denied"), "got: {message}");
        assert!(
            !message.contains("not found in PATH"),
            "a present-but-unrunnable binary must not be reported as absent, got: {message}"
        );
    }

    #[tokio::test]
    async fn test_fetch_classifies_timeout() {
        let err = fetch_outputs(&HangingTool).await.expect_err("must fail");
        assert!(matches!(err, InventoryError::ToolTimeout(_)), "got: {err:?}");
        assert!(err.to_string().contains("timed out"), "got: {err}");
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_json() {
        let terraform = FixedOutputs("terraform version 1.9.0\n");
        let err = fetch_outputs(&terraform).await.expect_err("must fail");
        assert!(matches!(err, InventoryError::MalformedOutput(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_rejects_json_of_wrong_shape() {
        let terraform = FixedOutputs(r#"{"droplet_ip": "203.0.113.5"}"#);
        let err = fetch_outputs(&terraform).await.expect_err("must fail");
        assert!(matches!(err, InventoryError::MalformedOutput(_)), "got: {err:?}");
    }

    // -----------------------------------------------------------------------
    // build_inventory
    // -----------------------------------------------------------------------

    #[test]
    fn test_build_defaults_port_when_output_absent() {
        let outputs = outputs(&[("droplet_ip", json!("203.0.113.5"))]);
        let doc = build_inventory(&outputs).expect("build succeeds");
        let vars = doc.meta.hostvars.get("swarm_manager").expect("manager vars");
        assert_eq!(vars.ansible_host, "203.0.113.5");
        assert_eq!(vars.ansible_port, json!(1923));
    }

    #[test]
    fn test_build_relays_numeric_port() {
        let outputs = outputs(&[
            ("droplet_ip", json!("203.0.113.5")),
            ("ssh_port", json!(2222)),
        ]);
        let doc = build_inventory(&outputs).expect("build succeeds");
        let vars = doc.meta.hostvars.get("swarm_manager").expect("manager vars");
        assert_eq!(vars.ansible_port, json!(2222));
    }

    #[test]
    fn test_build_relays_string_port_without_coercion() {
        let outputs = outputs(&[
            ("droplet_ip", json!("203.0.113.5")),
            ("ssh_port", json!("2222")),
        ]);
        let doc = build_inventory(&outputs).expect("build succeeds");
        let vars = doc.meta.hostvars.get("swarm_manager").expect("manager vars");
        assert_eq!(vars.ansible_port, json!("2222"));
    }

    #[test]
    fn test_build_fails_when_address_missing() {
        let err = build_inventory(&TerraformOutputs::default()).expect_err("must fail");
        assert!(
            matches!(err, InventoryError::MissingRequiredOutput { key: "droplet_ip" }),
            "got: {err:?}"
        );
        assert!(err.to_string().contains("droplet_ip"), "got: {err}");
    }

    #[test]
    fn test_build_fails_when_address_empty() {
        let outputs = outputs(&[("droplet_ip", json!(""))]);
        let err = build_inventory(&outputs).expect_err("must fail");
        assert!(matches!(err, InventoryError::MissingRequiredOutput { .. }), "got: {err:?}");
    }

    #[test]
    fn test_build_fails_when_address_is_not_a_string() {
        let outputs = outputs(&[("droplet_ip", json!(203_011_305))]);
        let err = build_inventory(&outputs).expect_err("must fail");
        assert!(matches!(err, InventoryError::MissingRequiredOutput { .. }), "got: {err:?}");
    }

    #[test]
    fn test_build_ignores_unrelated_outputs() {
        let outputs = outputs(&[
            ("droplet_ip", json!("203.0.113.5")),
            ("floating_ip", json!("198.51.100.7")),
            ("region", json!("fra1")),
        ]);
        let doc = build_inventory(&outputs).expect("build succeeds");
        assert_eq!(doc.meta.hostvars.len(), 1);
        assert!(doc.unresolved_aliases().is_empty());
    }

    // -----------------------------------------------------------------------
    // collect_inventory and host_vars
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_collect_runs_full_pipeline() {
        let terraform = FixedOutputs(
            r#"{"droplet_ip": {"value": "203.0.113.5"}, "ssh_port": {"value": 2222}}"#,
        );
        let doc = collect_inventory(&terraform).await.expect("pipeline succeeds");
        let vars = doc.meta.hostvars.get("swarm_manager").expect("manager vars");
        assert_eq!(vars.ansible_user, "deployer");
        assert_eq!(vars.ansible_port, json!(2222));
    }

    #[tokio::test]
    async fn test_collect_surfaces_missing_address_from_empty_state() {
        let terraform = FixedOutputs("{}");
        let err = collect_inventory(&terraform).await.expect_err("must fail");
        assert!(matches!(err, InventoryError::MissingRequiredOutput { .. }), "got: {err:?}");
    }

    #[test]
    fn test_host_vars_is_an_empty_object() {
        assert_eq!(host_vars(), "{}");
        let value: serde_json::Value =
            serde_json::from_str(host_vars()).expect("host vars parse as JSON");
        assert_eq!(value, json!({}));
    }

    // -----------------------------------------------------------------------
    // Property tests
    // -----------------------------------------------------------------------

    mod proptests {
        use proptest::prelude::*;
        use serde_json::json;

        use super::{build_inventory, outputs};

        fn arb_address() -> impl Strategy<Value = String> {
            "[0-9a-f.:]{1,39}"
        }

        fn arb_port() -> impl Strategy<Value = serde_json::Value> {
            prop_oneof![
                (1u16..=65535).prop_map(|port| json!(port)),
                (1u16..=65535).prop_map(|port| json!(port.to_string())),
            ]
        }

        proptest! {
            /// Any non-empty address string builds a resolvable document.
            #[test]
            fn prop_nonempty_address_builds_document(address in arb_address()) {
                let doc = build_inventory(&outputs(&[("droplet_ip", json!(address.clone()))]))
                    .expect("build succeeds");
                let vars = doc.meta.hostvars.get("swarm_manager").expect("manager vars");
                prop_assert_eq!(&vars.ansible_host, &address);
                prop_assert!(doc.unresolved_aliases().is_empty());
            }

            /// The port value is relayed with its JSON type intact.
            #[test]
            fn prop_port_value_relayed_verbatim(address in arb_address(), port in arb_port()) {
                let doc = build_inventory(&outputs(&[
                    ("droplet_ip", json!(address)),
                    ("ssh_port", port.clone()),
                ]))
                .expect("build succeeds");
                let vars = doc.meta.hostvars.get("swarm_manager").expect("manager vars");
                prop_assert_eq!(&vars.ansible_port, &port);
            }

            /// A non-string address never builds a document.
            #[test]
            fn prop_non_string_address_is_rejected(address in any::<u32>()) {
                let result = build_inventory(&outputs(&[("droplet_ip", json!(address))]));
                prop_assert!(result.is_err());
            }
        }
    }
}
