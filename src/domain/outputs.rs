//! Parsed form of `terraform output -json`.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// One named root-module output.
///
/// Terraform emits `sensitive` and `type` next to `value`; neither matters
/// for inventory purposes, so deserialization drops them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputEntry {
    pub value: Value,
}

/// The full output map, keyed by output name.
///
/// An empty map is what Terraform prints before `apply` has run; callers
/// decide which outputs are required.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TerraformOutputs(BTreeMap<String, OutputEntry>);

impl TerraformOutputs {
    /// Raw JSON value of the named output.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.0.get(name).map(|entry| &entry.value)
    }

    /// String value of the named output; `None` when absent or another type.
    #[must_use]
    pub fn string(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(Value::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for TerraformOutputs {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), OutputEntry { value }))
                .collect(),
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
