//! Declarative specs consumed by the engine.
//!
//! All three are plain configuration values. They serialize to/from
//! JSON transparently (the wrapper struct does not appear in the
//! encoded form), so callers can keep rule sets in config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scalar::Scalar;

/// Filter rules: type short-name → field name → allowed values.
///
/// A structured node is disqualified when any constrained field of its
/// type is null or holds a value outside the allowed set. Membership
/// is exact scalar equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec {
    rules: BTreeMap<String, BTreeMap<String, Vec<Scalar>>>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an allowed-value constraint for `type_name.field`.
    pub fn allow(
        mut self,
        type_name: impl Into<String>,
        field: impl Into<String>,
        values: impl IntoIterator<Item = Scalar>,
    ) -> Self {
        self.rules
            .entry(type_name.into())
            .or_default()
            .entry(field.into())
            .or_default()
            .extend(values);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Allowed values for `type_name.field`, or `None` when the field
    /// is unconstrained.
    pub fn allowed(&self, type_name: &str, field: &str) -> Option<&[Scalar]> {
        self.rules
            .get(type_name)?
            .get(field)
            .map(|values| values.as_slice())
    }
}

/// Ordered source-key → target-key prefix mapping.
///
/// Order matters: key translation applies the first entry whose source
/// side is a textual prefix of the key being translated, so insertion
/// order is the precedence rule for overlapping prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationSpec {
    entries: Vec<(String, String)>,
}

impl CorrelationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.entries.push((source.into(), target.into()));
        self
    }

    /// Maps a source key to itself on the target side. Equivalent to
    /// `map(key, "")` followed by normalization.
    pub fn map_identity(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.map(key.clone(), key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Copy with every empty target mapping defaulted to its source
    /// key, so unmapped keys round-trip as themselves. The caller's
    /// spec is never mutated.
    pub fn normalized(&self) -> CorrelationSpec {
        CorrelationSpec {
            entries: self
                .entries
                .iter()
                .map(|(source, target)| {
                    let target = if target.is_empty() {
                        source.clone()
                    } else {
                        target.clone()
                    };
                    (source.clone(), target)
                })
                .collect(),
        }
    }
}

/// Per-field copy overrides: source composite key → target composite
/// key. Consulted only by the scalar copy step, to suppress a
/// same-name copy whose source was redirected elsewhere and to pull a
/// target field from a differently-named source field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideSpec {
    entries: BTreeMap<String, String>,
}

impl OverrideSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirect(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.entries.insert(source.into(), target.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Target key mapped from this source key, if any.
    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    /// Inverse lookup: the source key whose mapped target equals
    /// `target`, if any.
    pub fn source_for_target(&self, target: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, mapped)| mapped.as_str() == target)
            .map(|(source, _)| source.as_str())
    }
}
