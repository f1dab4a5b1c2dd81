//! Correlator/copier: pairs structured nodes across two graphs via
//! translated composite keys, then copies scalar field values from
//! each source node onto its correlated target nodes.
//!
//! The correlator owns no state; both indices are built fresh per call
//! and dropped at the end. Nothing here is fatal: unresolvable keys
//! are skipped, type mismatches are left alone by design, and refused
//! field accesses are reported and skipped.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use graft_model::{
    key, CorrelationSpec, FieldType, FilterSpec, ObjectRef, OverrideSpec, Value,
};

use crate::access::AccessOp;
use crate::Engine;

/// Translates a value-qualified source key to the target side.
///
/// The first correlation entry whose source side is a textual prefix
/// of `qualified` wins — insertion order is the precedence rule — and
/// only the matched prefix is substituted; the literal value suffix is
/// preserved unparsed. `None` when no entry applies.
fn translate(correlation: &CorrelationSpec, qualified: &str) -> Option<String> {
    for (source, target) in correlation.entries() {
        if let Some(suffix) = qualified.strip_prefix(source.as_str()) {
            return Some(format!("{target}{suffix}"));
        }
    }
    None
}

impl Engine {
    /// Correlates `src` and `target` and copies matching scalar fields.
    pub fn copy_values(&self, src: &Value, target: &Value, correlation: &CorrelationSpec) {
        self.copy_values_with(src, target, correlation, None, None);
    }

    /// Full-control variant: optional per-field overrides, optional
    /// filter applied to the target graph first. When the filter
    /// disqualifies the top-level target node there is nothing left to
    /// correlate and the copy is skipped entirely.
    pub fn copy_values_with(
        &self,
        src: &Value,
        target: &Value,
        correlation: &CorrelationSpec,
        overrides: Option<&OverrideSpec>,
        filter: Option<&FilterSpec>,
    ) {
        if let Some(filter) = filter {
            if !filter.is_empty() && self.prune(target, filter).is_none() {
                return;
            }
        }
        if correlation.is_empty() {
            return;
        }

        let correlation = correlation.normalized();
        let source_keys: BTreeSet<String> = correlation
            .entries()
            .iter()
            .map(|(source, _)| source.clone())
            .collect();
        let target_keys: BTreeSet<String> = correlation
            .entries()
            .iter()
            .map(|(_, target)| target.clone())
            .collect();

        let src_index = self.build_index(src, &source_keys);
        let target_index = self.build_index(target, &target_keys);

        for qualified in src_index.keys() {
            let Some(target_key) = translate(&correlation, qualified) else {
                // no correlation target for this key
                continue;
            };
            // one representative source object per key
            let Some(source) = src_index.get(qualified).first() else {
                continue;
            };
            for target_object in target_index.get(&target_key) {
                self.copy_fields(source, target_object, overrides);
            }
        }
    }

    /// Restricted scalar copy between one correlated pair.
    ///
    /// Only the top-level scalar fields of the two runtime types take
    /// part; nested structured or list fields are never touched —
    /// deeper correlation is expressed as additional correlation
    /// entries.
    fn copy_fields(
        &self,
        source: &ObjectRef,
        target: &ObjectRef,
        overrides: Option<&OverrideSpec>,
    ) {
        let source_ty = source.ty();
        let mut source_fields: BTreeMap<String, (FieldType, Value)> = BTreeMap::new();
        for (slot, field) in source_ty.fields().iter().enumerate() {
            if !matches!(field.ty, FieldType::Scalar(_)) {
                continue;
            }
            if field.frozen {
                continue;
            }
            let value = match self.access().read(source, slot) {
                Ok(value) => value,
                Err(error) => {
                    self.report(source_ty.name(), &field.name, AccessOp::Read, error);
                    continue;
                }
            };
            if value.is_null() {
                continue;
            }
            source_fields.insert(key::compose(source_ty.name(), &field.name), (field.ty, value));
        }

        let target_ty = target.ty().clone();
        for (slot, field) in target_ty.fields().iter().enumerate() {
            let mut source_key = key::compose(source_ty.name(), &field.name);
            let target_key = key::compose(target_ty.name(), &field.name);

            if let Some(overrides) = overrides {
                if let Some(mapped) = overrides.get(&source_key) {
                    if !mapped.eq_ignore_ascii_case(&target_key) {
                        // this source field is redirected to some other
                        // target field; the same-name copy must not run
                        continue;
                    }
                }
                if let Some(redirected) = overrides.source_for_target(&target_key) {
                    source_key = redirected.to_string();
                }
            }

            let Some((source_field_ty, value)) = source_fields.get(&source_key) else {
                continue;
            };
            if *source_field_ty != field.ty {
                // declared types must match exactly; silent by design
                continue;
            }
            if let Err(error) = self.access().write(target, slot, value.clone()) {
                self.report(target_ty.name(), &field.name, AccessOp::Write, error);
            }
        }
    }
}
