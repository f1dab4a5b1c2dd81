//! Index builder: one read-only walk of a graph that maps
//! value-qualified composite keys to the structured objects observed
//! at them.
//!
//! The index is working state for a single correlation call — built,
//! consumed, discarded. Nothing is cached across calls.

use std::collections::{BTreeMap, BTreeSet};

use graft_model::{key, FieldType, ObjectRef, Scalar, Value};

use crate::access::{AccessError, AccessOp};
use crate::Engine;

/// Multi-valued mapping from value-qualified key (`Type_field_value`)
/// to the objects found at that key during one walk.
///
/// Backed by a `BTreeMap` so iteration order is deterministic.
#[derive(Debug, Default)]
pub struct Index {
    entries: BTreeMap<String, Vec<ObjectRef>>,
}

impl Index {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Objects recorded under `key`, in discovery order.
    pub fn get(&self, key: &str) -> &[ObjectRef] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn insert(&mut self, key: String, object: ObjectRef) {
        self.entries.entry(key).or_default().push(object);
    }
}

impl Engine {
    /// Builds the lookup index for one graph.
    ///
    /// `requested` holds unqualified keys (`Type_field`); entries are
    /// recorded under the value-qualified form (`Type_field_value`).
    /// Read-only: the graph is never mutated. Null field values are
    /// dropped, never indexed.
    pub fn build_index(&self, graph: &Value, requested: &BTreeSet<String>) -> Index {
        let mut index = Index::default();
        if requested.is_empty() {
            return index;
        }
        self.index_value(graph, requested, &mut index);
        index
    }

    fn index_value(&self, value: &Value, requested: &BTreeSet<String>, out: &mut Index) {
        match value {
            Value::Null | Value::Scalar(_) => {}
            Value::List(list) => {
                for item in list.items() {
                    self.index_value(&item, requested, out);
                }
            }
            Value::Object(object) => self.index_object(object, requested, out),
        }
    }

    fn index_object(&self, object: &ObjectRef, requested: &BTreeSet<String>, out: &mut Index) {
        for entry in object.ty().chain_fields() {
            let value = match self.access().read(object, entry.slot) {
                Ok(value) => value,
                Err(error) => {
                    self.report(entry.declared_in, &entry.field.name, AccessOp::Read, error);
                    continue;
                }
            };
            if value.is_null() {
                continue;
            }
            match entry.field.ty {
                FieldType::List | FieldType::Struct => self.index_value(&value, requested, out),
                FieldType::Scalar(_) => {
                    let field_key = key::compose(entry.declared_in, &entry.field.name);
                    if !requested.contains(&field_key) {
                        continue;
                    }
                    match value {
                        Value::Scalar(scalar) => {
                            out.insert(key::qualify(&field_key, &scalar), object.clone());
                        }
                        other => self.report(
                            entry.declared_in,
                            &entry.field.name,
                            AccessOp::Read,
                            AccessError::KindMismatch {
                                declared: entry.field.ty,
                                got: other.label(),
                            },
                        ),
                    }
                }
            }
        }
    }

    /// Flattened discovery of every scalar value found at one
    /// unqualified composite key, anywhere in the graph. Deduplicated,
    /// first-seen order.
    pub fn collect_values(&self, graph: &Value, field_key: &str) -> Vec<Scalar> {
        let mut values = Vec::new();
        if field_key.is_empty() {
            return values;
        }
        self.collect_value(graph, field_key, &mut values);
        values
    }

    fn collect_value(&self, value: &Value, field_key: &str, out: &mut Vec<Scalar>) {
        match value {
            Value::Null | Value::Scalar(_) => {}
            Value::List(list) => {
                for item in list.items() {
                    self.collect_value(&item, field_key, out);
                }
            }
            Value::Object(object) => {
                for entry in object.ty().chain_fields() {
                    let value = match self.access().read(object, entry.slot) {
                        Ok(value) => value,
                        Err(error) => {
                            self.report(entry.declared_in, &entry.field.name, AccessOp::Read, error);
                            continue;
                        }
                    };
                    if value.is_null() {
                        continue;
                    }
                    match entry.field.ty {
                        FieldType::List | FieldType::Struct => {
                            self.collect_value(&value, field_key, out)
                        }
                        FieldType::Scalar(_) => {
                            if key::compose(entry.declared_in, &entry.field.name) != field_key {
                                continue;
                            }
                            if let Value::Scalar(scalar) = value {
                                if !out.contains(&scalar) {
                                    out.push(scalar);
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_model::{ListRef, ScalarKind, TypeDescriptor};
    use std::sync::Arc;

    fn node_type() -> Arc<TypeDescriptor> {
        TypeDescriptor::builder("Node")
            .scalar("id", ScalarKind::I64)
            .nested("child")
            .list("children")
            .build()
    }

    fn node(ty: &Arc<TypeDescriptor>, id: i64) -> ObjectRef {
        ObjectRef::builder(ty.clone()).set("id", id).build()
    }

    fn keys(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn empty_request_returns_an_empty_index() {
        let ty = node_type();
        let graph = Value::Object(node(&ty, 1));
        let index = Engine::new().build_index(&graph, &BTreeSet::new());
        assert!(index.is_empty());
    }

    #[test]
    fn entries_are_value_qualified() {
        let ty = node_type();
        let graph = Value::Object(node(&ty, 42));
        let index = Engine::new().build_index(&graph, &keys(&["Node_id"]));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("Node_id_42").len(), 1);
        assert!(index.get("Node_id").is_empty());
    }

    #[test]
    fn nesting_depth_does_not_matter() {
        let ty = node_type();
        let leaf = node(&ty, 3);
        let middle = ObjectRef::builder(ty.clone())
            .set("id", 2i64)
            .set("children", ListRef::new(vec![Value::Object(leaf.clone())]))
            .build();
        let root = ObjectRef::builder(ty.clone())
            .set("id", 1i64)
            .set("child", middle.clone())
            .build();

        let graph = Value::Object(root.clone());
        let index = Engine::new().build_index(&graph, &keys(&["Node_id"]));
        assert_eq!(index.len(), 3);
        assert!(index.get("Node_id_1")[0].ptr_eq(&root));
        assert!(index.get("Node_id_2")[0].ptr_eq(&middle));
        assert!(index.get("Node_id_3")[0].ptr_eq(&leaf));
    }

    #[test]
    fn null_values_are_never_indexed() {
        let ty = node_type();
        let object = ObjectRef::builder(ty).build();
        let index = Engine::new().build_index(&Value::Object(object), &keys(&["Node_id"]));
        assert!(index.is_empty());
    }

    #[test]
    fn inherited_fields_are_keyed_by_the_declaring_type() {
        let base = TypeDescriptor::builder("Base")
            .scalar("code", ScalarKind::Str)
            .build();
        let derived = TypeDescriptor::builder("Derived")
            .scalar("id", ScalarKind::I64)
            .parent(base)
            .build();
        let object = ObjectRef::builder(derived)
            .set("id", 1i64)
            .set("code", "x")
            .build();

        let index = Engine::new().build_index(
            &Value::Object(object),
            &keys(&["Base_code", "Derived_id"]),
        );
        assert_eq!(index.get("Base_code_x").len(), 1);
        assert_eq!(index.get("Derived_id_1").len(), 1);
        // the inherited field is not visible under the runtime type's name
        assert!(index.get("Derived_code_x").is_empty());
    }

    #[test]
    fn collect_values_flattens_across_nesting() {
        let ty = node_type();
        let leaf = node(&ty, 3);
        let middle = ObjectRef::builder(ty.clone())
            .set("id", 2i64)
            .set("children", ListRef::new(vec![Value::Object(leaf)]))
            .build();
        let root = ObjectRef::builder(ty.clone())
            .set("id", 1i64)
            .set("child", middle)
            .build();

        let values = Engine::new().collect_values(&Value::Object(root), "Node_id");
        assert_eq!(
            values,
            vec![Scalar::I64(1), Scalar::I64(2), Scalar::I64(3)]
        );
    }

    #[test]
    fn collect_values_deduplicates() {
        let ty = node_type();
        let twins = ListRef::new(vec![
            Value::Object(node(&ty, 5)),
            Value::Object(node(&ty, 5)),
            Value::Object(node(&ty, 6)),
        ]);
        let values = Engine::new().collect_values(&Value::List(twins), "Node_id");
        assert_eq!(values, vec![Scalar::I64(5), Scalar::I64(6)]);
    }

    #[test]
    fn short_slot_vectors_are_reported_and_skipped() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let ty = node_type();
        // descriptor claims three slots, object carries none
        let broken = ObjectRef::new(ty, vec![]);
        let failures = Rc::new(RefCell::new(Vec::new()));
        let seen = failures.clone();
        let engine = Engine::new().with_reporter(move |failure| {
            seen.borrow_mut().push(failure.clone());
        });

        let index = engine.build_index(&Value::Object(broken), &keys(&["Node_id"]));
        assert!(index.is_empty());
        assert_eq!(failures.borrow().len(), 3);
        assert!(matches!(
            failures.borrow()[0].error,
            AccessError::SlotOutOfRange { .. }
        ));
    }
}
