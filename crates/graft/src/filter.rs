//! Filter engine: in-place pruning of a single graph against a
//! [`FilterSpec`](graft_model::FilterSpec).
//!
//! Disqualified collection elements are removed from their list,
//! disqualified nodes held through a struct field are nulled out on
//! the owner, and a disqualified top-level node is reported back to
//! the caller as an absent result. Scalars and collections themselves
//! never disqualify — only structured nodes do.

use graft_model::{FieldType, FilterSpec, ListRef, ObjectRef, Value};

use crate::access::AccessOp;
use crate::Engine;

impl Engine {
    /// Prunes `graph` in place.
    ///
    /// Returns the same handle (unchanged identity) when the top-level
    /// node survives, or `None` when the filter disqualifies the
    /// top-level node itself — the one removal the engine cannot
    /// perform in place.
    pub fn prune(&self, graph: &Value, filter: &FilterSpec) -> Option<Value> {
        if self.disqualified(graph, filter) {
            None
        } else {
            Some(graph.clone())
        }
    }

    /// Whether this node should be removed by whatever holds it.
    /// Walks and prunes the node's substructure as a side effect.
    fn disqualified(&self, value: &Value, filter: &FilterSpec) -> bool {
        match value {
            // only non-null objects are evaluated; null survives vacuously
            Value::Null => false,
            Value::Scalar(_) => false,
            Value::List(list) => {
                self.prune_list(list, filter);
                false
            }
            Value::Object(object) => self.disqualified_object(object, filter),
        }
    }

    /// Removes disqualified elements; the list node itself survives.
    fn prune_list(&self, list: &ListRef, filter: &FilterSpec) {
        list.retain(|item| !self.disqualified(item, filter));
    }

    fn disqualified_object(&self, object: &ObjectRef, filter: &FilterSpec) -> bool {
        for entry in object.ty().chain_fields() {
            match entry.field.ty {
                FieldType::List => {
                    let value = match self.access().read(object, entry.slot) {
                        Ok(value) => value,
                        Err(error) => {
                            self.report(entry.declared_in, &entry.field.name, AccessOp::Read, error);
                            continue;
                        }
                    };
                    if let Value::List(list) = value {
                        self.prune_list(&list, filter);
                    }
                }
                FieldType::Struct => {
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
                    if self.disqualified(&value, filter) {
                        if let Err(error) =
                            self.access().write(object, entry.slot, Value::Null)
                        {
                            self.report(
                                entry.declared_in,
                                &entry.field.name,
                                AccessOp::Write,
                                error,
                            );
                        }
                    }
                }
                FieldType::Scalar(_) => {
                    let Some(allowed) = filter.allowed(entry.declared_in, &entry.field.name)
                    else {
                        continue;
                    };
                    let value = match self.access().read(object, entry.slot) {
                        Ok(value) => value,
                        Err(error) => {
                            self.report(entry.declared_in, &entry.field.name, AccessOp::Read, error);
                            continue;
                        }
                    };
                    // a constrained field that is null, or holds
                    // anything outside the allowed set, disqualifies
                    // the whole node; remaining fields are not examined
                    match value {
                        Value::Scalar(scalar) if allowed.contains(&scalar) => {}
                        _ => return true,
                    }
                }
            }
        }
        false
    }
}
