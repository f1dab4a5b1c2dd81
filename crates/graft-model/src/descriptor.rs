//! Type descriptors: the declared-schema side of introspection.
//!
//! A descriptor is built once by the caller and shared via `Arc`; the
//! engine re-reads it on every traversal instead of materializing any
//! per-graph metadata. Inheritance is a parent chain; chain iteration
//! covers every ancestor level and ends when the chain does (there is
//! no universal root type to stop short of).

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::scalar::ScalarKind;

/// How a traversal treats a type: leaf, ordered sequence, or record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Scalar,
    Collection,
    Structured,
}

/// Declared type of a field.
///
/// List element types and struct identities are not declared; they are
/// discovered from runtime values, the way erased generics behave in
/// the host environments this engine mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Scalar(ScalarKind),
    List,
    Struct,
}

impl FieldType {
    /// Exact classification from the closed type table.
    pub fn kind(self) -> ValueKind {
        match self {
            FieldType::Scalar(_) => ValueKind::Scalar,
            FieldType::List => ValueKind::Collection,
            FieldType::Struct => ValueKind::Structured,
        }
    }
}

/// Declared accessibility of a field.
///
/// The default slot accessor forces fields open (the analogue of
/// host reflection unlocking private members); a stricter `FieldAccess`
/// implementation may refuse `Restricted` fields instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Restricted,
}

/// One declared field: name, declared type, and access metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: FieldType,
    /// Frozen fields never act as copy sources and reject writes.
    pub frozen: bool,
    pub visibility: Visibility,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            frozen: false,
            visibility: Visibility::Public,
        }
    }

    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    pub fn restricted(mut self) -> Self {
        self.visibility = Visibility::Restricted;
        self
    }
}

/// A structured type: short name, own fields, optional parent.
#[derive(Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
    parent: Option<Arc<TypeDescriptor>>,
}

/// One entry of a flattened inheritance chain.
///
/// `declared_in` is the short name of the level that declares the
/// field; composite keys for inherited fields are built from it, not
/// from the runtime type's own name.
#[derive(Debug, Clone, Copy)]
pub struct ChainField<'a> {
    pub declared_in: &'a str,
    pub slot: usize,
    pub field: &'a FieldDescriptor,
}

impl TypeDescriptor {
    pub fn builder(name: impl Into<String>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            name: name.into(),
            fields: Vec::new(),
            parent: None,
        }
    }

    /// Short name of this type. Callers keep the key delimiter `_` out
    /// of type names so that distinct (type, field) pairs never collapse
    /// into the same composite key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields declared on this level only.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn parent(&self) -> Option<&Arc<TypeDescriptor>> {
        self.parent.as_ref()
    }

    /// Every field across the chain, own level first, then each
    /// ancestor in order. Duplicate names across levels are all
    /// yielded; nothing shadows anything. Slots number the chain
    /// contiguously, so an object's slot vector aligns with this.
    pub fn chain_fields(&self) -> Vec<ChainField<'_>> {
        let mut out = Vec::new();
        let mut slot = 0;
        let mut level = Some(self);
        while let Some(ty) = level {
            for field in &ty.fields {
                out.push(ChainField {
                    declared_in: ty.name.as_str(),
                    slot,
                    field,
                });
                slot += 1;
            }
            level = ty.parent.as_deref();
        }
        out
    }

    /// Total number of slots across the chain.
    pub fn slot_count(&self) -> usize {
        let mut count = 0;
        let mut level = Some(self);
        while let Some(ty) = level {
            count += ty.fields.len();
            level = ty.parent.as_deref();
        }
        count
    }

    /// Chain field occupying `slot`, if any.
    pub fn field_at(&self, slot: usize) -> Option<ChainField<'_>> {
        self.chain_fields().into_iter().find(|f| f.slot == slot)
    }

    /// Slot of the first chain field with this name.
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.chain_fields()
            .into_iter()
            .find(|f| f.field.name == name)
            .map(|f| f.slot)
    }
}

/// Builder for `TypeDescriptor` with shorthands for the common field
/// shapes.
pub struct TypeDescriptorBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    parent: Option<Arc<TypeDescriptor>>,
}

impl TypeDescriptorBuilder {
    pub fn scalar(self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.field(FieldDescriptor::new(name, FieldType::Scalar(kind)))
    }

    pub fn list(self, name: impl Into<String>) -> Self {
        self.field(FieldDescriptor::new(name, FieldType::List))
    }

    pub fn nested(self, name: impl Into<String>) -> Self {
        self.field(FieldDescriptor::new(name, FieldType::Struct))
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn parent(mut self, parent: Arc<TypeDescriptor>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn build(self) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor {
            name: self.name,
            fields: self.fields,
            parent: self.parent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_exact() {
        assert_eq!(FieldType::Scalar(ScalarKind::I64).kind(), ValueKind::Scalar);
        assert_eq!(FieldType::List.kind(), ValueKind::Collection);
        assert_eq!(FieldType::Struct.kind(), ValueKind::Structured);
    }

    #[test]
    fn chain_walks_own_fields_before_ancestors() {
        let base = TypeDescriptor::builder("Base")
            .scalar("id", ScalarKind::I64)
            .build();
        let derived = TypeDescriptor::builder("Derived")
            .scalar("name", ScalarKind::Str)
            .parent(base)
            .build();

        let chain = derived.chain_fields();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].declared_in, "Derived");
        assert_eq!(chain[0].field.name, "name");
        assert_eq!(chain[0].slot, 0);
        assert_eq!(chain[1].declared_in, "Base");
        assert_eq!(chain[1].field.name, "id");
        assert_eq!(chain[1].slot, 1);
    }

    #[test]
    fn duplicate_names_across_levels_are_kept() {
        let base = TypeDescriptor::builder("Base")
            .scalar("id", ScalarKind::I64)
            .build();
        let derived = TypeDescriptor::builder("Derived")
            .scalar("id", ScalarKind::I32)
            .parent(base)
            .build();

        let chain = derived.chain_fields();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].field.name, "id");
        assert_eq!(chain[1].field.name, "id");
        // slot_of resolves to the own-level declaration
        assert_eq!(derived.slot_of("id"), Some(0));
        assert_eq!(derived.slot_count(), 2);
    }

    #[test]
    fn field_at_resolves_inherited_slots() {
        let base = TypeDescriptor::builder("Base")
            .scalar("id", ScalarKind::I64)
            .build();
        let derived = TypeDescriptor::builder("Derived")
            .scalar("name", ScalarKind::Str)
            .parent(base)
            .build();

        let entry = derived.field_at(1).expect("slot 1 must exist");
        assert_eq!(entry.declared_in, "Base");
        assert_eq!(entry.field.name, "id");
        assert!(derived.field_at(2).is_none());
    }
}
