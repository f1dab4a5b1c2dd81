//! Graph node model.
//!
//! Values are handles: cloning a `Value` clones an `Rc`, so two clones
//! alias the same list or object and in-place mutation through one
//! handle is visible through the other — the reference semantics the
//! caller-owned graphs rely on. The model is single-threaded by
//! design, hence `Rc`/`RefCell` rather than their atomic counterparts.
//!
//! Cyclic graphs are out of scope. The walkers do not carry a visited
//! set; a cycle recurses without bound (or trips a `RefCell` borrow
//! panic when a node aliases itself through a mutating walk).

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::scalar::Scalar;

/// One graph node: absent, leaf, ordered sequence, or structured.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Scalar(Scalar),
    List(ListRef),
    Object(ObjectRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Short label for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Scalar(_) => "scalar",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }
}

/// Scalars compare by value, lists and objects by handle identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Scalar(a), Value::Scalar(b)) => a == b,
            (Value::List(a), Value::List(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<ListRef> for Value {
    fn from(l: ListRef) -> Self {
        Value::List(l)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Scalar(Scalar::Bool(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Scalar(Scalar::I32(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Scalar(Scalar::I64(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(Scalar::F64(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Scalar(Scalar::Str(v.to_string()))
    }
}

/// Shared ordered sequence of values.
#[derive(Debug, Clone, Default)]
pub struct ListRef(Rc<RefCell<Vec<Value>>>);

impl ListRef {
    pub fn new(items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(items)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Snapshot of the element handles. Walkers iterate the snapshot so
    /// no borrow is held across recursion.
    pub fn items(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.0.borrow_mut().push(value.into());
    }

    /// In-place element removal. The borrow is held for the whole pass.
    pub fn retain(&self, mut keep: impl FnMut(&Value) -> bool) {
        self.0.borrow_mut().retain(|v| keep(v));
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl FromIterator<Value> for ListRef {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug)]
struct ObjectInner {
    ty: Arc<TypeDescriptor>,
    slots: RefCell<Vec<Value>>,
}

/// Shared structured node: a descriptor plus one slot per chain field.
///
/// Construction does not validate slot arity against the descriptor;
/// a mismatch surfaces later as an access failure, which is the
/// engine's introspection-failure path.
#[derive(Debug, Clone)]
pub struct ObjectRef(Rc<ObjectInner>);

impl ObjectRef {
    pub fn new(ty: Arc<TypeDescriptor>, slots: Vec<Value>) -> Self {
        Self(Rc::new(ObjectInner {
            ty,
            slots: RefCell::new(slots),
        }))
    }

    /// Builder that pre-sizes the slot vector and sets fields by name.
    pub fn builder(ty: Arc<TypeDescriptor>) -> ObjectBuilder {
        let slots = vec![Value::Null; ty.slot_count()];
        ObjectBuilder { ty, slots }
    }

    pub fn ty(&self) -> &Arc<TypeDescriptor> {
        &self.0.ty
    }

    pub fn type_name(&self) -> &str {
        self.0.ty.name()
    }

    pub fn slot_count(&self) -> usize {
        self.0.slots.borrow().len()
    }

    /// Raw slot read; `None` when the slot does not exist.
    pub fn slot(&self, index: usize) -> Option<Value> {
        self.0.slots.borrow().get(index).cloned()
    }

    /// Raw slot write; `false` when the slot does not exist.
    pub fn set_slot(&self, index: usize, value: Value) -> bool {
        let mut slots = self.0.slots.borrow_mut();
        match slots.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Slot-by-name construction for `ObjectRef`.
pub struct ObjectBuilder {
    ty: Arc<TypeDescriptor>,
    slots: Vec<Value>,
}

impl ObjectBuilder {
    /// Sets the first chain field with this name. Panics on an unknown
    /// field name; builders are construction-time APIs and a typo here
    /// is a caller bug, not a recoverable condition.
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        let slot = self
            .ty
            .slot_of(field)
            .unwrap_or_else(|| panic!("no field named `{field}` on type `{}`", self.ty.name()));
        self.slots[slot] = value.into();
        self
    }

    pub fn build(self) -> ObjectRef {
        ObjectRef::new(self.ty, self.slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;
    use crate::scalar::ScalarKind;

    fn point_type() -> Arc<TypeDescriptor> {
        TypeDescriptor::builder("Point")
            .scalar("x", ScalarKind::I64)
            .scalar("y", ScalarKind::I64)
            .build()
    }

    #[test]
    fn builder_fills_named_slots() {
        let point = ObjectRef::builder(point_type()).set("y", 2i64).build();
        assert_eq!(point.slot(0), Some(Value::Null));
        assert_eq!(point.slot(1), Some(Value::from(2i64)));
        assert!(point.slot(2).is_none());
    }

    #[test]
    fn clones_alias_the_same_object() {
        let point = ObjectRef::builder(point_type()).set("x", 1i64).build();
        let alias = point.clone();
        assert!(alias.set_slot(0, Value::from(9i64)));
        assert_eq!(point.slot(0), Some(Value::from(9i64)));
        assert!(point.ptr_eq(&alias));
    }

    #[test]
    fn list_retain_mutates_in_place_through_aliases() {
        let list = ListRef::new(vec![Value::from(1i64), Value::from(2i64), Value::from(3i64)]);
        let alias = Value::List(list.clone());
        list.retain(|v| *v != Value::from(2i64));
        let alias = alias.as_list().expect("alias stays a list");
        assert_eq!(alias.len(), 2);
        assert_eq!(alias.items(), vec![Value::from(1i64), Value::from(3i64)]);
    }

    #[test]
    fn set_slot_rejects_missing_slots() {
        let point = ObjectRef::new(point_type(), vec![Value::Null]);
        assert!(!point.set_slot(1, Value::from(5i64)));
    }
}
