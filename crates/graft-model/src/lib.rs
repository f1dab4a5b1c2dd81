//! Data model shared by the graft object-graph transformer.
//!
//! Everything here is plain data: scalar values and their closed kind
//! table, type descriptors with inheritance chains, shared graph node
//! handles, composite-key helpers, and the declarative specs consumed
//! by the engine. Traversal and mutation logic lives in the `graft`
//! crate.

pub mod descriptor;
pub mod key;
pub mod scalar;
pub mod spec;
pub mod value;

pub use descriptor::{
    ChainField, FieldDescriptor, FieldType, TypeDescriptor, TypeDescriptorBuilder, ValueKind,
    Visibility,
};
pub use scalar::{Scalar, ScalarKind};
pub use spec::{CorrelationSpec, FilterSpec, OverrideSpec};
pub use value::{ListRef, ObjectBuilder, ObjectRef, Value};
