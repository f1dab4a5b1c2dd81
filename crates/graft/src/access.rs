//! The field access capability.
//!
//! Every field read and write the engine performs goes through
//! [`FieldAccess`], so the core algorithms stay independent of how
//! field access is obtained. The default [`SlotAccess`] reads and
//! writes the slot-backed model directly; alternative implementations
//! (code generation, stricter visibility policies) only need to supply
//! these two operations.

use graft_model::{FieldType, ObjectRef, Value};
use std::error::Error;
use std::fmt;

/// Why a field read or write was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The object's slot vector is shorter than its descriptor claims.
    SlotOutOfRange { slot: usize, len: usize },
    /// Writes to frozen fields are refused.
    FrozenField,
    /// The accessor declined based on field visibility.
    AccessDenied,
    /// A value incompatible with the field's declared type.
    KindMismatch {
        declared: FieldType,
        got: &'static str,
    },
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlotOutOfRange { slot, len } => {
                write!(f, "slot {slot} out of range for object with {len} slots")
            }
            Self::FrozenField => write!(f, "field is frozen"),
            Self::AccessDenied => write!(f, "access denied by field visibility"),
            Self::KindMismatch { declared, got } => {
                write!(f, "field declares {declared:?} but the value is {got}")
            }
        }
    }
}

impl Error for AccessError {}

/// Whether the failure happened reading or writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOp {
    Read,
    Write,
}

/// A suppressed introspection failure, handed to the failure reporter.
///
/// `type_name` is the level that declares the field, which for
/// inherited fields is an ancestor type, not the runtime type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub type_name: String,
    pub field: String,
    pub op: AccessOp,
    pub error: AccessError,
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            AccessOp::Read => "read",
            AccessOp::Write => "write",
        };
        write!(
            f,
            "{op} of {}.{} failed: {}",
            self.type_name, self.field, self.error
        )
    }
}

/// Field read/write capability the engine depends on.
pub trait FieldAccess {
    /// Reads the value at `slot`. The returned value is a handle clone,
    /// so structured and list values stay aliased with the graph.
    fn read(&self, object: &ObjectRef, slot: usize) -> Result<Value, AccessError>;

    /// Writes `value` into `slot`.
    fn write(&self, object: &ObjectRef, slot: usize, value: Value) -> Result<(), AccessError>;
}

/// Default accessor over the slot-backed object model.
///
/// Visibility is forced open, the way host reflection unlocks private
/// members for the duration of a call. Writes enforce the declared
/// field type and the frozen flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotAccess;

impl FieldAccess for SlotAccess {
    fn read(&self, object: &ObjectRef, slot: usize) -> Result<Value, AccessError> {
        object.slot(slot).ok_or(AccessError::SlotOutOfRange {
            slot,
            len: object.slot_count(),
        })
    }

    fn write(&self, object: &ObjectRef, slot: usize, value: Value) -> Result<(), AccessError> {
        let ty = object.ty();
        let entry = ty.field_at(slot).ok_or(AccessError::SlotOutOfRange {
            slot,
            len: ty.slot_count(),
        })?;
        if entry.field.frozen {
            return Err(AccessError::FrozenField);
        }
        let declared = entry.field.ty;
        let compatible = match (&declared, &value) {
            (_, Value::Null) => true,
            (FieldType::Scalar(kind), Value::Scalar(scalar)) => scalar.kind() == *kind,
            (FieldType::List, Value::List(_)) => true,
            (FieldType::Struct, Value::Object(_)) => true,
            _ => false,
        };
        if !compatible {
            return Err(AccessError::KindMismatch {
                declared,
                got: value.label(),
            });
        }
        if object.set_slot(slot, value) {
            Ok(())
        } else {
            Err(AccessError::SlotOutOfRange {
                slot,
                len: object.slot_count(),
            })
        }
    }
}
