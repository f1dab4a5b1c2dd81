//! graft prunes and correlates independently-typed object graphs.
//!
//! Two caller-owned graphs come in: a *source* and a *target*. The
//! engine can prune a graph in place, dropping structured nodes whose
//! scalar fields fail a declarative [`FilterSpec`]; and it can
//! correlate nodes across the two graphs by composite key (type name +
//! field name + value), copying matching scalar field values from each
//! correlated source node onto its target nodes, honoring the renaming
//! rules of a [`CorrelationSpec`] and the per-field redirections of an
//! [`OverrideSpec`].
//!
//! Everything is synchronous and single-threaded: recursive walks over
//! `Rc`-shared nodes, in-place mutation through the caller's handles,
//! no state kept between calls. No operation is fatal — a field the
//! accessor refuses is reported to the failure reporter and skipped, a
//! source key without a correlation entry is ignored, and a type
//! mismatch between copy endpoints is silently left alone.
//!
//! Cyclic graphs are out of scope; a cycle recurses without bound.

pub mod access;
pub mod correlate;
pub mod filter;
pub mod index;

pub use access::{AccessError, AccessOp, FieldAccess, FieldFailure, SlotAccess};
pub use index::Index;

pub use graft_model as model;
pub use graft_model::{
    CorrelationSpec, FilterSpec, ListRef, ObjectRef, OverrideSpec, Scalar, ScalarKind,
    TypeDescriptor, Value,
};

/// The transformer facade.
///
/// Owns the [`FieldAccess`] capability and the failure reporter; holds
/// no other state. Construct once, call any number of times.
pub struct Engine {
    access: Box<dyn FieldAccess>,
    reporter: Box<dyn Fn(&FieldFailure)>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine with the default slot accessor; suppressed failures are
    /// logged at `warn` level.
    pub fn new() -> Self {
        Self {
            access: Box::new(SlotAccess),
            reporter: Box::new(|failure| {
                tracing::warn!(failure = %failure, "suppressed introspection failure");
            }),
        }
    }

    /// Replaces the field accessor.
    pub fn with_access(mut self, access: impl FieldAccess + 'static) -> Self {
        self.access = Box::new(access);
        self
    }

    /// Replaces the failure reporter, so callers (and tests) can
    /// observe every suppressed access failure.
    pub fn with_reporter(mut self, reporter: impl Fn(&FieldFailure) + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub(crate) fn access(&self) -> &dyn FieldAccess {
        self.access.as_ref()
    }

    pub(crate) fn report(&self, type_name: &str, field: &str, op: AccessOp, error: AccessError) {
        (self.reporter)(&FieldFailure {
            type_name: type_name.to_string(),
            field: field.to_string(),
            op,
            error,
        });
    }
}
