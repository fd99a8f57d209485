//! The query surface of the host type system.
//!
//! Everything the classifier, the detector and the formatter know about
//! types comes through [`TypeDatabase`]. The analyzer never builds types on
//! its own; [`TypeInterner`] is the in-tree implementation used by the
//! snapshot loader and by tests, and any other host can implement the trait
//! over its own type graph.

use crate::TypeInterner;
use crate::types::*;
use anyflow_common::interner::Atom;
use anyflow_common::limits::MAX_ALIAS_RESOLUTION_DEPTH;
use std::sync::Arc;

/// Read-only access to a type graph.
///
/// Lookups return `None` for handles the host cannot resolve; callers treat
/// such descriptors as opaque.
pub trait TypeDatabase {
    fn lookup(&self, id: TypeId) -> Option<TypeData>;

    fn type_list(&self, id: TypeListId) -> Option<Arc<[TypeId]>>;

    fn type_application(&self, id: TypeApplicationId) -> Option<Arc<TypeApplication>>;

    fn function_shape(&self, id: FunctionShapeId) -> Option<Arc<FunctionShape>>;

    fn callable_shape(&self, id: CallableShapeId) -> Option<Arc<CallableShape>>;

    fn definition(&self, def: DefId) -> Option<DefinitionInfo>;

    fn resolve_atom(&self, atom: Atom) -> Arc<str>;

    /// Whether two descriptors denote the same type entity.
    fn is_identical(&self, a: TypeId, b: TypeId) -> bool {
        a == b
    }

    /// Call signatures of a type, in declaration order.
    ///
    /// Functions expose one signature, callables expose their overloads,
    /// deferred definitions are followed. Everything else has none.
    fn call_signatures(&self, id: TypeId) -> Vec<CallSignature> {
        let Some(resolved) = resolve_alias(self, id) else {
            return Vec::new();
        };
        match self.lookup(resolved) {
            Some(TypeData::Function(shape_id)) => self
                .function_shape(shape_id)
                .map(|shape| vec![shape.signature()])
                .unwrap_or_default(),
            Some(TypeData::Callable(shape_id)) => self
                .callable_shape(shape_id)
                .map(|shape| shape.call_signatures.clone())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

impl TypeDatabase for TypeInterner {
    fn lookup(&self, id: TypeId) -> Option<TypeData> {
        TypeInterner::lookup(self, id)
    }

    fn type_list(&self, id: TypeListId) -> Option<Arc<[TypeId]>> {
        TypeInterner::type_list(self, id)
    }

    fn type_application(&self, id: TypeApplicationId) -> Option<Arc<TypeApplication>> {
        TypeInterner::type_application(self, id)
    }

    fn function_shape(&self, id: FunctionShapeId) -> Option<Arc<FunctionShape>> {
        TypeInterner::function_shape(self, id)
    }

    fn callable_shape(&self, id: CallableShapeId) -> Option<Arc<CallableShape>> {
        TypeInterner::callable_shape(self, id)
    }

    fn definition(&self, def: DefId) -> Option<DefinitionInfo> {
        TypeInterner::definition(self, def)
    }

    fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        TypeInterner::resolve_atom(self, atom)
    }
}

/// Follow deferred definitions until a non-lazy type is reached.
///
/// Returns `None` when the handle cannot be resolved: the absent
/// descriptor, an unknown handle, a definition without a body, or an alias
/// chain longer than [`MAX_ALIAS_RESOLUTION_DEPTH`] (which is how
/// `type A = B; type B = A;` ends).
pub fn resolve_alias<D: TypeDatabase + ?Sized>(db: &D, id: TypeId) -> Option<TypeId> {
    let mut current = id;
    for _ in 0..MAX_ALIAS_RESOLUTION_DEPTH {
        match db.lookup(current)? {
            TypeData::Lazy(def) => current = db.definition(def)?.body?,
            _ => return Some(current),
        }
    }
    None
}
