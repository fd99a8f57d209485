//! Classification of types as dynamic (`any`), dynamic arrays, or safe.
//!
//! This is the base case of every unsafe-return check: a returned value is
//! reported outright when its own type is `any` or an array of `any`.
//!
//! Only one structural shape is looked through: "array of". Unions and
//! intersections are never classified as dynamic here, even when a member
//! is `any`. Leaks hidden inside other composite types are the job of the
//! structural comparison in [`crate::unsafe_assignment`].

use crate::db::{TypeDatabase, resolve_alias};
use crate::types::{IntrinsicKind, TypeData, TypeId};
use anyflow_common::limits::MAX_ARRAY_NESTING_DEPTH;

/// Three-valued answer of [`classify_any`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnyClassification {
    Safe,
    /// Exactly the `any` type.
    Dynamic,
    /// An array (at any nesting) whose innermost element is `any`.
    DynamicArray,
}

impl AnyClassification {
    #[inline]
    pub fn is_safe(self) -> bool {
        matches!(self, Self::Safe)
    }

    /// `true` for both `Dynamic` and `DynamicArray`.
    #[inline]
    pub fn is_dynamic(self) -> bool {
        !self.is_safe()
    }

    /// The display form used in diagnostics (`any` / `any[]`).
    pub fn type_name(self) -> Option<&'static str> {
        match self {
            Self::Safe => None,
            Self::Dynamic => Some("any"),
            Self::DynamicArray => Some("any[]"),
        }
    }
}

/// Classify `ty` as `Dynamic`, `DynamicArray`, or `Safe`.
///
/// Deferred aliases are resolved first; anything that cannot be resolved is
/// `Safe`.
///
/// # Panics
///
/// Panics if `ty` is [`TypeId::NONE`]. An absent descriptor means the caller
/// failed to resolve a type, and answering `Safe` would hide that.
pub fn classify_any<D: TypeDatabase + ?Sized>(db: &D, ty: TypeId) -> AnyClassification {
    assert!(!ty.is_none(), "classify_any called with an absent type descriptor");

    let mut current = ty;
    let mut in_array = false;
    for _ in 0..MAX_ARRAY_NESTING_DEPTH {
        let Some(resolved) = resolve_alias(db, current) else {
            return AnyClassification::Safe;
        };
        if is_any(db, resolved) {
            return if in_array {
                AnyClassification::DynamicArray
            } else {
                AnyClassification::Dynamic
            };
        }
        match array_element_type(db, resolved) {
            Some(element) => {
                in_array = true;
                current = element;
            }
            None => return AnyClassification::Safe,
        }
    }
    AnyClassification::Safe
}

/// Whether a receiver accepts dynamic content without narrowing it: `any`,
/// arrays of `any`, `unknown`, and the host's error type (nothing is known
/// about it, so nothing is reported against it).
pub fn tolerates_dynamic<D: TypeDatabase + ?Sized>(db: &D, receiver: TypeId) -> bool {
    if receiver.is_none() {
        return true;
    }
    if classify_any(db, receiver).is_dynamic() {
        return true;
    }
    match resolve_alias(db, receiver) {
        Some(resolved) => matches!(
            db.lookup(resolved),
            Some(TypeData::Intrinsic(IntrinsicKind::Unknown)) | Some(TypeData::Error)
        ),
        None => true,
    }
}

/// Element type of an array-shaped type.
///
/// Recognizes `T[]`, `readonly T[]`, and the `Array<T>` / `ReadonlyArray<T>`
/// applications. Does not resolve aliases on `ty` itself.
pub fn array_element_type<D: TypeDatabase + ?Sized>(db: &D, ty: TypeId) -> Option<TypeId> {
    match db.lookup(ty)? {
        TypeData::Array(element) => Some(element),
        TypeData::ReadonlyType(inner) => match db.lookup(resolve_alias(db, inner)?)? {
            TypeData::Array(element) => Some(element),
            _ => None,
        },
        TypeData::Application(app_id) => {
            let app = db.type_application(app_id)?;
            if app.args.len() != 1 || !is_array_origin(db, app.base) {
                return None;
            }
            Some(app.args[0])
        }
        _ => None,
    }
}

fn is_array_origin<D: TypeDatabase + ?Sized>(db: &D, base: TypeId) -> bool {
    match db.lookup(base) {
        Some(TypeData::Reference(name)) => {
            matches!(&*db.resolve_atom(name), "Array" | "ReadonlyArray")
        }
        _ => false,
    }
}

fn is_any<D: TypeDatabase + ?Sized>(db: &D, ty: TypeId) -> bool {
    ty.is_any() || matches!(db.lookup(ty), Some(TypeData::Intrinsic(IntrinsicKind::Any)))
}

#[cfg(test)]
#[path = "../tests/type_classifier_tests.rs"]
mod tests;
