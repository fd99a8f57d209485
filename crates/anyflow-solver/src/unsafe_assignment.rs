//! Detection of unsafe assignments of dynamic content.
//!
//! [`UnsafeAssignmentChecker`] decides whether assigning a value of type
//! `sender` to a location declared as `receiver` silently narrows `any`
//! into a concretely typed shape, e.g. returning `Promise<any>` from a
//! function declared to return `Promise<string>`.
//!
//! ## Algorithm
//!
//! 1. Identical descriptors are safe.
//! 2. An `any` sender is unsafe unless the receiver tolerates dynamic
//!    content (`any`, `any[]`, `unknown`). An `any[]` sender is unsafe only
//!    against an array receiver that does not tolerate it.
//! 3. Otherwise, when both sides have the same structural shape (same
//!    generic origin and arity, arrays, tuples of equal length, callables
//!    with the same number of signatures), the corresponding positions are
//!    compared recursively and the first unsafe pair wins.
//! 4. Any shape mismatch is safe: ordinary incompatibility is the host
//!    checker's concern, not ours.
//!
//! Cycles through deferred definitions are cut by a visiting set of
//! `(sender, receiver)` pairs; a pair met again on the current path is safe.

use crate::db::{TypeDatabase, resolve_alias};
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::type_classifier::{
    AnyClassification, array_element_type, classify_any, tolerates_dynamic,
};
use crate::types::{TypeData, TypeId};
use anyflow_common::limits::MAX_ALIAS_RESOLUTION_DEPTH;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::trace;

/// The nested pair at which dynamic content flows into a non-dynamic type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnsafeAssignment {
    pub sender: TypeId,
    pub receiver: TypeId,
}

type PairList = SmallVec<[(TypeId, TypeId); 4]>;

/// Structural view of a type, limited to the shapes the comparison
/// recurses through.
enum Shape {
    Array(TypeId),
    Application { base: TypeId, args: Vec<TypeId> },
    Tuple(Arc<[TypeId]>),
    /// Return types of the call signatures, in declaration order.
    Signatures(SmallVec<[TypeId; 2]>),
    Opaque,
}

/// Recursive unsafe-assignment detector.
///
/// One checker may be reused for several comparisons; every top-level call
/// starts with an empty visiting set and a fresh budget.
pub struct UnsafeAssignmentChecker<'a, D: TypeDatabase + ?Sized> {
    db: &'a D,
    profile: RecursionProfile,
    guard: RecursionGuard<(TypeId, TypeId)>,
    exceeded: bool,
}

impl<'a, D: TypeDatabase + ?Sized> UnsafeAssignmentChecker<'a, D> {
    pub fn new(db: &'a D) -> Self {
        Self::with_profile(db, RecursionProfile::UnsafeAssignment)
    }

    pub fn with_profile(db: &'a D, profile: RecursionProfile) -> Self {
        UnsafeAssignmentChecker {
            db,
            profile,
            guard: RecursionGuard::with_profile(profile),
            exceeded: false,
        }
    }

    /// Returns the unsafe pair, or `None` when the assignment is safe.
    ///
    /// # Panics
    ///
    /// Panics if either descriptor is [`TypeId::NONE`].
    pub fn check(&mut self, sender: TypeId, receiver: TypeId) -> Option<UnsafeAssignment> {
        assert!(
            !sender.is_none() && !receiver.is_none(),
            "unsafe assignment check called with an absent type descriptor"
        );
        self.guard = RecursionGuard::with_profile(self.profile);
        let result = self.check_pair(sender, receiver);
        self.exceeded |= self.guard.is_exceeded();
        result
    }

    /// Whether a comparison budget was exhausted in any call so far.
    /// Exhausted branches are answered as safe.
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    fn check_pair(&mut self, sender: TypeId, receiver: TypeId) -> Option<UnsafeAssignment> {
        if sender.is_none() || receiver.is_none() || self.db.is_identical(sender, receiver) {
            return None;
        }

        match self.guard.enter((sender, receiver)) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                trace!(?sender, ?receiver, "cycle in unsafe assignment check, assuming safe");
                return None;
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                trace!(?sender, ?receiver, "unsafe assignment budget exceeded, assuming safe");
                return None;
            }
        }
        let result = self.check_entered(sender, receiver);
        self.guard.leave((sender, receiver));
        result
    }

    fn check_entered(&mut self, sender: TypeId, receiver: TypeId) -> Option<UnsafeAssignment> {
        match classify_any(self.db, sender) {
            AnyClassification::Dynamic | AnyClassification::DynamicArray => {
                if tolerates_dynamic(self.db, receiver) {
                    return None;
                }
                trace!(?sender, ?receiver, "dynamic sender into non-dynamic receiver");
                Some(UnsafeAssignment { sender, receiver })
            }
            AnyClassification::Safe => {
                let pairs = self.matching_positions(sender, receiver);
                for (sender_child, receiver_child) in pairs {
                    if let Some(found) = self.check_pair(sender_child, receiver_child) {
                        return Some(self.attribute(found, sender, receiver));
                    }
                }
                None
            }
        }
    }

    /// A bare `any` in a type argument says little on its own, so it is
    /// reported as the enclosing pair (`Promise<any>` vs `Promise<string>`).
    /// Structured findings such as `any[]` are already specific and pass
    /// through unchanged.
    fn attribute(
        &self,
        found: UnsafeAssignment,
        sender: TypeId,
        receiver: TypeId,
    ) -> UnsafeAssignment {
        if classify_any(self.db, found.sender) == AnyClassification::Dynamic {
            UnsafeAssignment { sender, receiver }
        } else {
            found
        }
    }

    /// Pairs of corresponding positions when both sides share a shape;
    /// empty when they do not.
    fn matching_positions(&self, sender: TypeId, receiver: TypeId) -> PairList {
        let mut pairs = PairList::new();
        match (self.shape_of(sender), self.shape_of(receiver)) {
            (Shape::Array(s), Shape::Array(r)) => pairs.push((s, r)),
            (
                Shape::Application {
                    base: s_base,
                    args: s_args,
                },
                Shape::Application {
                    base: r_base,
                    args: r_args,
                },
            ) => {
                if self.db.is_identical(s_base, r_base) && s_args.len() == r_args.len() {
                    pairs.extend(s_args.iter().copied().zip(r_args.iter().copied()));
                }
            }
            (Shape::Tuple(s), Shape::Tuple(r)) => {
                if s.len() == r.len() {
                    pairs.extend(s.iter().copied().zip(r.iter().copied()));
                }
            }
            (Shape::Signatures(s), Shape::Signatures(r)) => {
                if s.len() == r.len() {
                    pairs.extend(s.iter().copied().zip(r.iter().copied()));
                }
            }
            _ => {}
        }
        pairs
    }

    fn shape_of(&self, ty: TypeId) -> Shape {
        let mut current = ty;
        // `readonly` wrappers are peeled in a loop: an alias may wrap itself.
        for _ in 0..MAX_ALIAS_RESOLUTION_DEPTH {
            let Some(resolved) = resolve_alias(self.db, current) else {
                return Shape::Opaque;
            };
            match self.db.lookup(resolved) {
                Some(TypeData::ReadonlyType(inner))
                    if array_element_type(self.db, resolved).is_none() =>
                {
                    current = inner;
                }
                _ => return self.shape_of_resolved(resolved),
            }
        }
        Shape::Opaque
    }

    fn shape_of_resolved(&self, resolved: TypeId) -> Shape {
        if let Some(element) = array_element_type(self.db, resolved) {
            return Shape::Array(element);
        }
        match self.db.lookup(resolved) {
            Some(TypeData::Application(app_id)) => match self.db.type_application(app_id) {
                Some(app) => Shape::Application {
                    base: app.base,
                    args: app.args.clone(),
                },
                None => Shape::Opaque,
            },
            Some(TypeData::Tuple(list)) => match self.db.type_list(list) {
                Some(elements) => Shape::Tuple(elements),
                None => Shape::Opaque,
            },
            Some(TypeData::Function(_)) | Some(TypeData::Callable(_)) => {
                let returns: SmallVec<[TypeId; 2]> = self
                    .db
                    .call_signatures(resolved)
                    .iter()
                    .map(|sig| sig.return_type)
                    .collect();
                if returns.is_empty() {
                    Shape::Opaque
                } else {
                    Shape::Signatures(returns)
                }
            }
            _ => Shape::Opaque,
        }
    }
}

/// Convenience wrapper running a fresh [`UnsafeAssignmentChecker`].
///
/// # Panics
///
/// Panics if either descriptor is [`TypeId::NONE`].
pub fn detect_unsafe_assignment<D: TypeDatabase + ?Sized>(
    db: &D,
    sender: TypeId,
    receiver: TypeId,
) -> Option<UnsafeAssignment> {
    UnsafeAssignmentChecker::new(db).check(sender, receiver)
}

#[cfg(test)]
#[path = "../tests/unsafe_assignment_tests.rs"]
mod tests;
