//! Property checks over a generated pool of types.
//!
//! The pool covers every shape the detector recurses through, built from a
//! small set of leaves, so each property is checked against all pairs.

use anyflow_solver::{
    AnyClassification, CallSignature, CallableShape, FunctionShape, TypeId, TypeInterner,
    UnsafeAssignmentChecker, classify_any, detect_unsafe_assignment, tolerates_dynamic,
};
use rayon::prelude::*;

const LEAVES: [TypeId; 5] = [
    TypeId::ANY,
    TypeId::UNKNOWN,
    TypeId::STRING,
    TypeId::NUMBER,
    TypeId::NEVER,
];

fn build_pool(interner: &TypeInterner) -> Vec<TypeId> {
    let promise = interner.reference("Promise");
    let map = interner.reference("Map");
    let array_ref = interner.reference("Array");

    let mut pool: Vec<TypeId> = LEAVES.to_vec();
    for &leaf in &LEAVES {
        pool.push(interner.array(leaf));
        pool.push(interner.readonly_array(leaf));
        pool.push(interner.application(array_ref, vec![leaf]));
        pool.push(interner.application(promise, vec![leaf]));
        pool.push(interner.application(map, vec![TypeId::STRING, leaf]));
        pool.push(interner.tuple(vec![leaf, TypeId::STRING]));
        pool.push(interner.union2(leaf, TypeId::NUMBER));
        pool.push(interner.function(FunctionShape {
            type_params: Vec::new(),
            params: Vec::new(),
            return_type: leaf,
        }));
        pool.push(interner.callable(CallableShape {
            call_signatures: vec![CallSignature {
                type_params: Vec::new(),
                params: Vec::new(),
                return_type: leaf,
            }],
        }));
    }

    // One level deeper through a generic origin.
    let depth_one = pool.clone();
    for ty in depth_one {
        pool.push(interner.application(promise, vec![ty]));
    }

    // Recursive definitions: type Tree<L> = Promise<Tree<L>> for each leaf.
    for &leaf in &LEAVES {
        let (def, alias) = interner.define_lazy("Tree");
        let body = interner.application(map, vec![leaf, alias]);
        interner.set_definition_body(def, body);
        pool.push(alias);
    }

    pool.sort_unstable();
    pool.dedup();
    pool
}

fn all_pairs(pool: &[TypeId]) -> Vec<(TypeId, TypeId)> {
    pool.iter()
        .flat_map(|&sender| pool.iter().map(move |&receiver| (sender, receiver)))
        .collect()
}

#[test]
fn identical_pairs_are_never_reported() {
    let interner = TypeInterner::new();
    for ty in build_pool(&interner) {
        assert_eq!(detect_unsafe_assignment(&interner, ty, ty), None, "{ty:?}");
    }
}

#[test]
fn any_into_intolerant_receiver_is_always_reported() {
    let interner = TypeInterner::new();
    for receiver in build_pool(&interner) {
        let result = detect_unsafe_assignment(&interner, TypeId::ANY, receiver);
        assert_eq!(
            result.is_some(),
            !tolerates_dynamic(&interner, receiver),
            "{receiver:?}"
        );
    }
}

#[test]
fn tolerant_receivers_never_report_dynamic_senders() {
    let interner = TypeInterner::new();
    let pool = build_pool(&interner);
    for &sender in &pool {
        if classify_any(&interner, sender).is_safe() {
            continue;
        }
        for &receiver in &pool {
            if tolerates_dynamic(&interner, receiver) {
                assert_eq!(
                    detect_unsafe_assignment(&interner, sender, receiver),
                    None,
                    "{sender:?} -> {receiver:?}"
                );
            }
        }
    }
}

#[test]
fn reported_pairs_are_never_identical_or_tolerant() {
    let interner = TypeInterner::new();
    let pool = build_pool(&interner);
    for (sender, receiver) in all_pairs(&pool) {
        let Some(found) = detect_unsafe_assignment(&interner, sender, receiver) else {
            continue;
        };
        assert_ne!(found.sender, found.receiver);
        assert!(
            !tolerates_dynamic(&interner, found.receiver),
            "{sender:?} -> {receiver:?} reported {found:?}"
        );
        // A reported pair either is the dynamic leak itself or wraps one.
        let direct = classify_any(&interner, found.sender) != AnyClassification::Safe;
        let wrapped = detect_unsafe_assignment(&interner, found.sender, found.receiver).is_some();
        assert!(direct || wrapped, "{found:?}");
    }
}

#[test]
fn checks_terminate_within_budget() {
    let interner = TypeInterner::new();
    let pool = build_pool(&interner);
    let mut checker = UnsafeAssignmentChecker::new(&interner);
    for (sender, receiver) in all_pairs(&pool) {
        let _ = checker.check(sender, receiver);
    }
    assert!(!checker.is_exceeded());
}

#[test]
fn parallel_checks_match_sequential_results() {
    let interner = TypeInterner::new();
    let pool = build_pool(&interner);
    let pairs = all_pairs(&pool);

    let sequential: Vec<_> = pairs
        .iter()
        .map(|&(sender, receiver)| detect_unsafe_assignment(&interner, sender, receiver))
        .collect();
    let parallel: Vec<_> = pairs
        .par_iter()
        .map(|&(sender, receiver)| detect_unsafe_assignment(&interner, sender, receiver))
        .collect();

    assert_eq!(sequential, parallel);
}
