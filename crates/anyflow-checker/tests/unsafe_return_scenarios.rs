//! End-to-end return checking through the public API.
//!
//! Each scenario is one function whose body returns one value.

use anyflow_checker::{
    CheckerOptions, NodeIndex, NodeKind, OverloadPolicy, TypedProgram, UnsafeReturnKind,
    check_unsafe_returns,
};
use anyflow_common::span::Span;
use anyflow_solver::{FunctionShape, TypeId, TypeInterner};

/// `function f()[: annotation] { return <value>; }` in a fresh program.
fn program_returning(
    build: impl FnOnce(&TypeInterner) -> (TypeId, TypeId),
    annotation: Option<&str>,
) -> (TypedProgram, NodeIndex) {
    let mut program = TypedProgram::new("scenario.ts");
    let (returned, declared) = build(&program.types);
    let fn_type = program.types.function(FunctionShape {
        type_params: Vec::new(),
        params: Vec::new(),
        return_type: declared,
    });

    let value = program.arena.add_expression(Vec::new(), Span::at(30, 5));
    let ret = program.arena.add_return(value, Span::at(23, 13));
    let body = program.arena.add_block(vec![ret], Span::at(21, 17));
    let func = program
        .arena
        .add_function(NodeKind::FunctionDeclaration, annotation, body, Span::at(0, 38));
    let root = program.arena.add_source_file(vec![func], Span::at(0, 38));
    program.set_type(value, returned);
    program.set_type(func, fn_type);
    (program, root)
}

fn messages(program: &TypedProgram, root: NodeIndex, options: CheckerOptions) -> Vec<String> {
    check_unsafe_returns(program, root, options)
        .expect("scenario checks cleanly")
        .iter()
        .map(|finding| finding.to_diagnostic("scenario.ts").message_text)
        .collect()
}

#[test]
fn dynamic_value_from_string_function() {
    let (program, root) = program_returning(|_| (TypeId::ANY, TypeId::STRING), Some("string"));
    assert_eq!(
        messages(&program, root, CheckerOptions::default()),
        vec!["Unsafe return of an any typed value."]
    );
}

#[test]
fn dynamic_array_from_string_function() {
    let (program, root) = program_returning(
        |types| (types.array(TypeId::ANY), TypeId::STRING),
        Some("string"),
    );
    assert_eq!(
        messages(&program, root, CheckerOptions::default()),
        vec!["Unsafe return of an any[] typed value."]
    );
}

#[test]
fn promise_of_any_into_promise_of_string() {
    let (program, root) = program_returning(
        |types| {
            let promise = types.reference("Promise");
            (
                types.application(promise, vec![TypeId::ANY]),
                types.application(promise, vec![TypeId::STRING]),
            )
        },
        Some("Promise<string>"),
    );
    assert_eq!(
        messages(&program, root, CheckerOptions::default()),
        vec!["Unsafe return of type 'Promise<any>' from function with return type 'Promise<string>'."]
    );
}

#[test]
fn dynamic_value_from_any_function() {
    let (program, root) = program_returning(|_| (TypeId::ANY, TypeId::ANY), Some("any"));
    assert_eq!(
        messages(&program, root, CheckerOptions::default()),
        vec!["Unsafe return of an any typed value."]
    );
}

#[test]
fn dynamic_value_from_unannotated_function() {
    let (program, root) = program_returning(|_| (TypeId::ANY, TypeId::ANY), None);
    let findings = check_unsafe_returns(&program, root, CheckerOptions::default())
        .expect("scenario checks cleanly");
    assert_eq!(findings.len(), 1);
    assert!(matches!(
        findings[0].kind,
        UnsafeReturnKind::UnsafeReturn { .. }
    ));
}

#[test]
fn identical_array_types() {
    let (program, root) = program_returning(
        |types| {
            let array = types.reference("Array");
            let strings = types.application(array, vec![TypeId::STRING]);
            (strings, strings)
        },
        Some("Array<string>"),
    );
    assert!(messages(&program, root, CheckerOptions::default()).is_empty());
}

#[test]
fn unannotated_function_never_gets_assignment_findings() {
    let (program, root) = program_returning(
        |types| {
            let promise = types.reference("Promise");
            (
                types.application(promise, vec![TypeId::ANY]),
                types.application(promise, vec![TypeId::STRING]),
            )
        },
        None,
    );
    for policy in [OverloadPolicy::FirstUnsafe, OverloadPolicy::EachSignature] {
        let options = CheckerOptions::default().with_overload_policy(policy);
        assert!(messages(&program, root, options).is_empty());
    }
}

#[test]
fn diagnostics_point_at_the_return_statement() {
    let (program, root) = program_returning(|_| (TypeId::ANY, TypeId::NUMBER), Some("number"));
    let findings = check_unsafe_returns(&program, root, CheckerOptions::default())
        .expect("scenario checks cleanly");
    let diagnostic = findings[0].to_diagnostic("scenario.ts");

    assert_eq!(diagnostic.file, "scenario.ts");
    assert_eq!(diagnostic.start, 23);
    assert_eq!(diagnostic.length, 13);
    assert_eq!(diagnostic.key, "unsafeReturn");
}
