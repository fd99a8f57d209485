use super::*;
use anyflow_checker::{CheckerOptions, UnsafeReturnKind, check_unsafe_returns};
use anyflow_solver::{AnyClassification, TypeData, TypeFormatter, classify_any, resolve_alias};

const PROMISE_SNAPSHOT: &str = r#"{
    "file": "promise.ts",
    "source": "async function f(): Promise<string> {\n  return p;\n}\n",
    "types": [
        { "kind": "intrinsic", "name": "any" },
        { "kind": "intrinsic", "name": "string" },
        { "kind": "reference", "name": "Promise" },
        { "kind": "application", "base": 2, "args": [0] },
        { "kind": "application", "base": 2, "args": [1] },
        { "kind": "function", "return_type": 4 }
    ],
    "root": {
        "kind": "block",
        "statements": [{
            "kind": "function",
            "flavor": "declaration",
            "type": 5,
            "return_type": "Promise<string>",
            "start": 0,
            "length": 50,
            "body": {
                "kind": "block",
                "statements": [{
                    "kind": "return",
                    "start": 40,
                    "length": 9,
                    "expression": { "kind": "expression", "type": 3, "start": 47, "length": 1 }
                }]
            }
        }]
    }
}"#;

fn load_err(text: &str) -> SnapshotError {
    match load_snapshot_str(text) {
        Ok(_) => panic!("snapshot should be rejected"),
        Err(err) => err,
    }
}

#[test]
fn test_loads_program_and_node_types() {
    let host = load_snapshot_str(PROMISE_SNAPSHOT).expect("valid snapshot");

    assert_eq!(host.file_name(), "promise.ts");
    assert!(host.source().is_some_and(|source| source.contains("return p;")));
    // source file, block, function, return, expression
    assert_eq!(host.arena().len(), 5);

    let root = host.arena().get(host.root()).expect("root node");
    assert_eq!(root.kind, NodeKind::SourceFile);

    let findings = check_unsafe_returns(&host, host.root(), CheckerOptions::default())
        .expect("snapshot checks cleanly");
    assert_eq!(findings.len(), 1);
    match &findings[0].kind {
        UnsafeReturnKind::UnsafeReturnAssignment {
            sender_text,
            receiver_text,
            ..
        } => {
            assert_eq!(sender_text, "Promise<any>");
            assert_eq!(receiver_text, "Promise<string>");
        }
        other => panic!("unexpected finding {other:?}"),
    }
    assert_eq!(findings[0].span, Span::at(40, 9));
}

#[test]
fn test_intrinsics_map_to_fixed_ids() {
    let host = load_snapshot_str(
        r#"{
            "file": "a.ts",
            "types": [
                { "kind": "intrinsic", "name": "any" },
                { "kind": "intrinsic", "name": "unknown" },
                { "kind": "intrinsic", "name": "number" },
                { "kind": "array", "element": 0 }
            ],
            "root": { "kind": "block", "statements": [
                { "kind": "expression_statement", "expression": { "kind": "expression", "type": 0, "children": [
                    { "kind": "expression", "type": 1 },
                    { "kind": "expression", "type": 2 },
                    { "kind": "expression", "type": 3 }
                ]}}
            ]}
        }"#,
    )
    .expect("valid snapshot");

    let types: Vec<TypeId> = (0..host.arena().len() as u32)
        .map(|idx| host.get_type_of_node(NodeIndex(idx)))
        .collect();
    // Children are added before their parent.
    assert_eq!(types[0], TypeId::UNKNOWN);
    assert_eq!(types[1], TypeId::NUMBER);
    assert_eq!(
        classify_any(host.types(), types[2]),
        AnyClassification::DynamicArray
    );
    assert_eq!(types[3], TypeId::ANY);
    // The statement and the source file carry no type.
    assert_eq!(types[4], TypeId::NONE);
}

#[test]
fn test_recursive_alias_through_lazy_definition() {
    // type Tree = Map<string, Tree>
    let host = load_snapshot_str(
        r#"{
            "file": "tree.ts",
            "types": [
                { "kind": "alias", "name": "Tree", "target": 3 },
                { "kind": "intrinsic", "name": "string" },
                { "kind": "reference", "name": "Map" },
                { "kind": "application", "base": 2, "args": [1, 0] }
            ],
            "root": { "kind": "block", "statements": [
                { "kind": "expression", "type": 0 }
            ]}
        }"#,
    )
    .expect("aliases may be recursive");

    let tree = host.get_type_of_node(NodeIndex(0));
    assert!(matches!(host.types().lookup(tree), Some(TypeData::Lazy(_))));
    let body = resolve_alias(host.types(), tree).expect("alias body is attached");
    assert!(matches!(
        host.types().lookup(body),
        Some(TypeData::Application(_))
    ));
    assert_eq!(TypeFormatter::new(host.types()).format(tree), "Tree");
}

#[test]
fn test_function_and_callable_signatures() {
    let host = load_snapshot_str(
        r#"{
            "file": "sig.ts",
            "types": [
                { "kind": "intrinsic", "name": "number" },
                { "kind": "intrinsic", "name": "string" },
                { "kind": "type_parameter", "name": "T" },
                { "kind": "function", "type_params": ["T"],
                  "params": [{ "name": "x", "type": 2 }, { "name": "rest", "type": 0, "rest": true }],
                  "return_type": 2 },
                { "kind": "callable", "signatures": [
                    { "return_type": 0 },
                    { "params": [{ "type": 1, "optional": true }], "return_type": 1 }
                ]}
            ],
            "root": { "kind": "block", "statements": [
                { "kind": "expression", "type": 3 },
                { "kind": "expression", "type": 4 }
            ]}
        }"#,
    )
    .expect("valid snapshot");

    let function = host.get_type_of_node(NodeIndex(0));
    let callable = host.get_type_of_node(NodeIndex(1));
    assert_eq!(host.types().call_signatures(function).len(), 1);
    assert_eq!(
        TypeFormatter::new(host.types()).format(function),
        "<T>(x: T, ...rest: number) => T"
    );
    let overloads = host.types().call_signatures(callable);
    assert_eq!(overloads.len(), 2);
    assert_eq!(overloads[0].return_type, TypeId::NUMBER);
    assert_eq!(overloads[1].return_type, TypeId::STRING);
    assert!(overloads[1].params[0].optional);
}

#[test]
fn test_bare_return_and_arrow_flavor() {
    let host = load_snapshot_str(
        r#"{
            "file": "arrow.ts",
            "types": [{ "kind": "intrinsic", "name": "any" }],
            "root": { "kind": "block", "statements": [
                { "kind": "return" },
                { "kind": "function", "flavor": "arrow", "body": { "kind": "expression", "type": 0 } }
            ]}
        }"#,
    )
    .expect("valid snapshot");

    let kinds: Vec<NodeKind> = (0..host.arena().len() as u32)
        .filter_map(|idx| host.arena().get(NodeIndex(idx)).map(|node| node.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::ReturnStatement,
            NodeKind::Expression,
            NodeKind::ArrowFunction,
            NodeKind::SourceFile,
        ]
    );
}

#[test]
fn test_unknown_intrinsic_is_rejected() {
    let err = load_err(
        r#"{
            "file": "a.ts",
            "types": [{ "kind": "intrinsic", "name": "integer" }],
            "root": { "kind": "block" }
        }"#,
    );
    assert!(matches!(
        err,
        SnapshotError::UnknownIntrinsic { index: 0, ref name } if name == "integer"
    ));
}

#[test]
fn test_dangling_type_index_is_rejected() {
    let err = load_err(
        r#"{
            "file": "a.ts",
            "types": [{ "kind": "array", "element": 9 }],
            "root": { "kind": "block" }
        }"#,
    );
    assert!(matches!(
        err,
        SnapshotError::DanglingTypeIndex {
            target: 9,
            count: 1,
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "type #0 refers to type #9, but the snapshot has 1 types"
    );
}

#[test]
fn test_dangling_node_type_is_rejected() {
    let err = load_err(
        r#"{
            "file": "a.ts",
            "types": [],
            "root": { "kind": "block", "statements": [{ "kind": "expression", "type": 0 }] }
        }"#,
    );
    assert!(matches!(
        err,
        SnapshotError::DanglingTypeIndex { target: 0, count: 0, ref referrer } if referrer == "node #0"
    ));
}

#[test]
fn test_cycle_without_alias_is_rejected() {
    let err = load_err(
        r#"{
            "file": "a.ts",
            "types": [
                { "kind": "array", "element": 1 },
                { "kind": "tuple", "elements": [0] }
            ],
            "root": { "kind": "block" }
        }"#,
    );
    assert!(matches!(err, SnapshotError::CycleWithoutAlias { index: 0 }));
}

/// `types[i] = (types[i + 1])[]` for `len` entries, ending in `last`.
fn chain_snapshot(len: usize, last: &str) -> String {
    let mut types: Vec<String> = (0..len)
        .map(|i| format!(r#"{{ "kind": "array", "element": {} }}"#, i + 1))
        .collect();
    types.push(last.to_string());
    format!(
        r#"{{ "file": "chain.ts", "types": [{}], "root": {{ "kind": "block", "statements": [{{ "kind": "expression", "type": 0 }}] }} }}"#,
        types.join(",")
    )
}

#[test]
fn test_long_acyclic_chain_loads() {
    let text = chain_snapshot(100_000, r#"{ "kind": "intrinsic", "name": "string" }"#);
    let host = load_snapshot_str(&text).expect("long acyclic chains load");

    let outer = host.get_type_of_node(NodeIndex(0));
    let Some(TypeData::Array(next)) = host.types().lookup(outer) else {
        panic!("outermost entry is an array");
    };
    assert!(matches!(host.types().lookup(next), Some(TypeData::Array(_))));
}

#[test]
fn test_long_chain_closing_into_a_cycle_is_rejected() {
    let text = chain_snapshot(100_000, r#"{ "kind": "array", "element": 0 }"#);
    assert!(matches!(
        load_err(&text),
        SnapshotError::CycleWithoutAlias { index: 0 }
    ));
}

#[test]
fn test_repeated_dependencies_are_interned_once() {
    let host = load_snapshot_str(
        r#"{
            "file": "a.ts",
            "types": [
                { "kind": "tuple", "elements": [1, 1, 2] },
                { "kind": "intrinsic", "name": "number" },
                { "kind": "array", "element": 1 }
            ],
            "root": { "kind": "block", "statements": [{ "kind": "expression", "type": 0 }] }
        }"#,
    )
    .expect("shared dependencies are not cycles");
    let tuple = host.get_type_of_node(NodeIndex(0));
    assert!(matches!(host.types().lookup(tuple), Some(TypeData::Tuple(_))));
}

#[test]
fn test_root_must_be_a_block() {
    let err = load_err(r#"{ "file": "a.ts", "root": { "kind": "return" } }"#);
    assert!(matches!(err, SnapshotError::RootNotBlock));
}

#[test]
fn test_malformed_json_is_a_parse_error() {
    assert!(matches!(
        load_err(r#"{ "file": "a.ts", "root": { "kind": "loop" } }"#),
        SnapshotError::Parse(_)
    ));
    assert!(matches!(
        load_err(r#"{ "file": "a.ts", "root": { "kind": "block" }, "extra": 1 }"#),
        SnapshotError::Parse(_)
    ));
}

#[test]
fn test_reads_snapshot_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("promise.json");
    std::fs::write(&path, PROMISE_SNAPSHOT).expect("write snapshot");

    let host = load_snapshot_file(&path).expect("snapshot loads from disk");
    assert_eq!(host.file_name(), "promise.ts");

    let missing = load_snapshot_file(&dir.path().join("missing.json"));
    assert!(matches!(missing, Err(SnapshotError::Io(_))));
}
