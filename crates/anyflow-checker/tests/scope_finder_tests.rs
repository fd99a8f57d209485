use super::*;
use crate::node::NodeKind;
use anyflow_common::span::Span;

#[test]
fn test_finds_nearest_function() {
    let mut arena = NodeArena::new();
    let value = arena.add_expression(Vec::new(), Span::DUMMY);
    let inner_ret = arena.add_return(value, Span::DUMMY);
    let inner_body = arena.add_block(vec![inner_ret], Span::DUMMY);
    let inner = arena.add_function(NodeKind::FunctionExpression, None, inner_body, Span::DUMMY);
    let holder = arena.add_expression(vec![inner], Span::DUMMY);
    let stmt = arena.add_expression_statement(holder, Span::DUMMY);
    let outer_body = arena.add_block(vec![stmt], Span::DUMMY);
    let outer = arena.add_function(NodeKind::MethodDeclaration, Some("void"), outer_body, Span::DUMMY);
    let root = arena.add_source_file(vec![outer], Span::DUMMY);

    assert_eq!(find_enclosing_function(&arena, inner_ret), Some(inner));
    assert_eq!(find_enclosing_function(&arena, stmt), Some(outer));
    // A function-like node encloses itself.
    assert_eq!(find_enclosing_function(&arena, inner), Some(inner));
    assert_eq!(find_enclosing_function(&arena, root), None);
}

#[test]
fn test_file_scope_and_unknown_nodes() {
    let mut arena = NodeArena::new();
    let value = arena.add_expression(Vec::new(), Span::DUMMY);
    let ret = arena.add_return(value, Span::DUMMY);
    arena.add_source_file(vec![ret], Span::DUMMY);

    assert_eq!(find_enclosing_function(&arena, ret), None);
    assert_eq!(find_enclosing_function(&arena, NodeIndex(500)), None);
    assert_eq!(find_enclosing_function(&arena, NodeIndex::NONE), None);
}
