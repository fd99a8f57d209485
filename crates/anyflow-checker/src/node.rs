//! Thin syntax arena for return-site analysis.
//!
//! Only the node kinds that matter for return-flow checking are modeled:
//! containers (source file, block), function-like nodes, return statements,
//! expression statements, and opaque expressions with child expressions
//! (which is where nested function expressions and arrows live).
//!
//! # Architecture
//!
//! Like a parser arena, each node is a small header (`Node`) holding its
//! kind, span and an index into a kind-specific data pool. Parent links live
//! in a parallel `extended_info` vector and are set when a parent is added,
//! so trees are built bottom-up: children first, then the node that owns
//! them.

use anyflow_common::interner::{Atom, Interner};
use anyflow_common::span::Span;
use smallvec::SmallVec;
use std::fmt;

/// Index of a node in a [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Sentinel for "no node" (absent return argument, missing parent).
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != u32::MAX
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    SourceFile,
    Block,
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunction,
    MethodDeclaration,
    ReturnStatement,
    ExpressionStatement,
    Expression,
}

impl NodeKind {
    #[inline]
    pub const fn is_function_like(self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration
                | NodeKind::FunctionExpression
                | NodeKind::ArrowFunction
                | NodeKind::MethodDeclaration
        )
    }
}

/// Node header: kind, source range, and the index into the kind's pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub data_index: u32,
}

impl Node {
    #[inline]
    pub fn is_function_like(&self) -> bool {
        self.kind.is_function_like()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ExtendedNodeInfo {
    pub parent: NodeIndex,
}

impl Default for NodeIndex {
    fn default() -> Self {
        NodeIndex::NONE
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("<none>")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Statements of a source file or block.
#[derive(Clone, Debug, Default)]
pub struct BlockData {
    pub statements: Vec<NodeIndex>,
}

#[derive(Clone, Debug)]
pub struct FunctionData {
    /// Text of the explicit return type annotation, or `None` when the
    /// return type is inferred.
    pub return_type_annotation: Option<Atom>,
    /// A block, or (for arrow functions only) an expression.
    pub body: NodeIndex,
}

impl FunctionData {
    #[inline]
    pub fn has_return_type_annotation(&self) -> bool {
        self.return_type_annotation.is_some()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ReturnData {
    /// The returned expression; `NodeIndex::NONE` for a bare `return;`.
    pub expression: NodeIndex,
}

#[derive(Clone, Debug, Default)]
pub struct ExpressionData {
    pub children: Vec<NodeIndex>,
}

#[derive(Clone, Copy, Debug)]
pub struct ExpressionStatementData {
    pub expression: NodeIndex,
}

/// Arena owning every node of one source file.
#[derive(Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    extended_info: Vec<ExtendedNodeInfo>,
    blocks: Vec<BlockData>,
    functions: Vec<FunctionData>,
    returns: Vec<ReturnData>,
    expressions: Vec<ExpressionData>,
    expr_statements: Vec<ExpressionStatementData>,
    interner: Interner,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        if idx.is_none() {
            return None;
        }
        self.nodes.get(idx.0 as usize)
    }

    #[inline]
    pub fn get_extended(&self, idx: NodeIndex) -> Option<&ExtendedNodeInfo> {
        if idx.is_none() {
            return None;
        }
        self.extended_info.get(idx.0 as usize)
    }

    /// Parent of `idx`, or `NodeIndex::NONE` for roots and unknown nodes.
    #[inline]
    pub fn parent_of(&self, idx: NodeIndex) -> NodeIndex {
        self.get_extended(idx).map_or(NodeIndex::NONE, |ext| ext.parent)
    }

    // -------------------------------------------------------------------------
    // Typed pool accessors
    // -------------------------------------------------------------------------

    pub fn get_block(&self, node: &Node) -> Option<&BlockData> {
        match node.kind {
            NodeKind::SourceFile | NodeKind::Block => self.blocks.get(node.data_index as usize),
            _ => None,
        }
    }

    pub fn get_function(&self, node: &Node) -> Option<&FunctionData> {
        if node.is_function_like() {
            self.functions.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn get_return(&self, node: &Node) -> Option<&ReturnData> {
        match node.kind {
            NodeKind::ReturnStatement => self.returns.get(node.data_index as usize),
            _ => None,
        }
    }

    pub fn get_expression(&self, node: &Node) -> Option<&ExpressionData> {
        match node.kind {
            NodeKind::Expression => self.expressions.get(node.data_index as usize),
            _ => None,
        }
    }

    pub fn get_expression_statement(&self, node: &Node) -> Option<&ExpressionStatementData> {
        match node.kind {
            NodeKind::ExpressionStatement => self.expr_statements.get(node.data_index as usize),
            _ => None,
        }
    }

    /// Text of a function's return type annotation.
    pub fn return_type_annotation_text(&self, data: &FunctionData) -> Option<String> {
        data.return_type_annotation
            .map(|atom| self.interner.resolve(atom).to_string())
    }

    /// Direct children of a node, in source order.
    pub fn children(&self, idx: NodeIndex) -> SmallVec<[NodeIndex; 4]> {
        let mut out = SmallVec::new();
        let Some(node) = self.get(idx) else {
            return out;
        };
        match node.kind {
            NodeKind::SourceFile | NodeKind::Block => {
                if let Some(block) = self.get_block(node) {
                    out.extend(block.statements.iter().copied());
                }
            }
            NodeKind::FunctionDeclaration
            | NodeKind::FunctionExpression
            | NodeKind::ArrowFunction
            | NodeKind::MethodDeclaration => {
                if let Some(func) = self.get_function(node) {
                    out.push(func.body);
                }
            }
            NodeKind::ReturnStatement => {
                if let Some(ret) = self.get_return(node) {
                    out.push(ret.expression);
                }
            }
            NodeKind::ExpressionStatement => {
                if let Some(stmt) = self.get_expression_statement(node) {
                    out.push(stmt.expression);
                }
            }
            NodeKind::Expression => {
                if let Some(expr) = self.get_expression(node) {
                    out.extend(expr.children.iter().copied());
                }
            }
        }
        out.retain(|child| child.is_some());
        out
    }

    // -------------------------------------------------------------------------
    // Node creation (children before parents)
    // -------------------------------------------------------------------------

    fn push_node(&mut self, kind: NodeKind, span: Span, data_index: usize) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            span,
            data_index: data_index as u32,
        });
        self.extended_info.push(ExtendedNodeInfo::default());
        idx
    }

    fn adopt(&mut self, parent: NodeIndex, child: NodeIndex) {
        if child.is_none() {
            return;
        }
        if let Some(ext) = self.extended_info.get_mut(child.0 as usize) {
            ext.parent = parent;
        }
    }

    pub fn add_source_file(&mut self, statements: Vec<NodeIndex>, span: Span) -> NodeIndex {
        self.add_container(NodeKind::SourceFile, statements, span)
    }

    pub fn add_block(&mut self, statements: Vec<NodeIndex>, span: Span) -> NodeIndex {
        self.add_container(NodeKind::Block, statements, span)
    }

    fn add_container(&mut self, kind: NodeKind, statements: Vec<NodeIndex>, span: Span) -> NodeIndex {
        let data_index = self.blocks.len();
        let children = statements.clone();
        self.blocks.push(BlockData { statements });
        let idx = self.push_node(kind, span, data_index);
        for child in children {
            self.adopt(idx, child);
        }
        idx
    }

    /// Add a function-like node. `kind` must satisfy
    /// [`NodeKind::is_function_like`]; other kinds are recorded as
    /// function declarations.
    pub fn add_function(
        &mut self,
        kind: NodeKind,
        return_type_annotation: Option<&str>,
        body: NodeIndex,
        span: Span,
    ) -> NodeIndex {
        let kind = if kind.is_function_like() {
            kind
        } else {
            NodeKind::FunctionDeclaration
        };
        let return_type_annotation = return_type_annotation.map(|text| self.interner.intern(text));
        let data_index = self.functions.len();
        self.functions.push(FunctionData {
            return_type_annotation,
            body,
        });
        let idx = self.push_node(kind, span, data_index);
        self.adopt(idx, body);
        idx
    }

    pub fn add_return(&mut self, expression: NodeIndex, span: Span) -> NodeIndex {
        let data_index = self.returns.len();
        self.returns.push(ReturnData { expression });
        let idx = self.push_node(NodeKind::ReturnStatement, span, data_index);
        self.adopt(idx, expression);
        idx
    }

    pub fn add_expression(&mut self, children: Vec<NodeIndex>, span: Span) -> NodeIndex {
        let data_index = self.expressions.len();
        let owned = children.clone();
        self.expressions.push(ExpressionData { children });
        let idx = self.push_node(NodeKind::Expression, span, data_index);
        for child in owned {
            self.adopt(idx, child);
        }
        idx
    }

    pub fn add_expression_statement(&mut self, expression: NodeIndex, span: Span) -> NodeIndex {
        let data_index = self.expr_statements.len();
        self.expr_statements.push(ExpressionStatementData { expression });
        let idx = self.push_node(NodeKind::ExpressionStatement, span, data_index);
        self.adopt(idx, expression);
        idx
    }
}

#[cfg(test)]
#[path = "../tests/node_tests.rs"]
mod tests;
