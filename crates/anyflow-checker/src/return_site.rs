//! Collection of return-producing sites.
//!
//! A function hands a value back to its caller in exactly two syntactic
//! ways, modeled as the closed enum [`ReturnSite`]:
//!
//! - `return <expr>;` inside a function body
//! - the body expression of an arrow function (`() => expr`)
//!
//! `return;` without an argument produces nothing and is not a site.

use crate::error::CheckError;
use crate::node::{NodeArena, NodeIndex, NodeKind};
use anyflow_solver::recursion::{DepthCounter, RecursionProfile};
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReturnSite {
    /// `return expression;`
    Explicit {
        statement: NodeIndex,
        expression: NodeIndex,
    },
    /// `(...) => expression`
    ArrowBody {
        function: NodeIndex,
        expression: NodeIndex,
    },
}

impl ReturnSite {
    /// The returned expression.
    #[inline]
    pub fn expression(self) -> NodeIndex {
        match self {
            ReturnSite::Explicit { expression, .. } | ReturnSite::ArrowBody { expression, .. } => {
                expression
            }
        }
    }

    /// Where findings for this site are reported: the whole statement for
    /// explicit returns, the body expression for arrow bodies.
    #[inline]
    pub fn report_node(self) -> NodeIndex {
        match self {
            ReturnSite::Explicit { statement, .. } => statement,
            ReturnSite::ArrowBody { expression, .. } => expression,
        }
    }
}

/// Collect every return site under `root`, in source order.
///
/// Subtrees nested deeper than the syntax traversal limit are skipped with
/// a warning.
pub fn collect_return_sites(
    arena: &NodeArena,
    root: NodeIndex,
) -> Result<Vec<ReturnSite>, CheckError> {
    let mut collector = ReturnSiteCollector {
        arena,
        depth: DepthCounter::with_profile(RecursionProfile::SyntaxTraversal),
        sites: Vec::new(),
    };
    collector.visit(root)?;
    Ok(collector.sites)
}

struct ReturnSiteCollector<'a> {
    arena: &'a NodeArena,
    depth: DepthCounter,
    sites: Vec<ReturnSite>,
}

impl ReturnSiteCollector<'_> {
    fn visit(&mut self, idx: NodeIndex) -> Result<(), CheckError> {
        let node = *self.arena.get(idx).ok_or(CheckError::MissingNode(idx))?;

        if !self.depth.enter() {
            warn!(node = %idx, "syntax tree too deep, skipping subtree");
            return Ok(());
        }

        match node.kind {
            NodeKind::ReturnStatement => {
                if let Some(ret) = self.arena.get_return(&node)
                    && ret.expression.is_some()
                {
                    self.sites.push(ReturnSite::Explicit {
                        statement: idx,
                        expression: ret.expression,
                    });
                }
            }
            NodeKind::ArrowFunction => {
                if let Some(func) = self.arena.get_function(&node)
                    && let Some(body) = self.arena.get(func.body)
                    && body.kind != NodeKind::Block
                {
                    self.sites.push(ReturnSite::ArrowBody {
                        function: idx,
                        expression: func.body,
                    });
                }
            }
            _ => {}
        }

        let result = self.visit_children(idx);
        self.depth.leave();
        result
    }

    fn visit_children(&mut self, idx: NodeIndex) -> Result<(), CheckError> {
        for child in self.arena.children(idx) {
            self.visit(child)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/return_site_tests.rs"]
mod tests;
