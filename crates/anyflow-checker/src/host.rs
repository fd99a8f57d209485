//! The host collaborator the driver queries.

use crate::node::{NodeArena, NodeIndex};
use anyflow_solver::{TypeDatabase, TypeId, TypeInterner};
use rustc_hash::FxHashMap;

/// Interface to a type-checked program.
///
/// The driver only reads through this trait; the host owns the syntax tree
/// and the type graph, and keeps both alive for the duration of a check.
pub trait CheckerHost {
    /// Get access to the node arena for AST traversal.
    fn arena(&self) -> &NodeArena;

    /// The type graph node types point into.
    fn types(&self) -> &dyn TypeDatabase;

    /// Get the resolved type of an expression or function node.
    ///
    /// Returns [`TypeId::NONE`] when the host has no type for the node.
    fn get_type_of_node(&self, idx: NodeIndex) -> TypeId;

    /// Name of the file being checked, used in rendered diagnostics.
    fn file_name(&self) -> &str {
        ""
    }
}

/// An in-memory program: a syntax arena, a type graph, and the type of
/// each node, as recorded by whoever checked the program.
pub struct TypedProgram {
    pub arena: NodeArena,
    pub types: TypeInterner,
    node_types: FxHashMap<NodeIndex, TypeId>,
    file_name: String,
}

impl TypedProgram {
    pub fn new(file_name: impl Into<String>) -> Self {
        TypedProgram {
            arena: NodeArena::new(),
            types: TypeInterner::new(),
            node_types: FxHashMap::default(),
            file_name: file_name.into(),
        }
    }

    /// Record the type of a node, replacing any earlier one.
    pub fn set_type(&mut self, idx: NodeIndex, ty: TypeId) {
        self.node_types.insert(idx, ty);
    }
}

impl CheckerHost for TypedProgram {
    fn arena(&self) -> &NodeArena {
        &self.arena
    }

    fn types(&self) -> &dyn TypeDatabase {
        &self.types
    }

    fn get_type_of_node(&self, idx: NodeIndex) -> TypeId {
        self.node_types.get(&idx).copied().unwrap_or(TypeId::NONE)
    }

    fn file_name(&self) -> &str {
        &self.file_name
    }
}
