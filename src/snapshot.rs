//! Program snapshots: a JSON description of one type-checked file.
//!
//! A snapshot carries the syntax tree of the file, the type graph its nodes
//! point into, and the resolved type of every node the checker asks about.
//! It stands in for a live type-checking engine in the CLI and in tests.
//!
//! ```json
//! {
//!   "file": "a.ts",
//!   "types": [
//!     { "kind": "intrinsic", "name": "any" },
//!     { "kind": "intrinsic", "name": "string" },
//!     { "kind": "function", "return_type": 1 }
//!   ],
//!   "root": {
//!     "kind": "block",
//!     "statements": [{
//!       "kind": "function", "flavor": "declaration", "type": 2,
//!       "return_type": "string",
//!       "body": { "kind": "block", "statements": [
//!         { "kind": "return", "expression": { "kind": "expression", "type": 0 } }
//!       ]}
//!     }]
//!   }
//! }
//! ```
//!
//! Type entries refer to each other by position in `types`. Only `alias`
//! entries may take part in cycles; they become deferred definitions whose
//! bodies are attached once every other entry is interned.

use anyflow_checker::{CheckerHost, NodeArena, NodeIndex, NodeKind, TypedProgram};
use anyflow_common::span::Span;
use anyflow_solver::{
    CallSignature, CallableShape, DefId, FunctionShape, IntrinsicKind, ParamInfo, TypeDatabase,
    TypeId, TypeInterner,
};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("could not read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("type #{index}: unknown intrinsic `{name}`")]
    UnknownIntrinsic { index: usize, name: String },

    #[error("{referrer} refers to type #{target}, but the snapshot has {count} types")]
    DanglingTypeIndex {
        referrer: String,
        target: usize,
        count: usize,
    },

    #[error("type #{index} is part of a cycle that does not pass through an alias")]
    CycleWithoutAlias { index: usize },

    #[error("the snapshot root must be a block")]
    RootNotBlock,
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramSnapshot {
    pub file: String,
    /// Source text of the file, used for locations and snippets.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeEntry>,
    pub root: NodeEntry,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeEntry {
    Intrinsic {
        name: String,
    },
    StringLiteral {
        value: String,
    },
    NumberLiteral {
        value: f64,
    },
    BooleanLiteral {
        value: bool,
    },
    Array {
        element: usize,
    },
    ReadonlyArray {
        element: usize,
    },
    Tuple {
        elements: Vec<usize>,
        #[serde(default)]
        readonly: bool,
    },
    Union {
        members: Vec<usize>,
    },
    Intersection {
        members: Vec<usize>,
    },
    Reference {
        name: String,
    },
    Application {
        base: usize,
        args: Vec<usize>,
    },
    Function(SignatureEntry),
    Callable {
        signatures: Vec<SignatureEntry>,
    },
    TypeParameter {
        name: String,
    },
    Alias {
        name: String,
        /// Absent for a definition whose body never resolved.
        #[serde(default)]
        target: Option<usize>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignatureEntry {
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub params: Vec<ParamEntry>,
    pub return_type: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParamEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_index: usize,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub rest: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionFlavor {
    Declaration,
    Expression,
    Arrow,
    Method,
}

impl FunctionFlavor {
    fn node_kind(self) -> NodeKind {
        match self {
            FunctionFlavor::Declaration => NodeKind::FunctionDeclaration,
            FunctionFlavor::Expression => NodeKind::FunctionExpression,
            FunctionFlavor::Arrow => NodeKind::ArrowFunction,
            FunctionFlavor::Method => NodeKind::MethodDeclaration,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeEntry {
    Block {
        #[serde(default)]
        statements: Vec<NodeEntry>,
        #[serde(default)]
        start: u32,
        #[serde(default)]
        length: u32,
    },
    Function {
        flavor: FunctionFlavor,
        #[serde(rename = "type", default)]
        type_index: Option<usize>,
        /// Text of the declared return type, when written in source.
        #[serde(default)]
        return_type: Option<String>,
        body: Box<NodeEntry>,
        #[serde(default)]
        start: u32,
        #[serde(default)]
        length: u32,
    },
    Return {
        #[serde(default)]
        expression: Option<Box<NodeEntry>>,
        #[serde(default)]
        start: u32,
        #[serde(default)]
        length: u32,
    },
    Expression {
        #[serde(rename = "type", default)]
        type_index: Option<usize>,
        #[serde(default)]
        children: Vec<NodeEntry>,
        #[serde(default)]
        start: u32,
        #[serde(default)]
        length: u32,
    },
    ExpressionStatement {
        expression: Box<NodeEntry>,
        #[serde(default)]
        start: u32,
        #[serde(default)]
        length: u32,
    },
}

// =============================================================================
// Loaded program
// =============================================================================

/// A loaded snapshot: the program plus the index of its source-file node.
pub struct SnapshotHost {
    program: TypedProgram,
    root: NodeIndex,
    source: Option<String>,
}

impl SnapshotHost {
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn program(&self) -> &TypedProgram {
        &self.program
    }
}

impl CheckerHost for SnapshotHost {
    fn arena(&self) -> &NodeArena {
        &self.program.arena
    }

    fn types(&self) -> &dyn TypeDatabase {
        &self.program.types
    }

    fn get_type_of_node(&self, idx: NodeIndex) -> TypeId {
        self.program.get_type_of_node(idx)
    }

    fn file_name(&self) -> &str {
        self.program.file_name()
    }
}

pub fn load_snapshot_file(path: &Path) -> Result<SnapshotHost, SnapshotError> {
    let text = std::fs::read_to_string(path)?;
    load_snapshot_str(&text)
}

pub fn load_snapshot_str(text: &str) -> Result<SnapshotHost, SnapshotError> {
    let snapshot: ProgramSnapshot = serde_json::from_str(text)?;
    load_snapshot(snapshot)
}

/// Build a checkable program from a parsed snapshot.
pub fn load_snapshot(snapshot: ProgramSnapshot) -> Result<SnapshotHost, SnapshotError> {
    let ProgramSnapshot {
        file,
        source,
        types,
        root,
    } = snapshot;

    let mut program = TypedProgram::new(file);
    let type_ids = TypeGraphBuilder::new(&program.types, &types).build()?;

    let NodeEntry::Block {
        statements,
        start,
        length,
    } = root
    else {
        return Err(SnapshotError::RootNotBlock);
    };

    let mut builder = TreeBuilder {
        program: &mut program,
        type_ids: &type_ids,
    };
    let statements = statements
        .iter()
        .map(|statement| builder.add_node(statement))
        .collect::<Result<Vec<_>, _>>()?;
    let root = program
        .arena
        .add_source_file(statements, Span::at(start, length));

    debug!(
        file = program.file_name(),
        nodes = program.arena.len(),
        types = type_ids.len(),
        "snapshot loaded"
    );

    Ok(SnapshotHost {
        program,
        root,
        source,
    })
}

// =============================================================================
// Type graph
// =============================================================================

#[derive(Clone, Copy)]
enum Slot {
    Pending,
    /// Dependencies are being interned; the entry itself is not yet.
    InProgress,
    Done(TypeId),
}

struct TypeGraphBuilder<'a> {
    types: &'a TypeInterner,
    entries: &'a [TypeEntry],
    slots: Vec<Slot>,
    aliases: Vec<(DefId, usize)>,
}

impl<'a> TypeGraphBuilder<'a> {
    fn new(types: &'a TypeInterner, entries: &'a [TypeEntry]) -> Self {
        TypeGraphBuilder {
            types,
            entries,
            slots: vec![Slot::Pending; entries.len()],
            aliases: Vec::new(),
        }
    }

    fn build(mut self) -> Result<Vec<TypeId>, SnapshotError> {
        // Aliases get their lazy handles up front so that any entry can refer
        // to them without looking into the alias body.
        for (index, entry) in self.entries.iter().enumerate() {
            if let TypeEntry::Alias { name, target } = entry {
                let (def, lazy) = self.types.define_lazy(name);
                self.slots[index] = Slot::Done(lazy);
                if let Some(target) = *target {
                    self.aliases.push((def, target));
                }
            }
        }

        for index in 0..self.entries.len() {
            self.resolve(index)?;
        }

        for &(def, target) in &self.aliases {
            let body = self.lookup_done(target, &format!("alias #{}", def.0))?;
            self.types.set_definition_body(def, body);
        }

        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| match slot {
                Slot::Done(id) => Ok(*id),
                _ => Err(SnapshotError::CycleWithoutAlias { index }),
            })
            .collect()
    }

    fn lookup_done(&self, target: usize, referrer: &str) -> Result<TypeId, SnapshotError> {
        match self.slots.get(target) {
            Some(Slot::Done(id)) => Ok(*id),
            Some(_) => Err(SnapshotError::CycleWithoutAlias { index: target }),
            None => Err(self.dangling(referrer.to_string(), target)),
        }
    }

    fn dangling(&self, referrer: String, target: usize) -> SnapshotError {
        SnapshotError::DanglingTypeIndex {
            referrer,
            target,
            count: self.entries.len(),
        }
    }

    /// Intern entry `root` after everything it depends on.
    ///
    /// Depth-first over an explicit stack: an entry is expanded once
    /// (pushing its pending dependencies) and interned when it surfaces
    /// again. Meeting an expanded but unfinished entry while expanding is a
    /// cycle.
    fn resolve(&mut self, root: usize) -> Result<TypeId, SnapshotError> {
        let mut stack = vec![root];
        while let Some(&index) = stack.last() {
            match self.slots[index] {
                Slot::Done(_) => {
                    stack.pop();
                }
                Slot::InProgress => {
                    let id = self.intern_entry(index)?;
                    self.slots[index] = Slot::Done(id);
                    stack.pop();
                }
                Slot::Pending => {
                    self.slots[index] = Slot::InProgress;
                    for dependency in dependencies(&self.entries[index]) {
                        match self.slots.get(dependency) {
                            None => {
                                return Err(self.dangling(format!("type #{index}"), dependency));
                            }
                            Some(Slot::InProgress) => {
                                return Err(SnapshotError::CycleWithoutAlias { index: dependency });
                            }
                            Some(Slot::Pending) => stack.push(dependency),
                            Some(Slot::Done(_)) => {}
                        }
                    }
                }
            }
        }
        self.lookup_done(root, "snapshot")
    }

    /// Intern entry `index`; every dependency is already done.
    fn intern_entry(&self, index: usize) -> Result<TypeId, SnapshotError> {
        let types = self.types;
        let referrer = format!("type #{index}");
        let done = |target: usize| self.lookup_done(target, &referrer);
        let all_done = |targets: &[usize]| -> Result<Vec<TypeId>, SnapshotError> {
            targets.iter().map(|&target| done(target)).collect()
        };

        Ok(match &self.entries[index] {
            TypeEntry::Intrinsic { name } => match IntrinsicKind::from_name(name) {
                Some(kind) => types.intrinsic(kind),
                None => {
                    return Err(SnapshotError::UnknownIntrinsic {
                        index,
                        name: name.clone(),
                    });
                }
            },
            TypeEntry::StringLiteral { value } => types.literal_string(value),
            TypeEntry::NumberLiteral { value } => types.literal_number(*value),
            TypeEntry::BooleanLiteral { value } => types.literal_boolean(*value),
            TypeEntry::Array { element } => types.array(done(*element)?),
            TypeEntry::ReadonlyArray { element } => types.readonly_array(done(*element)?),
            TypeEntry::Tuple { elements, readonly } => {
                let elements = all_done(elements)?;
                if *readonly {
                    types.readonly_tuple(elements)
                } else {
                    types.tuple(elements)
                }
            }
            TypeEntry::Union { members } => types.union(all_done(members)?),
            TypeEntry::Intersection { members } => types.intersection(all_done(members)?),
            TypeEntry::Reference { name } => types.reference(name),
            TypeEntry::Application { base, args } => {
                types.application(done(*base)?, all_done(args)?)
            }
            TypeEntry::Function(signature) => {
                let signature = self.signature(signature, &done)?;
                types.function(FunctionShape {
                    type_params: signature.type_params,
                    params: signature.params,
                    return_type: signature.return_type,
                })
            }
            TypeEntry::Callable { signatures } => {
                let call_signatures = signatures
                    .iter()
                    .map(|signature| self.signature(signature, &done))
                    .collect::<Result<Vec<_>, _>>()?;
                types.callable(CallableShape { call_signatures })
            }
            TypeEntry::TypeParameter { name } => types.type_param(name),
            // Given a lazy handle in `build`.
            TypeEntry::Alias { .. } => done(index)?,
        })
    }

    fn signature(
        &self,
        entry: &SignatureEntry,
        done: &dyn Fn(usize) -> Result<TypeId, SnapshotError>,
    ) -> Result<CallSignature, SnapshotError> {
        let params = entry
            .params
            .iter()
            .map(|param| {
                Ok(ParamInfo {
                    name: param.name.as_deref().map(|name| self.types.intern_string(name)),
                    type_id: done(param.type_index)?,
                    optional: param.optional,
                    rest: param.rest,
                })
            })
            .collect::<Result<Vec<_>, SnapshotError>>()?;
        Ok(CallSignature {
            type_params: entry
                .type_params
                .iter()
                .map(|name| self.types.intern_string(name))
                .collect(),
            params,
            return_type: done(entry.return_type)?,
        })
    }
}

/// Type entries `entry` refers to, in source order.
fn dependencies(entry: &TypeEntry) -> Vec<usize> {
    fn signature_dependencies(signature: &SignatureEntry, out: &mut Vec<usize>) {
        out.extend(signature.params.iter().map(|param| param.type_index));
        out.push(signature.return_type);
    }

    let mut out = Vec::new();
    match entry {
        TypeEntry::Array { element } | TypeEntry::ReadonlyArray { element } => out.push(*element),
        TypeEntry::Tuple { elements, .. } => out.extend_from_slice(elements),
        TypeEntry::Union { members } | TypeEntry::Intersection { members } => {
            out.extend_from_slice(members)
        }
        TypeEntry::Application { base, args } => {
            out.push(*base);
            out.extend_from_slice(args);
        }
        TypeEntry::Function(signature) => signature_dependencies(signature, &mut out),
        TypeEntry::Callable { signatures } => {
            for signature in signatures {
                signature_dependencies(signature, &mut out);
            }
        }
        // Aliases are resolved lazily and never block their referrers.
        TypeEntry::Alias { .. }
        | TypeEntry::Intrinsic { .. }
        | TypeEntry::StringLiteral { .. }
        | TypeEntry::NumberLiteral { .. }
        | TypeEntry::BooleanLiteral { .. }
        | TypeEntry::Reference { .. }
        | TypeEntry::TypeParameter { .. } => {}
    }
    out
}

// =============================================================================
// Syntax tree
// =============================================================================

struct TreeBuilder<'a> {
    program: &'a mut TypedProgram,
    type_ids: &'a [TypeId],
}

impl TreeBuilder<'_> {
    /// Add `entry` and its subtree, children first, and record node types.
    fn add_node(&mut self, entry: &NodeEntry) -> Result<NodeIndex, SnapshotError> {
        let (idx, type_index) = match entry {
            NodeEntry::Block {
                statements,
                start,
                length,
            } => {
                let statements = statements
                    .iter()
                    .map(|statement| self.add_node(statement))
                    .collect::<Result<Vec<_>, _>>()?;
                let idx = self
                    .program
                    .arena
                    .add_block(statements, Span::at(*start, *length));
                (idx, None)
            }
            NodeEntry::Function {
                flavor,
                type_index,
                return_type,
                body,
                start,
                length,
            } => {
                let body = self.add_node(body)?;
                let idx = self.program.arena.add_function(
                    flavor.node_kind(),
                    return_type.as_deref(),
                    body,
                    Span::at(*start, *length),
                );
                (idx, *type_index)
            }
            NodeEntry::Return {
                expression,
                start,
                length,
            } => {
                let expression = match expression {
                    Some(expression) => self.add_node(expression)?,
                    None => NodeIndex::NONE,
                };
                let idx = self
                    .program
                    .arena
                    .add_return(expression, Span::at(*start, *length));
                (idx, None)
            }
            NodeEntry::Expression {
                type_index,
                children,
                start,
                length,
            } => {
                let children = children
                    .iter()
                    .map(|child| self.add_node(child))
                    .collect::<Result<Vec<_>, _>>()?;
                let idx = self
                    .program
                    .arena
                    .add_expression(children, Span::at(*start, *length));
                (idx, *type_index)
            }
            NodeEntry::ExpressionStatement {
                expression,
                start,
                length,
            } => {
                let expression = self.add_node(expression)?;
                let idx = self
                    .program
                    .arena
                    .add_expression_statement(expression, Span::at(*start, *length));
                (idx, None)
            }
        };

        if let Some(type_index) = type_index {
            let Some(&ty) = self.type_ids.get(type_index) else {
                return Err(SnapshotError::DanglingTypeIndex {
                    referrer: format!("node {idx}"),
                    target: type_index,
                    count: self.type_ids.len(),
                });
            };
            self.program.set_type(idx, ty);
        }
        Ok(idx)
    }
}

#[cfg(test)]
#[path = "tests/snapshot_tests.rs"]
mod tests;
