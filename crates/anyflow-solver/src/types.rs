//! Type representation for the interned type graph.
//!
//! Types are stored once in the [`TypeInterner`](crate::TypeInterner) and
//! referred to by [`TypeId`] handles. Two handles are equal exactly when the
//! host considers them the same type entity, which is what the unsafe-return
//! checks rely on for their identity short-circuit.

use anyflow_common::interner::Atom;
use std::hash::{Hash, Hasher};

/// Handle to an interned type.
///
/// The low ids are reserved for intrinsics so they can be named as
/// constants; user types start at [`TypeId::FIRST_USER`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// The absent descriptor. Passing it where a type is required is a
    /// contract violation.
    pub const NONE: TypeId = TypeId(0);
    pub const ERROR: TypeId = TypeId(1);
    pub const NEVER: TypeId = TypeId(2);
    pub const UNKNOWN: TypeId = TypeId(3);
    pub const ANY: TypeId = TypeId(4);
    pub const VOID: TypeId = TypeId(5);
    pub const UNDEFINED: TypeId = TypeId(6);
    pub const NULL: TypeId = TypeId(7);
    pub const BOOLEAN: TypeId = TypeId(8);
    pub const NUMBER: TypeId = TypeId(9);
    pub const STRING: TypeId = TypeId(10);
    pub const BIGINT: TypeId = TypeId(11);
    pub const SYMBOL: TypeId = TypeId(12);
    pub const OBJECT: TypeId = TypeId(13);

    /// First id handed out to non-intrinsic types.
    pub const FIRST_USER: u32 = 100;

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    #[inline]
    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }

    #[inline]
    pub const fn is_any(self) -> bool {
        self.0 == Self::ANY.0
    }

    #[inline]
    pub const fn is_unknown(self) -> bool {
        self.0 == Self::UNKNOWN.0
    }

    #[inline]
    pub const fn is_never(self) -> bool {
        self.0 == Self::NEVER.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Any,
    Unknown,
    Never,
    Void,
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Bigint,
    Symbol,
    Object,
}

impl IntrinsicKind {
    pub const fn to_type_id(self) -> TypeId {
        match self {
            IntrinsicKind::Any => TypeId::ANY,
            IntrinsicKind::Unknown => TypeId::UNKNOWN,
            IntrinsicKind::Never => TypeId::NEVER,
            IntrinsicKind::Void => TypeId::VOID,
            IntrinsicKind::Undefined => TypeId::UNDEFINED,
            IntrinsicKind::Null => TypeId::NULL,
            IntrinsicKind::Boolean => TypeId::BOOLEAN,
            IntrinsicKind::Number => TypeId::NUMBER,
            IntrinsicKind::String => TypeId::STRING,
            IntrinsicKind::Bigint => TypeId::BIGINT,
            IntrinsicKind::Symbol => TypeId::SYMBOL,
            IntrinsicKind::Object => TypeId::OBJECT,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            IntrinsicKind::Any => "any",
            IntrinsicKind::Unknown => "unknown",
            IntrinsicKind::Never => "never",
            IntrinsicKind::Void => "void",
            IntrinsicKind::Undefined => "undefined",
            IntrinsicKind::Null => "null",
            IntrinsicKind::Boolean => "boolean",
            IntrinsicKind::Number => "number",
            IntrinsicKind::String => "string",
            IntrinsicKind::Bigint => "bigint",
            IntrinsicKind::Symbol => "symbol",
            IntrinsicKind::Object => "object",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "any" => IntrinsicKind::Any,
            "unknown" => IntrinsicKind::Unknown,
            "never" => IntrinsicKind::Never,
            "void" => IntrinsicKind::Void,
            "undefined" => IntrinsicKind::Undefined,
            "null" => IntrinsicKind::Null,
            "boolean" => IntrinsicKind::Boolean,
            "number" => IntrinsicKind::Number,
            "string" => IntrinsicKind::String,
            "bigint" => IntrinsicKind::Bigint,
            "symbol" => IntrinsicKind::Symbol,
            "object" => IntrinsicKind::Object,
            _ => return None,
        })
    }
}

/// `f64` wrapper with bitwise equality so number literals can be hashed.
#[derive(Clone, Copy, Debug)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    String(Atom),
    Number(OrderedFloat),
    Boolean(bool),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeApplicationId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShapeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallableShapeId(pub u32);

/// Identity of a deferred type definition (an alias whose body may refer
/// back to itself).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DefId(pub u32);

/// Structural description of one interned type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    Literal(LiteralValue),
    /// `T[]`
    Array(TypeId),
    /// `readonly T` wrapper, used for readonly arrays and tuples.
    ReadonlyType(TypeId),
    Tuple(TypeListId),
    Union(TypeListId),
    Intersection(TypeListId),
    /// A nominal declared type such as `Promise` or `Map`, used as the
    /// generic origin of applications.
    Reference(Atom),
    /// `Base<Args>`
    Application(TypeApplicationId),
    Function(FunctionShapeId),
    /// A type with several call signatures (overloads).
    Callable(CallableShapeId),
    TypeParameter(Atom),
    /// Deferred reference to a definition, resolved through the database.
    Lazy(DefId),
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeApplication {
    pub base: TypeId,
    pub args: Vec<TypeId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: Option<Atom>,
    pub type_id: TypeId,
    pub optional: bool,
    pub rest: bool,
}

impl ParamInfo {
    pub fn required(name: Option<Atom>, type_id: TypeId) -> Self {
        ParamInfo {
            name,
            type_id,
            optional: false,
            rest: false,
        }
    }
}

/// One declared overload shape: parameters plus a return type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallSignature {
    pub type_params: Vec<Atom>,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub type_params: Vec<Atom>,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
}

impl FunctionShape {
    pub fn signature(&self) -> CallSignature {
        CallSignature {
            type_params: self.type_params.clone(),
            params: self.params.clone(),
            return_type: self.return_type,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CallableShape {
    pub call_signatures: Vec<CallSignature>,
}

/// A registered deferred definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinitionInfo {
    pub name: Atom,
    /// `None` until the body has been lowered.
    pub body: Option<TypeId>,
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
