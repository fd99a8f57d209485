//! Type interning for structural deduplication.
//!
//! This module implements the interning engine that converts [`TypeData`]
//! structures into lightweight [`TypeId`] handles.
//!
//! Benefits:
//! - O(1) type identity (just compare TypeId values)
//! - Memory efficient (each unique structure stored once)
//! - Cycles can only be formed through [`TypeData::Lazy`] definitions, so
//!   every structural walk over non-lazy data terminates

use crate::types::*;
use anyflow_common::interner::{Atom, Interner};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

const TYPE_LIST_INLINE: usize = 8;

type TypeListBuffer = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

#[derive(Default)]
struct TypeTable {
    key_to_index: FxHashMap<TypeData, u32>,
    index_to_key: Vec<TypeData>,
}

struct SliceInterner<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T> SliceInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: Vec<T>) -> u32 {
        if items.is_empty() {
            return 0;
        }

        if let Some(&id) = self.map.get(items.as_slice()) {
            return id;
        }

        let arc: Arc<[T]> = items.into();
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<[T]>> {
        self.items.get(id as usize).cloned()
    }
}

struct ValueInterner<T> {
    items: Vec<Arc<T>>,
    map: FxHashMap<Arc<T>, u32>,
}

impl<T> ValueInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        ValueInterner {
            items: Vec::new(),
            map: FxHashMap::default(),
        }
    }

    fn intern(&mut self, value: T) -> u32 {
        if let Some(&id) = self.map.get(&value) {
            return id;
        }

        let arc = Arc::new(value);
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<T>> {
        self.items.get(id as usize).cloned()
    }
}

/// Type interning table.
/// Thread-safe via RwLock for concurrent access.
pub struct TypeInterner {
    types: RwLock<TypeTable>,
    /// String interner for reference, parameter and definition names.
    pub string_interner: Interner,
    type_lists: RwLock<SliceInterner<TypeId>>,
    applications: RwLock<ValueInterner<TypeApplication>>,
    function_shapes: RwLock<ValueInterner<FunctionShape>>,
    callable_shapes: RwLock<ValueInterner<CallableShape>>,
    definitions: RwLock<Vec<DefinitionInfo>>,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    /// Create a new type interner with pre-registered intrinsics.
    pub fn new() -> Self {
        TypeInterner {
            types: RwLock::new(TypeTable::default()),
            string_interner: {
                let interner = Interner::new();
                interner.intern_common();
                interner
            },
            type_lists: RwLock::new(SliceInterner::new()),
            applications: RwLock::new(ValueInterner::new()),
            function_shapes: RwLock::new(ValueInterner::new()),
            callable_shapes: RwLock::new(ValueInterner::new()),
            definitions: RwLock::new(Vec::new()),
        }
    }

    pub fn intern_string(&self, s: &str) -> Atom {
        self.string_interner.intern(s)
    }

    pub fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.string_interner.resolve(atom)
    }

    pub fn type_list(&self, id: TypeListId) -> Option<Arc<[TypeId]>> {
        self.type_lists
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0)
    }

    pub fn type_application(&self, id: TypeApplicationId) -> Option<Arc<TypeApplication>> {
        self.applications
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0)
    }

    pub fn function_shape(&self, id: FunctionShapeId) -> Option<Arc<FunctionShape>> {
        self.function_shapes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0)
    }

    pub fn callable_shape(&self, id: CallableShapeId) -> Option<Arc<CallableShape>> {
        self.callable_shapes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0)
    }

    pub fn definition(&self, def: DefId) -> Option<DefinitionInfo> {
        self.definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(def.0 as usize)
            .cloned()
    }

    /// Intern a type structure, returning its handle.
    pub fn intern(&self, key: TypeData) -> TypeId {
        if let Some(id) = intrinsic_id(&key) {
            return id;
        }

        {
            let table = self.types.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(&index) = table.key_to_index.get(&key) {
                return TypeId(TypeId::FIRST_USER + index);
            }
        }

        let mut table = self.types.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(&index) = table.key_to_index.get(&key) {
            return TypeId(TypeId::FIRST_USER + index);
        }
        let index = table.index_to_key.len() as u32;
        table.index_to_key.push(key.clone());
        table.key_to_index.insert(key, index);
        TypeId(TypeId::FIRST_USER + index)
    }

    /// Look up the structure behind a handle.
    ///
    /// Returns `None` for [`TypeId::NONE`] and for handles this interner
    /// never produced.
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        if id.is_intrinsic() {
            return intrinsic_key(id);
        }
        let table = self.types.read().unwrap_or_else(PoisonError::into_inner);
        table
            .index_to_key
            .get((id.0 - TypeId::FIRST_USER) as usize)
            .cloned()
    }

    /// Number of interned non-intrinsic types.
    pub fn len(&self) -> usize {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .index_to_key
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Convenience methods for common type constructions
    // =========================================================================

    pub fn intrinsic(&self, kind: IntrinsicKind) -> TypeId {
        kind.to_type_id()
    }

    pub fn literal_string(&self, value: &str) -> TypeId {
        let atom = self.intern_string(value);
        self.intern(TypeData::Literal(LiteralValue::String(atom)))
    }

    pub fn literal_number(&self, value: f64) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Number(OrderedFloat(value))))
    }

    pub fn literal_boolean(&self, value: bool) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Boolean(value)))
    }

    /// Intern a union type, flattening nested unions and deduplicating
    /// members. Reductions such as `any | T` are the host's business and
    /// are not applied here.
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat: TypeListBuffer = SmallVec::new();
        for member in members {
            if let Some(TypeData::Union(inner)) = self.lookup(member) {
                if let Some(list) = self.type_list(inner) {
                    flat.extend(list.iter().copied());
                    continue;
                }
            }
            flat.push(member);
        }
        flat.sort_unstable();
        flat.dedup();

        match flat.len() {
            0 => TypeId::NEVER,
            1 => flat[0],
            _ => {
                let list = self.intern_type_list(flat.into_vec());
                self.intern(TypeData::Union(list))
            }
        }
    }

    pub fn union2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.union(vec![left, right])
    }

    pub fn intersection(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat: TypeListBuffer = members.into_iter().collect();
        flat.sort_unstable();
        flat.dedup();

        match flat.len() {
            0 => TypeId::UNKNOWN,
            1 => flat[0],
            _ => {
                let list = self.intern_type_list(flat.into_vec());
                self.intern(TypeData::Intersection(list))
            }
        }
    }

    pub fn array(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array(element))
    }

    pub fn readonly_array(&self, element: TypeId) -> TypeId {
        let array = self.array(element);
        self.intern(TypeData::ReadonlyType(array))
    }

    pub fn tuple(&self, elements: Vec<TypeId>) -> TypeId {
        let list = self.intern_type_list(elements);
        self.intern(TypeData::Tuple(list))
    }

    pub fn readonly_tuple(&self, elements: Vec<TypeId>) -> TypeId {
        let tuple = self.tuple(elements);
        self.intern(TypeData::ReadonlyType(tuple))
    }

    /// Intern a nominal declared type by name (e.g. `Promise`).
    pub fn reference(&self, name: &str) -> TypeId {
        let atom = self.intern_string(name);
        self.intern(TypeData::Reference(atom))
    }

    /// Intern a generic instantiation `base<args>`.
    pub fn application(&self, base: TypeId, args: Vec<TypeId>) -> TypeId {
        let id = self
            .applications
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .intern(TypeApplication { base, args });
        self.intern(TypeData::Application(TypeApplicationId(id)))
    }

    pub fn function(&self, shape: FunctionShape) -> TypeId {
        let id = self
            .function_shapes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .intern(shape);
        self.intern(TypeData::Function(FunctionShapeId(id)))
    }

    pub fn callable(&self, shape: CallableShape) -> TypeId {
        let id = self
            .callable_shapes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .intern(shape);
        self.intern(TypeData::Callable(CallableShapeId(id)))
    }

    pub fn type_param(&self, name: &str) -> TypeId {
        let atom = self.intern_string(name);
        self.intern(TypeData::TypeParameter(atom))
    }

    /// Register a deferred definition and return its id together with the
    /// lazy handle that refers to it. The body is attached later with
    /// [`set_definition_body`](Self::set_definition_body), which allows the
    /// body to mention the lazy handle itself.
    pub fn define_lazy(&self, name: &str) -> (DefId, TypeId) {
        let name = self.intern_string(name);
        let def = {
            let mut defs = self.definitions.write().unwrap_or_else(PoisonError::into_inner);
            let def = DefId(defs.len() as u32);
            defs.push(DefinitionInfo { name, body: None });
            def
        };
        (def, self.intern(TypeData::Lazy(def)))
    }

    /// Attach the body of a deferred definition. Returns `false` if the
    /// definition does not exist.
    pub fn set_definition_body(&self, def: DefId, body: TypeId) -> bool {
        let mut defs = self.definitions.write().unwrap_or_else(PoisonError::into_inner);
        match defs.get_mut(def.0 as usize) {
            Some(info) => {
                info.body = Some(body);
                true
            }
            None => false,
        }
    }

    fn intern_type_list(&self, members: Vec<TypeId>) -> TypeListId {
        let id = self
            .type_lists
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .intern(members);
        TypeListId(id)
    }
}

fn intrinsic_id(key: &TypeData) -> Option<TypeId> {
    match key {
        TypeData::Intrinsic(kind) => Some(kind.to_type_id()),
        TypeData::Error => Some(TypeId::ERROR),
        _ => None,
    }
}

fn intrinsic_key(id: TypeId) -> Option<TypeData> {
    let kind = match id {
        TypeId::ERROR => return Some(TypeData::Error),
        TypeId::NEVER => IntrinsicKind::Never,
        TypeId::UNKNOWN => IntrinsicKind::Unknown,
        TypeId::ANY => IntrinsicKind::Any,
        TypeId::VOID => IntrinsicKind::Void,
        TypeId::UNDEFINED => IntrinsicKind::Undefined,
        TypeId::NULL => IntrinsicKind::Null,
        TypeId::BOOLEAN => IntrinsicKind::Boolean,
        TypeId::NUMBER => IntrinsicKind::Number,
        TypeId::STRING => IntrinsicKind::String,
        TypeId::BIGINT => IntrinsicKind::Bigint,
        TypeId::SYMBOL => IntrinsicKind::Symbol,
        TypeId::OBJECT => IntrinsicKind::Object,
        _ => return None,
    };
    Some(TypeData::Intrinsic(kind))
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
