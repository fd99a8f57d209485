//! String interner for type, parameter and declaration names.
//!
//! Names are interned into a shared pool and passed around as u32 indices
//! (Atoms). Comparisons become integer comparisons (`atom_a == atom_b`).
//!
//! The interner is internally synchronized so it can be shared behind `&self`
//! by the type interner, which is itself `Send + Sync`.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
/// To get the actual string, use [`Interner::resolve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    /// Check if this is the empty/none atom.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Names the analyzer formats most often. Pre-interning them keeps the
/// atoms for builtin generic origins small and stable.
const COMMON_STRINGS: &[&str] = &[
    "Array",
    "ReadonlyArray",
    "Promise",
    "Map",
    "Set",
    "ReadonlyMap",
    "ReadonlySet",
    "Record",
    "Partial",
    "Iterable",
    "Iterator",
    "AsyncIterable",
    "Generator",
    "T",
    "U",
    "K",
    "V",
    "value",
    "key",
    "args",
];

#[derive(Default)]
struct InternerState {
    map: FxHashMap<Arc<str>, Atom>,
    strings: Vec<Arc<str>>,
}

/// String interner that deduplicates strings and returns Atom handles.
///
/// # Example
/// ```
/// use anyflow_common::interner::Interner;
/// let interner = Interner::new();
/// let a1 = interner.intern("hello");
/// let a2 = interner.intern("hello");
/// assert_eq!(a1, a2);
/// assert_eq!(&*interner.resolve(a1), "hello");
/// ```
pub struct Interner {
    state: RwLock<InternerState>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    /// Create a new interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let mut state = InternerState::default();
        let empty: Arc<str> = Arc::from("");
        state.strings.push(empty.clone());
        state.map.insert(empty, Atom::NONE);
        Interner {
            state: RwLock::new(state),
        }
    }

    /// Intern a string, returning its Atom handle.
    /// If the string was already interned, returns the existing Atom.
    pub fn intern(&self, s: &str) -> Atom {
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(&atom) = state.map.get(s) {
                return atom;
            }
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have won the race between the two locks.
        if let Some(&atom) = state.map.get(s) {
            return atom;
        }
        let atom = Atom(state.strings.len() as u32);
        let owned: Arc<str> = Arc::from(s);
        state.strings.push(owned.clone());
        state.map.insert(owned, atom);
        atom
    }

    /// Resolve an Atom back to its string value.
    /// Returns the empty string if the atom is out of bounds.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.try_resolve(atom).unwrap_or_else(|| Arc::from(""))
    }

    /// Try to resolve an Atom, returning None if invalid.
    pub fn try_resolve(&self, atom: Atom) -> Option<Arc<str>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.strings.get(atom.0 as usize).cloned()
    }

    /// Get the number of interned strings.
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .strings
            .len()
    }

    /// Check if the interner is empty (only has the empty string).
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Pre-intern the builtin generic origins and common parameter names.
    pub fn intern_common(&self) {
        for s in COMMON_STRINGS {
            self.intern(s);
        }
    }
}
