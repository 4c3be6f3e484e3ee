//! Type environment: a scoped, persistent mapping from names to type
//! schemes (spec §3, §4.6).
//!
//! The teacher's `TypeContext::child()` shares scope by cloning the whole
//! parent into a fresh `Box` on every push. Spec §3 calls for outer frames
//! to be genuinely *shared* rather than copied ("functional-style
//! persistent; inner frames disappear when the scope exits"), so frames
//! here use `im::HashMap`, which gives that sharing via structural
//! sharing instead of a deep clone per scope.

use std::collections::HashSet;

use im::HashMap as PersistentMap;

use crate::scheme::TypeScheme;
use crate::substitution::Substitution;
use crate::types::{Type, TypeVariable};

#[derive(Debug, Clone)]
pub struct TypeEnvironment {
    /// Innermost frame last. Lookup scans from the end backwards.
    frames: Vec<PersistentMap<String, TypeScheme>>,
}

impl TypeEnvironment {
    pub fn new() -> Self {
        Self {
            frames: vec![PersistentMap::new()],
        }
    }

    /// Push a new, empty frame (spec §3 `openScope()`).
    pub fn open_scope(&self) -> Self {
        let mut frames = self.frames.clone();
        frames.push(PersistentMap::new());
        Self { frames }
    }

    /// Bind `name` to a type scheme in the current (innermost) frame,
    /// shadowing any outer binding for the lifetime of that frame.
    pub fn bind(&self, name: impl Into<String>, scheme: TypeScheme) -> Self {
        let mut frames = self.frames.clone();
        let top = frames.last_mut().expect("at least one frame always exists");
        *top = top.update(name.into(), scheme);
        Self { frames }
    }

    /// Monomorphic shorthand for `bind` (spec §3 `extend(name, type)`).
    pub fn extend(&self, name: impl Into<String>, ty: Type) -> Self {
        self.bind(name, TypeScheme::monomorphic(ty))
    }

    /// Look up a name, scanning from the innermost frame outward.
    pub fn lookup(&self, name: &str) -> Option<&TypeScheme> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Union over every reachable scheme's free variables, after applying
    /// the current substitution (spec §4.6 — "the solver re-queries this at
    /// generalisation").
    pub fn free_variables(&self, current_substitution: &Substitution) -> HashSet<TypeVariable> {
        let mut result = HashSet::new();
        for frame in &self.frames {
            for scheme in frame.values() {
                let substituted_body = current_substitution.apply(&scheme.body);
                let substituted = TypeScheme::polymorphic(scheme.quantified.clone(), substituted_body);
                result.extend(substituted.free_variables());
            }
        }
        result
    }
}

impl Default for TypeEnvironment {
    fn default() -> Self {
        Self::new()
    }
}
