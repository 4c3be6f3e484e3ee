//! Type schemes: ∀ᾱ.τ (spec §3, §4.2).

use std::collections::HashSet;
use std::fmt;

use crate::substitution::Substitution;
use crate::types::{fresh_type_variable, Type, TypeVariable};

/// A polymorphic type, universally quantified over zero or more variables.
/// Monomorphic iff `quantified` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeScheme {
    pub quantified: Vec<TypeVariable>,
    pub body: Type,
}

impl TypeScheme {
    pub fn monomorphic(ty: Type) -> Self {
        Self {
            quantified: Vec::new(),
            body: ty,
        }
    }

    pub fn polymorphic(quantified: Vec<TypeVariable>, body: Type) -> Self {
        Self { quantified, body }
    }

    pub fn is_monomorphic(&self) -> bool {
        self.quantified.is_empty()
    }

    /// `freeVars(∀V.τ) = freeVars(τ) \ V` (spec §3).
    pub fn free_variables(&self) -> HashSet<TypeVariable> {
        let quantified: HashSet<TypeVariable> = self.quantified.iter().copied().collect();
        self.body
            .free_variables()
            .into_iter()
            .filter(|v| !quantified.contains(v))
            .collect()
    }

    /// Promote the free variables of `ty` that are not free in the
    /// surrounding environment into quantifiers (spec §4.2). Called at
    /// `let`/`let rec` binding sites after the bound expression's
    /// constraints are solved.
    pub fn generalize(ty: &Type, free_in_env: &HashSet<TypeVariable>) -> TypeScheme {
        let mut quantified: Vec<TypeVariable> = ty
            .free_variables()
            .into_iter()
            .filter(|v| !free_in_env.contains(v))
            .collect();
        quantified.sort();
        TypeScheme::polymorphic(quantified, ty.clone())
    }

    /// Replace every quantified variable with a fresh one and return the
    /// instantiated body along with the substitution used (spec §4.2).
    /// Each call produces variables disjoint from any previous call.
    pub fn instantiate(&self) -> (Type, Substitution) {
        let mut subst = Substitution::empty();
        for &var in &self.quantified {
            subst.insert(var, Type::Variable(fresh_type_variable()));
        }
        (subst.apply(&self.body), subst)
    }

    /// `∀V1.τ1 ≡α ∀V2.τ2` iff `|V1| = |V2|` and there is a bijection
    /// `V1 ↔ V2` that makes the bodies equal up to that substitution
    /// (spec §3). Renames `self`'s quantifiers to `other`'s positionally and
    /// compares the resulting bodies.
    pub fn is_alpha_equivalent(&self, other: &TypeScheme) -> bool {
        if self.quantified.len() != other.quantified.len() {
            return false;
        }
        let mut rename = Substitution::empty();
        for (mine, theirs) in self.quantified.iter().zip(other.quantified.iter()) {
            rename.insert(*mine, Type::Variable(*theirs));
        }
        rename.apply(&self.body) == other.body
    }
}

impl fmt::Display for TypeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.quantified.is_empty() {
            write!(f, "forall")?;
            for v in &self.quantified {
                write!(f, " {}", v)?;
            }
            write!(f, ". ")?;
        }
        write!(f, "{}", self.body)
    }
}
