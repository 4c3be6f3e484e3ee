//! Substitution: a finite mapping from type variables to types (spec §3).

use std::collections::HashMap;
use std::fmt;

use crate::types::{Fields, Row, Type, TypeVariable};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    map: HashMap<TypeVariable, Type>,
}

impl Substitution {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn singleton(var: TypeVariable, ty: Type) -> Self {
        let mut map = HashMap::new();
        map.insert(var, ty);
        Self { map }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, var: &TypeVariable) -> Option<&Type> {
        self.map.get(var)
    }

    pub fn insert(&mut self, var: TypeVariable, ty: Type) {
        self.map.insert(var, ty);
    }

    /// Apply this substitution throughout a type (spec §4.1 `apply`).
    pub fn apply(&self, ty: &Type) -> Type {
        if self.map.is_empty() {
            return ty.clone();
        }
        match ty {
            Type::Primitive(_) | Type::LiteralString(_) => ty.clone(),
            Type::Variable(v) => match self.map.get(v) {
                Some(replacement) => self.apply(replacement),
                None => ty.clone(),
            },
            Type::Function(dom, cod) => {
                Type::function(self.apply(dom), self.apply(cod))
            }
            Type::Tuple(elements) => {
                Type::Tuple(elements.iter().map(|t| self.apply(t)).collect())
            }
            Type::Record(fields, row) => {
                let fields: Fields = fields
                    .iter()
                    .map(|(name, t)| (name.clone(), self.apply(t)))
                    .collect();
                let row = match row {
                    Row::Closed => Row::Closed,
                    Row::Open(v) => match self.map.get(v) {
                        // Substituting a row variable with a concrete row
                        // merges that row's fields into this record and
                        // adopts its tail.
                        Some(Type::Record(more_fields, more_row)) => {
                            let mut merged = fields;
                            for (name, t) in more_fields {
                                merged.entry(name.clone()).or_insert_with(|| t.clone());
                            }
                            return Type::Record(merged, more_row.clone());
                        }
                        Some(Type::Variable(v2)) => Row::Open(*v2),
                        _ => Row::Open(*v),
                    },
                };
                Type::Record(fields, row)
            }
            Type::Union(members) => Type::union(
                members
                    .iter()
                    .map(|m| self.apply(&m.0))
                    .collect(),
            ),
            Type::Intersection(members) => Type::intersection(
                members
                    .iter()
                    .map(|m| self.apply(&m.0))
                    .collect(),
            ),
            Type::Alias(name, args) => {
                Type::Alias(name.clone(), args.iter().map(|t| self.apply(t)).collect())
            }
        }
    }

    /// `(s2 ∘ s1)(v) = s2(s1(v))`, with the image of `s1` also run through
    /// `s2` (spec §3). `self` plays the role of `s1`; `other` is `s2`.
    pub fn compose(&self, other: &Substitution) -> Substitution {
        let mut map: HashMap<TypeVariable, Type> = self
            .map
            .iter()
            .map(|(v, t)| (*v, other.apply(t)))
            .collect();
        for (v, t) in &other.map {
            map.entry(*v).or_insert_with(|| t.clone());
        }
        Substitution { map }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeVariable, &Type)> {
        self.map.iter()
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (v, t)) in self.map.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} ↦ {}", v, t)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fresh_type_variable;

    #[test]
    fn empty_substitution_is_identity() {
        let s = Substitution::empty();
        assert_eq!(s.apply(&Type::int()), Type::int());
    }

    #[test]
    fn apply_replaces_variable() {
        let v = fresh_type_variable();
        let s = Substitution::singleton(v, Type::int());
        assert_eq!(s.apply(&Type::Variable(v)), Type::int());
    }

    #[test]
    fn apply_is_idempotent_when_substitution_is() {
        let v = fresh_type_variable();
        let s = Substitution::singleton(v, Type::int());
        let once = s.apply(&Type::Variable(v));
        let twice = s.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn compose_runs_first_substitution_image_through_second() {
        let a = fresh_type_variable();
        let b = fresh_type_variable();
        let s1 = Substitution::singleton(a, Type::Variable(b));
        let s2 = Substitution::singleton(b, Type::int());
        let composed = s1.compose(&s2);
        assert_eq!(composed.apply(&Type::Variable(a)), Type::int());
    }

    #[test]
    fn apply_recurses_into_function_types() {
        let v = fresh_type_variable();
        let s = Substitution::singleton(v, Type::int());
        let f = Type::function(Type::Variable(v), Type::bool());
        assert_eq!(s.apply(&f), Type::function(Type::int(), Type::bool()));
    }
}
