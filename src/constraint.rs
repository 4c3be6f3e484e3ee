//! Constraint model (spec §4.4).

use std::collections::HashSet;

use crate::location::Location;
use crate::substitution::Substitution;
use crate::types::{Type, TypeVariable};

/// Where a constraint came from, used for error attribution only (spec §4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Unification,
    Inference,
    Subtyping,
    TypeClass,
}

/// Total priority ordering: smaller ordinal is dequeued first (spec §4.4:
/// "Equality < Subtyping < Instance").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Equality = 0,
    Subtyping = 1,
    Instance = 2,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Equality {
        lhs: Type,
        rhs: Type,
        location: Option<Location>,
        origin: Origin,
    },
    Subtyping {
        sub: Type,
        sup: Type,
        location: Option<Location>,
        origin: Origin,
    },
    Instance {
        ty: Type,
        class_name: String,
        origin: Origin,
    },
}

impl Constraint {
    pub fn equality(lhs: Type, rhs: Type, location: Option<Location>, origin: Origin) -> Self {
        Constraint::Equality {
            lhs,
            rhs,
            location,
            origin,
        }
    }

    pub fn subtyping(sub: Type, sup: Type, location: Option<Location>, origin: Origin) -> Self {
        Constraint::Subtyping {
            sub,
            sup,
            location,
            origin,
        }
    }

    pub fn instance(ty: Type, class_name: impl Into<String>, origin: Origin) -> Self {
        Constraint::Instance {
            ty,
            class_name: class_name.into(),
            origin,
        }
    }

    pub fn priority(&self) -> Priority {
        match self {
            Constraint::Equality { .. } => Priority::Equality,
            Constraint::Subtyping { .. } => Priority::Subtyping,
            Constraint::Instance { .. } => Priority::Instance,
        }
    }

    pub fn location(&self) -> Option<Location> {
        match self {
            Constraint::Equality { location, .. } | Constraint::Subtyping { location, .. } => {
                *location
            }
            Constraint::Instance { .. } => None,
        }
    }

    pub fn involves_variable(&self, v: TypeVariable) -> bool {
        self.free_variables().contains(&v)
    }

    pub fn free_variables(&self) -> HashSet<TypeVariable> {
        match self {
            Constraint::Equality { lhs, rhs, .. } => {
                let mut s = lhs.free_variables();
                s.extend(rhs.free_variables());
                s
            }
            Constraint::Subtyping { sub, sup, .. } => {
                let mut s = sub.free_variables();
                s.extend(sup.free_variables());
                s
            }
            Constraint::Instance { ty, .. } => ty.free_variables(),
        }
    }

    /// True iff the two constraints share a free variable (spec §4.4,
    /// symmetric).
    pub fn depends_on(&self, other: &Constraint) -> bool {
        !self.free_variables().is_disjoint(&other.free_variables())
    }

    pub fn apply_substitution(&self, s: &Substitution) -> Constraint {
        match self {
            Constraint::Equality {
                lhs,
                rhs,
                location,
                origin,
            } => Constraint::Equality {
                lhs: s.apply(lhs),
                rhs: s.apply(rhs),
                location: *location,
                origin: *origin,
            },
            Constraint::Subtyping {
                sub,
                sup,
                location,
                origin,
            } => Constraint::Subtyping {
                sub: s.apply(sub),
                sup: s.apply(sup),
                location: *location,
                origin: *origin,
            },
            Constraint::Instance {
                ty,
                class_name,
                origin,
            } => Constraint::Instance {
                ty: s.apply(ty),
                class_name: class_name.clone(),
                origin: *origin,
            },
        }
    }

    /// Returns 0 or 1 constraints: the empty list when the two sides are
    /// already syntactically identical (spec §4.4 `simplify()`).
    pub fn simplify(&self) -> Vec<Constraint> {
        match self {
            Constraint::Equality { lhs, rhs, .. } if lhs == rhs => Vec::new(),
            Constraint::Subtyping { sub, sup, .. } if sub == sup => Vec::new(),
            other => vec![other.clone()],
        }
    }
}

/// A collection of constraints supporting priority-ordered draining and
/// best-effort contradiction detection (spec §4.4).
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, constraint: Constraint) {
        self.constraints.extend(constraint.simplify());
    }

    pub fn union(mut self, other: ConstraintSet) -> ConstraintSet {
        self.constraints.extend(other.constraints);
        self
    }

    pub fn all(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn size(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn apply_substitution(&self, s: &Substitution) -> ConstraintSet {
        ConstraintSet {
            constraints: self.constraints.iter().map(|c| c.apply_substitution(s)).collect(),
        }
    }

    /// Best-effort syntactic contradiction detection: finds a variable
    /// equated with two different, non-unifiable concrete types among the
    /// equality constraints currently present (spec §4.4).
    pub fn find_inconsistency(&self) -> Option<(TypeVariable, Type, Type)> {
        use std::collections::HashMap;
        let mut bindings: HashMap<TypeVariable, Type> = HashMap::new();
        for c in &self.constraints {
            if let Constraint::Equality { lhs, rhs, .. } = c {
                let (var, other) = match (lhs, rhs) {
                    (Type::Variable(v), other) => (*v, other),
                    (other, Type::Variable(v)) => (*v, other),
                    _ => continue,
                };
                if other.is_variable() {
                    continue;
                }
                if let Some(existing) = bindings.get(&var) {
                    if existing != other {
                        return Some((var, existing.clone(), other.clone()));
                    }
                } else {
                    bindings.insert(var, other.clone());
                }
            }
        }
        None
    }

    /// Drain constraints in priority order (highest priority first, stable
    /// within a priority tier), used by the solver.
    pub fn drain_by_priority(&mut self) -> Vec<Constraint> {
        let mut taken = std::mem::take(&mut self.constraints);
        taken.sort_by_key(|c| c.priority());
        taken
    }
}

impl FromIterator<Constraint> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        let mut set = ConstraintSet::new();
        for c in iter {
            set.add(c);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fresh_type_variable;

    #[test]
    fn simplify_drops_identical_sides() {
        let c = Constraint::equality(Type::int(), Type::int(), None, Origin::Inference);
        assert!(c.simplify().is_empty());
    }

    #[test]
    fn simplify_keeps_differing_sides() {
        let c = Constraint::equality(Type::int(), Type::string(), None, Origin::Inference);
        assert_eq!(c.simplify().len(), 1);
    }

    #[test]
    fn priority_orders_equality_before_subtyping_before_instance() {
        assert!(Priority::Equality < Priority::Subtyping);
        assert!(Priority::Subtyping < Priority::Instance);
    }

    #[test]
    fn depends_on_detects_shared_variable() {
        let v = fresh_type_variable();
        let c1 = Constraint::equality(Type::Variable(v), Type::int(), None, Origin::Inference);
        let c2 = Constraint::equality(Type::Variable(v), Type::string(), None, Origin::Inference);
        assert!(c1.depends_on(&c2));
    }

    #[test]
    fn depends_on_is_false_for_disjoint_constraints() {
        let c1 = Constraint::equality(Type::int(), Type::int(), None, Origin::Inference);
        let c2 = Constraint::equality(Type::string(), Type::string(), None, Origin::Inference);
        assert!(c1.simplify().is_empty() && c2.simplify().is_empty());
    }

    #[test]
    fn find_inconsistency_detects_conflicting_equalities() {
        let v = fresh_type_variable();
        let mut set = ConstraintSet::new();
        set.add(Constraint::equality(Type::Variable(v), Type::int(), None, Origin::Inference));
        set.add(Constraint::equality(Type::Variable(v), Type::string(), None, Origin::Inference));
        assert!(set.find_inconsistency().is_some());
    }

    #[test]
    fn drain_by_priority_orders_equality_first() {
        let mut set = ConstraintSet::new();
        set.add(Constraint::instance(Type::int(), "Show", Origin::TypeClass));
        set.add(Constraint::equality(Type::int(), Type::int().clone(), None, Origin::Inference));
        set.add(Constraint::equality(Type::string(), Type::bool(), None, Origin::Inference));
        let drained = set.drain_by_priority();
        assert_eq!(drained[0].priority(), Priority::Equality);
        assert_eq!(drained.last().unwrap().priority(), Priority::Instance);
    }
}
