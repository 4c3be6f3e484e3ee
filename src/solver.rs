//! Constraint solver (spec §4.5).

use crate::constraint::{Constraint, ConstraintSet, Origin};
use crate::error::{CompilerError, Failure};
use crate::substitution::Substitution;
use crate::types::{Fields, Row, Type};
use crate::unify::unify;

/// The allow-list of instance (type-class) obligations a ground type can
/// satisfy. Empty by default per spec §4.5 ("a closed allow-list per class
/// name, empty by default"); a driver embedding this crate can extend it.
#[derive(Debug, Clone, Default)]
pub struct InstanceRegistry {
    satisfied: Vec<(Type, String)>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(&mut self, ty: Type, class_name: impl Into<String>) {
        self.satisfied.push((ty, class_name.into()));
    }

    fn satisfies(&self, ty: &Type, class_name: &str) -> bool {
        self.satisfied
            .iter()
            .any(|(t, c)| t == ty && c == class_name)
    }
}

pub enum SolveOutcome {
    Success(Substitution),
    Failure(Failure),
}

/// Drain a constraint set by priority, calling the unifier and accumulating
/// a substitution, wrapping failures with the originating constraint's
/// location (spec §4.5).
pub fn solve(constraints: ConstraintSet, instances: &InstanceRegistry) -> SolveOutcome {
    let mut substitution = Substitution::empty();
    let mut queue: Vec<Constraint> = constraints.all().to_vec();
    queue.sort_by_key(|c| c.priority());

    // Re-sorting after every composed substitution would be wasteful and
    // is unnecessary: priority is a property of the constraint's kind, not
    // its current types, so substituting into a constraint never changes
    // where it belongs in the queue.
    let mut i = 0;
    while i < queue.len() {
        let constraint = queue[i].apply_substitution(&substitution);
        i += 1;

        match &constraint {
            Constraint::Equality { lhs, rhs, location, .. } => match unify(lhs, rhs) {
                Ok(step) => {
                    substitution = step.compose(&substitution);
                }
                Err(err) => {
                    let wrapped = match location {
                        Some(loc) => err.located(*loc),
                        None => err,
                    };
                    return SolveOutcome::Failure(Failure::new(wrapped));
                }
            },
            Constraint::Subtyping { sub, sup, location, .. } => {
                match reduce_subtyping(sub, sup) {
                    Ok(mut equalities) => {
                        for eq in equalities.drain(..) {
                            queue.push(eq);
                        }
                        queue[i..].sort_by_key(|c| c.priority());
                    }
                    Err(err) => {
                        let wrapped = match location {
                            Some(loc) => err.located(*loc),
                            None => err,
                        };
                        return SolveOutcome::Failure(Failure::new(wrapped));
                    }
                }
            }
            Constraint::Instance { ty, class_name, .. } => {
                if ty.free_variables().is_empty() && !instances.satisfies(ty, class_name) {
                    return SolveOutcome::Failure(Failure::new(CompilerError::InstanceNotSatisfied {
                        ty: ty.clone(),
                        class_name: class_name.clone(),
                    }));
                }
                // Non-ground or already-satisfied: defer (left for future
                // extension per spec §4.5).
            }
        }
    }

    SolveOutcome::Success(substitution)
}

/// Reduce a subtyping constraint to zero or more stronger equality
/// constraints (spec §4.5: "record width requires equalities on shared
/// fields"), or fail if the subtype relation structurally does not hold.
fn reduce_subtyping(sub: &Type, sup: &Type) -> Result<Vec<Constraint>, CompilerError> {
    if sub.is_subtype_of(sup) {
        if let (Type::Record(sub_fields, _), Type::Record(sup_fields, _)) = (sub, sup) {
            return Ok(shared_field_equalities(sub_fields, sup_fields));
        }
        return Ok(Vec::new());
    }

    // Not structurally a subtype yet: the only shapes this reduction can
    // still rescue are two records whose shared fields merely need to be
    // unified before width-subtyping can be re-checked.
    if let (Type::Record(sub_fields, _), Type::Record(sup_fields, _)) = (sub, sup) {
        let missing = sup_fields
            .keys()
            .find(|name| !sub_fields.contains_key(*name));
        if let Some(name) = missing {
            return Err(CompilerError::TypeMismatch {
                expected: sup.clone(),
                actual: sub.clone(),
                context: Some(format!("subtype is missing field '{}'", name)),
            });
        }
        return Ok(shared_field_equalities(sub_fields, sup_fields));
    }

    Err(CompilerError::TypeMismatch {
        expected: sup.clone(),
        actual: sub.clone(),
        context: Some("subtype relation does not hold".to_string()),
    })
}

fn shared_field_equalities(sub_fields: &Fields, sup_fields: &Fields) -> Vec<Constraint> {
    sup_fields
        .iter()
        .filter_map(|(name, sup_ty)| {
            sub_fields
                .get(name)
                .map(|sub_ty| Constraint::equality(sub_ty.clone(), sup_ty.clone(), None, Origin::Subtyping))
        })
        .collect()
}
