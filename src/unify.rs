//! Unification (spec §4.3).

use crate::error::CompilerError;
use crate::substitution::Substitution;
use crate::types::{fresh_type_variable, Fields, Row, Type};

/// Unify two types, producing a substitution that makes them equal or a
/// structured error. Exposed as a free function so it is directly testable
/// (spec §6: "`Unification.unify(t1, t2)` as a free operation").
pub fn unify(t1: &Type, t2: &Type) -> Result<Substitution, CompilerError> {
    match (t1, t2) {
        // The placeholder substituted for an ill-typed sub-expression
        // (spec §4.7 error-recovery policy) unifies with anything so a
        // single reported failure never cascades into unrelated ones.
        (Type::Primitive(crate::types::Primitive::Error), _)
        | (_, Type::Primitive(crate::types::Primitive::Error)) => Ok(Substitution::empty()),

        (Type::Primitive(p1), Type::Primitive(p2)) if p1 == p2 => Ok(Substitution::empty()),

        (Type::LiteralString(a), Type::LiteralString(b)) if a == b => Ok(Substitution::empty()),

        (Type::Variable(v), ty) | (ty, Type::Variable(v)) => unify_variable(*v, ty),

        (Type::Function(a, b), Type::Function(c, d)) => {
            let s1 = unify(a, c)?;
            let s2 = unify(&s1.apply(b), &s1.apply(d))?;
            Ok(s2.compose(&s1))
        }

        (Type::Tuple(xs), Type::Tuple(ys)) => {
            if xs.len() != ys.len() {
                return Err(CompilerError::TypeMismatch {
                    expected: t1.clone(),
                    actual: t2.clone(),
                    context: Some("tuple length mismatch".to_string()),
                });
            }
            let mut subst = Substitution::empty();
            for (x, y) in xs.iter().zip(ys.iter()) {
                let step = unify(&subst.apply(x), &subst.apply(y))?;
                subst = step.compose(&subst);
            }
            Ok(subst)
        }

        (Type::Record(fields1, row1), Type::Record(fields2, row2)) => {
            unify_records(fields1, row1, fields2, row2)
        }

        (Type::Union(a), Type::Union(b)) => {
            if a == b {
                Ok(Substitution::empty())
            } else {
                Err(CompilerError::TypeMismatch {
                    expected: t1.clone(),
                    actual: t2.clone(),
                    context: Some("union unification is nominal".to_string()),
                })
            }
        }

        (Type::Intersection(a), Type::Intersection(b)) => {
            if a == b {
                Ok(Substitution::empty())
            } else {
                Err(CompilerError::TypeMismatch {
                    expected: t1.clone(),
                    actual: t2.clone(),
                    context: Some("intersection unification is nominal".to_string()),
                })
            }
        }

        (Type::Alias(n, xs), Type::Alias(m, ys)) => {
            if n != m || xs.len() != ys.len() {
                return Err(CompilerError::TypeMismatch {
                    expected: t1.clone(),
                    actual: t2.clone(),
                    context: Some("alias name or arity mismatch".to_string()),
                });
            }
            let mut subst = Substitution::empty();
            for (x, y) in xs.iter().zip(ys.iter()) {
                let step = unify(&subst.apply(x), &subst.apply(y))?;
                subst = step.compose(&subst);
            }
            Ok(subst)
        }

        _ => Err(CompilerError::TypeMismatch {
            expected: t1.clone(),
            actual: t2.clone(),
            context: None,
        }),
    }
}

fn unify_variable(v: crate::types::TypeVariable, ty: &Type) -> Result<Substitution, CompilerError> {
    if let Type::Variable(other) = ty {
        if *other == v {
            return Ok(Substitution::empty());
        }
    }
    if ty.free_variables().contains(&v) {
        return Err(CompilerError::OccursCheckFailure {
            variable: v,
            containing_type: ty.clone(),
        });
    }
    Ok(Substitution::singleton(v, ty.clone()))
}

fn unify_records(
    fields1: &Fields,
    row1: &Row,
    fields2: &Fields,
    row2: &Row,
) -> Result<Substitution, CompilerError> {
    let mut subst = Substitution::empty();

    // Unify the types of every field shared by both sides.
    for (name, ty1) in fields1 {
        if let Some(ty2) = fields2.get(name) {
            let step = unify(&subst.apply(ty1), &subst.apply(ty2))?;
            subst = step.compose(&subst);
        }
    }

    let extra_in_1: Fields = fields1
        .iter()
        .filter(|(name, _)| !fields2.contains_key(*name))
        .map(|(n, t)| (n.clone(), subst.apply(t)))
        .collect();
    let extra_in_2: Fields = fields2
        .iter()
        .filter(|(name, _)| !fields1.contains_key(*name))
        .map(|(n, t)| (n.clone(), subst.apply(t)))
        .collect();

    match (row1, row2) {
        (Row::Closed, Row::Closed) => {
            if !extra_in_1.is_empty() || !extra_in_2.is_empty() {
                return Err(CompilerError::TypeMismatch {
                    expected: Type::Record(fields1.clone(), row1.clone()),
                    actual: Type::Record(fields2.clone(), row2.clone()),
                    context: Some("closed records with mismatched fields".to_string()),
                });
            }
            Ok(subst)
        }
        (Row::Closed, Row::Open(var)) => {
            if !extra_in_2.is_empty() {
                return Err(CompilerError::TypeMismatch {
                    expected: Type::Record(fields1.clone(), row1.clone()),
                    actual: Type::Record(fields2.clone(), row2.clone()),
                    context: Some("closed record is missing fields required by open row".to_string()),
                });
            }
            let step = unify_variable(*var, &Type::Record(extra_in_1, Row::Closed))?;
            Ok(step.compose(&subst))
        }
        (Row::Open(var), Row::Closed) => {
            if !extra_in_1.is_empty() {
                return Err(CompilerError::TypeMismatch {
                    expected: Type::Record(fields1.clone(), row1.clone()),
                    actual: Type::Record(fields2.clone(), row2.clone()),
                    context: Some("closed record is missing fields required by open row".to_string()),
                });
            }
            let step = unify_variable(*var, &Type::Record(extra_in_2, Row::Closed))?;
            Ok(step.compose(&subst))
        }
        (Row::Open(var1), Row::Open(var2)) => {
            let common_tail = fresh_type_variable();
            let step1 = unify_variable(
                *var1,
                &Type::Record(extra_in_2, Row::Open(common_tail)),
            )?;
            let subst = step1.compose(&subst);
            let step2 = unify_variable(
                *var2,
                &Type::Record(subst.apply(&Type::Record(extra_in_1, Row::Closed)).as_fields(), Row::Open(common_tail)),
            )?;
            Ok(step2.compose(&subst))
        }
    }
}

impl Type {
    /// Extract the field map of a `Record` type (used only by row
    /// unification's intermediate bookkeeping above).
    fn as_fields(&self) -> Fields {
        match self {
            Type::Record(fields, _) => fields.clone(),
            _ => Fields::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fresh_type_variable;

    #[test]
    fn equal_primitives_unify_trivially() {
        assert!(unify(&Type::int(), &Type::int()).unwrap().is_empty());
    }

    #[test]
    fn different_primitives_fail() {
        assert!(unify(&Type::int(), &Type::string()).is_err());
    }

    #[test]
    fn error_type_unifies_with_anything() {
        assert!(unify(&Type::error(), &Type::string()).unwrap().is_empty());
        assert!(unify(&Type::bool(), &Type::error()).unwrap().is_empty());
    }

    #[test]
    fn different_literals_fail() {
        assert!(unify(&Type::literal("a"), &Type::literal("b")).is_err());
    }

    #[test]
    fn variable_unifies_with_concrete_type() {
        let v = fresh_type_variable();
        let s = unify(&Type::Variable(v), &Type::int()).unwrap();
        assert_eq!(s.apply(&Type::Variable(v)), Type::int());
    }

    #[test]
    fn occurs_check_fails_for_infinite_type() {
        let v = fresh_type_variable();
        let recursive = Type::function(Type::Variable(v), Type::int());
        let err = unify(&Type::Variable(v), &recursive).unwrap_err();
        assert!(matches!(err, CompilerError::OccursCheckFailure { .. }));
    }

    #[test]
    fn functions_unify_pointwise() {
        let a = fresh_type_variable();
        let f1 = Type::function(Type::Variable(a), Type::int());
        let f2 = Type::function(Type::bool(), Type::int());
        let s = unify(&f1, &f2).unwrap();
        assert_eq!(s.apply(&Type::Variable(a)), Type::bool());
    }

    #[test]
    fn tuples_of_different_length_fail() {
        let t1 = Type::tuple(vec![Type::int()]);
        let t2 = Type::tuple(vec![Type::int(), Type::int()]);
        assert!(unify(&t1, &t2).is_err());
    }

    #[test]
    fn records_unify_regardless_of_field_order() {
        let mut f1 = Fields::new();
        f1.insert("x".to_string(), Type::int());
        f1.insert("y".to_string(), Type::string());
        let mut f2 = Fields::new();
        f2.insert("y".to_string(), Type::string());
        f2.insert("x".to_string(), Type::int());

        let r1 = Type::closed_record(f1);
        let r2 = Type::closed_record(f2);
        assert!(unify(&r1, &r2).unwrap().is_empty());
    }

    #[test]
    fn closed_open_record_binds_row_to_extra_fields() {
        let mut closed_fields = Fields::new();
        closed_fields.insert("x".to_string(), Type::int());
        closed_fields.insert("y".to_string(), Type::string());
        let closed = Type::closed_record(closed_fields);

        let mut open_fields = Fields::new();
        open_fields.insert("x".to_string(), Type::int());
        let row_var = fresh_type_variable();
        let open = Type::open_record(open_fields, row_var);

        let s = unify(&closed, &open).unwrap();
        let bound = s.get(&row_var).unwrap();
        match bound {
            Type::Record(fields, Row::Closed) => {
                assert_eq!(fields.get("y"), Some(&Type::string()));
                assert!(!fields.contains_key("x"));
            }
            other => panic!("expected closed record, got {:?}", other),
        }
    }

    #[test]
    fn closed_record_missing_required_field_fails() {
        let mut closed_fields = Fields::new();
        closed_fields.insert("x".to_string(), Type::int());
        let closed = Type::closed_record(closed_fields);

        let mut open_fields = Fields::new();
        open_fields.insert("x".to_string(), Type::int());
        open_fields.insert("y".to_string(), Type::string());
        let row_var = fresh_type_variable();
        let open = Type::open_record(open_fields, row_var);

        assert!(unify(&closed, &open).is_err());
    }

    #[test]
    fn aliases_unify_pointwise_when_name_and_arity_match() {
        let a1 = Type::alias("Pair", vec![Type::int(), Type::string()]);
        let a2 = Type::alias("Pair", vec![Type::int(), Type::string()]);
        assert!(unify(&a1, &a2).unwrap().is_empty());

        let mismatched = Type::alias("Other", vec![Type::int(), Type::string()]);
        assert!(unify(&a1, &mismatched).is_err());
    }
}
