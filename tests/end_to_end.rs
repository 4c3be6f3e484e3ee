//! End-to-end scenarios and testable properties (spec §8). Each scenario
//! builds an `Expr` by hand (this crate owns no parser) and drives it
//! through `TypeChecker::type_check`.

use mini_bendu_check::{
    fresh_type_variable, BinaryOp, CheckOutcome, CompilerError, Expr, ExprKind, FieldExpr, Location, Param,
    Substitution, Type, TypeChecker, TypeEnvironment, TypeScheme,
};

fn loc() -> Location {
    Location::point(1, 1)
}

fn int(n: i64) -> Expr {
    Expr::new(loc(), ExprKind::LiteralInt(n))
}

fn string(s: &str) -> Expr {
    Expr::new(loc(), ExprKind::LiteralString(s.to_string()))
}

fn boolean(b: bool) -> Expr {
    Expr::new(loc(), ExprKind::LiteralBool(b))
}

fn var(name: &str) -> Expr {
    Expr::new(loc(), ExprKind::Var(name.to_string()))
}

fn expect_success(outcome: CheckOutcome) -> Type {
    match outcome {
        CheckOutcome::Success(success) => success.ty,
        CheckOutcome::Failure(f) => panic!("expected success, got failure: {}", f),
    }
}

#[test]
fn scenario_integer_literal() {
    let checker = TypeChecker::new();
    assert_eq!(expect_success(checker.type_check(&int(42))), Type::int());
}

#[test]
fn scenario_string_literal_has_its_own_singleton_type() {
    let checker = TypeChecker::new();
    assert_eq!(
        expect_success(checker.type_check(&string("hello"))),
        Type::literal("hello")
    );
}

#[test]
fn scenario_annotated_lambda_adding_one() {
    // \(x: Int) -> x + 1
    let body = Expr::new(
        loc(),
        ExprKind::BinaryOp {
            op: BinaryOp::Add,
            left: Box::new(var("x")),
            right: Box::new(int(1)),
        },
    );
    let lambda = Expr::new(
        loc(),
        ExprKind::Lambda {
            params: vec![Param::with_annotation("x", mini_bendu_check::BaseTypeExpr::Named("Int".to_string()))],
            body: Box::new(body),
        },
    );
    let checker = TypeChecker::new();
    assert_eq!(
        expect_success(checker.type_check(&lambda)),
        Type::function(Type::int(), Type::int())
    );
}

#[test]
fn scenario_let_bound_identity_is_polymorphic() {
    // let id = \x -> x in id true
    let id_lambda = Expr::new(
        loc(),
        ExprKind::Lambda { params: vec![Param::new("x")], body: Box::new(var("x")) },
    );
    let application = Expr::new(
        loc(),
        ExprKind::Application { function: Box::new(var("id")), argument: Box::new(boolean(true)) },
    );
    let let_expr = Expr::new(
        loc(),
        ExprKind::Let {
            name: "id".to_string(),
            recursive: false,
            type_params: Vec::new(),
            parameters: None,
            annotation: None,
            value: Box::new(id_lambda),
            body: Box::new(application),
        },
    );
    let checker = TypeChecker::new();
    assert_eq!(expect_success(checker.type_check(&let_expr)), Type::bool());
}

#[test]
fn scenario_if_branch_mismatch_fails_with_else_branch_location() {
    let else_location = Location::point(1, 20);
    let if_expr = Expr::new(
        loc(),
        ExprKind::If {
            condition: Box::new(boolean(true)),
            then_branch: Box::new(int(1)),
            else_branch: Box::new(Expr::new(else_location, ExprKind::LiteralString("s".to_string()))),
        },
    );
    let checker = TypeChecker::new();
    match checker.type_check(&if_expr) {
        CheckOutcome::Failure(f) => {
            assert!(matches!(f.compiler_error, CompilerError::Located { .. }));
            assert_eq!(f.compiler_error.location(), Some(else_location));
        }
        CheckOutcome::Success(_) => panic!("expected a type mismatch"),
    }
}

#[test]
fn scenario_undefined_variable_reports_only_itself() {
    // unknownVar + 1 — should fail with exactly UndefinedVariable, not a
    // secondary TypeMismatch from treating the unknown variable as Error.
    let expr = Expr::new(
        loc(),
        ExprKind::BinaryOp { op: BinaryOp::Add, left: Box::new(var("unknownVar")), right: Box::new(int(1)) },
    );
    let checker = TypeChecker::new();
    match checker.type_check(&expr) {
        CheckOutcome::Failure(f) => {
            let inner = match &f.compiler_error {
                CompilerError::Located { inner, .. } => inner.as_ref(),
                other => other,
            };
            assert!(matches!(inner, CompilerError::UndefinedVariable { name } if name == "unknownVar"));
        }
        CheckOutcome::Success(_) => panic!("expected undefined variable failure"),
    }
}

#[test]
fn scenario_recursive_factorial_like_function() {
    // let rec f = \n -> if n == 0 then 1 else n * f(n - 1) in f
    let condition = Expr::new(
        loc(),
        ExprKind::BinaryOp { op: BinaryOp::Eq, left: Box::new(var("n")), right: Box::new(int(0)) },
    );
    let recursive_call = Expr::new(
        loc(),
        ExprKind::Application {
            function: Box::new(var("f")),
            argument: Box::new(Expr::new(
                loc(),
                ExprKind::BinaryOp { op: BinaryOp::Sub, left: Box::new(var("n")), right: Box::new(int(1)) },
            )),
        },
    );
    let else_branch = Expr::new(
        loc(),
        ExprKind::BinaryOp { op: BinaryOp::Mul, left: Box::new(var("n")), right: Box::new(recursive_call) },
    );
    let body = Expr::new(
        loc(),
        ExprKind::If { condition: Box::new(condition), then_branch: Box::new(int(1)), else_branch: Box::new(else_branch) },
    );
    let lambda = Expr::new(loc(), ExprKind::Lambda { params: vec![Param::new("n")], body: Box::new(body) });
    let let_rec = Expr::new(
        loc(),
        ExprKind::Let {
            name: "f".to_string(),
            recursive: true,
            type_params: Vec::new(),
            parameters: None,
            annotation: None,
            value: Box::new(lambda),
            body: Box::new(var("f")),
        },
    );
    let checker = TypeChecker::new();
    assert_eq!(
        expect_success(checker.type_check(&let_rec)),
        Type::function(Type::int(), Type::int())
    );
}

#[test]
fn scenario_record_projection() {
    // { a = 1, b = "s" }.a
    let record = Expr::new(
        loc(),
        ExprKind::Record(vec![
            FieldExpr { name: "a".to_string(), value: int(1) },
            FieldExpr { name: "b".to_string(), value: string("s") },
        ]),
    );
    let projection = Expr::new(loc(), ExprKind::Projection { record: Box::new(record), field: "a".to_string() });
    let checker = TypeChecker::new();
    assert_eq!(expect_success(checker.type_check(&projection)), Type::int());
}

// --- Testable properties (spec §8) ---

#[test]
fn property_substitution_is_idempotent_once_fully_resolved() {
    let v = fresh_type_variable();
    let s = Substitution::singleton(v, Type::int());
    let once = s.apply(&Type::Variable(v));
    let twice = s.apply(&once);
    assert_eq!(once, twice);
}

#[test]
fn property_fresh_variables_are_always_distinct() {
    let a = fresh_type_variable();
    let b = fresh_type_variable();
    assert_ne!(a, b);
}

#[test]
fn property_type_schemes_are_compared_up_to_alpha_renaming() {
    let a = fresh_type_variable();
    let b = fresh_type_variable();
    let id_a = TypeScheme::polymorphic(vec![a], Type::function(Type::Variable(a), Type::Variable(a)));
    let id_b = TypeScheme::polymorphic(vec![b], Type::function(Type::Variable(b), Type::Variable(b)));
    assert!(id_a.is_alpha_equivalent(&id_b));
}

#[test]
fn property_record_field_order_does_not_affect_type_identity() {
    let mut f1 = mini_bendu_check::Fields::new();
    f1.insert("x".to_string(), Type::int());
    f1.insert("y".to_string(), Type::string());
    let mut f2 = mini_bendu_check::Fields::new();
    f2.insert("y".to_string(), Type::string());
    f2.insert("x".to_string(), Type::int());
    assert_eq!(Type::closed_record(f1), Type::closed_record(f2));
}

#[test]
fn property_union_and_intersection_are_commutative() {
    let union_ab = Type::union(vec![Type::int(), Type::string()]);
    let union_ba = Type::union(vec![Type::string(), Type::int()]);
    assert!(union_ab.structurally_equivalent(&union_ba));

    let inter_ab = Type::intersection(vec![Type::int(), Type::string()]);
    let inter_ba = Type::intersection(vec![Type::string(), Type::int()]);
    assert!(inter_ab.structurally_equivalent(&inter_ba));
}

#[test]
fn property_occurs_check_rejects_infinite_types() {
    let v = fresh_type_variable();
    let recursive = Type::function(Type::Variable(v), Type::int());
    let err = mini_bendu_check::unify(&Type::Variable(v), &recursive).unwrap_err();
    assert!(matches!(err, CompilerError::OccursCheckFailure { .. }));
}

#[test]
fn property_generalisation_only_quantifies_variables_free_in_the_body_alone() {
    // let compose a monomorphic environment binding `env_var`, then
    // generalising a type that mentions both `env_var` and a fresh
    // variable must only quantify the fresh one.
    let env_var = fresh_type_variable();
    let fresh = fresh_type_variable();
    let env = TypeEnvironment::new().extend("bound", Type::Variable(env_var));
    let free_in_env = env.free_variables(&Substitution::empty());
    let ty = Type::function(Type::Variable(env_var), Type::Variable(fresh));
    let scheme = TypeScheme::generalize(&ty, &free_in_env);
    assert_eq!(scheme.quantified, vec![fresh]);
}

#[test]
fn property_principal_type_of_identity_is_fully_polymorphic() {
    // \x -> x checked with an empty environment should generalise to a
    // single-variable polymorphic scheme when let-bound, i.e. nothing in
    // the surrounding (empty) environment pins its argument type down.
    let lambda = Expr::new(loc(), ExprKind::Lambda { params: vec![Param::new("x")], body: Box::new(var("x")) });
    let checker = TypeChecker::new();
    match checker.type_check(&lambda) {
        CheckOutcome::Success(success) => match success.ty {
            Type::Function(domain, codomain) => assert_eq!(domain, codomain),
            other => panic!("expected a function type, got {:?}", other),
        },
        CheckOutcome::Failure(f) => panic!("unexpected failure: {}", f),
    }
}
