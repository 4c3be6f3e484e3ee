//! Constraint generator (spec §4.7): walks an AST and produces a type
//! together with the constraints that must hold for that type to be
//! correct, in the style of the teacher's `inference::InferenceEngine`
//! (which walks a swc AST accumulating `Constraint`s against a
//! `TypeContext`) but generalised to mini-bendu's expression language.

use crate::ast::{BaseTypeExpr, BinaryOp, Expr, ExprKind, FieldPattern, MatchCase, Param, Pattern};
use crate::constraint::{Constraint, ConstraintSet, Origin};
use crate::env::TypeEnvironment;
use crate::error::{CompilerError, CompilerWarning};
use crate::scheme::TypeScheme;
use crate::solver::{solve, InstanceRegistry, SolveOutcome};
use crate::types::{fresh_type_variable, Fields, Type};

/// The outcome of generating constraints for one expression: its type, the
/// constraints still owed to the caller's solver, any errors already
/// discovered (and recovered from) along the way, and any non-blocking
/// warnings (spec §7: "never blocks a Success result").
pub struct GenerationResult {
    pub ty: Type,
    pub constraints: ConstraintSet,
    pub errors: Vec<CompilerError>,
    pub warnings: Vec<CompilerWarning>,
}

/// Generate constraints for `expr` under `env` (spec §4.7 entry point).
pub fn generate(env: &TypeEnvironment, expr: &Expr) -> GenerationResult {
    let mut errors = Vec::new();
    let (ty, constraints) = go(env, expr, &mut errors);
    let warnings = collect_warnings(expr);
    GenerationResult { ty, constraints, errors, warnings }
}

/// Walk the tree for `UnusedVariable` warnings: a lambda parameter or
/// `let`-bound name never referenced in the scope it's bound over (spec
/// §7, §10.1). Structural, independent of constraint generation — a
/// name can be "unused" whether or not the expression it sits in ever
/// type-checks.
fn collect_warnings(expr: &Expr) -> Vec<CompilerWarning> {
    let mut warnings = Vec::new();
    walk_warnings(expr, &mut warnings);
    warnings
}

fn walk_warnings(expr: &Expr, warnings: &mut Vec<CompilerWarning>) {
    match &expr.kind {
        ExprKind::LiteralInt(_) | ExprKind::LiteralString(_) | ExprKind::LiteralBool(_) | ExprKind::Var(_) => {}
        ExprKind::BinaryOp { left, right, .. } => {
            walk_warnings(left, warnings);
            walk_warnings(right, warnings);
        }
        ExprKind::If { condition, then_branch, else_branch } => {
            walk_warnings(condition, warnings);
            walk_warnings(then_branch, warnings);
            walk_warnings(else_branch, warnings);
        }
        ExprKind::Lambda { params, body } => {
            for param in params {
                if !contains_var(body, &param.name) {
                    warnings.push(CompilerWarning::UnusedVariable {
                        name: param.name.clone(),
                        location: expr.location,
                    });
                }
            }
            walk_warnings(body, warnings);
        }
        ExprKind::Application { function, argument } => {
            walk_warnings(function, warnings);
            walk_warnings(argument, warnings);
        }
        ExprKind::Let { name, value, body, .. } => {
            walk_warnings(value, warnings);
            if !contains_var(body, name) {
                warnings.push(CompilerWarning::UnusedVariable { name: name.clone(), location: expr.location });
            }
            walk_warnings(body, warnings);
        }
        ExprKind::LetRecMutual { bindings, body } => {
            for (name, value) in bindings {
                walk_warnings(value, warnings);
                let used_elsewhere = bindings.iter().any(|(_, v)| contains_var(v, name));
                if !used_elsewhere && !contains_var(body, name) {
                    warnings.push(CompilerWarning::UnusedVariable { name: name.clone(), location: expr.location });
                }
            }
            walk_warnings(body, warnings);
        }
        ExprKind::Tuple(elements) => elements.iter().for_each(|e| walk_warnings(e, warnings)),
        ExprKind::Record(fields) => fields.iter().for_each(|f| walk_warnings(&f.value, warnings)),
        ExprKind::Projection { record, .. } => walk_warnings(record, warnings),
        ExprKind::Match { scrutinee, cases } => {
            walk_warnings(scrutinee, warnings);
            for case in cases {
                walk_warnings(&case.body, warnings);
            }
        }
    }
}

/// True iff `name` occurs as a free variable reference somewhere in
/// `expr`, accounting for shadowing introduced by nested binders.
fn contains_var(expr: &Expr, name: &str) -> bool {
    match &expr.kind {
        ExprKind::LiteralInt(_) | ExprKind::LiteralString(_) | ExprKind::LiteralBool(_) => false,
        ExprKind::Var(n) => n == name,
        ExprKind::BinaryOp { left, right, .. } => contains_var(left, name) || contains_var(right, name),
        ExprKind::If { condition, then_branch, else_branch } => {
            contains_var(condition, name) || contains_var(then_branch, name) || contains_var(else_branch, name)
        }
        ExprKind::Lambda { params, body } => {
            if params.iter().any(|p| p.name == name) {
                false
            } else {
                contains_var(body, name)
            }
        }
        ExprKind::Application { function, argument } => contains_var(function, name) || contains_var(argument, name),
        ExprKind::Let { name: bound, value, body, .. } => {
            contains_var(value, name) || (bound != name && contains_var(body, name))
        }
        ExprKind::LetRecMutual { bindings, body } => {
            let shadowed = bindings.iter().any(|(n, _)| n == name);
            bindings.iter().any(|(_, v)| contains_var(v, name)) || (!shadowed && contains_var(body, name))
        }
        ExprKind::Tuple(elements) => elements.iter().any(|e| contains_var(e, name)),
        ExprKind::Record(fields) => fields.iter().any(|f| contains_var(&f.value, name)),
        ExprKind::Projection { record, .. } => contains_var(record, name),
        ExprKind::Match { scrutinee, cases } => {
            contains_var(scrutinee, name)
                || cases
                    .iter()
                    .any(|c| !pattern_binds(&c.pattern, name) && contains_var(&c.body, name))
        }
    }
}

fn pattern_binds(pattern: &Pattern, name: &str) -> bool {
    match pattern {
        Pattern::Var(n) => n == name,
        Pattern::Tuple(elements) => elements.iter().any(|p| pattern_binds(p, name)),
        Pattern::Record(fields) => fields.iter().any(|f| pattern_binds(&f.pattern, name)),
        Pattern::LiteralInt(_) | Pattern::LiteralBool(_) | Pattern::LiteralString(_) => false,
    }
}

fn go(env: &TypeEnvironment, expr: &Expr, errors: &mut Vec<CompilerError>) -> (Type, ConstraintSet) {
    match &expr.kind {
        ExprKind::LiteralInt(_) => (Type::int(), ConstraintSet::new()),
        ExprKind::LiteralBool(_) => (Type::bool(), ConstraintSet::new()),
        // A string literal gets its own singleton type; callers that need
        // `String` get there via the literal-is-a-subtype-of-String rule
        // (spec §4.1), not by widening here.
        ExprKind::LiteralString(s) => (Type::literal(s.clone()), ConstraintSet::new()),

        ExprKind::Var(name) => match env.lookup(name) {
            Some(scheme) => {
                let (ty, _) = scheme.instantiate();
                (ty, ConstraintSet::new())
            }
            None => {
                errors.push(
                    CompilerError::UndefinedVariable { name: name.clone() }.located(expr.location),
                );
                (Type::error(), ConstraintSet::new())
            }
        },

        ExprKind::BinaryOp { op, left, right } => generate_binary_op(env, expr, *op, left, right, errors),

        ExprKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let (cond_ty, mut constraints) = go(env, condition, errors);
            let (then_ty, then_constraints) = go(env, then_branch, errors);
            let (else_ty, else_constraints) = go(env, else_branch, errors);
            constraints = constraints.union(then_constraints).union(else_constraints);
            constraints.add(Constraint::equality(
                cond_ty,
                Type::bool(),
                Some(condition.location),
                Origin::Inference,
            ));
            constraints.add(Constraint::equality(
                else_ty,
                then_ty.clone(),
                Some(else_branch.location),
                Origin::Inference,
            ));
            (then_ty, constraints)
        }

        ExprKind::Lambda { params, body } => {
            let mut scope = env.open_scope();
            let mut param_types = Vec::new();
            for param in params {
                let param_ty = param_type(param);
                param_types.push(param_ty.clone());
                scope = scope.extend(param.name.clone(), param_ty);
            }
            let (body_ty, constraints) = go(&scope, body, errors);
            (Type::curried_function(param_types, body_ty), constraints)
        }

        ExprKind::Application { function, argument } => {
            let (fn_ty, fn_constraints) = go(env, function, errors);
            let (arg_ty, arg_constraints) = go(env, argument, errors);
            let result = Type::Variable(fresh_type_variable());
            let mut constraints = fn_constraints.union(arg_constraints);
            constraints.add(Constraint::equality(
                fn_ty,
                Type::function(arg_ty, result.clone()),
                Some(expr.location),
                Origin::Inference,
            ));
            (result, constraints)
        }

        ExprKind::Let {
            name,
            recursive,
            type_params: _,
            parameters,
            annotation,
            value,
            body,
        } => generate_let(env, name, *recursive, parameters, annotation, value, body, errors),

        ExprKind::LetRecMutual { bindings, body } => generate_let_rec_mutual(env, bindings, body, errors),

        ExprKind::Tuple(elements) => {
            let mut constraints = ConstraintSet::new();
            let mut types = Vec::with_capacity(elements.len());
            for element in elements {
                let (ty, element_constraints) = go(env, element, errors);
                types.push(ty);
                constraints = constraints.union(element_constraints);
            }
            (Type::tuple(types), constraints)
        }

        ExprKind::Record(fields) => {
            let mut constraints = ConstraintSet::new();
            let mut field_types = Fields::new();
            for field in fields {
                let (ty, field_constraints) = go(env, &field.value, errors);
                field_types.insert(field.name.clone(), ty);
                constraints = constraints.union(field_constraints);
            }
            (Type::closed_record(field_types), constraints)
        }

        ExprKind::Projection { record, field } => {
            let (record_ty, mut constraints) = go(env, record, errors);
            let field_ty = Type::Variable(fresh_type_variable());
            let row_var = fresh_type_variable();
            let mut expected_fields = Fields::new();
            expected_fields.insert(field.clone(), field_ty.clone());
            constraints.add(Constraint::equality(
                record_ty,
                Type::open_record(expected_fields, row_var),
                Some(expr.location),
                Origin::Inference,
            ));
            (field_ty, constraints)
        }

        ExprKind::Match { scrutinee, cases } => generate_match(env, expr, scrutinee, cases, errors),
    }
}

fn param_type(param: &Param) -> Type {
    match &param.annotation {
        Some(annotation) => base_type_to_type(annotation),
        None => Type::Variable(fresh_type_variable()),
    }
}

fn base_type_to_type(annotation: &BaseTypeExpr) -> Type {
    match annotation {
        BaseTypeExpr::Named(name) => match name.as_str() {
            "Int" => Type::int(),
            "String" => Type::string(),
            "Bool" => Type::bool(),
            "Unit" => Type::unit(),
            other => Type::alias(other, Vec::new()),
        },
        BaseTypeExpr::Function(domain, codomain) => {
            Type::function(base_type_to_type(domain), base_type_to_type(codomain))
        }
        BaseTypeExpr::Tuple(elements) => Type::tuple(elements.iter().map(base_type_to_type).collect()),
    }
}

fn generate_binary_op(
    env: &TypeEnvironment,
    expr: &Expr,
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    errors: &mut Vec<CompilerError>,
) -> (Type, ConstraintSet) {
    let (left_ty, left_constraints) = go(env, left, errors);
    let (right_ty, right_constraints) = go(env, right, errors);
    let mut constraints = left_constraints.union(right_constraints);

    if op.is_arithmetic() {
        constraints.add(Constraint::equality(left_ty, Type::int(), Some(left.location), Origin::Inference));
        constraints.add(Constraint::equality(right_ty, Type::int(), Some(right.location), Origin::Inference));
        (Type::int(), constraints)
    } else if op.is_comparison() {
        constraints.add(Constraint::equality(
            left_ty,
            right_ty,
            Some(expr.location),
            Origin::Inference,
        ));
        (Type::bool(), constraints)
    } else {
        debug_assert!(op.is_logical());
        constraints.add(Constraint::equality(left_ty, Type::bool(), Some(left.location), Origin::Inference));
        constraints.add(Constraint::equality(right_ty, Type::bool(), Some(right.location), Origin::Inference));
        (Type::bool(), constraints)
    }
}

#[allow(clippy::too_many_arguments)]
fn generate_let(
    env: &TypeEnvironment,
    name: &str,
    recursive: bool,
    parameters: &Option<Vec<Param>>,
    annotation: &Option<BaseTypeExpr>,
    value: &Expr,
    body: &Expr,
    errors: &mut Vec<CompilerError>,
) -> (Type, ConstraintSet) {
    let desugared_value = desugar_parameters(parameters, value);
    let value = desugared_value.as_ref().unwrap_or(value);

    let (value_ty, mut value_constraints, binding_var) = if recursive {
        // Pre-bind `name` to a fresh monomorphic variable so the value can
        // refer to itself (spec §4.7 "For mutual recursion" applies equally
        // to the single-binding case).
        let self_var = fresh_type_variable();
        let scope = env.extend(name.to_string(), Type::Variable(self_var));
        let (value_ty, mut constraints) = go(&scope, value, errors);
        constraints.add(Constraint::equality(
            Type::Variable(self_var),
            value_ty.clone(),
            Some(value.location),
            Origin::Inference,
        ));
        (Type::Variable(self_var), constraints, Some(self_var))
    } else {
        let (value_ty, constraints) = go(env, value, errors);
        (value_ty, constraints, None)
    };

    if let Some(annotation) = annotation {
        value_constraints.add(Constraint::equality(
            value_ty.clone(),
            base_type_to_type(annotation),
            Some(value.location),
            Origin::Inference,
        ));
    }

    // Solve the bound expression's constraints now, before generating the
    // body: generalisation needs a fully-solved type, and the body must see
    // a scheme, not an unsolved variable (spec §4.7, §5 ordering guarantee).
    let scheme = match solve(value_constraints, &InstanceRegistry::new()) {
        SolveOutcome::Success(substitution) => {
            let solved_ty = substitution.apply(&binding_var.map(Type::Variable).unwrap_or(value_ty));
            let free_in_env = env.free_variables(&substitution);
            TypeScheme::generalize(&solved_ty, &free_in_env)
        }
        SolveOutcome::Failure(failure) => {
            errors.push(failure.compiler_error);
            TypeScheme::monomorphic(Type::error())
        }
    };

    let body_env = env.bind(name.to_string(), scheme);
    go(&body_env, body, errors)
}

fn desugar_parameters(parameters: &Option<Vec<Param>>, value: &Expr) -> Option<Expr> {
    let params = parameters.as_ref()?;
    Some(Expr::new(
        value.location,
        ExprKind::Lambda {
            params: params.clone(),
            body: Box::new(value.clone()),
        },
    ))
}

fn generate_let_rec_mutual(
    env: &TypeEnvironment,
    bindings: &[(String, Expr)],
    body: &Expr,
    errors: &mut Vec<CompilerError>,
) -> (Type, ConstraintSet) {
    let mut scope = env.clone();
    let mut self_vars = Vec::with_capacity(bindings.len());
    for (name, _) in bindings {
        let v = fresh_type_variable();
        self_vars.push(v);
        scope = scope.extend(name.clone(), Type::Variable(v));
    }

    let mut constraints = ConstraintSet::new();
    for ((_, value), self_var) in bindings.iter().zip(self_vars.iter()) {
        let (value_ty, value_constraints) = go(&scope, value, errors);
        constraints = constraints.union(value_constraints);
        constraints.add(Constraint::equality(
            Type::Variable(*self_var),
            value_ty,
            Some(value.location),
            Origin::Inference,
        ));
    }

    let mut body_env = env.clone();
    match solve(constraints, &InstanceRegistry::new()) {
        SolveOutcome::Success(substitution) => {
            let free_in_env = env.free_variables(&substitution);
            for ((name, _), self_var) in bindings.iter().zip(self_vars.iter()) {
                let solved_ty = substitution.apply(&Type::Variable(*self_var));
                let scheme = TypeScheme::generalize(&solved_ty, &free_in_env);
                body_env = body_env.bind(name.clone(), scheme);
            }
        }
        SolveOutcome::Failure(failure) => {
            errors.push(failure.compiler_error);
            for (name, _) in bindings {
                body_env = body_env.bind(name.clone(), TypeScheme::monomorphic(Type::error()));
            }
        }
    }

    go(&body_env, body, errors)
}

fn generate_match(
    env: &TypeEnvironment,
    expr: &Expr,
    scrutinee: &Expr,
    cases: &[MatchCase],
    errors: &mut Vec<CompilerError>,
) -> (Type, ConstraintSet) {
    let (scrutinee_ty, mut constraints) = go(env, scrutinee, errors);

    if cases.is_empty() {
        errors.push(
            CompilerError::NonExhaustivePatternMatch { missing_patterns: vec!["_".to_string()] }
                .located(expr.location),
        );
        return (Type::error(), constraints);
    }

    let result_ty = Type::Variable(fresh_type_variable());
    for case in cases {
        let (pattern_ty, bindings) = generate_pattern(&case.pattern);
        constraints.add(Constraint::equality(
            scrutinee_ty.clone(),
            pattern_ty,
            Some(case.body.location),
            Origin::Inference,
        ));

        let mut case_env = env.open_scope();
        for (name, ty) in bindings {
            case_env = case_env.extend(name, ty);
        }
        let (case_ty, case_constraints) = go(&case_env, &case.body, errors);
        constraints = constraints.union(case_constraints);
        constraints.add(Constraint::equality(
            case_ty,
            result_ty.clone(),
            Some(case.body.location),
            Origin::Inference,
        ));
    }

    (result_ty, constraints)
}

/// Compute a pattern's type and the variable bindings it introduces
/// (spec §4.7 "match"). Record patterns are row-polymorphic: a pattern
/// naming a subset of fields matches any record that has at least those
/// fields.
fn generate_pattern(pattern: &Pattern) -> (Type, Vec<(String, Type)>) {
    match pattern {
        Pattern::LiteralInt(_) => (Type::int(), Vec::new()),
        Pattern::LiteralBool(_) => (Type::bool(), Vec::new()),
        Pattern::LiteralString(s) => (Type::literal(s.clone()), Vec::new()),
        Pattern::Var(name) => {
            let v = Type::Variable(fresh_type_variable());
            (v.clone(), vec![(name.clone(), v)])
        }
        Pattern::Tuple(elements) => {
            let mut types = Vec::with_capacity(elements.len());
            let mut bindings = Vec::new();
            for element in elements {
                let (ty, mut element_bindings) = generate_pattern(element);
                types.push(ty);
                bindings.append(&mut element_bindings);
            }
            (Type::tuple(types), bindings)
        }
        Pattern::Record(fields) => {
            let mut field_types = Fields::new();
            let mut bindings = Vec::new();
            for FieldPattern { name, pattern } in fields {
                let (ty, mut field_bindings) = generate_pattern(pattern);
                field_types.insert(name.clone(), ty);
                bindings.append(&mut field_bindings);
            }
            let row_var = fresh_type_variable();
            (Type::open_record(field_types, row_var), bindings)
        }
    }
}
