//! `TypeChecker` facade (spec §4.9): drives Generating -> Solving ->
//! Success/Failure for a single expression, a sequence of expressions
//! sharing one fresh-id source, or a whole program.
//!
//! Mirrors the teacher's `checker::TypeChecker`, which drives passes over
//! a swc module collecting `TypeError`s as it goes; this facade drives the
//! generator and solver instead of a swc visitor.

use crate::ast::Expr;
use crate::env::TypeEnvironment;
use crate::error::{CompilerError, CompilerWarning, Failure};
use crate::generator::generate;
use crate::location::Location;
use crate::solver::{solve, InstanceRegistry, SolveOutcome};
use crate::substitution::Substitution;
use crate::types::Type;

/// A successful check: the principal type found, the substitution that
/// makes it principal, and any non-blocking warnings collected along the
/// way (spec §7: warnings "never block a Success result").
#[derive(Debug, Clone, PartialEq)]
pub struct Success {
    pub ty: Type,
    pub substitution: Substitution,
    pub warnings: Vec<CompilerWarning>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Success(Success),
    Failure(Failure),
}

/// Either a located type together with its pretty-printed form, for a
/// query that fell inside a checked expression, or nothing, for one that
/// fell outside it (spec §4.9 `get_type_information`: `Available(type,
/// prettyType)`).
pub enum TypeInformation {
    Available { ty: Type, pretty: String },
    Unavailable,
}

pub struct TypeChecker {
    env: TypeEnvironment,
    instances: InstanceRegistry,
}

impl TypeChecker {
    pub fn new() -> Self {
        Self {
            env: TypeEnvironment::new(),
            instances: InstanceRegistry::new(),
        }
    }

    pub fn with_env(env: TypeEnvironment) -> Self {
        Self {
            env,
            instances: InstanceRegistry::new(),
        }
    }

    pub fn with_instances(mut self, instances: InstanceRegistry) -> Self {
        self.instances = instances;
        self
    }

    /// Generate -> Solve -> report, for one expression (spec §4.9, §5's
    /// state machine).
    pub fn type_check(&self, expr: &Expr) -> CheckOutcome {
        let generated = generate(&self.env, expr);
        if let Some(first) = generated.errors.into_iter().next() {
            return CheckOutcome::Failure(Failure::new(first));
        }
        match solve(generated.constraints, &self.instances) {
            SolveOutcome::Success(substitution) => CheckOutcome::Success(Success {
                ty: substitution.apply(&generated.ty),
                substitution,
                warnings: generated.warnings,
            }),
            SolveOutcome::Failure(failure) => CheckOutcome::Failure(failure),
        }
    }

    /// Check several expressions against the same environment and a
    /// shared fresh-id source (spec §4.9 `typeCheckIncrementally`):
    /// each element is generated and solved independently, but the
    /// process-wide fresh variable counter is never reset between them,
    /// so no two elements' inferred variables can collide.
    pub fn type_check_incrementally(&self, exprs: &[Expr]) -> IncrementalResult {
        let results: Vec<CheckOutcome> = exprs.iter().map(|e| self.type_check(e)).collect();
        let errors: Vec<CompilerError> = results
            .iter()
            .filter_map(|r| match r {
                CheckOutcome::Failure(f) => Some(f.compiler_error.clone()),
                CheckOutcome::Success(_) => None,
            })
            .collect();
        let warnings: Vec<CompilerWarning> = results
            .iter()
            .filter_map(|r| match r {
                CheckOutcome::Success(s) => Some(s.warnings.clone()),
                CheckOutcome::Failure(_) => None,
            })
            .flatten()
            .collect();
        IncrementalResult {
            has_errors: !errors.is_empty(),
            results,
            errors,
            warnings,
        }
    }

    /// Check a whole program: a sequence of top-level `let` bindings ending
    /// in a final expression, already threaded into one `Expr` by the
    /// caller (the core has no module/import system of its own — spec §6
    /// "no module system belongs to the core"). Returns the outcome
    /// alongside a list of best-effort suggestions (spec §4.9: "a
    /// top-level Success/Failure and a list of suggestions"); this facade
    /// contributes no suggestions of its own yet, matching the teacher's
    /// own `checker::TypeChecker::check_module` vs. `check_expr` split in
    /// everything but that extra slot.
    pub fn type_check_program(&self, program: &Expr) -> ProgramResult {
        ProgramResult {
            outcome: self.type_check(program),
            suggestions: Vec::new(),
        }
    }

    /// Best-effort lookup of the type assigned to the sub-expression at
    /// `location`, after a successful check (spec §4.9: `Available(type,
    /// prettyType)`). Re-generates and re-solves, since this facade keeps
    /// no persistent typed-AST cache.
    pub fn get_type_information(&self, expr: &Expr, location: Location) -> TypeInformation {
        match self.type_check(expr) {
            CheckOutcome::Success(_) => find_location(expr, location)
                .map(|found| self.type_check(found))
                .and_then(|outcome| match outcome {
                    CheckOutcome::Success(success) => {
                        let pretty = success.ty.to_string();
                        Some(TypeInformation::Available { ty: success.ty, pretty })
                    }
                    CheckOutcome::Failure(_) => None,
                })
                .unwrap_or(TypeInformation::Unavailable),
            CheckOutcome::Failure(_) => TypeInformation::Unavailable,
        }
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

pub struct IncrementalResult {
    pub results: Vec<CheckOutcome>,
    pub has_errors: bool,
    pub errors: Vec<CompilerError>,
    pub warnings: Vec<CompilerWarning>,
}

/// The result of `type_check_program` (spec §4.9): the outcome of checking
/// the whole program, plus any best-effort suggestions gathered alongside
/// it (may be empty).
pub struct ProgramResult {
    pub outcome: CheckOutcome,
    pub suggestions: Vec<String>,
}

/// Find the innermost sub-expression whose location exactly matches
/// `target`, depth-first.
fn find_location(expr: &Expr, target: Location) -> Option<&Expr> {
    use crate::ast::ExprKind::*;

    let found_in_children = match &expr.kind {
        LiteralInt(_) | LiteralString(_) | LiteralBool(_) | Var(_) => None,
        BinaryOp { left, right, .. } => find_location(left, target).or_else(|| find_location(right, target)),
        If { condition, then_branch, else_branch } => find_location(condition, target)
            .or_else(|| find_location(then_branch, target))
            .or_else(|| find_location(else_branch, target)),
        Lambda { body, .. } => find_location(body, target),
        Application { function, argument } => {
            find_location(function, target).or_else(|| find_location(argument, target))
        }
        Let { value, body, .. } => find_location(value, target).or_else(|| find_location(body, target)),
        LetRecMutual { bindings, body } => bindings
            .iter()
            .find_map(|(_, v)| find_location(v, target))
            .or_else(|| find_location(body, target)),
        Tuple(elements) => elements.iter().find_map(|e| find_location(e, target)),
        Record(fields) => fields.iter().find_map(|f| find_location(&f.value, target)),
        Projection { record, .. } => find_location(record, target),
        Match { scrutinee, cases } => find_location(scrutinee, target)
            .or_else(|| cases.iter().find_map(|c| find_location(&c.body, target))),
    };

    found_in_children.or(if expr.location == target { Some(expr) } else { None })
}
