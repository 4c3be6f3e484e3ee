//! Type algebra (spec §3, §4.1).
//!
//! Mirrors the shape of the teacher's `types::Type` enum (primitives,
//! compound constructors, a `Display` impl, and a handful of predicate
//! methods) but swaps in the mini-bendu algebra: literal-string singletons,
//! row-polymorphic records, and set-canonicalised unions/intersections.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// A type variable identifier, drawn from a process-wide fresh-id counter.
///
/// Ordering is by id, which also gives a stable iteration order for sets of
/// variables (needed so `freeVariables()` results are deterministic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeVariable(pub u32);

impl fmt::Display for TypeVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

static NEXT_VAR_ID: AtomicU32 = AtomicU32::new(0);

/// Produce a fresh type variable, unique for the lifetime of the process.
///
/// Safe to call concurrently from independent checker invocations (spec §5):
/// the counter is atomic, so freshness across invocations is still
/// guaranteed even though nothing else is shared.
pub fn fresh_type_variable() -> TypeVariable {
    TypeVariable(NEXT_VAR_ID.fetch_add(1, Ordering::SeqCst))
}

/// Primitive, nullary types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    String,
    Bool,
    Unit,
    /// Placeholder type substituted for an ill-typed sub-expression so
    /// inference can continue past it (spec §4.7 error-recovery policy).
    Error,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Int => write!(f, "Int"),
            Primitive::String => write!(f, "String"),
            Primitive::Bool => write!(f, "Bool"),
            Primitive::Unit => write!(f, "Unit"),
            Primitive::Error => write!(f, "<error>"),
        }
    }
}

/// The tail of a record type (spec §3, §9 "row polymorphism").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Row {
    /// The record has exactly the listed fields, no more.
    Closed,
    /// The record contains at least the listed fields; `var` stands for
    /// whatever else the remainder of the record might hold.
    Open(TypeVariable),
}

impl Row {
    pub fn free_variables(&self) -> HashSet<TypeVariable> {
        match self {
            Row::Closed => HashSet::new(),
            Row::Open(v) => HashSet::from([*v]),
        }
    }
}

/// A record's field map, kept sorted by name so that two structurally equal
/// records compare equal regardless of construction order.
pub type Fields = std::collections::BTreeMap<String, Type>;

/// The full mini-bendu type algebra (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(Primitive),
    /// A singleton type inhabited only by the one string value. Note this is
    /// NOT structurally equivalent to `Primitive(String)` — only a subtype
    /// of it (spec §3, §4.1) — so unions of literals like
    /// `"pending" | "fulfilled"` keep each alternative distinguishable.
    LiteralString(String),
    Variable(TypeVariable),
    Function(Box<Type>, Box<Type>),
    /// Non-empty, ordered (length >= 1; single-element tuples are legal).
    Tuple(Vec<Type>),
    Record(Fields, Row),
    /// Canonicalised: always |alternatives| >= 2, see `Type::union`.
    Union(BTreeSet<CanonType>),
    /// Canonicalised: always |members| >= 2, see `Type::intersection`.
    Intersection(BTreeSet<CanonType>),
    Alias(String, Vec<Type>),
}

/// `Type` wrapper that provides a total order so it can live in a `BTreeSet`
/// (unions/intersections are sets: member order must not affect equality).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonType(pub Box<Type>);

impl PartialOrd for CanonType {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CanonType {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        format!("{:?}", self.0).cmp(&format!("{:?}", other.0))
    }
}

impl Type {
    pub fn int() -> Type {
        Type::Primitive(Primitive::Int)
    }
    pub fn string() -> Type {
        Type::Primitive(Primitive::String)
    }
    pub fn bool() -> Type {
        Type::Primitive(Primitive::Bool)
    }
    pub fn unit() -> Type {
        Type::Primitive(Primitive::Unit)
    }
    pub fn error() -> Type {
        Type::Primitive(Primitive::Error)
    }
    pub fn literal(s: impl Into<String>) -> Type {
        Type::LiteralString(s.into())
    }
    pub fn function(domain: Type, codomain: Type) -> Type {
        Type::Function(Box::new(domain), Box::new(codomain))
    }
    pub fn tuple(elements: Vec<Type>) -> Type {
        assert!(!elements.is_empty(), "Tuple must have at least one element");
        Type::Tuple(elements)
    }
    pub fn closed_record(fields: Fields) -> Type {
        Type::Record(fields, Row::Closed)
    }
    pub fn open_record(fields: Fields, tail: TypeVariable) -> Type {
        Type::Record(fields, Row::Open(tail))
    }

    /// Build a curried multi-argument function type, left-to-right.
    pub fn curried_function(params: Vec<Type>, result: Type) -> Type {
        params
            .into_iter()
            .rev()
            .fold(result, |acc, param| Type::function(param, acc))
    }

    /// Canonicalising constructor for unions (spec §3).
    ///
    /// Flattens nested unions, collapses a singleton set to its sole member,
    /// and otherwise returns a `Union` of at least two alternatives.
    pub fn union(alternatives: Vec<Type>) -> Type {
        let mut flat: BTreeSet<CanonType> = BTreeSet::new();
        for t in alternatives {
            match t {
                Type::Union(members) => flat.extend(members),
                other => {
                    flat.insert(CanonType(Box::new(other)));
                }
            }
        }
        if flat.len() == 1 {
            *flat.into_iter().next().unwrap().0
        } else {
            assert!(!flat.is_empty(), "Union must have at least one alternative");
            Type::Union(flat)
        }
    }

    /// Canonicalising constructor for intersections, symmetric to `union`.
    pub fn intersection(members: Vec<Type>) -> Type {
        let mut flat: BTreeSet<CanonType> = BTreeSet::new();
        for t in members {
            match t {
                Type::Intersection(members) => flat.extend(members),
                other => {
                    flat.insert(CanonType(Box::new(other)));
                }
            }
        }
        if flat.len() == 1 {
            *flat.into_iter().next().unwrap().0
        } else {
            assert!(!flat.is_empty(), "Intersection must have at least one member");
            Type::Intersection(flat)
        }
    }

    pub fn alias(name: impl Into<String>, args: Vec<Type>) -> Type {
        Type::Alias(name.into(), args)
    }

    /// Free type variables, per spec §4.1 ("for `Record` includes the
    /// open-row variable; for `Alias` is the union over args").
    pub fn free_variables(&self) -> HashSet<TypeVariable> {
        match self {
            Type::Primitive(_) | Type::LiteralString(_) => HashSet::new(),
            Type::Variable(v) => HashSet::from([*v]),
            Type::Function(dom, cod) => {
                let mut s = dom.free_variables();
                s.extend(cod.free_variables());
                s
            }
            Type::Tuple(elements) => elements.iter().flat_map(Type::free_variables).collect(),
            Type::Record(fields, row) => {
                let mut s: HashSet<TypeVariable> =
                    fields.values().flat_map(Type::free_variables).collect();
                s.extend(row.free_variables());
                s
            }
            Type::Union(members) | Type::Intersection(members) => members
                .iter()
                .flat_map(|m| m.0.free_variables())
                .collect(),
            Type::Alias(_, args) => args.iter().flat_map(Type::free_variables).collect(),
        }
    }

    /// Deep structural equality, modulo unordered members of
    /// `Union`/`Intersection`/`Record.fields` (spec §4.1). `Union` and
    /// `Intersection` are already canonicalised sets so `PartialEq`
    /// (derived) already treats them as unordered; `Fields` is a
    /// `BTreeMap` so field order never mattered either. This method exists
    /// as the named spec operation and simply delegates.
    pub fn structurally_equivalent(&self, other: &Type) -> bool {
        self == other
    }

    /// Limited subtype predicate (spec §4.1).
    pub fn is_subtype_of(&self, other: &Type) -> bool {
        if self.structurally_equivalent(other) {
            return true;
        }
        match (self, other) {
            (Type::LiteralString(_), Type::Primitive(Primitive::String)) => true,
            (Type::Intersection(members), sup) => {
                members.iter().any(|m| m.0.is_subtype_of(sup))
            }
            (sub, Type::Union(members)) => members.iter().any(|m| sub.is_subtype_of(&m.0)),
            (Type::Record(sub_fields, _), Type::Record(sup_fields, _)) => {
                sup_fields.iter().all(|(name, sup_ty)| {
                    sub_fields
                        .get(name)
                        .is_some_and(|sub_ty| sub_ty.is_subtype_of(sup_ty))
                })
            }
            _ => false,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Type::Variable(_))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{}", p),
            Type::LiteralString(s) => write!(f, "{:?}", s),
            Type::Variable(v) => write!(f, "{}", v),
            Type::Function(dom, cod) => write!(f, "({} -> {})", dom, cod),
            Type::Tuple(elements) => {
                write!(f, "(")?;
                for (i, t) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", t)?;
                }
                write!(f, ")")
            }
            Type::Record(fields, row) => {
                write!(f, "{{ ")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                match row {
                    Row::Closed => write!(f, " }}"),
                    Row::Open(v) => write!(f, " | {} }}", v),
                }
            }
            Type::Union(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", m.0)?;
                }
                Ok(())
            }
            Type::Intersection(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " & ")?;
                    }
                    write!(f, "{}", m.0)?;
                }
                Ok(())
            }
            Type::Alias(name, args) => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, a) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", a)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_flattens_and_dedupes() {
        let u = Type::union(vec![
            Type::int(),
            Type::union(vec![Type::string(), Type::int()]),
        ]);
        assert_eq!(u, Type::union(vec![Type::string(), Type::int()]));
    }

    #[test]
    fn union_of_one_collapses() {
        assert_eq!(Type::union(vec![Type::int()]), Type::int());
    }

    #[test]
    fn union_commutative() {
        let a = Type::union(vec![Type::int(), Type::string()]);
        let b = Type::union(vec![Type::string(), Type::int()]);
        assert!(a.structurally_equivalent(&b));
    }

    #[test]
    fn intersection_commutative() {
        let a = Type::intersection(vec![Type::int(), Type::string()]);
        let b = Type::intersection(vec![Type::string(), Type::int()]);
        assert!(a.structurally_equivalent(&b));
    }

    #[test]
    fn literal_string_not_structurally_equal_to_string() {
        assert_ne!(Type::literal("s"), Type::string());
    }

    #[test]
    fn literal_string_is_subtype_of_string() {
        assert!(Type::literal("s").is_subtype_of(&Type::string()));
        assert!(!Type::string().is_subtype_of(&Type::literal("s")));
    }

    #[test]
    fn record_width_subtyping() {
        let mut wide = Fields::new();
        wide.insert("a".to_string(), Type::int());
        wide.insert("b".to_string(), Type::string());
        let mut narrow = Fields::new();
        narrow.insert("a".to_string(), Type::int());

        let wide_ty = Type::closed_record(wide);
        let narrow_ty = Type::closed_record(narrow);
        assert!(wide_ty.is_subtype_of(&narrow_ty));
        assert!(!narrow_ty.is_subtype_of(&wide_ty));
    }

    #[test]
    fn free_variables_of_record_includes_row_variable() {
        let row_var = fresh_type_variable();
        let rec = Type::open_record(Fields::new(), row_var);
        assert_eq!(rec.free_variables(), HashSet::from([row_var]));
    }

    #[test]
    fn free_variables_of_alias_unions_args() {
        let a = fresh_type_variable();
        let b = fresh_type_variable();
        let alias = Type::alias("Pair", vec![Type::Variable(a), Type::Variable(b)]);
        assert_eq!(alias.free_variables(), HashSet::from([a, b]));
    }

    #[test]
    fn fresh_variables_are_distinct() {
        let a = fresh_type_variable();
        let b = fresh_type_variable();
        assert_ne!(a, b);
    }
}
