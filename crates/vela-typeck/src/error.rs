//! Type error taxonomy with provenance tracking.
//!
//! Every constraint-producing error carries a [`ConstraintOrigin`] recording
//! where the constraint came from, so messages can point past the bare
//! "expected/found" pair to the actual source shape (both branches of an
//! `if`, both sides of a binary op, ...).

use std::fmt;

use vela_ast::Location;

use crate::ty::{Ty, TyVar};

#[derive(Clone, Debug)]
pub enum ConstraintOrigin {
    FnArg { call_site: Location, param_idx: usize },
    BinOp { op_span: Location },
    UnaryOp { op_span: Location },
    MatchArms { first_span: Location, arm_span: Location },
    Annotation { annotation_span: Location },
    LetBinding { binding_span: Location },
    PatternMatch { pattern_span: Location },
    Guard { guard_span: Location },
    RecordUpdate { field_span: Location },
    RefCell { span: Location },
    /// Synthetic origin for built-in constraints with no single source site.
    Builtin,
}

impl ConstraintOrigin {
    pub fn span(&self) -> Option<Location> {
        match self {
            ConstraintOrigin::FnArg { call_site, .. } => Some(*call_site),
            ConstraintOrigin::BinOp { op_span } => Some(*op_span),
            ConstraintOrigin::UnaryOp { op_span } => Some(*op_span),
            ConstraintOrigin::MatchArms { arm_span, .. } => Some(*arm_span),
            ConstraintOrigin::Annotation { annotation_span } => Some(*annotation_span),
            ConstraintOrigin::LetBinding { binding_span } => Some(*binding_span),
            ConstraintOrigin::PatternMatch { pattern_span } => Some(*pattern_span),
            ConstraintOrigin::Guard { guard_span } => Some(*guard_span),
            ConstraintOrigin::RecordUpdate { field_span } => Some(*field_span),
            ConstraintOrigin::RefCell { span } => Some(*span),
            ConstraintOrigin::Builtin => None,
        }
    }
}

/// A type error. Every variant carries a location; most also carry the
/// context needed to render a useful message without re-deriving it.
#[derive(Clone, Debug)]
pub enum TypeError {
    UndefinedVariable { name: String, loc: Location, suggestions: Vec<String> },
    UndefinedConstructor { name: String, loc: Location },
    ConstructorArity { name: String, expected: usize, found: usize, loc: Location },
    Mismatch { expected: Ty, found: Ty, origin: ConstraintOrigin },
    ArityMismatch { expected: usize, found: usize, origin: ConstraintOrigin },
    InfiniteType { var: TyVar, ty: Ty, origin: ConstraintOrigin },
    MissingField { field: String, record_ty: Ty, loc: Location, suggestions: Vec<String> },
    NonRecordAccess { ty: Ty, field: String, loc: Location },
    NonExhaustiveMatch { scrutinee_ty: Ty, missing: Vec<String>, loc: Location },
    InvalidGuard { found: Ty, loc: Location },
    DuplicatePatternVariable { name: String, loc: Location },
    ValueRestriction { name: String, loc: Location },
    EscapingTypeVariable { var: TyVar, loc: Location },
    UnsupportedTypeAnnotation { reason: String, loc: Location },
    NoMatchingOverload { name: String, arity: usize, loc: Location },
    AmbiguousOverload { name: String, arity: usize, loc: Location },
    DuplicateOverloadTarget { name: String, first_target: String, second_target: String },
    InconsistentOverloadImport { name: String, first_source: Option<String>, second_source: Option<String> },
}

impl TypeError {
    /// The primary source location for this error, where one exists.
    pub fn primary_span(&self) -> Option<Location> {
        match self {
            TypeError::UndefinedVariable { loc, .. }
            | TypeError::UndefinedConstructor { loc, .. }
            | TypeError::ConstructorArity { loc, .. }
            | TypeError::MissingField { loc, .. }
            | TypeError::NonRecordAccess { loc, .. }
            | TypeError::NonExhaustiveMatch { loc, .. }
            | TypeError::InvalidGuard { loc, .. }
            | TypeError::DuplicatePatternVariable { loc, .. }
            | TypeError::ValueRestriction { loc, .. }
            | TypeError::EscapingTypeVariable { loc, .. }
            | TypeError::UnsupportedTypeAnnotation { loc, .. }
            | TypeError::NoMatchingOverload { loc, .. }
            | TypeError::AmbiguousOverload { loc, .. } => Some(*loc),
            TypeError::Mismatch { origin, .. }
            | TypeError::ArityMismatch { origin, .. }
            | TypeError::InfiniteType { origin, .. } => origin.span(),
            TypeError::DuplicateOverloadTarget { .. }
            | TypeError::InconsistentOverloadImport { .. } => None,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::UndefinedVariable { name, suggestions, .. } => {
                write!(f, "undefined variable `{}`", name)?;
                if !suggestions.is_empty() {
                    write!(f, " (did you mean: {}?)", suggestions.join(", "))?;
                }
                Ok(())
            }
            TypeError::UndefinedConstructor { name, .. } => {
                write!(f, "undefined constructor `{}`", name)
            }
            TypeError::ConstructorArity { name, expected, found, .. } => {
                write!(
                    f,
                    "constructor `{}` expects {} argument(s), found {}",
                    name, expected, found
                )
            }
            TypeError::Mismatch { expected, found, .. } => {
                write!(f, "type mismatch: expected `{}`, found `{}`", expected, found)
            }
            TypeError::ArityMismatch { expected, found, .. } => {
                write!(f, "arity mismatch: expected {} argument(s), found {}", expected, found)
            }
            TypeError::InfiniteType { var, ty, .. } => {
                write!(f, "infinite type: `?{}` occurs in `{}`", var.0, ty)
            }
            TypeError::MissingField { field, record_ty, suggestions, .. } => {
                write!(f, "no field `{}` on `{}`", field, record_ty)?;
                if !suggestions.is_empty() {
                    write!(f, " (did you mean: {}?)", suggestions.join(", "))?;
                }
                Ok(())
            }
            TypeError::NonRecordAccess { ty, field, .. } => {
                write!(f, "cannot access field `{}` on non-record type `{}`", field, ty)
            }
            TypeError::NonExhaustiveMatch { scrutinee_ty, missing, .. } => {
                write!(
                    f,
                    "non-exhaustive match on `{}`: missing {}",
                    scrutinee_ty,
                    missing.join(", ")
                )
            }
            TypeError::InvalidGuard { found, .. } => {
                write!(f, "guard expression must be `Bool`, found `{}`", found)
            }
            TypeError::DuplicatePatternVariable { name, .. } => {
                write!(f, "variable `{}` bound more than once in this pattern", name)
            }
            TypeError::ValueRestriction { name, .. } => {
                write!(f, "`{}` cannot be generalized; bound monomorphically", name)
            }
            TypeError::EscapingTypeVariable { var, .. } => {
                write!(f, "type variable `?{}` escapes its scope", var.0)
            }
            TypeError::UnsupportedTypeAnnotation { reason, .. } => {
                write!(f, "unsupported type annotation: {}", reason)
            }
            TypeError::NoMatchingOverload { name, arity, .. } => {
                write!(f, "no overload of `{}` accepts {} argument(s)", name, arity)
            }
            TypeError::AmbiguousOverload { name, arity, .. } => {
                write!(f, "ambiguous overload of `{}` for {} argument(s)", name, arity)
            }
            TypeError::DuplicateOverloadTarget { name, first_target, second_target } => {
                write!(
                    f,
                    "overloads of `{}` disagree on target symbol: `{}` vs `{}`",
                    name, first_target, second_target
                )
            }
            TypeError::InconsistentOverloadImport { name, first_source, second_source } => {
                write!(
                    f,
                    "overloads of `{}` disagree on import source: {:?} vs {:?}",
                    name, first_source, second_source
                )
            }
        }
    }
}
