//! Core expression, pattern, and declaration schema.
//!
//! This is the already-lowered tree the checker consumes: no surface
//! syntax, no sugar. Every node that can anchor a diagnostic carries a
//! [`Location`].

use crate::span::Location;

/// A binary operator tag. Fixed set; no user-defined operators at this layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Concat,
    /// `:=`, reference assignment.
    RefAssign,
}

/// A unary operator tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    Neg,
    Not,
    /// `!`, reference dereference (distinct from logical `Not` in the AST;
    /// surface `!` spellings are desugared to one or the other upstream).
    Deref,
}

/// A literal value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Unit,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchCase {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Expr,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecBinding {
    pub name: String,
    pub value: Expr,
    pub loc: Location,
}

/// A core expression.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    Literal {
        value: Literal,
        loc: Location,
    },
    Var {
        name: String,
        loc: Location,
    },
    /// `λ pattern. body`. Only a `Pattern::Var` is accepted by the checker;
    /// any other pattern shape is a lowering bug upstream of this crate.
    Lambda {
        param: Pattern,
        body: Box<Expr>,
        loc: Location,
    },
    App {
        func: Box<Expr>,
        args: Vec<Expr>,
        loc: Location,
    },
    BinOp {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        loc: Location,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
        loc: Location,
    },
    /// Non-recursive `let`, and recursive single-binding `let rec` (the
    /// latter distinguished by `recursive: true`).
    Let {
        pattern: Pattern,
        recursive: bool,
        value: Box<Expr>,
        body: Box<Expr>,
        loc: Location,
    },
    /// Mutually recursive group; every binding must be a bare variable name.
    LetRecGroup {
        bindings: Vec<RecBinding>,
        body: Box<Expr>,
        loc: Location,
    },
    Match {
        scrutinee: Box<Expr>,
        cases: Vec<MatchCase>,
        loc: Location,
    },
    RecordLit {
        fields: Vec<(String, Expr)>,
        loc: Location,
    },
    RecordAccess {
        record: Box<Expr>,
        field: String,
        loc: Location,
    },
    RecordUpdate {
        record: Box<Expr>,
        updates: Vec<(String, Expr)>,
        loc: Location,
    },
    /// `C(arg1, ...)` — a variant constructor application.
    VariantConstruct {
        name: String,
        args: Vec<Expr>,
        loc: Location,
    },
    Annotate {
        expr: Box<Expr>,
        ty: crate::ty_expr::TypeExpr,
        loc: Location,
    },
    /// Transparent wrapper: the checker gives it the inner expression's type.
    Unsafe {
        expr: Box<Expr>,
        loc: Location,
    },
}

impl Expr {
    pub fn loc(&self) -> Location {
        match self {
            Expr::Literal { loc, .. }
            | Expr::Var { loc, .. }
            | Expr::Lambda { loc, .. }
            | Expr::App { loc, .. }
            | Expr::BinOp { loc, .. }
            | Expr::UnaryOp { loc, .. }
            | Expr::Let { loc, .. }
            | Expr::LetRecGroup { loc, .. }
            | Expr::Match { loc, .. }
            | Expr::RecordLit { loc, .. }
            | Expr::RecordAccess { loc, .. }
            | Expr::RecordUpdate { loc, .. }
            | Expr::VariantConstruct { loc, .. }
            | Expr::Annotate { loc, .. }
            | Expr::Unsafe { loc, .. } => *loc,
        }
    }
}

/// A core pattern.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pattern {
    Wildcard {
        loc: Location,
    },
    Var {
        name: String,
        loc: Location,
    },
    Literal {
        value: Literal,
        loc: Location,
    },
    Variant {
        name: String,
        args: Vec<Pattern>,
        loc: Location,
    },
    Record {
        fields: Vec<(String, Pattern)>,
        loc: Location,
    },
}

impl Pattern {
    pub fn loc(&self) -> Location {
        match self {
            Pattern::Wildcard { loc }
            | Pattern::Var { loc, .. }
            | Pattern::Literal { loc, .. }
            | Pattern::Variant { loc, .. }
            | Pattern::Record { loc, .. } => *loc,
        }
    }
}
