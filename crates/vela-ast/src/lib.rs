//! Core AST schema consumed by the type checker.
//!
//! This crate has no lexer, no parser, no desugaring pass -- it is pure
//! data. An upstream compiler stage is responsible for producing a
//! well-formed [`module::Module`] from surface syntax.

pub mod expr;
pub mod module;
pub mod span;
pub mod ty_expr;

pub use expr::{BinOp, Expr, Literal, MatchCase, Pattern, RecBinding, UnaryOp};
pub use module::{ConstructorDecl, Declaration, Module};
pub use span::{FileId, Location, LineIndex, Span};
pub use ty_expr::TypeExpr;
