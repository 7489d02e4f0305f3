//! Hindley-Milner type checking core for a small functional language.
//!
//! The crate has three layers:
//!
//! - Representation: [`ty`] (types, schemes, type variables) and [`unify`]
//!   (the union-find unification table, level-based generalization).
//! - Per-node inference: [`infer`] (Algorithm W over `vela_ast::Expr`),
//!   [`pattern`] (pattern checking) and [`exhaustiveness`] (Maranget
//!   usefulness over an abstract pattern domain independent of the AST).
//! - Module-level driver: [`driver`] walks an ordered `vela_ast::Module`,
//!   installing type declarations, external overload sets, and top-level
//!   bindings into a shared environment seeded by [`builtins`].
//!
//! [`driver::type_check`] is the entry point; everything else is exposed
//! for callers that want to drive inference over a single expression (a
//! REPL evaluating one line at a time, for instance) without going through
//! a full module.
//!
//! [`diagnostics`] is a separate, optional rendering layer: the core never
//! touches I/O or color, it only ever produces [`TypeError`] values.

pub mod builtins;
pub mod convert;
pub mod diagnostics;
pub mod driver;
pub mod env;
pub mod error;
pub mod exhaustiveness;
pub mod infer;
pub mod pattern;
pub mod suggest;
pub mod ty;
pub mod unify;

pub use diagnostics::{render_diagnostic, DiagnosticOptions};
pub use driver::{type_check, TypeckResult};
pub use env::{TypeDef, TypeDefEnv, TypeEnv, ValueBinding};
pub use error::{ConstraintOrigin, TypeError};
pub use ty::{Scheme, Ty, TyCon, TyVar};
pub use unify::InferCtx;
