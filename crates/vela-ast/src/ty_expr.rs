//! Surface type-expression schema (annotations, external declarations).
//!
//! Converted to a `Ty` by the checker; `Var` and `InlineVariant` are
//! rejected by that conversion (`UnsupportedTypeAnnotation`) since this
//! language's surface does not support free type variables or anonymous
//! variant types in annotation position.

use crate::span::Location;

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeExpr {
    /// A named type, possibly applied to no arguments: `Int`, `MyType`.
    Const { name: String, loc: Location },
    /// A free type variable written in an annotation. Always rejected.
    Var { name: String, loc: Location },
    Fun {
        params: Vec<TypeExpr>,
        ret: Box<TypeExpr>,
        loc: Location,
    },
    /// A named constructor applied to arguments: `List<Int>`, `Result<T,E>`.
    App {
        name: String,
        args: Vec<TypeExpr>,
        loc: Location,
    },
    Record {
        fields: Vec<(String, TypeExpr)>,
        loc: Location,
    },
    /// An inline variant type written directly in an annotation. Always
    /// rejected -- variant types must be declared by name.
    InlineVariant {
        constructors: Vec<(String, Vec<TypeExpr>)>,
        loc: Location,
    },
    Union {
        members: Vec<TypeExpr>,
        loc: Location,
    },
}

impl TypeExpr {
    pub fn loc(&self) -> Location {
        match self {
            TypeExpr::Const { loc, .. }
            | TypeExpr::Var { loc, .. }
            | TypeExpr::Fun { loc, .. }
            | TypeExpr::App { loc, .. }
            | TypeExpr::Record { loc, .. }
            | TypeExpr::InlineVariant { loc, .. }
            | TypeExpr::Union { loc, .. } => *loc,
        }
    }
}
