//! Top-level module schema: an ordered sequence of declarations.

use crate::expr::{Expr, Pattern, RecBinding};
use crate::span::Location;
use crate::ty_expr::TypeExpr;

/// One constructor in a `type` declaration: name plus ordered parameter types.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstructorDecl {
    pub name: String,
    pub params: Vec<TypeExpr>,
    pub loc: Location,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Declaration {
    Let {
        pattern: Pattern,
        value: Expr,
        recursive: bool,
        mutable: bool,
        exported: bool,
        loc: Location,
    },
    LetRecGroup {
        bindings: Vec<RecBinding>,
        exported: bool,
        loc: Location,
    },
    /// `external name : type = target_symbol [from "source"]`.
    ///
    /// Several `External` declarations may share `name` to form an overload
    /// set; they must agree on `target_symbol` and `import_source`, checked
    /// during environment construction (not during inference).
    External {
        name: String,
        ty: TypeExpr,
        target_symbol: String,
        import_source: Option<String>,
        loc: Location,
    },
    TypeDecl {
        name: String,
        params: Vec<String>,
        constructors: Vec<ConstructorDecl>,
        loc: Location,
    },
}

impl Declaration {
    pub fn loc(&self) -> Location {
        match self {
            Declaration::Let { loc, .. }
            | Declaration::LetRecGroup { loc, .. }
            | Declaration::External { loc, .. }
            | Declaration::TypeDecl { loc, .. } => *loc,
        }
    }
}

/// A core module: an ordered sequence of declarations.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Module {
    pub declarations: Vec<Declaration>,
}

impl Module {
    pub fn new(declarations: Vec<Declaration>) -> Self {
        Module { declarations }
    }
}
