//! Conversion from surface `TypeExpr` to the internal `Ty` representation.
//!
//! Two entry points share one recursive walk: [`type_expr_to_ty`] is used
//! for annotations and `external` signatures, where a free type variable
//! has nothing to refer to and is rejected outright. [`type_expr_to_ty_with_params`]
//! is used while registering a `type` declaration's constructors, where a
//! bound parameter name (`T` in `type List<T> = ...`) resolves to a
//! concrete `Ty` supplied by the caller.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use vela_ast::TypeExpr;

use crate::error::TypeError;
use crate::ty::{Ty, TyCon};

/// Convert a type expression with no type-parameter scope. Any `Var` is
/// necessarily free and rejected.
pub fn type_expr_to_ty(texpr: &TypeExpr) -> Result<Ty, TypeError> {
    let empty = FxHashMap::default();
    convert(texpr, &empty)
}

/// Convert a type expression inside a `type` declaration's constructor
/// signature, where `params` maps each declared type parameter name to the
/// concrete `Ty` standing in for it.
pub fn type_expr_to_ty_with_params(
    texpr: &TypeExpr,
    params: &FxHashMap<String, Ty>,
) -> Result<Ty, TypeError> {
    convert(texpr, params)
}

fn convert(texpr: &TypeExpr, params: &FxHashMap<String, Ty>) -> Result<Ty, TypeError> {
    match texpr {
        TypeExpr::Const { name, .. } => Ok(Ty::Con(TyCon::new(name.as_str()))),
        TypeExpr::Var { name, loc } => params.get(name).cloned().ok_or_else(|| {
            TypeError::UnsupportedTypeAnnotation {
                reason: format!("free type variable `{}` is not supported in this position", name),
                loc: *loc,
            }
        }),
        TypeExpr::Fun { params: param_tys, ret, .. } => {
            let converted_params = param_tys
                .iter()
                .map(|p| convert(p, params))
                .collect::<Result<Vec<_>, _>>()?;
            let converted_ret = convert(ret, params)?;
            Ok(Ty::fun(converted_params, converted_ret))
        }
        TypeExpr::App { name, args, .. } => {
            let converted_args =
                args.iter().map(|a| convert(a, params)).collect::<Result<Vec<_>, _>>()?;
            Ok(Ty::App(Box::new(Ty::Con(TyCon::new(name.as_str()))), converted_args))
        }
        TypeExpr::Record { fields, .. } => {
            let converted: BTreeMap<String, Ty> = fields
                .iter()
                .map(|(name, texpr)| Ok((name.clone(), convert(texpr, params)?)))
                .collect::<Result<_, TypeError>>()?;
            Ok(Ty::Record(converted))
        }
        TypeExpr::InlineVariant { loc, .. } => Err(TypeError::UnsupportedTypeAnnotation {
            reason: "inline variant types must be declared by name".to_string(),
            loc: *loc,
        }),
        TypeExpr::Union { members, .. } => {
            let converted =
                members.iter().map(|m| convert(m, params)).collect::<Result<Vec<_>, _>>()?;
            Ok(Ty::Union(converted))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_ast::{FileId, Location, Span};

    fn loc() -> Location {
        Location::new(FileId(0), Span::new(0, 0))
    }

    #[test]
    fn const_converts_to_con() {
        let texpr = TypeExpr::Const { name: "Int".into(), loc: loc() };
        assert_eq!(type_expr_to_ty(&texpr).unwrap(), Ty::int());
    }

    #[test]
    fn free_var_is_rejected() {
        let texpr = TypeExpr::Var { name: "T".into(), loc: loc() };
        assert!(matches!(
            type_expr_to_ty(&texpr),
            Err(TypeError::UnsupportedTypeAnnotation { .. })
        ));
    }

    #[test]
    fn inline_variant_is_rejected() {
        let texpr = TypeExpr::InlineVariant { constructors: vec![], loc: loc() };
        assert!(matches!(
            type_expr_to_ty(&texpr),
            Err(TypeError::UnsupportedTypeAnnotation { .. })
        ));
    }

    #[test]
    fn app_converts_positionally() {
        let texpr = TypeExpr::App {
            name: "List".into(),
            args: vec![TypeExpr::Const { name: "Int".into(), loc: loc() }],
            loc: loc(),
        };
        assert_eq!(type_expr_to_ty(&texpr).unwrap(), Ty::list(Ty::int()));
    }

    #[test]
    fn bound_var_resolves_via_params() {
        let texpr = TypeExpr::Var { name: "T".into(), loc: loc() };
        let mut params = FxHashMap::default();
        params.insert("T".to_string(), Ty::int());
        assert_eq!(type_expr_to_ty_with_params(&texpr, &params).unwrap(), Ty::int());
    }

    #[test]
    fn record_converts_fieldwise() {
        let texpr = TypeExpr::Record {
            fields: vec![
                ("x".into(), TypeExpr::Const { name: "Int".into(), loc: loc() }),
                ("y".into(), TypeExpr::Const { name: "String".into(), loc: loc() }),
            ],
            loc: loc(),
        };
        let ty = type_expr_to_ty(&texpr).unwrap();
        match ty {
            Ty::Record(fields) => {
                assert_eq!(fields.get("x"), Some(&Ty::int()));
                assert_eq!(fields.get("y"), Some(&Ty::string()));
            }
            _ => panic!("expected Record"),
        }
    }
}
