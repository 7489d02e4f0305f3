//! Pattern checking: pattern -> (type, bindings), and the bridge from core
//! AST patterns/types into [`crate::exhaustiveness`]'s abstract `Pat`/
//! `TypeInfo` pair.
//!
//! `check_pattern` walks a [`vela_ast::Pattern`] against an expected `Ty`,
//! extending a fresh binding set as it goes and rejecting a name bound
//! twice within one pattern tree. `type_info_for` resolves a scrutinee type
//! into the finite-or-infinite domain description the usefulness algorithm
//! needs; recursive algebraic types (`List`) are cut off by a `seen` set so
//! construction always terminates.

use std::collections::{BTreeMap, HashSet};

use rustc_hash::FxHashMap;
use vela_ast::{Literal, Location, Pattern};

use crate::convert::type_expr_to_ty_with_params;
use crate::env::{TypeDefEnv, TypeEnv, ValueBinding};
use crate::error::{ConstraintOrigin, TypeError};
use crate::exhaustiveness::{ConstructorSig, LitKind, Pat, TypeInfo};
use crate::suggest::suggest;
use crate::ty::Ty;
use crate::unify::InferCtx;

/// Check `pattern` against `expected`, returning the (possibly-refined)
/// type and the set of names it binds. Rejects a repeated binding name
/// anywhere within the same pattern tree.
pub fn check_pattern(
    ctx: &mut InferCtx,
    env: &TypeEnv,
    pattern: &Pattern,
    expected: Ty,
) -> Result<(Ty, FxHashMap<String, Ty>), TypeError> {
    let mut bindings = FxHashMap::default();
    let ty = check_pattern_inner(ctx, env, pattern, expected, &mut bindings)?;
    Ok((ty, bindings))
}

fn check_pattern_inner(
    ctx: &mut InferCtx,
    env: &TypeEnv,
    pattern: &Pattern,
    expected: Ty,
    bindings: &mut FxHashMap<String, Ty>,
) -> Result<Ty, TypeError> {
    match pattern {
        Pattern::Wildcard { .. } => Ok(expected),

        Pattern::Var { name, loc } => {
            if bindings.contains_key(name) {
                return Err(TypeError::DuplicatePatternVariable { name: name.clone(), loc: *loc });
            }
            bindings.insert(name.clone(), expected.clone());
            Ok(expected)
        }

        Pattern::Literal { value, loc } => {
            let lit_ty = literal_ty(value);
            ctx.unify(expected.clone(), lit_ty, ConstraintOrigin::PatternMatch { pattern_span: *loc })?;
            Ok(expected)
        }

        Pattern::Variant { name, args, loc } => {
            let scheme = match env.lookup(name) {
                Some(ValueBinding::Scheme(scheme)) => scheme.clone(),
                Some(ValueBinding::Overload(_)) => {
                    return Err(TypeError::UndefinedConstructor { name: name.clone(), loc: *loc });
                }
                None => return Err(TypeError::UndefinedConstructor { name: name.clone(), loc: *loc }),
            };
            let ctor_ty = ctx.instantiate(&scheme);
            let (params, ret) = match ctor_ty {
                Ty::Fun(params, ret) => (params, *ret),
                other => (Vec::new(), other),
            };
            if params.len() != args.len() {
                return Err(TypeError::ConstructorArity {
                    name: name.clone(),
                    expected: params.len(),
                    found: args.len(),
                    loc: *loc,
                });
            }
            ctx.unify(ret.clone(), expected, ConstraintOrigin::PatternMatch { pattern_span: *loc })?;
            for (sub_pattern, param_ty) in args.iter().zip(params.into_iter()) {
                let resolved_param = ctx.resolve(param_ty);
                check_pattern_inner(ctx, env, sub_pattern, resolved_param, bindings)?;
            }
            Ok(ctx.resolve(ret))
        }

        Pattern::Record { fields, loc } => {
            let resolved = ctx.resolve(expected);
            match resolved {
                Ty::Record(record_fields) => {
                    for (field_name, sub_pattern) in fields {
                        match record_fields.get(field_name) {
                            Some(field_ty) => {
                                let resolved_field = ctx.resolve(field_ty.clone());
                                check_pattern_inner(ctx, env, sub_pattern, resolved_field, bindings)?;
                            }
                            None => {
                                let suggestions = suggest(field_name, record_fields.keys());
                                return Err(TypeError::MissingField {
                                    field: field_name.clone(),
                                    record_ty: Ty::Record(record_fields.clone()),
                                    loc: *loc,
                                    suggestions,
                                });
                            }
                        }
                    }
                    Ok(Ty::Record(record_fields))
                }
                Ty::Var(_) => {
                    let mut fresh_fields = BTreeMap::new();
                    for (field_name, _) in fields {
                        fresh_fields.insert(field_name.clone(), ctx.fresh_var());
                    }
                    let rec_ty = Ty::Record(fresh_fields.clone());
                    ctx.unify(resolved, rec_ty.clone(), ConstraintOrigin::PatternMatch { pattern_span: *loc })?;
                    for (field_name, sub_pattern) in fields {
                        let field_ty = fresh_fields[field_name].clone();
                        let resolved_field = ctx.resolve(field_ty);
                        check_pattern_inner(ctx, env, sub_pattern, resolved_field, bindings)?;
                    }
                    Ok(ctx.resolve(rec_ty))
                }
                other => Err(TypeError::Mismatch {
                    expected: Ty::Record(
                        fields.iter().map(|(name, _)| (name.clone(), ctx.fresh_var())).collect(),
                    ),
                    found: other,
                    origin: ConstraintOrigin::PatternMatch { pattern_span: *loc },
                }),
            }
        }
    }
}

fn literal_ty(value: &Literal) -> Ty {
    match value {
        Literal::Int(_) => Ty::int(),
        Literal::Float(_) => Ty::float(),
        Literal::String(_) => Ty::string(),
        Literal::Bool(_) => Ty::bool(),
        Literal::Unit => Ty::unit(),
    }
}

// ── Bridge to the exhaustiveness checker ──────────────────────────────────

/// Convert a core-AST pattern to the abstract shape [`crate::exhaustiveness`]
/// reasons about. Record patterns have no counterpart there (records are not
/// part of the built-in exhaustiveness domain) and map to a wildcard; the
/// caller only uses the result when `type_info_for` produced a finite
/// description of the scrutinee type, which never happens for a record.
pub fn to_exhaustiveness_pat(pattern: &Pattern) -> Pat {
    match pattern {
        Pattern::Wildcard { .. } | Pattern::Var { .. } => Pat::Wildcard,
        Pattern::Literal { value: Literal::Unit, .. } => {
            Pat::Constructor { name: "()".to_string(), type_name: "Unit".to_string(), args: Vec::new() }
        }
        Pattern::Literal { value, .. } => Pat::Literal { value: literal_text(value), ty: literal_kind(value) },
        Pattern::Variant { name, args, .. } => Pat::Constructor {
            name: name.clone(),
            type_name: String::new(),
            args: args.iter().map(to_exhaustiveness_pat).collect(),
        },
        Pattern::Record { .. } => Pat::Wildcard,
    }
}

fn literal_text(value: &Literal) -> String {
    match value {
        Literal::Int(i) => i.to_string(),
        Literal::Float(f) => f.to_string(),
        Literal::String(s) => format!("{:?}", s),
        Literal::Bool(b) => b.to_string(),
        Literal::Unit => "()".to_string(),
    }
}

fn literal_kind(value: &Literal) -> LitKind {
    match value {
        Literal::Int(_) => LitKind::Int,
        Literal::Float(_) => LitKind::Float,
        Literal::String(_) => LitKind::String,
        Literal::Bool(_) => LitKind::Bool,
        Literal::Unit => unreachable!("Unit literals convert through the single-constructor path"),
    }
}

/// Resolve a scrutinee type into the finite-or-infinite domain description
/// exhaustiveness needs, or `None` when the type has no defined exhaustiveness
/// domain (functions, tuples, unions, records, unresolved variables).
pub fn type_info_for(ctx: &mut InferCtx, type_defs: &TypeDefEnv, ty: &Ty) -> Option<TypeInfo> {
    let resolved = ctx.resolve(ty.clone());
    let mut seen = HashSet::new();
    type_info_for_inner(ctx, type_defs, &resolved, &mut seen)
}

fn type_info_for_inner(
    ctx: &mut InferCtx,
    type_defs: &TypeDefEnv,
    ty: &Ty,
    seen: &mut HashSet<String>,
) -> Option<TypeInfo> {
    let (name, args): (&str, &[Ty]) = match ty {
        Ty::Con(c) => (c.name.as_str(), &[]),
        Ty::App(con, args) => match con.as_ref() {
            Ty::Con(c) => (c.name.as_str(), args.as_slice()),
            _ => return None,
        },
        _ => return None,
    };

    match name {
        "Bool" => return Some(TypeInfo::Bool),
        "Int" | "Float" | "String" => return Some(TypeInfo::Infinite),
        "Unit" => {
            return Some(TypeInfo::SumType {
                variants: vec![ConstructorSig { name: "()".to_string(), arg_types: Vec::new() }],
            })
        }
        _ => {}
    }

    if seen.contains(name) {
        return Some(TypeInfo::Infinite);
    }

    let type_def = type_defs.lookup(name)?;
    let param_map: FxHashMap<String, Ty> =
        type_def.params.iter().cloned().zip(args.iter().cloned()).collect();

    seen.insert(name.to_string());
    let mut variants = Vec::new();
    for (ctor_name, param_texprs) in &type_def.constructors {
        let mut arg_types = Vec::new();
        for texpr in param_texprs {
            let arg_ty = match type_expr_to_ty_with_params(texpr, &param_map) {
                Ok(t) => t,
                Err(_) => continue,
            };
            let nested = type_info_for_inner(ctx, type_defs, &arg_ty, seen).unwrap_or(TypeInfo::Infinite);
            arg_types.push(nested);
        }
        variants.push(ConstructorSig { name: ctor_name.clone(), arg_types });
    }
    seen.remove(name);

    Some(TypeInfo::SumType { variants })
}

/// Render a list of missing-coverage witnesses as the names `NonExhaustiveMatch`
/// reports.
pub fn describe_missing(witnesses: &[Pat]) -> Vec<String> {
    witnesses
        .iter()
        .map(|p| match p {
            Pat::Constructor { name, .. } => name.clone(),
            Pat::Literal { value, .. } => value.clone(),
            Pat::Wildcard => "_".to_string(),
            Pat::Or { alternatives } => {
                alternatives.first().map(|a| describe_missing(std::slice::from_ref(a))[0].clone()).unwrap_or_default()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_ast::{FileId, Span};

    fn loc() -> Location {
        Location::new(FileId(0), Span::new(0, 0))
    }

    #[test]
    fn wildcard_binds_nothing() {
        let mut ctx = InferCtx::new();
        let env = TypeEnv::new();
        let (ty, bindings) =
            check_pattern(&mut ctx, &env, &Pattern::Wildcard { loc: loc() }, Ty::int()).unwrap();
        assert_eq!(ty, Ty::int());
        assert!(bindings.is_empty());
    }

    #[test]
    fn var_binds_expected_type() {
        let mut ctx = InferCtx::new();
        let env = TypeEnv::new();
        let (_, bindings) = check_pattern(
            &mut ctx,
            &env,
            &Pattern::Var { name: "x".into(), loc: loc() },
            Ty::int(),
        )
        .unwrap();
        assert_eq!(bindings.get("x"), Some(&Ty::int()));
    }

    #[test]
    fn duplicate_variable_in_same_tuple_of_variants_is_rejected() {
        let mut ctx = InferCtx::new();
        let mut env = TypeEnv::new();
        env.insert_scheme(
            "Pair".into(),
            crate::ty::Scheme::mono(Ty::fun(vec![Ty::int(), Ty::int()], Ty::int())),
        );
        let pattern = Pattern::Variant {
            name: "Pair".into(),
            args: vec![
                Pattern::Var { name: "x".into(), loc: loc() },
                Pattern::Var { name: "x".into(), loc: loc() },
            ],
            loc: loc(),
        };
        let result = check_pattern(&mut ctx, &env, &pattern, Ty::int());
        assert!(matches!(result, Err(TypeError::DuplicatePatternVariable { .. })));
    }

    #[test]
    fn missing_field_reports_suggestions() {
        let mut ctx = InferCtx::new();
        let env = TypeEnv::new();
        let mut fields = BTreeMap::new();
        fields.insert("x".to_string(), Ty::int());
        fields.insert("y".to_string(), Ty::int());
        let pattern = Pattern::Record {
            fields: vec![("z".to_string(), Pattern::Wildcard { loc: loc() })],
            loc: loc(),
        };
        let result = check_pattern(&mut ctx, &env, &pattern, Ty::Record(fields));
        assert!(matches!(result, Err(TypeError::MissingField { .. })));
    }

    #[test]
    fn type_info_for_bool() {
        let mut ctx = InferCtx::new();
        let type_defs = TypeDefEnv::new();
        let info = type_info_for(&mut ctx, &type_defs, &Ty::bool());
        assert!(matches!(info, Some(TypeInfo::Bool)));
    }

    #[test]
    fn type_info_for_int_is_infinite() {
        let mut ctx = InferCtx::new();
        let type_defs = TypeDefEnv::new();
        let info = type_info_for(&mut ctx, &type_defs, &Ty::int());
        assert!(matches!(info, Some(TypeInfo::Infinite)));
    }

    #[test]
    fn type_info_for_option_is_sum_type_with_two_variants() {
        let mut ctx = InferCtx::new();
        let mut type_defs = TypeDefEnv::new();
        crate::builtins::register_builtins(&mut TypeEnv::new(), &mut type_defs);
        let info = type_info_for(&mut ctx, &type_defs, &Ty::option(Ty::int()));
        match info {
            Some(TypeInfo::SumType { variants }) => assert_eq!(variants.len(), 2),
            other => panic!("expected SumType, got {other:?}"),
        }
    }

    #[test]
    fn type_info_for_list_terminates_on_recursive_cons() {
        let mut ctx = InferCtx::new();
        let mut type_defs = TypeDefEnv::new();
        crate::builtins::register_builtins(&mut TypeEnv::new(), &mut type_defs);
        let info = type_info_for(&mut ctx, &type_defs, &Ty::list(Ty::int()));
        match info {
            Some(TypeInfo::SumType { variants }) => assert_eq!(variants.len(), 2),
            other => panic!("expected SumType, got {other:?}"),
        }
    }
}
