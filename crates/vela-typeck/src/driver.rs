//! Module-level driver: the `typeCheck` entry point.
//!
//! Unlike the nested `let`/`let rec` forms in [`crate::infer`], a top-level
//! declaration has no enclosing body expression -- its scheme is installed
//! directly into the (never-popped) global scope so every later declaration
//! sees it. Declarations are processed strictly in source order; the first
//! diagnostic halts the walk and is returned to the caller. There is no
//! multi-error collection in this core.

use rustc_hash::FxHashMap;
use vela_ast::{ConstructorDecl, Declaration, Expr, Location, Module, Pattern, RecBinding};

use crate::builtins;
use crate::convert::{type_expr_to_ty, type_expr_to_ty_with_params};
use crate::env::{OverloadCandidate, TypeDef, TypeDefEnv, TypeEnv, ValueBinding};
use crate::error::{ConstraintOrigin, TypeError};
use crate::infer::{infer_expr, is_syntactic_value};
use crate::pattern::check_pattern;
use crate::ty::{Scheme, Ty, TyCon, TyVar};
use crate::unify::InferCtx;

/// The result of type-checking one module: every top-level binding's
/// generalized scheme, plus the environments a caller can use to seed a
/// dependent module (import resolution is an upstream responsibility, not
/// this crate's).
pub struct TypeckResult {
    pub declaration_types: FxHashMap<String, Scheme>,
    pub env: TypeEnv,
    pub type_defs: TypeDefEnv,
}

/// Tracks one external name's overload set as it accumulates across
/// possibly-scattered `external` declarations, so a later declaration can
/// be checked for agreement with the first one seen.
struct OverloadMeta {
    target_symbol: String,
    import_source: Option<String>,
    candidates: Vec<OverloadCandidate>,
}

/// Type-check a module. Declarations are visited in order; each extends
/// the environment the rest of the walk sees.
pub fn type_check(module: &Module) -> Result<TypeckResult, TypeError> {
    let mut ctx = InferCtx::new();
    let mut env = TypeEnv::new();
    let mut type_defs = TypeDefEnv::new();
    builtins::register_builtins(&mut env, &mut type_defs);

    let mut declaration_types = FxHashMap::default();
    let mut overloads: FxHashMap<String, OverloadMeta> = FxHashMap::default();

    for decl in &module.declarations {
        match decl {
            Declaration::TypeDecl { name, params, constructors, .. } => {
                register_type_decl(&mut ctx, &mut env, &mut type_defs, name, params, constructors)?;
            }

            Declaration::External { name, ty, target_symbol, import_source, .. } => {
                register_external(&mut env, &mut overloads, name, ty, target_symbol, import_source)?;
            }

            Declaration::Let { pattern, value, recursive, loc, .. } => {
                let scheme =
                    check_top_level_let(&mut ctx, &mut env, &type_defs, pattern, value, *recursive, *loc)?;
                if let Pattern::Var { name, .. } = pattern {
                    declaration_types.insert(name.clone(), scheme);
                }
            }

            Declaration::LetRecGroup { bindings, .. } => {
                for (name, scheme) in check_top_level_let_rec_group(&mut ctx, &mut env, &type_defs, bindings)? {
                    declaration_types.insert(name, scheme);
                }
            }
        }
    }

    Ok(TypeckResult { declaration_types, env, type_defs })
}

// ── Type declarations ──────────────────────────────────────────────────

/// Register a user-declared algebraic type and its constructors, the same
/// way [`builtins::register_builtins`] registers `List`/`Option`/`Result`:
/// a `TypeDef` in the type namespace (surface `TypeExpr` parameter types,
/// unconverted) plus one function-typed value binding per constructor,
/// quantified over the type's own parameters.
fn register_type_decl(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &mut TypeDefEnv,
    name: &str,
    params: &[String],
    constructors: &[ConstructorDecl],
) -> Result<(), TypeError> {
    type_defs.insert(
        name.to_string(),
        TypeDef {
            params: params.to_vec(),
            constructors: constructors.iter().map(|c| (c.name.clone(), c.params.clone())).collect(),
        },
    );

    for ctor in constructors {
        let param_vars: Vec<(String, TyVar)> = params
            .iter()
            .map(|p| {
                let var = match ctx.fresh_var() {
                    Ty::Var(v) => v,
                    _ => unreachable!("fresh_var always returns Ty::Var"),
                };
                (p.clone(), var)
            })
            .collect();
        let param_map: FxHashMap<String, Ty> =
            param_vars.iter().map(|(p, v)| (p.clone(), Ty::Var(*v))).collect();

        let mut arg_tys = Vec::with_capacity(ctor.params.len());
        for texpr in &ctor.params {
            arg_tys.push(type_expr_to_ty_with_params(texpr, &param_map)?);
        }

        let type_args: Vec<Ty> = params.iter().map(|p| param_map[p].clone()).collect();
        let ret_ty = if type_args.is_empty() {
            Ty::Con(TyCon::new(name))
        } else {
            Ty::App(Box::new(Ty::Con(TyCon::new(name))), type_args)
        };

        let vars: Vec<TyVar> = param_vars.into_iter().map(|(_, v)| v).collect();
        env.insert_scheme(ctor.name.clone(), Scheme { vars, ty: Ty::fun(arg_tys, ret_ty) });
    }

    Ok(())
}

// ── External declarations & overload sets ───────────────────────────────

/// Register one `external` declaration, folding it into any existing
/// overload set for `name`. A second `external` for a name already seen
/// must agree on target symbol and import source (else
/// `DuplicateOverloadTarget` / `InconsistentOverloadImport`); these are
/// environment-build errors, not inference errors, so they have no source
/// location of their own.
fn register_external(
    env: &mut TypeEnv,
    overloads: &mut FxHashMap<String, OverloadMeta>,
    name: &str,
    ty: &vela_ast::TypeExpr,
    target_symbol: &str,
    import_source: &Option<String>,
) -> Result<(), TypeError> {
    let converted = type_expr_to_ty(ty)?;
    let arity = match &converted {
        Ty::Fun(params, _) => params.len(),
        _ => 0,
    };
    // External signatures never contain a free type variable -- `type_expr_to_ty`
    // rejects one outright -- so there is nothing for generalization to quantify.
    let scheme = Scheme::mono(converted);
    let candidate =
        OverloadCandidate { arity, scheme: scheme.clone(), target_symbol: target_symbol.to_string() };

    match overloads.get_mut(name) {
        None => {
            env.insert_scheme(name.to_string(), scheme);
            overloads.insert(
                name.to_string(),
                OverloadMeta {
                    target_symbol: target_symbol.to_string(),
                    import_source: import_source.clone(),
                    candidates: vec![candidate],
                },
            );
        }
        Some(meta) => {
            if meta.target_symbol != target_symbol {
                return Err(TypeError::DuplicateOverloadTarget {
                    name: name.to_string(),
                    first_target: meta.target_symbol.clone(),
                    second_target: target_symbol.to_string(),
                });
            }
            if meta.import_source != *import_source {
                return Err(TypeError::InconsistentOverloadImport {
                    name: name.to_string(),
                    first_source: meta.import_source.clone(),
                    second_source: import_source.clone(),
                });
            }
            meta.candidates.push(candidate);
            env.insert(name.to_string(), ValueBinding::Overload(meta.candidates.clone()));
        }
    }
    Ok(())
}

// ── Top-level let / let-rec ──────────────────────────────────────────────

fn top_level_name(pattern: &Pattern) -> &str {
    match pattern {
        Pattern::Var { name, .. } => name,
        _ => unreachable!("recursive top-level binding must be a variable pattern"),
    }
}

fn check_top_level_let(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    pattern: &Pattern,
    value: &Expr,
    recursive: bool,
    loc: Location,
) -> Result<Scheme, TypeError> {
    if recursive {
        let name = top_level_name(pattern).to_string();
        ctx.enter_level();
        let placeholder = ctx.fresh_var();
        env.insert_scheme(name.clone(), Scheme::mono(placeholder.clone()));
        let value_ty = infer_expr(ctx, env, type_defs, value)?;
        ctx.unify(placeholder.clone(), value_ty, ConstraintOrigin::LetBinding { binding_span: loc })?;
        ctx.leave_level();

        let resolved = ctx.resolve(placeholder);
        let scheme = if is_syntactic_value(value) { ctx.generalize(resolved) } else { Scheme::mono(resolved) };
        env.insert_scheme(name, scheme.clone());
        Ok(scheme)
    } else {
        ctx.enter_level();
        let value_ty = infer_expr(ctx, env, type_defs, value)?;
        ctx.leave_level();

        let resolved = ctx.resolve(value_ty);
        let scheme = if is_syntactic_value(value) {
            ctx.generalize(resolved.clone())
        } else {
            Scheme::mono(resolved.clone())
        };

        match pattern {
            Pattern::Var { name, .. } => env.insert_scheme(name.clone(), scheme.clone()),
            Pattern::Wildcard { .. } => {}
            _ => {
                let (_, bindings) = check_pattern(ctx, env, pattern, resolved)?;
                for (bound_name, bound_ty) in bindings {
                    env.insert_scheme(bound_name, Scheme::mono(bound_ty));
                }
            }
        }
        Ok(scheme)
    }
}

fn check_top_level_let_rec_group(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    bindings: &[RecBinding],
) -> Result<Vec<(String, Scheme)>, TypeError> {
    ctx.enter_level();

    let mut placeholders = FxHashMap::default();
    for binding in bindings {
        let fresh = ctx.fresh_var();
        env.insert_scheme(binding.name.clone(), Scheme::mono(fresh.clone()));
        placeholders.insert(binding.name.clone(), fresh);
    }

    for binding in bindings {
        let value_ty = infer_expr(ctx, env, type_defs, &binding.value)?;
        let placeholder = placeholders[&binding.name].clone();
        ctx.unify(placeholder, value_ty, ConstraintOrigin::LetBinding { binding_span: binding.loc })?;
    }
    ctx.leave_level();

    let mut result = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let placeholder = placeholders[&binding.name].clone();
        let resolved = ctx.resolve(placeholder);
        let scheme =
            if is_syntactic_value(&binding.value) { ctx.generalize(resolved) } else { Scheme::mono(resolved) };
        env.insert_scheme(binding.name.clone(), scheme.clone());
        result.push((binding.name.clone(), scheme));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_ast::{BinOp, FileId, Literal, Span};

    fn loc() -> Location {
        Location::new(FileId(0), Span::new(0, 0))
    }

    fn var(name: &str) -> Expr {
        Expr::Var { name: name.to_string(), loc: loc() }
    }

    fn int(n: i64) -> Expr {
        Expr::Literal { value: Literal::Int(n), loc: loc() }
    }

    fn let_decl(name: &str, value: Expr) -> Declaration {
        Declaration::Let {
            pattern: Pattern::Var { name: name.to_string(), loc: loc() },
            value,
            recursive: false,
            mutable: false,
            exported: true,
            loc: loc(),
        }
    }

    #[test]
    fn single_let_declaration_is_typed() {
        let module = Module::new(vec![let_decl("x", int(42))]);
        let result = type_check(&module).expect("should type-check");
        match result.declaration_types.get("x") {
            Some(scheme) => assert_eq!(format!("{}", scheme.ty), "Int"),
            None => panic!("expected `x` in declaration_types"),
        }
    }

    #[test]
    fn later_declaration_sees_earlier_binding() {
        let module = Module::new(vec![
            let_decl("x", int(1)),
            let_decl(
                "y",
                Expr::BinOp { op: BinOp::Add, lhs: Box::new(var("x")), rhs: Box::new(int(2)), loc: loc() },
            ),
        ]);
        let result = type_check(&module).expect("should type-check");
        assert_eq!(format!("{}", result.declaration_types["y"].ty), "Int");
    }

    #[test]
    fn let_polymorphism_generalizes_across_declarations() {
        let module = Module::new(vec![
            let_decl(
                "id",
                Expr::Lambda {
                    param: Pattern::Var { name: "a".to_string(), loc: loc() },
                    body: Box::new(var("a")),
                    loc: loc(),
                },
            ),
            let_decl("use_int", Expr::App { func: Box::new(var("id")), args: vec![int(1)], loc: loc() }),
            let_decl(
                "use_string",
                Expr::App {
                    func: Box::new(var("id")),
                    args: vec![Expr::Literal { value: Literal::String("hi".into()), loc: loc() }],
                    loc: loc(),
                },
            ),
        ]);
        let result = type_check(&module).expect("should type-check");
        assert_eq!(format!("{}", result.declaration_types["use_int"].ty), "Int");
        assert_eq!(format!("{}", result.declaration_types["use_string"].ty), "String");
    }

    #[test]
    fn type_decl_registers_constructors_and_exhaustiveness_domain() {
        let module = Module::new(vec![Declaration::TypeDecl {
            name: "Shape".to_string(),
            params: vec![],
            constructors: vec![
                ConstructorDecl { name: "Circle".to_string(), params: vec![], loc: loc() },
                ConstructorDecl { name: "Square".to_string(), params: vec![], loc: loc() },
            ],
            loc: loc(),
        }]);
        let result = type_check(&module).expect("should type-check");
        assert!(result.type_defs.lookup("Shape").is_some());
        assert!(result.env.lookup("Circle").is_some());
        assert!(result.env.lookup("Square").is_some());
    }

    #[test]
    fn duplicate_overload_target_is_rejected() {
        use vela_ast::TypeExpr;
        let ty_int_to_int = TypeExpr::Fun {
            params: vec![TypeExpr::Const { name: "Int".into(), loc: loc() }],
            ret: Box::new(TypeExpr::Const { name: "Int".into(), loc: loc() }),
            loc: loc(),
        };
        let module = Module::new(vec![
            Declaration::External {
                name: "abs".into(),
                ty: ty_int_to_int.clone(),
                target_symbol: "c_abs".into(),
                import_source: None,
                loc: loc(),
            },
            Declaration::External {
                name: "abs".into(),
                ty: ty_int_to_int,
                target_symbol: "different_symbol".into(),
                import_source: None,
                loc: loc(),
            },
        ]);
        let result = type_check(&module);
        assert!(matches!(result, Err(TypeError::DuplicateOverloadTarget { .. })));
    }

    #[test]
    fn overload_set_resolves_by_arity_at_call_site() {
        use vela_ast::TypeExpr;
        let one_arg = TypeExpr::Fun {
            params: vec![TypeExpr::Const { name: "Int".into(), loc: loc() }],
            ret: Box::new(TypeExpr::Const { name: "Int".into(), loc: loc() }),
            loc: loc(),
        };
        let two_arg = TypeExpr::Fun {
            params: vec![
                TypeExpr::Const { name: "Int".into(), loc: loc() },
                TypeExpr::Const { name: "Int".into(), loc: loc() },
            ],
            ret: Box::new(TypeExpr::Const { name: "Int".into(), loc: loc() }),
            loc: loc(),
        };
        let module = Module::new(vec![
            Declaration::External { name: "add".into(), ty: one_arg, target_symbol: "c_add".into(), import_source: None, loc: loc() },
            Declaration::External { name: "add".into(), ty: two_arg, target_symbol: "c_add".into(), import_source: None, loc: loc() },
            let_decl("result", Expr::App { func: Box::new(var("add")), args: vec![int(1), int(2)], loc: loc() }),
        ]);
        let result = type_check(&module).expect("overload should resolve by arity");
        assert_eq!(format!("{}", result.declaration_types["result"].ty), "Int");
    }
}
