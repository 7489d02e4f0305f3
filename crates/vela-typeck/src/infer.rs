//! Algorithm W: the per-expression inference walk.
//!
//! `infer_expr` dispatches on `vela_ast::Expr` and returns the node's type,
//! mutating the shared [`InferCtx`] (unification table, levels) and
//! [`TypeEnv`] (pushed/popped per lexical scope) as it goes. There is no
//! explicit substitution value threaded between calls -- `InferCtx` owns a
//! single mutable union-find table, so every unification is visible to
//! every later `resolve` automatically.

use rustc_hash::FxHashMap;
use vela_ast::{BinOp, Expr, Literal, Location, MatchCase, Pattern, RecBinding, UnaryOp};

use crate::convert::type_expr_to_ty;
use crate::env::{OverloadCandidate, TypeDefEnv, TypeEnv, ValueBinding};
use crate::error::{ConstraintOrigin, TypeError};
use crate::exhaustiveness::check_exhaustiveness;
use crate::pattern::{check_pattern, describe_missing, to_exhaustiveness_pat, type_info_for};
use crate::suggest::suggest;
use crate::ty::{Scheme, Ty};
use crate::unify::InferCtx;

/// Infer the type of `expr` in `env`, under `type_defs` for constructor/type
/// lookups invoked by pattern checking.
pub fn infer_expr(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    expr: &Expr,
) -> Result<Ty, TypeError> {
    match expr {
        Expr::Literal { value, .. } => Ok(literal_ty(value)),

        Expr::Var { name, loc } => infer_var(ctx, env, name, *loc),

        Expr::Lambda { param, body, .. } => infer_lambda(ctx, env, type_defs, param, body),

        Expr::App { func, args, loc } => infer_app(ctx, env, type_defs, func, args, *loc),

        Expr::BinOp { op, lhs, rhs, loc } => infer_binop(ctx, env, type_defs, *op, lhs, rhs, *loc),

        Expr::UnaryOp { op, operand, loc } => infer_unaryop(ctx, env, type_defs, *op, operand, *loc),

        Expr::Let { pattern, recursive, value, body, loc } => {
            if *recursive {
                infer_let_rec(ctx, env, type_defs, pattern, value, body, *loc)
            } else {
                infer_let(ctx, env, type_defs, pattern, value, body, *loc)
            }
        }

        Expr::LetRecGroup { bindings, body, .. } => infer_let_rec_group(ctx, env, type_defs, bindings, body),

        Expr::Match { scrutinee, cases, loc } => infer_match(ctx, env, type_defs, scrutinee, cases, *loc),

        Expr::RecordLit { fields, .. } => infer_record_lit(ctx, env, type_defs, fields),

        Expr::RecordAccess { record, field, loc } => infer_record_access(ctx, env, type_defs, record, field, *loc),

        Expr::RecordUpdate { record, updates, loc } => {
            infer_record_update(ctx, env, type_defs, record, updates, *loc)
        }

        Expr::VariantConstruct { name, args, loc } => infer_variant_construct(ctx, env, type_defs, name, args, *loc),

        Expr::Annotate { expr, ty, loc } => infer_annotate(ctx, env, type_defs, expr, ty, *loc),

        Expr::Unsafe { expr, .. } => infer_expr(ctx, env, type_defs, expr),
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

fn infer_var(ctx: &mut InferCtx, env: &TypeEnv, name: &str, loc: Location) -> Result<Ty, TypeError> {
    match env.lookup(name) {
        Some(ValueBinding::Scheme(scheme)) => Ok(ctx.instantiate(scheme)),
        Some(ValueBinding::Overload(_)) => {
            Err(TypeError::AmbiguousOverload { name: name.to_string(), arity: 0, loc })
        }
        None => {
            let suggestions = suggest(name, all_names(env));
            Err(TypeError::UndefinedVariable { name: name.to_string(), loc, suggestions })
        }
    }
}

/// All currently-visible value names, for "did you mean" suggestions.
/// `TypeEnv` does not expose scope internals beyond the global frame, so
/// this only searches what lookup itself can reach -- which is exactly the
/// set a miss could plausibly have meant.
fn all_names(env: &TypeEnv) -> Vec<&str> {
    env.visible_names()
}

fn pattern_var_name(pattern: &Pattern) -> &str {
    match pattern {
        Pattern::Var { name, .. } => name,
        // Lambda parameters and recursive let bindings are guaranteed by
        // upstream lowering to be bare variable names.
        _ => unreachable!("expected a variable pattern; lowering invariant violated"),
    }
}

fn infer_lambda(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    param: &Pattern,
    body: &Expr,
) -> Result<Ty, TypeError> {
    let param_name = pattern_var_name(param);
    let param_ty = ctx.fresh_var();
    env.push_scope();
    env.insert_scheme(param_name.to_string(), Scheme::mono(param_ty.clone()));
    let body_ty = infer_expr(ctx, env, type_defs, body);
    env.pop_scope();
    let body_ty = body_ty?;
    Ok(Ty::fun(vec![param_ty], body_ty))
}

fn infer_app(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    func: &Expr,
    args: &[Expr],
    loc: Location,
) -> Result<Ty, TypeError> {
    if let Expr::Var { name, loc: var_loc } = func {
        let overload = match env.lookup(name) {
            Some(ValueBinding::Overload(candidates)) => Some(candidates.clone()),
            _ => None,
        };
        if let Some(candidates) = overload {
            return infer_overloaded_app(ctx, env, type_defs, name, candidates, args, *var_loc, loc);
        }
    }

    let func_ty = infer_expr(ctx, env, type_defs, func)?;
    let mut arg_tys = Vec::with_capacity(args.len());
    for arg in args {
        arg_tys.push(infer_expr(ctx, env, type_defs, arg)?);
    }
    let result = ctx.fresh_var();
    let expected_fn = Ty::fun(arg_tys, result.clone());
    ctx.unify(func_ty, expected_fn, ConstraintOrigin::FnArg { call_site: loc, param_idx: 0 })?;
    Ok(ctx.resolve(result))
}

fn infer_overloaded_app(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    name: &str,
    candidates: Vec<OverloadCandidate>,
    args: &[Expr],
    var_loc: Location,
    call_loc: Location,
) -> Result<Ty, TypeError> {
    let matching: Vec<&OverloadCandidate> = candidates.iter().filter(|c| c.arity == args.len()).collect();
    let chosen = match matching.len() {
        0 => {
            return Err(TypeError::NoMatchingOverload { name: name.to_string(), arity: args.len(), loc: var_loc })
        }
        1 => matching[0].clone(),
        _ => {
            return Err(TypeError::AmbiguousOverload { name: name.to_string(), arity: args.len(), loc: var_loc })
        }
    };

    let func_ty = ctx.instantiate(&chosen.scheme);
    let mut arg_tys = Vec::with_capacity(args.len());
    for arg in args {
        arg_tys.push(infer_expr(ctx, env, type_defs, arg)?);
    }
    let result = ctx.fresh_var();
    let expected_fn = Ty::fun(arg_tys, result.clone());
    ctx.unify(func_ty, expected_fn, ConstraintOrigin::FnArg { call_site: call_loc, param_idx: 0 })?;
    Ok(ctx.resolve(result))
}

fn infer_binop(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    op: BinOp,
    lhs: &Expr,
    rhs: &Expr,
    loc: Location,
) -> Result<Ty, TypeError> {
    if op == BinOp::RefAssign {
        let lhs_ty = infer_expr(ctx, env, type_defs, lhs)?;
        let rhs_ty = infer_expr(ctx, env, type_defs, rhs)?;
        let inner = ctx.fresh_var();
        ctx.unify(lhs_ty, Ty::ref_ty(inner.clone()), ConstraintOrigin::RefCell { span: loc })?;
        ctx.unify(rhs_ty, inner, ConstraintOrigin::RefCell { span: loc })?;
        return Ok(Ty::unit());
    }

    let lhs_ty = infer_expr(ctx, env, type_defs, lhs)?;
    let rhs_ty = infer_expr(ctx, env, type_defs, rhs)?;

    let (param_ty, result_ty) = match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => (Ty::int(), Ty::int()),
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => (Ty::int(), Ty::bool()),
        BinOp::And | BinOp::Or => (Ty::bool(), Ty::bool()),
        BinOp::Concat => (Ty::string(), Ty::string()),
        BinOp::Eq | BinOp::Ne => {
            let fresh = ctx.fresh_var();
            ctx.unify(lhs_ty, fresh.clone(), ConstraintOrigin::BinOp { op_span: loc })?;
            ctx.unify(rhs_ty, fresh, ConstraintOrigin::BinOp { op_span: loc })?;
            return Ok(Ty::bool());
        }
        BinOp::RefAssign => unreachable!("handled above"),
    };

    ctx.unify(lhs_ty, param_ty.clone(), ConstraintOrigin::BinOp { op_span: loc })?;
    ctx.unify(rhs_ty, param_ty, ConstraintOrigin::BinOp { op_span: loc })?;
    Ok(result_ty)
}

fn infer_unaryop(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    op: UnaryOp,
    operand: &Expr,
    loc: Location,
) -> Result<Ty, TypeError> {
    let operand_ty = infer_expr(ctx, env, type_defs, operand)?;
    match op {
        UnaryOp::Neg => {
            ctx.unify(operand_ty, Ty::int(), ConstraintOrigin::UnaryOp { op_span: loc })?;
            Ok(Ty::int())
        }
        UnaryOp::Not => {
            ctx.unify(operand_ty, Ty::bool(), ConstraintOrigin::UnaryOp { op_span: loc })?;
            Ok(Ty::bool())
        }
        UnaryOp::Deref => {
            let inner = ctx.fresh_var();
            ctx.unify(operand_ty, Ty::ref_ty(inner.clone()), ConstraintOrigin::RefCell { span: loc })?;
            Ok(ctx.resolve(inner))
        }
    }
}

// ── Syntactic value restriction ────────────────────────────────────────────

/// Whether `expr` is a shape that may be soundly generalized. Everything
/// else binds monomorphically at the surrounding level.
pub fn is_syntactic_value(expr: &Expr) -> bool {
    match expr {
        Expr::Literal { .. } | Expr::Var { .. } | Expr::Lambda { .. } => true,
        Expr::VariantConstruct { args, .. } => args.iter().all(is_syntactic_value),
        Expr::RecordLit { fields, .. } => fields.iter().all(|(_, v)| is_syntactic_value(v)),
        Expr::Annotate { expr, .. } | Expr::Unsafe { expr, .. } => is_syntactic_value(expr),
        Expr::App { .. }
        | Expr::BinOp { .. }
        | Expr::UnaryOp { .. }
        | Expr::Let { .. }
        | Expr::LetRecGroup { .. }
        | Expr::Match { .. }
        | Expr::RecordAccess { .. }
        | Expr::RecordUpdate { .. } => false,
    }
}

// ── Let bindings ────────────────────────────────────────────────────────────

/// Bind the names a (possibly-destructuring) let pattern introduces.
/// `Pattern::Var` is the common case and gets the
/// generalized-or-monomorphic scheme computed by the caller; any other
/// pattern shape destructures a value whose shape is necessarily already
/// concrete, so its extracted bindings are monomorphic regardless of the
/// value restriction (there is no single type left to generalize once the
/// pattern has pulled it apart).
fn bind_let_pattern(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    pattern: &Pattern,
    value_scheme: Scheme,
    value_ty: Ty,
    loc: Location,
) -> Result<(), TypeError> {
    match pattern {
        Pattern::Var { name, .. } => {
            env.insert_scheme(name.clone(), value_scheme);
            Ok(())
        }
        Pattern::Wildcard { .. } => Ok(()),
        _ => {
            let (_, bindings) = check_pattern(ctx, env, pattern, value_ty)?;
            let _ = loc;
            for (name, ty) in bindings {
                env.insert_scheme(name, Scheme::mono(ty));
            }
            Ok(())
        }
    }
}

fn infer_let(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    pattern: &Pattern,
    value: &Expr,
    body: &Expr,
    loc: Location,
) -> Result<Ty, TypeError> {
    ctx.enter_level();
    let value_ty = infer_expr(ctx, env, type_defs, value)?;
    ctx.leave_level();

    let resolved = ctx.resolve(value_ty);
    let scheme = if is_syntactic_value(value) { ctx.generalize(resolved.clone()) } else { Scheme::mono(resolved.clone()) };

    env.push_scope();
    bind_let_pattern(ctx, env, pattern, scheme, resolved, loc)?;
    let body_ty = infer_expr(ctx, env, type_defs, body);
    env.pop_scope();
    body_ty
}

fn infer_let_rec(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    pattern: &Pattern,
    value: &Expr,
    body: &Expr,
    loc: Location,
) -> Result<Ty, TypeError> {
    let name = pattern_var_name(pattern).to_string();

    ctx.enter_level();
    let placeholder = ctx.fresh_var();
    env.push_scope();
    env.insert_scheme(name.clone(), Scheme::mono(placeholder.clone()));

    let value_ty = infer_expr(ctx, env, type_defs, value)?;
    ctx.unify(placeholder.clone(), value_ty, ConstraintOrigin::LetBinding { binding_span: loc })?;
    ctx.leave_level();

    let resolved = ctx.resolve(placeholder);
    let scheme = if is_syntactic_value(value) { ctx.generalize(resolved) } else { Scheme::mono(resolved) };
    env.insert_scheme(name, scheme);

    let body_ty = infer_expr(ctx, env, type_defs, body);
    env.pop_scope();
    body_ty
}

fn infer_let_rec_group(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    bindings: &[RecBinding],
    body: &Expr,
) -> Result<Ty, TypeError> {
    ctx.enter_level();
    env.push_scope();

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

    for binding in bindings {
        let placeholder = placeholders[&binding.name].clone();
        let resolved = ctx.resolve(placeholder);
        let scheme =
            if is_syntactic_value(&binding.value) { ctx.generalize(resolved) } else { Scheme::mono(resolved) };
        env.insert_scheme(binding.name.clone(), scheme);
    }

    let body_ty = infer_expr(ctx, env, type_defs, body);
    env.pop_scope();
    body_ty
}

// ── Match ───────────────────────────────────────────────────────────────────

fn infer_match(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    scrutinee: &Expr,
    cases: &[MatchCase],
    loc: Location,
) -> Result<Ty, TypeError> {
    let scrutinee_ty = infer_expr(ctx, env, type_defs, scrutinee)?;
    let resolved_scrutinee = ctx.resolve(scrutinee_ty);
    let result = ctx.fresh_var();
    let mut first_body_span: Option<Location> = None;
    let mut coverage = Vec::new();

    for case in cases {
        env.push_scope();
        let pattern_result = check_pattern(ctx, env, &case.pattern, resolved_scrutinee.clone());
        let bindings = match pattern_result {
            Ok((_, bindings)) => bindings,
            Err(err) => {
                env.pop_scope();
                return Err(err);
            }
        };
        for (name, ty) in bindings {
            env.insert_scheme(name, Scheme::mono(ty));
        }

        let has_guard = if let Some(guard) = &case.guard {
            let guard_ty = infer_expr(ctx, env, type_defs, guard);
            let guard_ty = match guard_ty {
                Ok(t) => t,
                Err(err) => {
                    env.pop_scope();
                    return Err(err);
                }
            };
            let resolved_guard = ctx.resolve(guard_ty);
            if ctx.unify(resolved_guard.clone(), Ty::bool(), ConstraintOrigin::Guard { guard_span: guard.loc() }).is_err() {
                env.pop_scope();
                return Err(TypeError::InvalidGuard { found: resolved_guard, loc: guard.loc() });
            }
            true
        } else {
            false
        };

        let body_ty = infer_expr(ctx, env, type_defs, &case.body);
        env.pop_scope();
        let body_ty = body_ty?;

        let arm_span = case.body.loc();
        let origin = ConstraintOrigin::MatchArms { first_span: first_body_span.unwrap_or(arm_span), arm_span };
        ctx.unify(result.clone(), body_ty, origin)?;
        first_body_span.get_or_insert(arm_span);

        if !has_guard {
            coverage.push(to_exhaustiveness_pat(&case.pattern));
        }
    }

    if let Some(type_info) = type_info_for(ctx, type_defs, &resolved_scrutinee) {
        if let Some(witnesses) = check_exhaustiveness(&coverage, &type_info) {
            return Err(TypeError::NonExhaustiveMatch {
                scrutinee_ty: resolved_scrutinee,
                missing: describe_missing(&witnesses),
                loc,
            });
        }
    }

    Ok(ctx.resolve(result))
}

// ── Records ─────────────────────────────────────────────────────────────────

fn infer_record_lit(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    fields: &[(String, Expr)],
) -> Result<Ty, TypeError> {
    let mut map = std::collections::BTreeMap::new();
    for (name, value) in fields {
        let ty = infer_expr(ctx, env, type_defs, value)?;
        map.insert(name.clone(), ty);
    }
    Ok(Ty::Record(map))
}

fn infer_record_access(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    record: &Expr,
    field: &str,
    loc: Location,
) -> Result<Ty, TypeError> {
    let record_ty = infer_expr(ctx, env, type_defs, record)?;
    let resolved = ctx.resolve(record_ty);
    match resolved {
        Ty::Record(fields) => match fields.get(field) {
            Some(ty) => Ok(ty.clone()),
            None => {
                let suggestions = suggest(field, fields.keys());
                Err(TypeError::MissingField {
                    field: field.to_string(),
                    record_ty: Ty::Record(fields),
                    loc,
                    suggestions,
                })
            }
        },
        other => Err(TypeError::NonRecordAccess { ty: other, field: field.to_string(), loc }),
    }
}

fn infer_record_update(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    record: &Expr,
    updates: &[(String, Expr)],
    loc: Location,
) -> Result<Ty, TypeError> {
    let record_ty = infer_expr(ctx, env, type_defs, record)?;
    let resolved = ctx.resolve(record_ty);
    let mut fields = match resolved {
        Ty::Record(fields) => fields,
        other => return Err(TypeError::NonRecordAccess { ty: other, field: String::new(), loc }),
    };

    for (name, value) in updates {
        let base_ty = match fields.get(name) {
            Some(ty) => ty.clone(),
            None => {
                let suggestions = suggest(name, fields.keys());
                return Err(TypeError::MissingField {
                    field: name.clone(),
                    record_ty: Ty::Record(fields),
                    loc,
                    suggestions,
                });
            }
        };
        let value_ty = infer_expr(ctx, env, type_defs, value)?;
        ctx.unify(value_ty, base_ty.clone(), ConstraintOrigin::RecordUpdate { field_span: value.loc() })?;
        fields.insert(name.clone(), base_ty);
    }

    Ok(Ty::Record(fields))
}

fn infer_variant_construct(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    name: &str,
    args: &[Expr],
    loc: Location,
) -> Result<Ty, TypeError> {
    let scheme = match env.lookup(name) {
        Some(ValueBinding::Scheme(scheme)) => scheme.clone(),
        _ => return Err(TypeError::UndefinedConstructor { name: name.to_string(), loc }),
    };
    let ctor_ty = ctx.instantiate(&scheme);
    let (params, ret) = match ctor_ty {
        Ty::Fun(params, ret) => (params, *ret),
        other => (Vec::new(), other),
    };
    if params.len() != args.len() {
        return Err(TypeError::ConstructorArity {
            name: name.to_string(),
            expected: params.len(),
            found: args.len(),
            loc,
        });
    }
    for (i, (arg, param_ty)) in args.iter().zip(params.into_iter()).enumerate() {
        let arg_ty = infer_expr(ctx, env, type_defs, arg)?;
        ctx.unify(arg_ty, param_ty, ConstraintOrigin::FnArg { call_site: loc, param_idx: i })?;
    }
    Ok(ctx.resolve(ret))
}

fn infer_annotate(
    ctx: &mut InferCtx,
    env: &mut TypeEnv,
    type_defs: &TypeDefEnv,
    expr: &Expr,
    ty_expr: &vela_ast::TypeExpr,
    loc: Location,
) -> Result<Ty, TypeError> {
    let inferred = infer_expr(ctx, env, type_defs, expr)?;
    let annotation = type_expr_to_ty(ty_expr)?;
    ctx.unify(inferred, annotation.clone(), ConstraintOrigin::Annotation { annotation_span: loc })?;
    Ok(annotation)
}
