//! Unification engine: level-based generalization and first-order
//! unification with occurs check.

use std::collections::HashSet;

use ena::unify::InPlaceUnificationTable;
use rustc_hash::FxHashMap;

use crate::error::{ConstraintOrigin, TypeError};
use crate::ty::{Scheme, Ty, TyVar, VariantTy};

/// Owns the unification table, the current generalization level, and the
/// per-variable level table. Created fresh per `type_check` invocation --
/// nothing here is process-global.
pub struct InferCtx {
    table: InPlaceUnificationTable<TyVar>,
    current_level: u32,
    var_levels: Vec<u32>,
}

impl InferCtx {
    pub fn new() -> Self {
        InferCtx {
            table: InPlaceUnificationTable::new(),
            current_level: 0,
            var_levels: Vec::new(),
        }
    }

    // ── Variable creation ────────────────────────────────────────────

    pub fn fresh_var(&mut self) -> Ty {
        let var = self.table.new_key(None);
        while self.var_levels.len() <= var.0 as usize {
            self.var_levels.push(0);
        }
        self.var_levels[var.0 as usize] = self.current_level;
        Ty::Var(var)
    }

    fn level_of(&self, var: TyVar) -> u32 {
        self.var_levels.get(var.0 as usize).copied().unwrap_or(0)
    }

    fn set_level(&mut self, var: TyVar, level: u32) {
        while self.var_levels.len() <= var.0 as usize {
            self.var_levels.push(0);
        }
        if level < self.var_levels[var.0 as usize] {
            self.var_levels[var.0 as usize] = level;
        }
    }

    /// Lower the level of every free variable in `ty` to at most `level`.
    /// Invariant 3: a variable's level never increases.
    fn lower_levels(&mut self, ty: &Ty, level: u32) {
        match ty {
            Ty::Var(v) => {
                if let Some(inner) = self.table.probe_value(*v) {
                    self.lower_levels(&inner, level);
                } else {
                    self.set_level(*v, level);
                }
            }
            Ty::Con(_) | Ty::Never => {}
            Ty::Fun(params, ret) => {
                for p in params {
                    self.lower_levels(p, level);
                }
                self.lower_levels(ret, level);
            }
            Ty::App(con, args) => {
                self.lower_levels(con, level);
                for a in args {
                    self.lower_levels(a, level);
                }
            }
            Ty::Record(fields) => {
                for v in fields.values() {
                    self.lower_levels(v, level);
                }
            }
            Ty::Variant(v) => {
                for params in v.constructors.values() {
                    for p in params {
                        self.lower_levels(p, level);
                    }
                }
            }
            Ty::Union(members) => {
                for m in members {
                    self.lower_levels(m, level);
                }
            }
            Ty::Tuple(elems) => {
                for e in elems {
                    self.lower_levels(e, level);
                }
            }
        }
    }

    // ── Resolution ───────────────────────────────────────────────────

    /// Follow union-find indirection to a normal form. Unbound variables
    /// normalize to their union-find root so that two unified-but-unbound
    /// variables resolve to the same representative.
    pub fn resolve(&mut self, ty: Ty) -> Ty {
        match ty {
            Ty::Var(v) => match self.table.probe_value(v) {
                Some(inner) => self.resolve(inner),
                None => Ty::Var(self.table.find(v)),
            },
            Ty::Fun(params, ret) => {
                let params = params.into_iter().map(|p| self.resolve(p)).collect();
                Ty::Fun(params, Box::new(self.resolve(*ret)))
            }
            Ty::App(con, args) => {
                let con = Box::new(self.resolve(*con));
                let args = args.into_iter().map(|a| self.resolve(a)).collect();
                Ty::App(con, args)
            }
            Ty::Record(fields) => Ty::Record(
                fields.into_iter().map(|(k, v)| (k, self.resolve(v))).collect(),
            ),
            Ty::Variant(v) => Ty::Variant(VariantTy {
                constructors: v
                    .constructors
                    .into_iter()
                    .map(|(k, params)| (k, params.into_iter().map(|p| self.resolve(p)).collect()))
                    .collect(),
                display_name: v.display_name,
            }),
            Ty::Union(members) => Ty::Union(members.into_iter().map(|m| self.resolve(m)).collect()),
            Ty::Tuple(elems) => Ty::Tuple(elems.into_iter().map(|e| self.resolve(e)).collect()),
            other => other,
        }
    }

    // ── Occurs check ─────────────────────────────────────────────────

    /// Whether `var` occurs anywhere in `ty`, including inside
    /// variant/record/union interiors.
    pub fn occurs_in(&mut self, var: TyVar, ty: &Ty) -> bool {
        match ty {
            Ty::Var(v) => {
                if *v == var {
                    return true;
                }
                match self.table.probe_value(*v) {
                    Some(inner) => self.occurs_in(var, &inner),
                    None => false,
                }
            }
            Ty::Con(_) | Ty::Never => false,
            Ty::Fun(params, ret) => {
                params.iter().any(|p| self.occurs_in(var, p)) || self.occurs_in(var, ret)
            }
            Ty::App(con, args) => {
                self.occurs_in(var, con) || args.iter().any(|a| self.occurs_in(var, a))
            }
            Ty::Record(fields) => fields.values().any(|v| self.occurs_in(var, v)),
            Ty::Variant(v) => v
                .constructors
                .values()
                .any(|params| params.iter().any(|p| self.occurs_in(var, p))),
            Ty::Union(members) => members.iter().any(|m| self.occurs_in(var, m)),
            Ty::Tuple(elems) => elems.iter().any(|e| self.occurs_in(var, e)),
        }
    }

    // ── Unification ──────────────────────────────────────────────────

    pub fn unify(&mut self, a: Ty, b: Ty, origin: ConstraintOrigin) -> Result<(), TypeError> {
        let a = self.resolve(a);
        let b = self.resolve(b);

        match (a, b) {
            (Ty::Never, Ty::Var(v)) | (Ty::Var(v), Ty::Never) => {
                self.table
                    .unify_var_value(v, Some(Ty::Never))
                    .expect("binding a var to Never should not fail");
                Ok(())
            }

            (Ty::Never, _) | (_, Ty::Never) => Ok(()),

            (Ty::Var(v1), Ty::Var(v2)) if v1 == v2 => Ok(()),

            (Ty::Var(v1), Ty::Var(v2)) => {
                let lvl = self.level_of(v1).min(self.level_of(v2));
                self.table
                    .unify_var_var(v1, v2)
                    .expect("unifying two unbound vars should not fail");
                self.set_level(v1, lvl);
                self.set_level(v2, lvl);
                Ok(())
            }

            (Ty::Var(v), ty) | (ty, Ty::Var(v)) => {
                if self.occurs_in(v, &ty) {
                    return Err(TypeError::InfiniteType { var: v, ty, origin });
                }
                self.lower_levels(&ty, self.level_of(v));
                self.table
                    .unify_var_value(v, Some(ty))
                    .expect("binding a var after occurs check should not fail");
                Ok(())
            }

            (Ty::Con(c1), Ty::Con(c2)) => {
                if c1 == c2 {
                    Ok(())
                } else {
                    Err(TypeError::Mismatch { expected: Ty::Con(c1), found: Ty::Con(c2), origin })
                }
            }

            (Ty::Fun(p1, r1), Ty::Fun(p2, r2)) => {
                if p1.len() != p2.len() {
                    return Err(TypeError::ArityMismatch { expected: p1.len(), found: p2.len(), origin });
                }
                for (x, y) in p1.into_iter().zip(p2.into_iter()) {
                    self.unify(x, y, origin.clone())?;
                }
                self.unify(*r1, *r2, origin)
            }

            (Ty::App(c1, a1), Ty::App(c2, a2)) => {
                self.unify(*c1, *c2, origin.clone())?;
                if a1.len() != a2.len() {
                    return Err(TypeError::ArityMismatch { expected: a1.len(), found: a2.len(), origin });
                }
                for (x, y) in a1.into_iter().zip(a2.into_iter()) {
                    self.unify(x, y, origin.clone())?;
                }
                Ok(())
            }

            // Width subtyping: only the common field set must agree.
            (Ty::Record(f1), Ty::Record(f2)) => {
                for (name, t1) in f1.iter() {
                    if let Some(t2) = f2.get(name) {
                        self.unify(t1.clone(), t2.clone(), origin.clone())?;
                    }
                }
                Ok(())
            }

            // Nominal: constructor sets must be exactly equal.
            (Ty::Variant(v1), Ty::Variant(v2)) => {
                let names1: HashSet<&String> = v1.constructors.keys().collect();
                let names2: HashSet<&String> = v2.constructors.keys().collect();
                if names1 != names2 {
                    let ty1 = Ty::Variant(v1.clone());
                    let ty2 = Ty::Variant(v2.clone());
                    return Err(TypeError::Mismatch { expected: ty1, found: ty2, origin });
                }
                for (name, params1) in v1.constructors.iter() {
                    let params2 = &v2.constructors[name];
                    if params1.len() != params2.len() {
                        return Err(TypeError::ArityMismatch {
                            expected: params1.len(),
                            found: params2.len(),
                            origin,
                        });
                    }
                    for (x, y) in params1.iter().zip(params2.iter()) {
                        self.unify(x.clone(), y.clone(), origin.clone())?;
                    }
                }
                Ok(())
            }

            (Ty::Union(m1), Ty::Union(m2)) => {
                if m1.len() != m2.len() {
                    return Err(TypeError::ArityMismatch { expected: m1.len(), found: m2.len(), origin });
                }
                for (x, y) in m1.into_iter().zip(m2.into_iter()) {
                    self.unify(x, y, origin.clone())?;
                }
                Ok(())
            }

            (Ty::Tuple(e1), Ty::Tuple(e2)) => {
                if e1.len() != e2.len() {
                    return Err(TypeError::ArityMismatch { expected: e1.len(), found: e2.len(), origin });
                }
                for (x, y) in e1.into_iter().zip(e2.into_iter()) {
                    self.unify(x, y, origin.clone())?;
                }
                Ok(())
            }

            (a, b) => Err(TypeError::Mismatch { expected: a, found: b, origin }),
        }
    }

    // ── Levels ───────────────────────────────────────────────────────

    pub fn enter_level(&mut self) {
        self.current_level += 1;
    }

    pub fn leave_level(&mut self) {
        debug_assert!(self.current_level > 0, "cannot leave level 0");
        self.current_level -= 1;
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    // ── Generalization ───────────────────────────────────────────────

    pub fn generalize(&mut self, ty: Ty) -> Scheme {
        let resolved = self.resolve(ty);
        let mut vars = Vec::new();
        self.collect_generalizable_vars(&resolved, &mut vars);
        let mut seen = HashSet::new();
        vars.retain(|v| seen.insert(*v));
        Scheme { vars, ty: resolved }
    }

    fn collect_generalizable_vars(&mut self, ty: &Ty, out: &mut Vec<TyVar>) {
        match ty {
            Ty::Var(v) => match self.table.probe_value(*v) {
                Some(inner) => self.collect_generalizable_vars(&inner, out),
                None => {
                    if self.level_of(*v) > self.current_level {
                        out.push(*v);
                    }
                }
            },
            Ty::Con(_) | Ty::Never => {}
            Ty::Fun(params, ret) => {
                for p in params {
                    self.collect_generalizable_vars(p, out);
                }
                self.collect_generalizable_vars(ret, out);
            }
            Ty::App(con, args) => {
                self.collect_generalizable_vars(con, out);
                for a in args {
                    self.collect_generalizable_vars(a, out);
                }
            }
            Ty::Record(fields) => {
                for v in fields.values() {
                    self.collect_generalizable_vars(v, out);
                }
            }
            Ty::Variant(v) => {
                for params in v.constructors.values() {
                    for p in params {
                        self.collect_generalizable_vars(p, out);
                    }
                }
            }
            Ty::Union(members) => {
                for m in members {
                    self.collect_generalizable_vars(m, out);
                }
            }
            Ty::Tuple(elems) => {
                for e in elems {
                    self.collect_generalizable_vars(e, out);
                }
            }
        }
    }

    // ── Instantiation ────────────────────────────────────────────────

    pub fn instantiate(&mut self, scheme: &Scheme) -> Ty {
        if scheme.vars.is_empty() {
            return scheme.ty.clone();
        }
        let subst: FxHashMap<TyVar, Ty> =
            scheme.vars.iter().map(|v| (*v, self.fresh_var())).collect();
        self.apply_substitution(&scheme.ty, &subst)
    }

    fn apply_substitution(&mut self, ty: &Ty, subst: &FxHashMap<TyVar, Ty>) -> Ty {
        match ty {
            Ty::Var(v) => match subst.get(v) {
                Some(replacement) => replacement.clone(),
                None => match self.table.probe_value(*v) {
                    Some(inner) => self.apply_substitution(&inner, subst),
                    None => ty.clone(),
                },
            },
            Ty::Con(_) | Ty::Never => ty.clone(),
            Ty::Fun(params, ret) => Ty::Fun(
                params.iter().map(|p| self.apply_substitution(p, subst)).collect(),
                Box::new(self.apply_substitution(ret, subst)),
            ),
            Ty::App(con, args) => Ty::App(
                Box::new(self.apply_substitution(con, subst)),
                args.iter().map(|a| self.apply_substitution(a, subst)).collect(),
            ),
            Ty::Record(fields) => Ty::Record(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), self.apply_substitution(v, subst)))
                    .collect(),
            ),
            Ty::Variant(v) => Ty::Variant(VariantTy {
                constructors: v
                    .constructors
                    .iter()
                    .map(|(k, params)| {
                        (
                            k.clone(),
                            params.iter().map(|p| self.apply_substitution(p, subst)).collect(),
                        )
                    })
                    .collect(),
                display_name: v.display_name.clone(),
            }),
            Ty::Union(members) => {
                Ty::Union(members.iter().map(|m| self.apply_substitution(m, subst)).collect())
            }
            Ty::Tuple(elems) => {
                Ty::Tuple(elems.iter().map(|e| self.apply_substitution(e, subst)).collect())
            }
        }
    }
}

impl Default for InferCtx {
    fn default() -> Self {
        Self::new()
    }
}
