//! Type representation for Hindley-Milner inference.
//!
//! Defines the core `Ty` enum, type constructors (`TyCon`), type variables
//! (`TyVar`), and polymorphic type schemes (`Scheme`).

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A type variable, identified by a `u32` index into the unification table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TyVar(pub u32);

/// A nullary type name (`Int`, `String`, a user type name used without
/// arguments, ...).
///
/// `display_prefix` affects only `Display`; it is excluded from `PartialEq`
/// and `Hash` so two `TyCon`s with the same name are the same type
/// regardless of how they're annotated for error messages.
#[derive(Clone, Debug)]
pub struct TyCon {
    pub name: String,
    pub display_prefix: Option<String>,
}

impl TyCon {
    pub fn new(name: impl Into<String>) -> Self {
        TyCon { name: name.into(), display_prefix: None }
    }
}

impl PartialEq for TyCon {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for TyCon {}
impl std::hash::Hash for TyCon {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
impl fmt::Display for TyCon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.display_prefix {
            write!(f, "{}.{}", prefix, self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// The fully-resolved shape of a zero-parameter algebraic type: a
/// constructor-name-set to ordered-parameter-types mapping.
///
/// `display_name` is carried only for `Display`/diagnostics and excluded
/// from equality: per the nominal rule, two variant types are the same
/// type iff their constructor sets (names, arities, parameter types) are
/// equal -- there is no separate identity tag.
#[derive(Clone, Debug)]
pub struct VariantTy {
    pub constructors: BTreeMap<String, Vec<Ty>>,
    pub display_name: Option<String>,
}

impl PartialEq for VariantTy {
    fn eq(&self, other: &Self) -> bool {
        self.constructors == other.constructors
    }
}
impl Eq for VariantTy {}
impl std::hash::Hash for VariantTy {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.constructors.hash(state);
    }
}

/// A type term.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    /// An inference variable, resolved through the unification table.
    Var(TyVar),
    /// A nullary type name: `Int`, `Bool`, a concrete nullary user type.
    Con(TyCon),
    /// `(params) -> ret`.
    Fun(Vec<Ty>, Box<Ty>),
    /// A named constructor applied to arguments: `List<Int>`, `Ref<T>`.
    /// Nominal via the constructor's `Con` name.
    App(Box<Ty>, Vec<Ty>),
    /// A structural, width-subtyped record.
    Record(BTreeMap<String, Ty>),
    /// A zero-parameter algebraic type, compared by constructor set.
    Variant(VariantTy),
    /// An ordered, positionally-compared union of member types.
    Union(Vec<Ty>),
    /// An ordered, positionally-compared tuple.
    Tuple(Vec<Ty>),
    /// The bottom type: unifies with anything.
    Never,
}

impl Ty {
    pub fn int() -> Ty {
        Ty::Con(TyCon::new("Int"))
    }
    pub fn float() -> Ty {
        Ty::Con(TyCon::new("Float"))
    }
    pub fn string() -> Ty {
        Ty::Con(TyCon::new("String"))
    }
    pub fn bool() -> Ty {
        Ty::Con(TyCon::new("Bool"))
    }
    pub fn unit() -> Ty {
        Ty::Con(TyCon::new("Unit"))
    }

    pub fn fun(params: Vec<Ty>, ret: Ty) -> Ty {
        Ty::Fun(params, Box::new(ret))
    }

    pub fn app(name: &str, args: Vec<Ty>) -> Ty {
        Ty::App(Box::new(Ty::Con(TyCon::new(name))), args)
    }

    pub fn list(inner: Ty) -> Ty {
        Ty::app("List", vec![inner])
    }
    pub fn option(inner: Ty) -> Ty {
        Ty::app("Option", vec![inner])
    }
    pub fn result(ok: Ty, err: Ty) -> Ty {
        Ty::app("Result", vec![ok, err])
    }
    pub fn ref_ty(inner: Ty) -> Ty {
        Ty::app("Ref", vec![inner])
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Var(v) => write!(f, "?{}", v.0),
            Ty::Con(c) => write!(f, "{}", c),
            Ty::Fun(params, ret) => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)
            }
            Ty::App(con, args) => {
                write!(f, "{}", con)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, a) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", a)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Ty::Record(fields) => {
                write!(f, "{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                write!(f, "}}")
            }
            Ty::Variant(v) => {
                if let Some(name) = &v.display_name {
                    write!(f, "{}", name)
                } else {
                    write!(f, "<")?;
                    for (i, (name, params)) in v.constructors.iter().enumerate() {
                        if i > 0 {
                            write!(f, " | ")?;
                        }
                        write!(f, "{}", name)?;
                        if !params.is_empty() {
                            write!(f, "(")?;
                            for (j, p) in params.iter().enumerate() {
                                if j > 0 {
                                    write!(f, ", ")?;
                                }
                                write!(f, "{}", p)?;
                            }
                            write!(f, ")")?;
                        }
                    }
                    write!(f, ">")
                }
            }
            Ty::Union(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", m)?;
                }
                Ok(())
            }
            Ty::Tuple(elems) => {
                write!(f, "(")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", e)?;
                }
                write!(f, ")")
            }
            Ty::Never => write!(f, "Never"),
        }
    }
}

/// A polymorphic type scheme: `forall vars. ty`.
#[derive(Clone, Debug)]
pub struct Scheme {
    pub vars: Vec<TyVar>,
    pub ty: Ty,
}

impl Scheme {
    pub fn mono(ty: Ty) -> Self {
        Scheme { vars: Vec::new(), ty }
    }

    /// Collect a resolved type's free variables and remap them to sequential
    /// ids starting at 0, for display and for asserting shapes "modulo
    /// variable renaming" in tests.
    pub fn normalize_from_ty(ty: Ty) -> Self {
        let mut seen_vars: Vec<TyVar> = Vec::new();
        collect_free_tyvars(&ty, &mut seen_vars);
        let mut mapping: HashMap<TyVar, TyVar> = HashMap::new();
        let mut next_id = 0u32;
        for var in &seen_vars {
            mapping.entry(*var).or_insert_with(|| {
                let id = TyVar(next_id);
                next_id += 1;
                id
            });
        }
        let mut deduped = Vec::new();
        let mut seen_set = std::collections::HashSet::new();
        for v in &seen_vars {
            let mapped = mapping[v];
            if seen_set.insert(mapped) {
                deduped.push(mapped);
            }
        }
        let new_ty = remap_tyvars(&ty, &mapping);
        Scheme { vars: deduped, ty: new_ty }
    }
}

fn collect_free_tyvars(ty: &Ty, out: &mut Vec<TyVar>) {
    match ty {
        Ty::Var(v) => out.push(*v),
        Ty::Con(_) | Ty::Never => {}
        Ty::Fun(params, ret) => {
            for p in params {
                collect_free_tyvars(p, out);
            }
            collect_free_tyvars(ret, out);
        }
        Ty::App(con, args) => {
            collect_free_tyvars(con, out);
            for a in args {
                collect_free_tyvars(a, out);
            }
        }
        Ty::Record(fields) => {
            for v in fields.values() {
                collect_free_tyvars(v, out);
            }
        }
        Ty::Variant(v) => {
            for params in v.constructors.values() {
                for p in params {
                    collect_free_tyvars(p, out);
                }
            }
        }
        Ty::Union(members) => {
            for m in members {
                collect_free_tyvars(m, out);
            }
        }
        Ty::Tuple(elems) => {
            for e in elems {
                collect_free_tyvars(e, out);
            }
        }
    }
}

fn remap_tyvars(ty: &Ty, mapping: &HashMap<TyVar, TyVar>) -> Ty {
    match ty {
        Ty::Var(v) => Ty::Var(*mapping.get(v).unwrap_or(v)),
        Ty::Con(_) | Ty::Never => ty.clone(),
        Ty::Fun(params, ret) => Ty::Fun(
            params.iter().map(|p| remap_tyvars(p, mapping)).collect(),
            Box::new(remap_tyvars(ret, mapping)),
        ),
        Ty::App(con, args) => Ty::App(
            Box::new(remap_tyvars(con, mapping)),
            args.iter().map(|a| remap_tyvars(a, mapping)).collect(),
        ),
        Ty::Record(fields) => Ty::Record(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), remap_tyvars(v, mapping)))
                .collect(),
        ),
        Ty::Variant(v) => Ty::Variant(VariantTy {
            constructors: v
                .constructors
                .iter()
                .map(|(k, params)| {
                    (
                        k.clone(),
                        params.iter().map(|p| remap_tyvars(p, mapping)).collect(),
                    )
                })
                .collect(),
            display_name: v.display_name.clone(),
        }),
        Ty::Union(members) => {
            Ty::Union(members.iter().map(|m| remap_tyvars(m, mapping)).collect())
        }
        Ty::Tuple(elems) => {
            Ty::Tuple(elems.iter().map(|e| remap_tyvars(e, mapping)).collect())
        }
    }
}

impl ena::unify::UnifyKey for TyVar {
    type Value = Option<Ty>;

    fn index(&self) -> u32 {
        self.0
    }
    fn from_index(u: u32) -> Self {
        TyVar(u)
    }
    fn tag() -> &'static str {
        "TyVar"
    }
}

impl ena::unify::EqUnifyValue for Ty {}
