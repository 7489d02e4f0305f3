//! Two-namespace environment: values and type definitions.
//!
//! Both namespaces are scope stacks (one frame per lexical scope); lookup
//! searches from the innermost scope outward. Neither is ever mutated
//! retroactively by an inner scope -- extension only ever pushes a new
//! shadowing frame.

use rustc_hash::FxHashMap;
use vela_ast::TypeExpr;

use crate::ty::Scheme;

/// One arity+signature candidate of an external overload set.
#[derive(Clone, Debug)]
pub struct OverloadCandidate {
    pub arity: usize,
    pub scheme: Scheme,
    pub target_symbol: String,
}

/// What a name in the value namespace is bound to.
#[derive(Clone, Debug)]
pub enum ValueBinding {
    /// An ordinary source binding or a single external declaration.
    Scheme(Scheme),
    /// An external identifier declared more than once, to be resolved by
    /// argument arity at application sites.
    Overload(Vec<OverloadCandidate>),
}

impl ValueBinding {
    pub fn mono(scheme: Scheme) -> Self {
        ValueBinding::Scheme(scheme)
    }
}

/// The value namespace: identifiers to value bindings.
pub struct TypeEnv {
    scopes: Vec<FxHashMap<String, ValueBinding>>,
}

impl TypeEnv {
    pub fn new() -> Self {
        TypeEnv { scopes: vec![FxHashMap::default()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
    }

    pub fn insert(&mut self, name: String, binding: ValueBinding) {
        self.scopes
            .last_mut()
            .expect("scope stack should never be empty")
            .insert(name, binding);
    }

    pub fn insert_scheme(&mut self, name: String, scheme: Scheme) {
        self.insert(name, ValueBinding::Scheme(scheme));
    }

    pub fn lookup(&self, name: &str) -> Option<&ValueBinding> {
        for scope in self.scopes.iter().rev() {
            if let Some(binding) = scope.get(name) {
                return Some(binding);
            }
        }
        None
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Number of bindings in the outermost (global) scope. Used to assert
    /// the built-in environment's exact size.
    pub fn global_len(&self) -> usize {
        self.scopes[0].len()
    }

    /// All value names currently visible, innermost scope first. Used only
    /// to source "did you mean" candidates for an undefined-name error.
    pub fn visible_names(&self) -> Vec<&str> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.keys().map(|s| s.as_str()))
            .collect()
    }
}

impl Default for TypeEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// A declared algebraic type: its type parameters and ordered constructor
/// list (name plus that constructor's surface parameter types, not yet
/// converted to `Ty`).
#[derive(Clone, Debug)]
pub struct TypeDef {
    pub params: Vec<String>,
    pub constructors: Vec<(String, Vec<TypeExpr>)>,
}

/// The type namespace: type names to declarations.
pub struct TypeDefEnv {
    scopes: Vec<FxHashMap<String, TypeDef>>,
}

impl TypeDefEnv {
    pub fn new() -> Self {
        TypeDefEnv { scopes: vec![FxHashMap::default()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
    }

    pub fn insert(&mut self, name: String, def: TypeDef) {
        self.scopes
            .last_mut()
            .expect("scope stack should never be empty")
            .insert(name, def);
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeDef> {
        for scope in self.scopes.iter().rev() {
            if let Some(def) = scope.get(name) {
                return Some(def);
            }
        }
        None
    }

    /// Find the type that declares a given constructor, searching from the
    /// innermost scope outward.
    pub fn lookup_constructor(&self, ctor_name: &str) -> Option<(&str, &TypeDef)> {
        for scope in self.scopes.iter().rev() {
            for (type_name, def) in scope.iter() {
                if def.constructors.iter().any(|(c, _)| c == ctor_name) {
                    return Some((type_name.as_str(), def));
                }
            }
        }
        None
    }

    /// All type names currently visible, innermost scope first duplicates
    /// removed by caller if needed.
    pub fn names(&self) -> Vec<&str> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.keys().map(|s| s.as_str()))
            .collect()
    }
}

impl Default for TypeDefEnv {
    fn default() -> Self {
        Self::new()
    }
}
