//! Built-in type and value registration.
//!
//! Populates a fresh [`TypeEnv`]/[`TypeDefEnv`] pair with the checker's
//! fixed prelude before any source declaration is processed: the six
//! primitive type names, the three built-in algebraic types (`List`,
//! `Option`, `Result`) and their constructors, a standard-library function
//! set, and two special bindings (`panic`, `ref`).
//!
//! Every scheme's quantified variables use a manually reserved `TyVar` id
//! range per group, so ranges never collide across categories.

use vela_ast::{Location, TypeExpr};

use crate::env::{TypeDef, TypeDefEnv, TypeEnv};
use crate::ty::{Scheme, Ty, TyCon, TyVar};

fn synthetic_loc() -> Location {
    Location::new(vela_ast::FileId(0), vela_ast::Span::new(0, 0))
}

fn type_var_expr(name: &str) -> TypeExpr {
    TypeExpr::Var { name: name.to_string(), loc: synthetic_loc() }
}

fn type_app_expr(name: &str, args: Vec<TypeExpr>) -> TypeExpr {
    TypeExpr::App { name: name.to_string(), args, loc: synthetic_loc() }
}

/// Populate `env` and `type_defs` with the fixed built-in prelude.
pub fn register_builtins(env: &mut TypeEnv, type_defs: &mut TypeDefEnv) {
    register_primitive_types(type_defs);
    register_algebraic_types(type_defs);
    register_constructors(env);
    register_list_ops(env);
    register_option_ops(env);
    register_result_ops(env);
    register_string_and_numeric_ops(env);
    register_specials(env);
}

fn register_primitive_types(type_defs: &mut TypeDefEnv) {
    for name in ["Int", "Float", "String", "Bool", "Unit", "Never"] {
        type_defs.insert(name.to_string(), TypeDef { params: vec![], constructors: vec![] });
    }
}

fn register_algebraic_types(type_defs: &mut TypeDefEnv) {
    type_defs.insert(
        "List".into(),
        TypeDef {
            params: vec!["T".into()],
            constructors: vec![
                ("Cons".into(), vec![type_var_expr("T"), type_app_expr("List", vec![type_var_expr("T")])]),
                ("Nil".into(), vec![]),
            ],
        },
    );
    type_defs.insert(
        "Option".into(),
        TypeDef {
            params: vec!["T".into()],
            constructors: vec![
                ("Some".into(), vec![type_var_expr("T")]),
                ("None".into(), vec![]),
            ],
        },
    );
    type_defs.insert(
        "Result".into(),
        TypeDef {
            params: vec!["T".into(), "E".into()],
            constructors: vec![
                ("Ok".into(), vec![type_var_expr("T")]),
                ("Err".into(), vec![type_var_expr("E")]),
            ],
        },
    );
}

fn register_constructors(env: &mut TypeEnv) {
    // Reserved range 83000-83039.
    {
        let t = TyVar(83000);
        let tv = Ty::Var(t);
        let list_t = Ty::list(tv.clone());
        env.insert_scheme("Cons".into(), Scheme { vars: vec![t], ty: Ty::fun(vec![tv.clone(), list_t.clone()], list_t) });
    }
    {
        let t = TyVar(83010);
        let list_t = Ty::list(Ty::Var(t));
        env.insert_scheme("Nil".into(), Scheme { vars: vec![t], ty: Ty::fun(vec![], list_t) });
    }
    {
        let t = TyVar(83020);
        let tv = Ty::Var(t);
        env.insert_scheme("Some".into(), Scheme { vars: vec![t], ty: Ty::fun(vec![tv.clone()], Ty::option(tv)) });
    }
    {
        let t = TyVar(83021);
        env.insert_scheme("None".into(), Scheme { vars: vec![t], ty: Ty::fun(vec![], Ty::option(Ty::Var(t))) });
    }
    {
        let t = TyVar(83030);
        let e = TyVar(83031);
        let tv = Ty::Var(t);
        env.insert_scheme("Ok".into(), Scheme { vars: vec![t, e], ty: Ty::fun(vec![tv.clone()], Ty::result(tv, Ty::Var(e))) });
    }
    {
        let t = TyVar(83032);
        let e = TyVar(83033);
        let ev = Ty::Var(e);
        env.insert_scheme("Err".into(), Scheme { vars: vec![t, e], ty: Ty::fun(vec![ev.clone()], Ty::result(Ty::Var(t), ev)) });
    }
}

fn register_list_ops(env: &mut TypeEnv) {
    // Reserved range 80000-80099.
    let t_var = TyVar(80000);
    let u_var = TyVar(80001);
    let t = Ty::Var(t_var);
    let u = Ty::Var(u_var);
    let list_t = Ty::list(t.clone());
    let list_u = Ty::list(u.clone());

    env.insert_scheme(
        "list_map".into(),
        Scheme { vars: vec![t_var, u_var], ty: Ty::fun(vec![list_t.clone(), Ty::fun(vec![t.clone()], u.clone())], list_u.clone()) },
    );
    env.insert_scheme(
        "list_filter".into(),
        Scheme { vars: vec![t_var], ty: Ty::fun(vec![list_t.clone(), Ty::fun(vec![t.clone()], Ty::bool())], list_t.clone()) },
    );
    env.insert_scheme(
        "list_fold".into(),
        Scheme {
            vars: vec![t_var, u_var],
            ty: Ty::fun(vec![list_t.clone(), u.clone(), Ty::fun(vec![u.clone(), t.clone()], u.clone())], u.clone()),
        },
    );
    env.insert_scheme(
        "list_fold_right".into(),
        Scheme {
            vars: vec![t_var, u_var],
            ty: Ty::fun(vec![list_t.clone(), u.clone(), Ty::fun(vec![t.clone(), u.clone()], u.clone())], u.clone()),
        },
    );
    env.insert_scheme("list_head".into(), Scheme { vars: vec![t_var], ty: Ty::fun(vec![list_t.clone()], t.clone()) });
    env.insert_scheme("list_tail".into(), Scheme { vars: vec![t_var], ty: Ty::fun(vec![list_t.clone()], list_t.clone()) });
    env.insert_scheme("list_reverse".into(), Scheme { vars: vec![t_var], ty: Ty::fun(vec![list_t.clone()], list_t.clone()) });
    env.insert_scheme("list_concat".into(), Scheme { vars: vec![t_var], ty: Ty::fun(vec![list_t.clone(), list_t.clone()], list_t.clone()) });
    env.insert_scheme("list_length".into(), Scheme { vars: vec![t_var], ty: Ty::fun(vec![list_t], Ty::int()) });
}

fn register_option_ops(env: &mut TypeEnv) {
    // Reserved range 81000-81099.
    let t_var = TyVar(81000);
    let u_var = TyVar(81001);
    let t = Ty::Var(t_var);
    let u = Ty::Var(u_var);
    let opt_t = Ty::option(t.clone());
    let opt_u = Ty::option(u.clone());

    env.insert_scheme(
        "option_map".into(),
        Scheme { vars: vec![t_var, u_var], ty: Ty::fun(vec![opt_t.clone(), Ty::fun(vec![t.clone()], u.clone())], opt_u.clone()) },
    );
    env.insert_scheme(
        "option_flat_map".into(),
        Scheme { vars: vec![t_var, u_var], ty: Ty::fun(vec![opt_t.clone(), Ty::fun(vec![t.clone()], opt_u.clone())], opt_u) },
    );
    env.insert_scheme("option_get_or_else".into(), Scheme { vars: vec![t_var], ty: Ty::fun(vec![opt_t.clone(), t.clone()], t.clone()) });
    env.insert_scheme("option_is_some".into(), Scheme { vars: vec![t_var], ty: Ty::fun(vec![opt_t.clone()], Ty::bool()) });
    env.insert_scheme("option_is_none".into(), Scheme { vars: vec![t_var], ty: Ty::fun(vec![opt_t.clone()], Ty::bool()) });
    env.insert_scheme("option_unwrap".into(), Scheme { vars: vec![t_var], ty: Ty::fun(vec![opt_t], t) });
}

fn register_result_ops(env: &mut TypeEnv) {
    // Reserved range 82000-82099.
    let t_var = TyVar(82000);
    let e_var = TyVar(82001);
    let u_var = TyVar(82002);
    let t = Ty::Var(t_var);
    let e = Ty::Var(e_var);
    let u = Ty::Var(u_var);
    let result_te = Ty::result(t.clone(), e.clone());

    env.insert_scheme(
        "result_map".into(),
        Scheme {
            vars: vec![t_var, e_var, u_var],
            ty: Ty::fun(vec![result_te.clone(), Ty::fun(vec![t.clone()], u.clone())], Ty::result(u.clone(), e.clone())),
        },
    );
    env.insert_scheme(
        "result_flat_map".into(),
        Scheme {
            vars: vec![t_var, e_var, u_var],
            ty: Ty::fun(
                vec![result_te.clone(), Ty::fun(vec![t.clone()], Ty::result(u.clone(), e.clone()))],
                Ty::result(u.clone(), e.clone()),
            ),
        },
    );
    env.insert_scheme(
        "result_map_err".into(),
        Scheme {
            vars: vec![t_var, e_var, u_var],
            ty: Ty::fun(vec![result_te.clone(), Ty::fun(vec![e.clone()], u.clone())], Ty::result(t.clone(), u)),
        },
    );
    env.insert_scheme("result_is_ok".into(), Scheme { vars: vec![t_var, e_var], ty: Ty::fun(vec![result_te.clone()], Ty::bool()) });
    env.insert_scheme("result_is_err".into(), Scheme { vars: vec![t_var, e_var], ty: Ty::fun(vec![result_te.clone()], Ty::bool()) });
    env.insert_scheme("result_unwrap".into(), Scheme { vars: vec![t_var, e_var], ty: Ty::fun(vec![result_te.clone()], t.clone()) });
    env.insert_scheme(
        "result_unwrap_or".into(),
        Scheme { vars: vec![t_var, e_var], ty: Ty::fun(vec![result_te, t.clone()], t) },
    );
}

fn register_string_and_numeric_ops(env: &mut TypeEnv) {
    // String inspection/manipulation -- 9 bindings, no free variables.
    env.insert_scheme("string_length".into(), Scheme::mono(Ty::fun(vec![Ty::string()], Ty::int())));
    env.insert_scheme("string_concat".into(), Scheme::mono(Ty::fun(vec![Ty::string(), Ty::string()], Ty::string())));
    env.insert_scheme("string_to_upper".into(), Scheme::mono(Ty::fun(vec![Ty::string()], Ty::string())));
    env.insert_scheme("string_to_lower".into(), Scheme::mono(Ty::fun(vec![Ty::string()], Ty::string())));
    env.insert_scheme("string_trim".into(), Scheme::mono(Ty::fun(vec![Ty::string()], Ty::string())));
    env.insert_scheme("string_split".into(), Scheme::mono(Ty::fun(vec![Ty::string(), Ty::string()], Ty::list(Ty::string()))));
    env.insert_scheme("string_contains".into(), Scheme::mono(Ty::fun(vec![Ty::string(), Ty::string()], Ty::bool())));
    env.insert_scheme("string_starts_with".into(), Scheme::mono(Ty::fun(vec![Ty::string(), Ty::string()], Ty::bool())));
    env.insert_scheme("string_ends_with".into(), Scheme::mono(Ty::fun(vec![Ty::string(), Ty::string()], Ty::bool())));

    // Conversions among Int/Float/String -- 6 bindings. Conversions that can
    // fail (parsing a String) return Option rather than panicking.
    env.insert_scheme("int_to_float".into(), Scheme::mono(Ty::fun(vec![Ty::int()], Ty::float())));
    env.insert_scheme("float_to_int".into(), Scheme::mono(Ty::fun(vec![Ty::float()], Ty::int())));
    env.insert_scheme("int_to_string".into(), Scheme::mono(Ty::fun(vec![Ty::int()], Ty::string())));
    env.insert_scheme("float_to_string".into(), Scheme::mono(Ty::fun(vec![Ty::float()], Ty::string())));
    env.insert_scheme("string_to_int".into(), Scheme::mono(Ty::fun(vec![Ty::string()], Ty::option(Ty::int()))));
    env.insert_scheme("string_to_float".into(), Scheme::mono(Ty::fun(vec![Ty::string()], Ty::option(Ty::float()))));

    // round/floor/ceil/abs -- 5 bindings.
    env.insert_scheme("float_round".into(), Scheme::mono(Ty::fun(vec![Ty::float()], Ty::int())));
    env.insert_scheme("float_floor".into(), Scheme::mono(Ty::fun(vec![Ty::float()], Ty::int())));
    env.insert_scheme("float_ceil".into(), Scheme::mono(Ty::fun(vec![Ty::float()], Ty::int())));
    env.insert_scheme("int_abs".into(), Scheme::mono(Ty::fun(vec![Ty::int()], Ty::int())));
    env.insert_scheme("float_abs".into(), Scheme::mono(Ty::fun(vec![Ty::float()], Ty::float())));

    // min/max -- 4 bindings.
    env.insert_scheme("int_min".into(), Scheme::mono(Ty::fun(vec![Ty::int(), Ty::int()], Ty::int())));
    env.insert_scheme("int_max".into(), Scheme::mono(Ty::fun(vec![Ty::int(), Ty::int()], Ty::int())));
    env.insert_scheme("float_min".into(), Scheme::mono(Ty::fun(vec![Ty::float(), Ty::float()], Ty::float())));
    env.insert_scheme("float_max".into(), Scheme::mono(Ty::fun(vec![Ty::float(), Ty::float()], Ty::float())));
}

fn register_specials(env: &mut TypeEnv) {
    env.insert_scheme("panic".into(), Scheme::mono(Ty::fun(vec![Ty::string()], Ty::Never)));
    {
        let t = TyVar(83040);
        let tv = Ty::Var(t);
        env.insert_scheme("ref".into(), Scheme { vars: vec![t], ty: Ty::fun(vec![tv.clone()], Ty::ref_ty(tv)) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> (TypeEnv, TypeDefEnv) {
        let mut env = TypeEnv::new();
        let mut type_defs = TypeDefEnv::new();
        register_builtins(&mut env, &mut type_defs);
        (env, type_defs)
    }

    #[test]
    fn exact_binding_count_is_54() {
        let (env, _) = fresh();
        assert_eq!(env.global_len(), 54);
    }

    #[test]
    fn primitive_types_registered() {
        let (_, type_defs) = fresh();
        for name in ["Int", "Float", "String", "Bool", "Unit", "Never"] {
            assert!(type_defs.lookup(name).is_some(), "missing primitive type {name}");
        }
    }

    #[test]
    fn algebraic_types_and_constructors_registered() {
        let (env, type_defs) = fresh();
        assert!(type_defs.lookup("List").is_some());
        assert!(type_defs.lookup("Option").is_some());
        assert!(type_defs.lookup("Result").is_some());

        for ctor in ["Cons", "Nil", "Some", "None", "Ok", "Err"] {
            assert!(env.lookup(ctor).is_some(), "missing constructor {ctor}");
        }

        let (owner, _) = type_defs.lookup_constructor("Cons").unwrap();
        assert_eq!(owner, "List");
        let (owner, _) = type_defs.lookup_constructor("Err").unwrap();
        assert_eq!(owner, "Result");
    }

    #[test]
    fn stdlib_functions_registered() {
        let (env, _) = fresh();
        let names = [
            "list_map", "list_filter", "list_fold", "list_fold_right", "list_head", "list_tail",
            "list_reverse", "list_concat", "list_length",
            "option_map", "option_flat_map", "option_get_or_else", "option_is_some", "option_is_none",
            "option_unwrap",
            "result_map", "result_flat_map", "result_map_err", "result_is_ok", "result_is_err",
            "result_unwrap", "result_unwrap_or",
            "string_length", "string_concat", "string_to_upper", "string_to_lower", "string_trim",
            "string_split", "string_contains", "string_starts_with", "string_ends_with",
            "int_to_float", "float_to_int", "int_to_string", "float_to_string", "string_to_int",
            "string_to_float",
            "float_round", "float_floor", "float_ceil", "int_abs", "float_abs",
            "int_min", "int_max", "float_min", "float_max",
        ];
        assert_eq!(names.len(), 46);
        for name in names {
            assert!(env.lookup(name).is_some(), "missing stdlib binding {name}");
        }
    }

    #[test]
    fn specials_registered() {
        let (env, _) = fresh();
        assert!(env.lookup("panic").is_some());
        assert!(env.lookup("ref").is_some());
    }

    #[test]
    fn ref_special_is_polymorphic_over_single_var() {
        let (env, _) = fresh();
        match env.lookup("ref").unwrap() {
            crate::env::ValueBinding::Scheme(s) => assert_eq!(s.vars.len(), 1),
            _ => panic!("expected Scheme"),
        }
    }
}
