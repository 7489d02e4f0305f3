//! Maranget's usefulness algorithm for match exhaustiveness.
//!
//! Implements Algorithm U from Luc Maranget's "Warnings for Pattern
//! Matching" (2007): `is_useful(matrix, row)` asks whether `row` matches a
//! value not already covered by `matrix`. Exhaustiveness and redundancy are
//! both expressed through it -- exhaustiveness asks whether a trailing
//! wildcard is still useful after all arms; redundancy asks whether each arm
//! is useful given only the arms before it.
//!
//! This module operates on an abstract `Pat`/`TypeInfo` pair, not on
//! `vela_ast::Pattern` directly -- the translation from core-AST patterns
//! (and from a resolved `Ty`) lives in [`crate::pattern`].

use std::collections::HashSet;

/// The kind of a literal pattern value, used only to format witnesses.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LitKind {
    Int,
    Float,
    Bool,
    String,
}

/// Abstract pattern shape the usefulness algorithm reasons about.
#[derive(Clone, Debug, PartialEq)]
pub enum Pat {
    /// Matches anything: wildcard `_` or a variable binding.
    Wildcard,
    /// A constructor applied to sub-patterns (`type_name` is carried only
    /// for witness display, never compared).
    Constructor {
        name: String,
        type_name: String,
        args: Vec<Pat>,
    },
    /// A literal value, compared by its textual form.
    Literal { value: String, ty: LitKind },
    /// An or-pattern: matches if any alternative matches.
    Or { alternatives: Vec<Pat> },
}

/// One match arm's column of patterns.
pub type PatternRow = Vec<Pat>;

/// Rows already known to be covered, one per prior arm.
#[derive(Clone, Debug, Default)]
pub struct PatternMatrix {
    pub rows: Vec<PatternRow>,
}

/// A constructor's name and the type info of each of its arguments, in
/// order. Arity is `arg_types.len()`.
#[derive(Clone, Debug)]
pub struct ConstructorSig {
    pub name: String,
    pub arg_types: Vec<TypeInfo>,
}

impl ConstructorSig {
    pub fn arity(&self) -> usize {
        self.arg_types.len()
    }
}

/// What the algorithm needs to know about a scrutinee position's type:
/// its full constructor signature, or that it has no finite signature.
#[derive(Clone, Debug)]
pub enum TypeInfo {
    /// A type with a closed, finite set of constructors (a built-in or
    /// user-declared variant, or `Bool` modeled with two nullary ctors).
    SumType { variants: Vec<ConstructorSig> },
    /// `Bool`: exactly `true` and `false`.
    Bool,
    /// A domain with no enumerable constructor set (`Int`, `Float`,
    /// `String`, or any non-algebraic type reached by a wildcard/var
    /// pattern only). Never treated as a complete signature.
    Infinite,
}

// ── Specialization ───────────────────────────────────────────────────────

fn specialize_row(row: &[Pat], ctor_name: &str, arity: usize, out: &mut Vec<PatternRow>) {
    if row.is_empty() {
        return;
    }
    let (head, rest) = (&row[0], &row[1..]);
    match head {
        Pat::Wildcard => {
            let mut new_row = vec![Pat::Wildcard; arity];
            new_row.extend_from_slice(rest);
            out.push(new_row);
        }
        Pat::Constructor { name, args, .. } => {
            if name == ctor_name {
                let mut new_row = args.clone();
                new_row.extend_from_slice(rest);
                out.push(new_row);
            }
        }
        Pat::Literal { .. } => {}
        Pat::Or { alternatives } => {
            for alt in alternatives {
                let mut expanded = vec![alt.clone()];
                expanded.extend_from_slice(rest);
                specialize_row(&expanded, ctor_name, arity, out);
            }
        }
    }
}

fn specialize(matrix: &PatternMatrix, ctor_name: &str, arity: usize) -> PatternMatrix {
    let mut rows = Vec::new();
    for row in &matrix.rows {
        specialize_row(row, ctor_name, arity, &mut rows);
    }
    PatternMatrix { rows }
}

fn specialize_literal_row(row: &[Pat], value: &str, out: &mut Vec<PatternRow>) {
    if row.is_empty() {
        return;
    }
    let (head, rest) = (&row[0], &row[1..]);
    match head {
        Pat::Wildcard => out.push(rest.to_vec()),
        Pat::Literal { value: v, .. } => {
            if v == value {
                out.push(rest.to_vec());
            }
        }
        Pat::Constructor { .. } => {}
        Pat::Or { alternatives } => {
            for alt in alternatives {
                let mut expanded = vec![alt.clone()];
                expanded.extend_from_slice(rest);
                specialize_literal_row(&expanded, value, out);
            }
        }
    }
}

fn specialize_literal(matrix: &PatternMatrix, value: &str) -> PatternMatrix {
    let mut rows = Vec::new();
    for row in &matrix.rows {
        specialize_literal_row(row, value, &mut rows);
    }
    PatternMatrix { rows }
}

fn default_row(row: &[Pat], out: &mut Vec<PatternRow>) {
    if row.is_empty() {
        return;
    }
    let (head, rest) = (&row[0], &row[1..]);
    match head {
        Pat::Wildcard => out.push(rest.to_vec()),
        Pat::Constructor { .. } | Pat::Literal { .. } => {}
        Pat::Or { alternatives } => {
            for alt in alternatives {
                let mut expanded = vec![alt.clone()];
                expanded.extend_from_slice(rest);
                default_row(&expanded, out);
            }
        }
    }
}

fn default_matrix(matrix: &PatternMatrix) -> PatternMatrix {
    let mut rows = Vec::new();
    for row in &matrix.rows {
        default_row(row, &mut rows);
    }
    PatternMatrix { rows }
}

fn constructors_used(matrix: &PatternMatrix, out: &mut HashSet<String>) {
    for row in &matrix.rows {
        collect_ctor_names(row.first(), out);
    }
}

fn collect_ctor_names(head: Option<&Pat>, out: &mut HashSet<String>) {
    match head {
        Some(Pat::Constructor { name, .. }) => {
            out.insert(name.clone());
        }
        Some(Pat::Or { alternatives }) => {
            for alt in alternatives {
                collect_ctor_names(Some(alt), out);
            }
        }
        _ => {}
    }
}

fn literals_used(matrix: &PatternMatrix, out: &mut HashSet<String>) {
    for row in &matrix.rows {
        collect_literal_values(row.first(), out);
    }
}

fn collect_literal_values(head: Option<&Pat>, out: &mut HashSet<String>) {
    match head {
        Some(Pat::Literal { value, .. }) => {
            out.insert(value.clone());
        }
        Some(Pat::Or { alternatives }) => {
            for alt in alternatives {
                collect_literal_values(Some(alt), out);
            }
        }
        _ => {}
    }
}

fn nested_type_info(ty: &TypeInfo, ctor_name: &str) -> Vec<TypeInfo> {
    match ty {
        TypeInfo::SumType { variants } => variants
            .iter()
            .find(|v| v.name == ctor_name)
            .map(|v| v.arg_types.clone())
            .unwrap_or_default(),
        TypeInfo::Bool | TypeInfo::Infinite => Vec::new(),
    }
}

// ── Usefulness ───────────────────────────────────────────────────────────

/// Whether `row` matches a value not already covered by `matrix`.
pub fn is_useful(matrix: &PatternMatrix, row: &[Pat], type_info: &[TypeInfo]) -> bool {
    if row.is_empty() {
        return matrix.rows.is_empty();
    }
    let (head, rest) = (&row[0], &row[1..]);
    match head {
        Pat::Or { alternatives } => alternatives.iter().any(|alt| {
            let mut new_row = vec![alt.clone()];
            new_row.extend_from_slice(rest);
            is_useful(matrix, &new_row, type_info)
        }),

        Pat::Constructor { name, args, .. } => {
            let arity = args.len();
            let specialized = specialize(matrix, name, arity);
            let mut new_row = args.clone();
            new_row.extend_from_slice(rest);
            let mut combined = type_info
                .first()
                .map(|ti| nested_type_info(ti, name))
                .unwrap_or_default();
            if combined.len() != arity {
                combined = vec![TypeInfo::Infinite; arity];
            }
            combined.extend_from_slice(type_info.get(1..).unwrap_or(&[]));
            is_useful(&specialized, &new_row, &combined)
        }

        Pat::Literal { value, .. } => {
            let specialized = specialize_literal(matrix, value);
            is_useful(&specialized, rest, type_info.get(1..).unwrap_or(&[]))
        }

        Pat::Wildcard => {
            let rest_info = type_info.get(1..).unwrap_or(&[]);
            match type_info.first() {
                Some(TypeInfo::SumType { variants }) if !variants.is_empty() => {
                    let mut used = HashSet::new();
                    constructors_used(matrix, &mut used);
                    let complete = variants.iter().all(|v| used.contains(&v.name));
                    if complete {
                        variants.iter().any(|v| {
                            let specialized = specialize(matrix, &v.name, v.arity());
                            let mut new_row = vec![Pat::Wildcard; v.arity()];
                            new_row.extend_from_slice(rest);
                            let mut combined = v.arg_types.clone();
                            combined.extend_from_slice(rest_info);
                            is_useful(&specialized, &new_row, &combined)
                        })
                    } else {
                        is_useful(&default_matrix(matrix), rest, rest_info)
                    }
                }
                Some(TypeInfo::Bool) => {
                    let mut used = HashSet::new();
                    literals_used(matrix, &mut used);
                    let complete = used.contains("true") && used.contains("false");
                    if complete {
                        ["true", "false"].iter().any(|v| {
                            let specialized = specialize_literal(matrix, v);
                            is_useful(&specialized, rest, rest_info)
                        })
                    } else {
                        is_useful(&default_matrix(matrix), rest, rest_info)
                    }
                }
                _ => is_useful(&default_matrix(matrix), rest, rest_info),
            }
        }
    }
}

// ── Exhaustiveness & redundancy ───────────────────────────────────────────

/// `None` if `arms` cover every inhabitant of `ty`; otherwise witnesses of
/// values no arm covers.
pub fn check_exhaustiveness(arms: &[Pat], ty: &TypeInfo) -> Option<Vec<Pat>> {
    let matrix = PatternMatrix {
        rows: arms.iter().cloned().map(|p| vec![p]).collect(),
    };
    if !is_useful(&matrix, &[Pat::Wildcard], std::slice::from_ref(ty)) {
        return None;
    }

    let witnesses = match ty {
        TypeInfo::SumType { variants } => variants
            .iter()
            .filter(|v| {
                let probe = [Pat::Constructor {
                    name: v.name.clone(),
                    type_name: String::new(),
                    args: vec![Pat::Wildcard; v.arity()],
                }];
                is_useful(&matrix, &probe, std::slice::from_ref(ty))
            })
            .map(|v| Pat::Constructor {
                name: v.name.clone(),
                type_name: String::new(),
                args: vec![Pat::Wildcard; v.arity()],
            })
            .collect::<Vec<_>>(),
        TypeInfo::Bool => ["true", "false"]
            .iter()
            .filter(|v| {
                let probe = [Pat::Literal { value: v.to_string(), ty: LitKind::Bool }];
                is_useful(&matrix, &probe, std::slice::from_ref(ty))
            })
            .map(|v| Pat::Literal { value: v.to_string(), ty: LitKind::Bool })
            .collect(),
        TypeInfo::Infinite => vec![Pat::Wildcard],
    };

    Some(if witnesses.is_empty() { vec![Pat::Wildcard] } else { witnesses })
}

/// Indices (0-based) of arms that are unreachable given the arms before them.
pub fn check_redundancy(arms: &[Pat], ty: &TypeInfo) -> Vec<usize> {
    let mut redundant = Vec::new();
    let mut rows: Vec<PatternRow> = Vec::new();
    for (i, arm) in arms.iter().enumerate() {
        let matrix = PatternMatrix { rows: rows.clone() };
        let probe = [arm.clone()];
        if !is_useful(&matrix, &probe, std::slice::from_ref(ty)) {
            redundant.push(i);
        }
        rows.push(vec![arm.clone()]);
    }
    redundant
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wildcard() -> Pat {
        Pat::Wildcard
    }

    fn ctor(name: &str, type_name: &str, args: Vec<Pat>) -> Pat {
        Pat::Constructor { name: name.to_string(), type_name: type_name.to_string(), args }
    }

    fn lit_int(value: i64) -> Pat {
        Pat::Literal { value: value.to_string(), ty: LitKind::Int }
    }

    fn lit_bool(value: bool) -> Pat {
        Pat::Literal { value: value.to_string(), ty: LitKind::Bool }
    }

    fn or_pat(alternatives: Vec<Pat>) -> Pat {
        Pat::Or { alternatives }
    }

    fn bool_type() -> TypeInfo {
        TypeInfo::Bool
    }

    fn int_type() -> TypeInfo {
        TypeInfo::Infinite
    }

    fn shape_type() -> TypeInfo {
        TypeInfo::SumType {
            variants: vec![
                ConstructorSig { name: "Circle".to_string(), arg_types: vec![TypeInfo::Infinite] },
                ConstructorSig { name: "Point".to_string(), arg_types: vec![] },
            ],
        }
    }

    fn option_shape_type() -> TypeInfo {
        TypeInfo::SumType {
            variants: vec![
                ConstructorSig { name: "Some".to_string(), arg_types: vec![shape_type()] },
                ConstructorSig { name: "None".to_string(), arg_types: vec![] },
            ],
        }
    }

    fn matrix(rows: Vec<Vec<Pat>>) -> PatternMatrix {
        PatternMatrix { rows }
    }

    #[test]
    fn test_is_useful_empty_matrix_returns_true() {
        let m = matrix(vec![]);
        assert!(is_useful(&m, &[wildcard()], &[int_type()]));
    }

    #[test]
    fn test_is_useful_empty_row_returns_false() {
        let m = matrix(vec![vec![]]);
        assert!(!is_useful(&m, &[], &[]));
    }

    #[test]
    fn test_is_useful_empty_matrix_empty_row_returns_true() {
        let m = matrix(vec![]);
        assert!(is_useful(&m, &[], &[]));
    }

    #[test]
    fn test_bool_exhaustive() {
        let result = check_exhaustiveness(&[lit_bool(true), lit_bool(false)], &bool_type());
        assert!(result.is_none(), "Bool [true, false] should be exhaustive");
    }

    #[test]
    fn test_bool_non_exhaustive() {
        let result = check_exhaustiveness(&[lit_bool(true)], &bool_type());
        assert!(result.is_some(), "Bool [true] should NOT be exhaustive");
        assert!(!result.unwrap().is_empty());
    }

    #[test]
    fn test_bool_wildcard_exhaustive() {
        let result = check_exhaustiveness(&[wildcard()], &bool_type());
        assert!(result.is_none(), "Bool [_] should be exhaustive");
    }

    #[test]
    fn test_sum_type_exhaustive() {
        let result = check_exhaustiveness(
            &[ctor("Circle", "Shape", vec![wildcard()]), ctor("Point", "Shape", vec![])],
            &shape_type(),
        );
        assert!(result.is_none(), "Shape [Circle(_), Point] should be exhaustive");
    }

    #[test]
    fn test_sum_type_non_exhaustive() {
        let result =
            check_exhaustiveness(&[ctor("Circle", "Shape", vec![wildcard()])], &shape_type());
        assert!(result.is_some(), "Shape [Circle(_)] should NOT be exhaustive");
    }

    #[test]
    fn test_sum_type_wildcard_exhaustive() {
        let result = check_exhaustiveness(&[wildcard()], &shape_type());
        assert!(result.is_none(), "Shape [_] should be exhaustive");
    }

    #[test]
    fn test_redundant_arm_after_wildcard() {
        let result = check_redundancy(
            &[wildcard(), ctor("Circle", "Shape", vec![wildcard()])],
            &shape_type(),
        );
        assert_eq!(result, vec![1], "Arm 1 should be redundant after wildcard");
    }

    #[test]
    fn test_no_redundancy() {
        let result = check_redundancy(
            &[ctor("Circle", "Shape", vec![wildcard()]), ctor("Point", "Shape", vec![])],
            &shape_type(),
        );
        assert!(result.is_empty(), "No arms should be redundant");
    }

    #[test]
    fn test_duplicate_arm_redundant() {
        let result = check_redundancy(
            &[
                ctor("Circle", "Shape", vec![wildcard()]),
                ctor("Circle", "Shape", vec![wildcard()]),
                ctor("Point", "Shape", vec![]),
            ],
            &shape_type(),
        );
        assert_eq!(result, vec![1], "Duplicate Circle arm should be redundant");
    }

    #[test]
    fn test_nested_exhaustive() {
        let result = check_exhaustiveness(
            &[
                ctor("Some", "Option", vec![ctor("Circle", "Shape", vec![wildcard()])]),
                ctor("Some", "Option", vec![ctor("Point", "Shape", vec![])]),
                ctor("None", "Option", vec![]),
            ],
            &option_shape_type(),
        );
        assert!(result.is_none(), "Option<Shape> fully covered should be exhaustive");
    }

    #[test]
    fn test_nested_non_exhaustive() {
        let result = check_exhaustiveness(
            &[
                ctor("Some", "Option", vec![ctor("Circle", "Shape", vec![wildcard()])]),
                ctor("None", "Option", vec![]),
            ],
            &option_shape_type(),
        );
        assert!(result.is_some(), "Option<Shape> missing Some(Point) should NOT be exhaustive");
    }

    #[test]
    fn test_or_pattern_exhaustive() {
        let result = check_exhaustiveness(
            &[or_pat(vec![
                ctor("Circle", "Shape", vec![wildcard()]),
                ctor("Point", "Shape", vec![]),
            ])],
            &shape_type(),
        );
        assert!(result.is_none(), "Shape [Circle(_) | Point] should be exhaustive");
    }

    #[test]
    fn test_or_pattern_non_exhaustive() {
        let result = check_exhaustiveness(
            &[or_pat(vec![
                ctor("Circle", "Shape", vec![wildcard()]),
                ctor("Circle", "Shape", vec![wildcard()]),
            ])],
            &shape_type(),
        );
        assert!(result.is_some(), "Shape [Circle(_) | Circle(_)] should NOT be exhaustive");
    }

    #[test]
    fn test_literal_with_wildcard_exhaustive() {
        let result = check_exhaustiveness(&[lit_int(1), lit_int(2), wildcard()], &int_type());
        assert!(result.is_none(), "Int [1, 2, _] should be exhaustive");
    }

    #[test]
    fn test_literal_without_wildcard_non_exhaustive() {
        let result = check_exhaustiveness(&[lit_int(1), lit_int(2)], &int_type());
        assert!(result.is_some(), "Int [1, 2] should NOT be exhaustive");
    }

    #[test]
    fn test_literal_wildcard_only_exhaustive() {
        let result = check_exhaustiveness(&[wildcard()], &int_type());
        assert!(result.is_none(), "Int [_] should be exhaustive");
    }

    #[test]
    fn test_is_useful_constructor_against_different_constructor() {
        let m = matrix(vec![vec![ctor("Circle", "Shape", vec![wildcard()])]]);
        assert!(is_useful(&m, &[ctor("Point", "Shape", vec![])], &[shape_type()]));
    }

    #[test]
    fn test_is_useful_constructor_against_same_constructor() {
        let m = matrix(vec![vec![ctor("Circle", "Shape", vec![wildcard()])]]);
        assert!(!is_useful(&m, &[ctor("Circle", "Shape", vec![wildcard()])], &[shape_type()]));
    }

    #[test]
    fn test_is_useful_wildcard_after_all_constructors() {
        let m = matrix(vec![
            vec![ctor("Circle", "Shape", vec![wildcard()])],
            vec![ctor("Point", "Shape", vec![])],
        ]);
        assert!(!is_useful(&m, &[wildcard()], &[shape_type()]));
    }

    #[test]
    fn test_is_useful_wildcard_after_partial_constructors() {
        let m = matrix(vec![vec![ctor("Circle", "Shape", vec![wildcard()])]]);
        assert!(is_useful(&m, &[wildcard()], &[shape_type()]));
    }

    #[test]
    fn test_is_useful_new_literal_value() {
        let m = matrix(vec![vec![lit_int(1)]]);
        assert!(is_useful(&m, &[lit_int(2)], &[int_type()]));
    }

    #[test]
    fn test_is_useful_duplicate_literal_value() {
        let m = matrix(vec![vec![lit_int(1)]]);
        assert!(!is_useful(&m, &[lit_int(1)], &[int_type()]));
    }

    #[test]
    fn test_is_useful_multi_column() {
        let m = matrix(vec![
            vec![lit_bool(true), lit_bool(true)],
            vec![lit_bool(false), lit_bool(false)],
        ]);
        assert!(is_useful(
            &m,
            &[lit_bool(true), lit_bool(false)],
            &[bool_type(), bool_type()],
        ));
    }

    #[test]
    fn test_is_useful_multi_column_not_useful() {
        let m = matrix(vec![
            vec![lit_bool(true), wildcard()],
            vec![lit_bool(false), wildcard()],
        ]);
        assert!(!is_useful(
            &m,
            &[lit_bool(true), lit_bool(true)],
            &[bool_type(), bool_type()],
        ));
    }

    #[test]
    fn test_bool_true_false_true_redundant() {
        let result = check_redundancy(&[lit_bool(true), lit_bool(false), lit_bool(true)], &bool_type());
        assert_eq!(result, vec![2]);
    }

    #[test]
    fn test_nested_specialization_type_info() {
        let m = matrix(vec![
            vec![ctor("Some", "Option", vec![ctor("Circle", "Shape", vec![wildcard()])])],
            vec![ctor("None", "Option", vec![])],
        ]);
        let result = is_useful(
            &m,
            &[ctor("Some", "Option", vec![ctor("Point", "Shape", vec![])])],
            &[option_shape_type()],
        );
        assert!(result, "Some(Point) should be useful when only Some(Circle(_)) and None are covered");
    }
}
