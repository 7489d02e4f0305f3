//! Ariadne-based diagnostic rendering for [`TypeError`].
//!
//! The inference core itself never touches I/O or colors -- it returns
//! `TypeError` values. This module is the optional rendering layer a driver
//! can call once it has the offending file's source text in hand, following
//! `snow-typeck::diagnostics::render_diagnostic`'s shape: one error code per
//! variant, a primary label at the constraint's origin span, and a help
//! string where a concrete fix suggestion exists.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use crate::error::{ConstraintOrigin, TypeError};
use crate::ty::Ty;

/// Rendering knobs a caller controls; the core itself reads none of these.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticOptions {
    pub color: bool,
    pub width: usize,
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        DiagnosticOptions { color: true, width: 100 }
    }
}

/// A stable code for each [`TypeError`] variant, in declaration order.
fn error_code(err: &TypeError) -> &'static str {
    match err {
        TypeError::UndefinedVariable { .. } => "E0001",
        TypeError::UndefinedConstructor { .. } => "E0002",
        TypeError::ConstructorArity { .. } => "E0003",
        TypeError::Mismatch { .. } => "E0004",
        TypeError::ArityMismatch { .. } => "E0005",
        TypeError::InfiniteType { .. } => "E0006",
        TypeError::MissingField { .. } => "E0007",
        TypeError::NonRecordAccess { .. } => "E0008",
        TypeError::NonExhaustiveMatch { .. } => "E0009",
        TypeError::InvalidGuard { .. } => "E0010",
        TypeError::DuplicatePatternVariable { .. } => "E0011",
        TypeError::ValueRestriction { .. } => "E0012",
        TypeError::EscapingTypeVariable { .. } => "E0013",
        TypeError::UnsupportedTypeAnnotation { .. } => "E0014",
        TypeError::NoMatchingOverload { .. } => "E0015",
        TypeError::AmbiguousOverload { .. } => "E0016",
        TypeError::DuplicateOverloadTarget { .. } => "E0017",
        TypeError::InconsistentOverloadImport { .. } => "E0018",
    }
}

fn loc_range(loc: vela_ast::Location) -> Range<usize> {
    loc.span.start as usize..loc.span.end as usize
}

fn origin_range(origin: &ConstraintOrigin) -> Option<Range<usize>> {
    origin.span().map(loc_range)
}

/// A fix suggestion for a type mismatch, when a plausible one exists.
fn fix_suggestion(expected: &Ty, found: &Ty) -> Option<String> {
    let exp = format!("{}", expected);
    let found_str = format!("{}", found);

    if let Some(inner) = exp.strip_prefix("Option<").and_then(|s| s.strip_suffix('>')) {
        if inner == found_str {
            return Some("wrap in Some(...)".to_string());
        }
    }
    if let Some(inner) = exp.strip_prefix("Result<") {
        if let Some(comma) = inner.find(',') {
            if inner[..comma].trim() == found_str {
                return Some("wrap in Ok(...)".to_string());
            }
        }
    }
    match (exp.as_str(), found_str.as_str()) {
        ("Int", "Float") => Some("convert with float_to_int".to_string()),
        ("Float", "Int") => Some("convert with int_to_float".to_string()),
        ("String", "Int") => Some("convert with int_to_string".to_string()),
        ("String", "Float") => Some("convert with float_to_string".to_string()),
        ("Bool", _) => Some("expected a boolean expression".to_string()),
        _ => None,
    }
}

/// Render `error` into a formatted diagnostic using `source`'s text.
/// `options` controls color and wrap width; `filename` is informational
/// only (ariadne's single-source cache does not echo it back).
pub fn render_diagnostic(
    error: &TypeError,
    source: &str,
    _filename: &str,
    options: DiagnosticOptions,
) -> String {
    let config = Config::default().with_color(options.color);
    let source_len = source.len();

    let clamp = |r: Range<usize>| -> Range<usize> {
        let s = r.start.min(source_len);
        let e = r.end.min(source_len).max(s);
        if s == e {
            s..e.saturating_add(1).min(source_len)
        } else {
            s..e
        }
    };

    let code = error_code(error);
    let fallback_span = || 0..source_len.max(1).min(source_len);

    let report = match error {
        TypeError::Mismatch { expected, found, origin } => {
            let msg = format!("type mismatch: expected `{}`, found `{}`", expected, found);
            let span = clamp(origin_range(origin).unwrap_or_else(fallback_span));

            let mut builder = Report::build(ReportKind::Error, span.clone())
                .with_code(code)
                .with_message(&msg)
                .with_config(config);

            match origin {
                ConstraintOrigin::MatchArms { first_span, arm_span } => {
                    let first_range = clamp(loc_range(*first_span));
                    let arm_range = clamp(loc_range(*arm_span));
                    builder.add_label(
                        Label::new(first_range)
                            .with_message("first arm's type established here")
                            .with_color(Color::Blue),
                    );
                    builder.add_label(
                        Label::new(arm_range)
                            .with_message(format!("expected `{}`, found `{}`", expected, found))
                            .with_color(Color::Red),
                    );
                }
                _ => {
                    builder.add_label(
                        Label::new(span.clone())
                            .with_message(format!("expected `{}`, found `{}`", expected, found))
                            .with_color(Color::Red),
                    );
                }
            }

            if let Some(fix) = fix_suggestion(expected, found) {
                builder.set_help(fix);
            }

            builder.finish()
        }

        TypeError::InfiniteType { var, ty, origin } => {
            let span = clamp(origin_range(origin).unwrap_or_else(fallback_span));
            Report::build(ReportKind::Error, span.clone())
                .with_code(code)
                .with_message(format!("infinite type: `?{}` occurs in `{}`", var.0, ty))
                .with_config(config)
                .with_label(
                    Label::new(span)
                        .with_message("recursive type here")
                        .with_color(Color::Red),
                )
                .with_help("a value cannot have a type that refers to itself")
                .finish()
        }

        TypeError::ArityMismatch { expected, found, origin } => {
            let span = clamp(origin_range(origin).unwrap_or_else(fallback_span));
            let mut builder = Report::build(ReportKind::Error, span.clone())
                .with_code(code)
                .with_message(format!("expected {} argument(s), found {}", expected, found))
                .with_config(config)
                .with_label(
                    Label::new(span)
                        .with_message(format!("expected {} argument(s)", expected))
                        .with_color(Color::Red),
                );
            if expected > found {
                builder.set_help(format!("missing {} argument(s)", expected - found));
            } else {
                builder.set_help(format!("{} extra argument(s)", found - expected));
            }
            builder.finish()
        }

        TypeError::UndefinedVariable { name, suggestions, loc } => {
            let span = clamp(loc_range(*loc));
            let mut builder = Report::build(ReportKind::Error, span.clone())
                .with_code(code)
                .with_message(format!("undefined variable `{}`", name))
                .with_config(config)
                .with_label(
                    Label::new(span)
                        .with_message("not found in this scope")
                        .with_color(Color::Red),
                );
            if !suggestions.is_empty() {
                builder.set_help(format!("did you mean: {}?", suggestions.join(", ")));
            }
            builder.finish()
        }

        TypeError::UndefinedConstructor { name, loc } => {
            let span = clamp(loc_range(*loc));
            Report::build(ReportKind::Error, span.clone())
                .with_code(code)
                .with_message(format!("undefined constructor `{}`", name))
                .with_config(config)
                .with_label(
                    Label::new(span)
                        .with_message("not a declared constructor")
                        .with_color(Color::Red),
                )
                .finish()
        }

        TypeError::ConstructorArity { name, expected, found, loc } => {
            let span = clamp(loc_range(*loc));
            Report::build(ReportKind::Error, span.clone())
                .with_code(code)
                .with_message(format!("constructor `{}` expects {} argument(s), found {}", name, expected, found))
                .with_config(config)
                .with_label(
                    Label::new(span)
                        .with_message(format!("expected {} argument(s)", expected))
                        .with_color(Color::Red),
                )
                .finish()
        }

        TypeError::MissingField { field, record_ty, loc, suggestions } => {
            let span = clamp(loc_range(*loc));
            let mut builder = Report::build(ReportKind::Error, span.clone())
                .with_code(code)
                .with_message(format!("no field `{}` on `{}`", field, record_ty))
                .with_config(config)
                .with_label(
                    Label::new(span)
                        .with_message(format!("`{}` has no field `{}`", record_ty, field))
                        .with_color(Color::Red),
                );
            if !suggestions.is_empty() {
                builder.set_help(format!("did you mean: {}?", suggestions.join(", ")));
            }
            builder.finish()
        }

        TypeError::NonRecordAccess { ty, field, loc } => {
            let span = clamp(loc_range(*loc));
            Report::build(ReportKind::Error, span.clone())
                .with_code(code)
                .with_message(format!("cannot access field `{}` on non-record type `{}`", field, ty))
                .with_config(config)
                .with_label(
                    Label::new(span)
                        .with_message("not a record")
                        .with_color(Color::Red),
                )
                .finish()
        }

        TypeError::NonExhaustiveMatch { scrutinee_ty, missing, loc } => {
            let span = clamp(loc_range(*loc));
            Report::build(ReportKind::Error, span.clone())
                .with_code(code)
                .with_message(format!("non-exhaustive match on `{}`", scrutinee_ty))
                .with_config(config)
                .with_label(
                    Label::new(span)
                        .with_message(format!("missing: {}", missing.join(", ")))
                        .with_color(Color::Red),
                )
                .with_help("add the missing patterns or a wildcard `_` arm")
                .finish()
        }

        TypeError::InvalidGuard { found, loc } => {
            let span = clamp(loc_range(*loc));
            Report::build(ReportKind::Error, span.clone())
                .with_code(code)
                .with_message(format!("guard expression must be `Bool`, found `{}`", found))
                .with_config(config)
                .with_label(
                    Label::new(span)
                        .with_message("not a `Bool`")
                        .with_color(Color::Red),
                )
                .finish()
        }

        TypeError::DuplicatePatternVariable { name, loc } => {
            let span = clamp(loc_range(*loc));
            Report::build(ReportKind::Error, span.clone())
                .with_code(code)
                .with_message(format!("variable `{}` bound more than once in this pattern", name))
                .with_config(config)
                .with_label(
                    Label::new(span)
                        .with_message("second binding here")
                        .with_color(Color::Red),
                )
                .finish()
        }

        TypeError::ValueRestriction { name, loc } => {
            let span = clamp(loc_range(*loc));
            Report::build(ReportKind::Error, span.clone())
                .with_code(code)
                .with_message(format!("`{}` cannot be generalized; bound monomorphically", name))
                .with_config(config)
                .with_label(
                    Label::new(span)
                        .with_message("not a syntactic value")
                        .with_color(Color::Yellow),
                )
                .finish()
        }

        TypeError::EscapingTypeVariable { var, loc } => {
            let span = clamp(loc_range(*loc));
            Report::build(ReportKind::Error, span.clone())
                .with_code(code)
                .with_message(format!("type variable `?{}` escapes its scope", var.0))
                .with_config(config)
                .with_label(
                    Label::new(span)
                        .with_message("escapes here")
                        .with_color(Color::Red),
                )
                .finish()
        }

        TypeError::UnsupportedTypeAnnotation { reason, loc } => {
            let span = clamp(loc_range(*loc));
            Report::build(ReportKind::Error, span.clone())
                .with_code(code)
                .with_message(format!("unsupported type annotation: {}", reason))
                .with_config(config)
                .with_label(Label::new(span).with_message(reason.clone()).with_color(Color::Red))
                .finish()
        }

        TypeError::NoMatchingOverload { name, arity, loc } => {
            let span = clamp(loc_range(*loc));
            Report::build(ReportKind::Error, span.clone())
                .with_code(code)
                .with_message(format!("no overload of `{}` accepts {} argument(s)", name, arity))
                .with_config(config)
                .with_label(
                    Label::new(span)
                        .with_message("no matching arity")
                        .with_color(Color::Red),
                )
                .finish()
        }

        TypeError::AmbiguousOverload { name, arity, loc } => {
            let span = clamp(loc_range(*loc));
            Report::build(ReportKind::Error, span.clone())
                .with_code(code)
                .with_message(format!("ambiguous overload of `{}` for {} argument(s)", name, arity))
                .with_config(config)
                .with_label(
                    Label::new(span)
                        .with_message("multiple candidates match")
                        .with_color(Color::Red),
                )
                .finish()
        }

        TypeError::DuplicateOverloadTarget { name, first_target, second_target } => {
            Report::build(ReportKind::Error, clamp(fallback_span()))
                .with_code(code)
                .with_message(format!(
                    "overloads of `{}` disagree on target symbol: `{}` vs `{}`",
                    name, first_target, second_target
                ))
                .with_config(config)
                .finish()
        }

        TypeError::InconsistentOverloadImport { name, first_source, second_source } => {
            Report::build(ReportKind::Error, clamp(fallback_span()))
                .with_code(code)
                .with_message(format!(
                    "overloads of `{}` disagree on import source: {:?} vs {:?}",
                    name, first_source, second_source
                ))
                .with_config(config)
                .finish()
        }
    };

    let mut buf = Vec::new();
    report.write(Source::from(source), &mut buf).expect("failed to write diagnostic");
    String::from_utf8(buf).expect("diagnostic output should be valid UTF-8")
}
