//! MSBuild condition parser and configuration-key extraction.
//!
//! Every configuration-scoped group in a `.vcxproj` is gated by a condition of
//! exactly one shape:
//!
//! ```text
//! '$(Configuration)|$(Platform)'=='Debug|Win32'
//! ```
//!
//! Conditions are parsed with [`chumsky`] into an [`Expression`] tree and the
//! configuration key is then pulled out of that tree.  Anything that parses but
//! does not have the shape above (a compound `and`/`or`, an `Exists(…)`, a
//! comparison against another property) is rejected: such a file was not
//! produced by a generator and cannot be bound to a configuration index.
//!
//! ## Grammar (case-insensitive keywords)
//!
//! ```text
//! expr       = or_expr
//! or_expr    = and_expr ('or' and_expr)*
//! and_expr   = atom ('and' atom)*
//! atom       = comparison | exists | '(' expr ')'
//! comparison = quoted ('==' | '!=') quoted
//! exists     = 'Exists' '(' quoted ')'
//! quoted     = "'" chars "'"
//! ```

use chumsky::prelude::*;

use crate::error::{ProjectError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
//  AST
// ═══════════════════════════════════════════════════════════════════════════════

/// A parsed MSBuild condition expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `'lhs' == 'rhs'` or `'lhs' != 'rhs'`.
    Compare {
        lhs: Vec<ExprValue>,
        op: CompareOp,
        rhs: Vec<ExprValue>,
    },
    /// `Exists('path')`.
    Exists(Vec<ExprValue>),
    /// `a and b`
    And(Box<Expression>, Box<Expression>),
    /// `a or b`
    Or(Box<Expression>, Box<Expression>),
}

/// Comparison operator used inside an [`Expression::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
}

/// A fragment of a quoted string that may contain `$(Variable)` references.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprValue {
    Literal(String),
    Variable(String),
}

/// Split the raw text between single quotes into [`ExprValue`] fragments.
fn parse_string_parts(s: &str) -> Vec<ExprValue> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'(') {
            if !literal.is_empty() {
                parts.push(ExprValue::Literal(std::mem::take(&mut literal)));
            }
            chars.next(); // '('
            let name: String = chars.by_ref().take_while(|&ch| ch != ')').collect();
            parts.push(ExprValue::Variable(name));
        } else {
            literal.push(c);
        }
    }

    if !literal.is_empty() {
        parts.push(ExprValue::Literal(literal));
    }

    parts
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Chumsky parser
// ═══════════════════════════════════════════════════════════════════════════════

fn condition_parser<'a>() -> impl Parser<'a, &'a str, Expression, extra::Err<Simple<'a, char>>> {
    recursive(|expr| {
        let quoted = just('\'')
            .ignore_then(none_of('\'').repeated().to_slice())
            .then_ignore(just('\''))
            .map(parse_string_parts);

        let cmp_op = just("==")
            .to(CompareOp::Equal)
            .or(just("!=").to(CompareOp::NotEqual));

        let comparison = quoted
            .padded()
            .then(cmp_op.padded())
            .then(quoted.padded())
            .map(|((lhs, op), rhs)| Expression::Compare { lhs, op, rhs });

        let word = any()
            .filter(|c: &char| c.is_ascii_alphabetic())
            .repeated()
            .at_least(1)
            .to_slice();

        let exists = word
            .filter(|s: &&str| s.eq_ignore_ascii_case("exists"))
            .ignore_then(just('(').padded())
            .ignore_then(quoted)
            .then_ignore(just(')').padded())
            .map(Expression::Exists);

        let group = expr.delimited_by(just('(').padded(), just(')').padded());

        let atom = choice((comparison, exists, group)).padded();

        let and_kw = word
            .filter(|s: &&str| s.eq_ignore_ascii_case("and"))
            .padded();
        let and_expr = atom.clone().foldl(
            and_kw.ignore_then(atom).repeated(),
            |lhs, rhs| Expression::And(Box::new(lhs), Box::new(rhs)),
        );

        let or_kw = word
            .filter(|s: &&str| s.eq_ignore_ascii_case("or"))
            .padded();
        and_expr.clone().foldl(
            or_kw.ignore_then(and_expr).repeated(),
            |lhs, rhs| Expression::Or(Box::new(lhs), Box::new(rhs)),
        )
    })
}

/// Parse a `Condition` attribute into an [`Expression`].
pub fn parse_condition(input: &str) -> Result<Expression> {
    condition_parser()
        .parse(input)
        .into_result()
        .map_err(|errs| {
            let messages: Vec<String> = errs.iter().map(|e| format!("{e}")).collect();
            ProjectError::MalformedCondition {
                condition: input.to_string(),
                reason: messages.join("; "),
            }
        })
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Configuration keys
// ═══════════════════════════════════════════════════════════════════════════════

/// Extract `"Debug|x64"` from `'$(Configuration)|$(Platform)'=='Debug|x64'`.
pub fn configuration_key(condition: &str) -> Result<String> {
    let malformed = |reason: &str| ProjectError::MalformedCondition {
        condition: condition.to_string(),
        reason: reason.to_string(),
    };

    let Expression::Compare { lhs, op, rhs } = parse_condition(condition)? else {
        return Err(malformed("expected a single configuration comparison"));
    };

    let expected_lhs = [
        ExprValue::Variable("Configuration".into()),
        ExprValue::Literal("|".into()),
        ExprValue::Variable("Platform".into()),
    ];
    if lhs != expected_lhs {
        return Err(malformed("left side must be '$(Configuration)|$(Platform)'"));
    }
    if op != CompareOp::Equal {
        return Err(malformed("operator must be '=='"));
    }

    let mut key = String::new();
    for part in &rhs {
        match part {
            ExprValue::Literal(s) => key.push_str(s),
            ExprValue::Variable(name) => {
                return Err(malformed(&format!("unexpected $({name}) in configuration key")));
            }
        }
    }
    if key.is_empty() {
        return Err(malformed("empty configuration key"));
    }

    Ok(key)
}

/// Inverse of [`configuration_key`].
pub fn format_condition(key: &str) -> String {
    format!("'$(Configuration)|$(Platform)'=='{key}'")
}

/// Split `"Debug|x64"` into `("Debug", "x64")`.
pub fn split_configuration_key(key: &str) -> Result<(&str, &str)> {
    match key.split_once('|') {
        Some((name, platform)) if !name.is_empty() && !platform.is_empty() && !platform.contains('|') => {
            Ok((name, platform))
        }
        _ => Err(ProjectError::MalformedConfigurationKey(key.to_string())),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    // ── String-part splitting ────────────────────────────────────────────

    #[test]
    fn string_parts_mixed() {
        assert_eq!(
            parse_string_parts("$(Configuration)|$(Platform)"),
            vec![
                ExprValue::Variable("Configuration".into()),
                ExprValue::Literal("|".into()),
                ExprValue::Variable("Platform".into()),
            ]
        );
    }

    #[test]
    fn string_parts_empty() {
        assert_eq!(parse_string_parts(""), Vec::<ExprValue>::new());
    }

    // ── Condition parsing ────────────────────────────────────────────────

    #[test]
    fn parse_configuration_condition() {
        let expr = parse_condition("'$(Configuration)|$(Platform)'=='Debug|Win32'").unwrap();
        assert_eq!(
            expr,
            Expression::Compare {
                lhs: vec![
                    ExprValue::Variable("Configuration".into()),
                    ExprValue::Literal("|".into()),
                    ExprValue::Variable("Platform".into()),
                ],
                op: CompareOp::Equal,
                rhs: vec![ExprValue::Literal("Debug|Win32".into())],
            }
        );
    }

    #[test]
    fn parse_import_exists_condition() {
        let expr = parse_condition(
            "exists('$(UserRootDir)\\Microsoft.Cpp.$(Platform).user.props')",
        )
        .unwrap();
        assert!(matches!(expr, Expression::Exists(_)));
    }

    #[test]
    fn parse_compound() {
        let input = "('$(Platform)'=='Win32' and '$(Base)'=='true') or '$(Base_Win32)'!=''";
        match parse_condition(input).unwrap() {
            Expression::Or(lhs, _) => assert!(matches!(lhs.as_ref(), Expression::And(_, _))),
            other => panic!("expected Or(And(..), ..), got {other:?}"),
        }
    }

    #[test]
    fn parse_garbage_fails() {
        let err = parse_condition("Configuration == Debug").unwrap_err();
        assert!(matches!(err, ProjectError::MalformedCondition { .. }));
    }

    // ── Configuration keys ───────────────────────────────────────────────

    #[test]
    fn key_from_condition() {
        assert_eq!(
            configuration_key("'$(Configuration)|$(Platform)'=='Release|x64'").unwrap(),
            "Release|x64"
        );
    }

    #[test]
    fn key_tolerates_padding() {
        assert_eq!(
            configuration_key(" '$(Configuration)|$(Platform)' == 'Debug|ARM64' ").unwrap(),
            "Debug|ARM64"
        );
    }

    #[test]
    fn key_rejects_other_shapes() {
        for cond in [
            "'$(Configuration)'=='Debug'",
            "'$(Configuration)|$(Platform)'!='Debug|Win32'",
            "'$(Configuration)|$(Platform)'==''",
            "'$(Configuration)|$(Platform)'=='$(Foo)'",
            "'$(Configuration)|$(Platform)'=='Debug|Win32' and '$(X)'==''",
            "exists('foo')",
        ] {
            let err = configuration_key(cond).unwrap_err();
            assert!(
                matches!(err, ProjectError::MalformedCondition { .. }),
                "{cond} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn format_is_inverse_of_extract() {
        let cond = format_condition("Debug|x64");
        assert_eq!(cond, "'$(Configuration)|$(Platform)'=='Debug|x64'");
        assert_eq!(configuration_key(&cond).unwrap(), "Debug|x64");
    }

    #[test]
    fn split_keys() {
        assert_eq!(split_configuration_key("Debug|Win32").unwrap(), ("Debug", "Win32"));
        assert!(split_configuration_key("Debug").is_err());
        assert!(split_configuration_key("|x64").is_err());
        assert!(split_configuration_key("a|b|c").is_err());
    }
}
