/// A rule for rendering a column default literal into a DEFAULT clause
#[derive(Debug, Clone, Copy)]
pub struct DefaultRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub render: fn(&str) -> String,
}

/// Evaluated top to bottom; the last rule matches everything.
pub const DEFAULT_RULES: &[DefaultRule] = &[
    DefaultRule {
        name: "null-literal",
        matches: is_null_literal,
        render: |_| "NULL".to_string(),
    },
    DefaultRule {
        name: "quoted-literal",
        matches: is_quoted,
        render: str::to_string,
    },
    DefaultRule {
        name: "numeric-or-boolean",
        matches: is_numeric_or_boolean,
        render: str::to_string,
    },
    DefaultRule {
        name: "quote-everything-else",
        matches: |_| true,
        render: quote_literal,
    },
];

/// Render a stored default literal as a complete ` DEFAULT ...` value
pub fn render_default(literal: &str) -> String {
    let rule = matching_rule(literal);
    format!("DEFAULT {}", (rule.render)(literal))
}

/// The first rule that accepts the literal
pub fn matching_rule(literal: &str) -> &'static DefaultRule {
    DEFAULT_RULES
        .iter()
        .find(|rule| (rule.matches)(literal))
        .unwrap_or(&DEFAULT_RULES[DEFAULT_RULES.len() - 1])
}

fn is_null_literal(literal: &str) -> bool {
    literal.eq_ignore_ascii_case("null") || literal.eq_ignore_ascii_case("'null'")
}

fn is_quoted(literal: &str) -> bool {
    literal.len() >= 2 && literal.starts_with('\'') && literal.ends_with('\'')
}

fn is_numeric_or_boolean(literal: &str) -> bool {
    // covers 0 and 1 as well
    let bare_digits = !literal.is_empty() && literal.bytes().all(|b| b.is_ascii_digit());
    bare_digits
        || literal.eq_ignore_ascii_case("true")
        || literal.eq_ignore_ascii_case("false")
}

fn quote_literal(literal: &str) -> String {
    format!("'{}'", literal.replace('\'', "''"))
}
