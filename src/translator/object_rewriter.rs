//! Textual translation of stored view and index definitions.
//!
//! Only the leading `CREATE ...` keywords are replaced; the rest of the stored
//! text, including the view query, is emitted as-is. Whether the result runs on
//! PostgreSQL depends entirely on the source text already being compatible with
//! it, which is a known limitation of this approach.

use tracing::debug;

/// Replace a leading keyword sequence with target-dialect keywords
#[derive(Debug, Clone, Copy)]
pub struct KeywordRewrite {
    pub from: &'static [&'static str],
    pub to: &'static str,
}

/// Longest sequences first so `IF NOT EXISTS` is not duplicated
pub const VIEW_REWRITES: &[KeywordRewrite] = &[
    KeywordRewrite {
        from: &["CREATE", "VIEW", "IF", "NOT", "EXISTS"],
        to: "CREATE OR REPLACE VIEW",
    },
    KeywordRewrite {
        from: &["CREATE", "VIEW"],
        to: "CREATE OR REPLACE VIEW",
    },
];

pub const INDEX_REWRITES: &[KeywordRewrite] = &[
    KeywordRewrite {
        from: &["CREATE", "UNIQUE", "INDEX", "IF", "NOT", "EXISTS"],
        to: "CREATE UNIQUE INDEX IF NOT EXISTS",
    },
    KeywordRewrite {
        from: &["CREATE", "INDEX", "IF", "NOT", "EXISTS"],
        to: "CREATE INDEX IF NOT EXISTS",
    },
    KeywordRewrite {
        from: &["CREATE", "UNIQUE", "INDEX"],
        to: "CREATE UNIQUE INDEX IF NOT EXISTS",
    },
    KeywordRewrite {
        from: &["CREATE", "INDEX"],
        to: "CREATE INDEX IF NOT EXISTS",
    },
];

/// Translate a stored view definition. `None` when there is nothing to translate.
pub fn translate_view_definition(definition: Option<&str>) -> Option<String> {
    rewrite_definition(definition, VIEW_REWRITES)
}

/// Translate a stored index definition. `None` when there is nothing to translate.
pub fn translate_index_definition(definition: Option<&str>) -> Option<String> {
    rewrite_definition(definition, INDEX_REWRITES)
}

fn rewrite_definition(definition: Option<&str>, rules: &[KeywordRewrite]) -> Option<String> {
    let text = definition.map(str::trim).filter(|text| !text.is_empty())?;

    let rewritten = rules
        .iter()
        .find_map(|rule| match_keywords(text, rule.from).map(|end| format!("{}{}", rule.to, &text[end..])));

    let sql = match rewritten {
        Some(sql) => sql,
        None => {
            debug!(definition = text, "No keyword rewrite applies, emitting definition unchanged");
            text.to_string()
        }
    };

    Some(terminate(&sql))
}

/// Byte offset just past `keywords` when `text` starts with them (case-insensitive,
/// any whitespace in between), or `None`.
fn match_keywords(text: &str, keywords: &[&str]) -> Option<usize> {
    let mut offset = 0;

    for keyword in keywords {
        let rest = &text[offset..];
        let trimmed = rest.trim_start();
        let word_len = trimmed
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(trimmed.len());

        if word_len == 0 || !trimmed[..word_len].eq_ignore_ascii_case(keyword) {
            return None;
        }
        offset += (rest.len() - trimmed.len()) + word_len;
    }

    Some(offset)
}

/// Make sure the statement ends with exactly one `;`
pub fn terminate(sql: &str) -> String {
    let trimmed = sql.trim_end();
    if trimmed.ends_with(';') {
        trimmed.to_string()
    } else {
        format!("{};", trimmed)
    }
}
