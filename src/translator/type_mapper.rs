use crate::types::PostgreSQLType;

/// Precision and scale given to every floating-point affinity
pub const DEFAULT_NUMERIC_PRECISION: u32 = 10;
pub const DEFAULT_NUMERIC_SCALE: u32 = 2;

/// One keyword rule: any keyword found in the upper-cased type name selects the target
#[derive(Debug, Clone, Copy)]
pub struct TypeRule {
    pub keywords: &'static [&'static str],
    pub target: PostgreSQLType,
}

/// Evaluated top to bottom, first match wins
pub const TYPE_RULES: &[TypeRule] = &[
    TypeRule {
        keywords: &["INT"],
        target: PostgreSQLType::Integer,
    },
    TypeRule {
        keywords: &["CHAR", "TEXT", "CLOB"],
        target: PostgreSQLType::Text,
    },
    TypeRule {
        keywords: &["REAL", "FLOA", "DOUB"],
        target: PostgreSQLType::Numeric(DEFAULT_NUMERIC_PRECISION, DEFAULT_NUMERIC_SCALE),
    },
    TypeRule {
        keywords: &["BLOB"],
        target: PostgreSQLType::Bytea,
    },
    TypeRule {
        keywords: &["BOOL"],
        target: PostgreSQLType::SmallInt,
    },
];

/// Type used when no rule matches, including the empty type name
pub const FALLBACK_TYPE: PostgreSQLType = PostgreSQLType::Text;

/// Map a declared SQLite type name to a PostgreSQL type. Total: never fails.
pub fn map_source_type(source_type: &str) -> PostgreSQLType {
    let upper = source_type.to_ascii_uppercase();

    TYPE_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| upper.contains(keyword)))
        .map(|rule| rule.target)
        .unwrap_or(FALLBACK_TYPE)
}
