use crate::config::IdentityDetection;
use crate::error::{LitepgError, LitepgResult};
use crate::translator::default_rules::render_default;
use crate::translator::object_rewriter::{translate_index_definition, translate_view_definition};
use crate::translator::type_mapper::map_source_type;
use crate::types::{
    ColumnDescriptor, DdlStatement, IndexDescriptor, PostgreSQLType, StatementKind, TableDescriptor,
    ViewDescriptor,
};

/// Builds PostgreSQL DDL from source catalog descriptors
#[derive(Debug, Clone)]
pub struct DdlEmitter {
    identity: IdentityDetection,
}

impl DdlEmitter {
    /// Create an emitter that detects auto-increment keys from catalog metadata
    pub fn new() -> Self {
        Self {
            identity: IdentityDetection::RowidAlias,
        }
    }

    pub fn with_identity(identity: IdentityDetection) -> Self {
        Self { identity }
    }

    /// Whether the column becomes `SERIAL PRIMARY KEY`
    pub fn is_identity_column(&self, column: &ColumnDescriptor) -> bool {
        if !column.is_primary_key() {
            return false;
        }
        match &self.identity {
            IdentityDetection::RowidAlias => column.rowid_alias,
            IdentityDetection::ColumnName(name) => column.name.eq_ignore_ascii_case(name),
        }
    }

    /// Generate CREATE TABLE statement for a table descriptor
    pub fn emit_table(&self, table: &TableDescriptor) -> LitepgResult<DdlStatement> {
        if table.name.trim().is_empty() {
            return Err(LitepgError::emission("table", "table has an empty name"));
        }
        if table.columns.is_empty() {
            return Err(LitepgError::emission(
                format!("table {}", table.name),
                "table has no columns",
            ));
        }

        let mut definitions: Vec<String> = table
            .columns
            .iter()
            .map(|column| format!("    {}", self.column_definition(column)))
            .collect();

        let has_identity = table.columns.iter().any(|c| self.is_identity_column(c));
        let mut key_columns: Vec<&ColumnDescriptor> = table
            .columns
            .iter()
            .filter(|c| c.is_primary_key() && !self.is_identity_column(c))
            .collect();
        key_columns.sort_by_key(|c| c.primary_key_position);

        // a lone natural key still needs its clause; next to SERIAL it would be a second key
        if key_columns.len() >= 2 || (key_columns.len() == 1 && !has_identity) {
            let names: Vec<String> = key_columns.iter().map(|c| escape_identifier(&c.name)).collect();
            definitions.push(format!("    PRIMARY KEY ({})", names.join(", ")));
        }

        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
            escape_identifier(&table.name),
            definitions.join(",\n")
        );

        Ok(DdlStatement {
            kind: StatementKind::Table,
            name: table.name.clone(),
            sql,
        })
    }

    /// Column clause without leading indentation
    pub fn column_definition(&self, column: &ColumnDescriptor) -> String {
        let name = escape_identifier(&column.name);

        if self.is_identity_column(column) {
            return format!("{} {} PRIMARY KEY", name, PostgreSQLType::Serial.to_sql());
        }

        let mut definition = format!("{} {}", name, map_source_type(&column.source_type).to_sql());

        if !column.nullable {
            definition.push_str(" NOT NULL");
        }

        if let Some(literal) = &column.default_value {
            definition.push(' ');
            definition.push_str(&render_default(literal));
        }

        definition
    }

    /// Translate a view, `None` when it has no stored definition
    pub fn emit_view(&self, view: &ViewDescriptor) -> Option<DdlStatement> {
        translate_view_definition(view.definition.as_deref()).map(|sql| DdlStatement {
            kind: StatementKind::View,
            name: view.name.clone(),
            sql,
        })
    }

    /// Translate an index, `None` when it has no stored definition
    pub fn emit_index(&self, index: &IndexDescriptor) -> Option<DdlStatement> {
        translate_index_definition(index.definition.as_deref()).map(|sql| DdlStatement {
            kind: StatementKind::Index,
            name: index.name.clone(),
            sql,
        })
    }
}

impl Default for DdlEmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// PostgreSQL keywords that cannot be used as bare column or table names
const RESERVED_KEYWORDS: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric",
    "authorization", "binary", "both", "case", "cast", "check", "collate", "collation",
    "column", "concurrently", "constraint", "create", "cross", "current_catalog",
    "current_date", "current_role", "current_schema", "current_time", "current_timestamp",
    "current_user", "default", "deferrable", "desc", "distinct", "do", "else", "end",
    "except", "false", "fetch", "for", "foreign", "freeze", "from", "full", "grant",
    "group", "having", "ilike", "in", "initially", "inner", "intersect", "into", "is",
    "isnull", "join", "lateral", "leading", "left", "like", "limit", "localtime",
    "localtimestamp", "natural", "not", "notnull", "null", "offset", "on", "only", "or",
    "order", "outer", "overlaps", "placing", "primary", "references", "returning", "right",
    "select", "session_user", "similar", "some", "symmetric", "system_user", "table",
    "tablesample", "then", "to", "trailing", "true", "union", "unique", "user", "using",
    "variadic", "verbose", "when", "where", "window", "with",
];

/// Escape SQL identifier (table name, column name, etc.)
pub fn escape_identifier(identifier: &str) -> String {
    if is_plain_identifier(identifier) {
        identifier.to_string()
    } else {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }
}

/// Bare names are folded to lower case by PostgreSQL, so anything with upper
/// case letters is quoted to keep its spelling.
fn is_plain_identifier(identifier: &str) -> bool {
    let mut chars = identifier.chars();
    let starts_well = matches!(chars.next(), Some(c) if c == '_' || c.is_lowercase());

    starts_well
        && chars.all(|c| c == '_' || c.is_ascii_digit() || c.is_lowercase())
        && !RESERVED_KEYWORDS.contains(&identifier.to_ascii_lowercase().as_str())
}
