use serde::{Deserialize, Serialize};

/// Column as reported by the source catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Declared type name, possibly empty
    pub source_type: String,
    /// Whether column allows NULL values
    pub nullable: bool,
    /// Default literal exactly as stored in the catalog
    pub default_value: Option<String>,
    /// 1-based position inside the primary key, if part of it
    pub primary_key_position: Option<u32>,
    /// Whether the column aliases the engine-generated row id
    pub rowid_alias: bool,
}

/// Table as reported by the source catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name
    pub name: String,
    /// Columns in declaration order
    pub columns: Vec<ColumnDescriptor>,
    /// Whether the table was declared WITHOUT ROWID
    pub without_rowid: bool,
}

/// View with its stored definition text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDescriptor {
    pub name: String,
    pub definition: Option<String>,
}

/// Index with its stored definition text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub definition: Option<String>,
}

/// PostgreSQL types the translator can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostgreSQLType {
    /// Integer (32-bit)
    Integer,
    /// Unlimited text
    Text,
    /// Numeric with precision and scale
    Numeric(u32, u32),
    /// Binary data
    Bytea,
    /// Small integer, used for boolean affinity
    SmallInt,
    /// Auto-incrementing integer
    Serial,
}

/// Kind of DDL object being emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    Table,
    View,
    Index,
}

/// A single emitted DDL statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdlStatement {
    pub kind: StatementKind,
    /// Name of the object the statement creates
    pub name: String,
    /// Statement text, terminated with `;`
    pub sql: String,
}

/// An object left out of the output and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedObject {
    pub kind: StatementKind,
    pub name: String,
    pub reason: String,
}

impl ColumnDescriptor {
    /// Create a nullable column with no default, outside the primary key
    pub fn new(name: impl Into<String>, source_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_type: source_type.into(),
            nullable: true,
            default_value: None,
            primary_key_position: None,
            rowid_alias: false,
        }
    }

    /// Set the column as not nullable
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Set the default literal for the column
    pub fn with_default(mut self, literal: impl Into<String>) -> Self {
        self.default_value = Some(literal.into());
        self
    }

    /// Mark the column as part of the primary key at the given position
    pub fn primary_key(mut self, position: u32) -> Self {
        self.primary_key_position = Some(position);
        self
    }

    /// Mark the column as the row id alias
    pub fn rowid_alias(mut self) -> Self {
        self.rowid_alias = true;
        self
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key_position.is_some()
    }
}

impl TableDescriptor {
    /// Create a new table descriptor
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            without_rowid: false,
        }
    }

    /// Add a column to the table
    pub fn add_column(&mut self, column: ColumnDescriptor) {
        self.columns.push(column);
    }

    /// Builder form of `add_column`
    pub fn with_column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }
}

impl PostgreSQLType {
    /// Convert to SQL type string
    pub fn to_sql(&self) -> String {
        match self {
            PostgreSQLType::Integer => "INTEGER".to_string(),
            PostgreSQLType::Text => "TEXT".to_string(),
            PostgreSQLType::Numeric(precision, scale) => {
                format!("NUMERIC({},{})", precision, scale)
            }
            PostgreSQLType::Bytea => "BYTEA".to_string(),
            PostgreSQLType::SmallInt => "SMALLINT".to_string(),
            PostgreSQLType::Serial => "SERIAL".to_string(),
        }
    }
}

impl StatementKind {
    /// Label used in per-object comment headers
    pub fn label(&self) -> &'static str {
        match self {
            StatementKind::Table => "Table",
            StatementKind::View => "View",
            StatementKind::Index => "Index",
        }
    }

    /// Label used in section headers
    pub fn section(&self) -> &'static str {
        match self {
            StatementKind::Table => "Tables",
            StatementKind::View => "Views",
            StatementKind::Index => "Indexes",
        }
    }
}
