// Source catalog introspection
pub mod introspector;
pub mod sqlite;

pub use introspector::SchemaIntrospector;
pub use sqlite::SqliteIntrospector;
