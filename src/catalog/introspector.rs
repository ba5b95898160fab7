use crate::error::LitepgResult;
use crate::types::{IndexDescriptor, TableDescriptor, ViewDescriptor};

/// Read-only access to the metadata of a source catalog.
///
/// Every listing is returned in enumeration order, which the emitter keeps.
#[allow(async_fn_in_trait)]
pub trait SchemaIntrospector {
    /// User table names, internal tables excluded
    async fn table_names(&mut self) -> LitepgResult<Vec<String>>;

    /// Columns and flags of one table
    async fn describe_table(&mut self, name: &str) -> LitepgResult<TableDescriptor>;

    /// User views with their stored definition text
    async fn views(&mut self) -> LitepgResult<Vec<ViewDescriptor>>;

    /// User indexes with their stored definition text, automatic indexes excluded
    async fn indexes(&mut self) -> LitepgResult<Vec<IndexDescriptor>>;

    /// Release the underlying connection
    async fn close(self) -> LitepgResult<()>
    where
        Self: Sized;
}
