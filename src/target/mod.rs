// PostgreSQL target: executes translated DDL
pub mod applier;

pub use applier::{ApplyReport, PostgresApplier};
