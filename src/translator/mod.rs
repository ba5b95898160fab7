// Schema translator module
pub mod ddl_emitter;
pub mod default_rules;
pub mod object_rewriter;
pub mod pipeline;
pub mod type_mapper;

#[cfg(test)]
mod tests;

pub use ddl_emitter::*;
pub use default_rules::render_default;
pub use pipeline::*;
pub use type_mapper::map_source_type;
