pub mod context;
pub mod enrich;
pub mod relations;
pub mod this_field;
pub mod transform;
pub mod types;

pub use context::AnalysisContext;
pub use enrich::SymbolProcessor;
pub use this_field::resolve_this_fields;
pub use transform::transform_raw_symbols;
