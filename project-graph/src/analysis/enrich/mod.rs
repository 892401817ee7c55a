//! Symbol enrichment: a chain of strategies over a mutable [`Symbol`].
//!
//! Order per symbol:
//! - basic info (origin, access, class relations)
//! - detail parsing
//! - hover query, for whatever detail parsing left missing
//! - regex scan of the lines above the declaration
//!
//! Every strategy checks whether what it provides is still missing, so the
//! chain can be reordered or trimmed without strategies stepping on each other.

pub mod basic;
pub mod detail;
pub mod hover;
pub mod params;
pub mod processor;
pub mod source_regex;

use crate::{analysis::context::AnalysisContext, model::{kind::SymbolKind, symbol::Symbol}};

pub use processor::SymbolProcessor;

/// Read-only inputs shared by every strategy for one symbol.
#[derive(Clone, Copy)]
pub struct EnrichEnv<'a> {
    pub ctx: &'a AnalysisContext,
    /// Text of the file declaring the symbol (may be empty).
    pub text: &'a str,
    /// Nearest enclosing class, if any.
    pub container: Option<&'a str>,
}

/// Synchronous enrichment strategy.
pub trait SymbolEnricher: Send + Sync {
    /// Strategy name for logs.
    fn name(&self) -> &'static str;

    /// Whether the symbol still misses something this strategy can supply.
    fn applies(&self, sym: &Symbol, env: &EnrichEnv<'_>) -> bool;

    fn enrich(&self, sym: &mut Symbol, env: &EnrichEnv<'_>);
}

/// Type information the hover and regex fallbacks try to fill in.
pub fn needs_type_info(sym: &Symbol) -> bool {
    match sym.kind {
        SymbolKind::Field | SymbolKind::Property => sym.resolved_type.is_none(),
        SymbolKind::Method | SymbolKind::Function => sym.return_type.is_none(),
        SymbolKind::Constructor => sym.parameters.as_ref().is_none_or(|p| p.is_empty()),
        _ => false,
    }
}
