//! Capability interface to the external language service.
//!
//! The pipeline only ever needs three questions answered: the symbol forest
//! of a file, hover text at a position, and references to a position. All
//! three are asynchronous and best-effort; callers log and absorb errors.

use crate::{
    errors::Result,
    model::{span::Position, span::Range, symbol::RawSymbol},
};
use serde::{Deserialize, Serialize};
use std::{future::Future, pin::Pin};

pub mod snapshot;

pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// A reference site reported by the language service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub file_id: String,
    pub range: Range,
}

/// Hover payload, flattened to plain text (markdown blocks joined by `\n`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HoverInfo {
    pub contents: String,
}

/// Symbol/hover/reference provider.
///
/// Implement this trait to plug in a real language server, a recorded
/// snapshot, or a canned test double.
pub trait LanguageService: Send + Sync {
    /// Symbol forest of `file_id`.
    fn lookup_symbols<'a>(&'a self, file_id: &'a str) -> ServiceFuture<'a, Vec<RawSymbol>>;

    /// Hover info at `pos`; `None` when the server has nothing to say.
    fn hover<'a>(&'a self, file_id: &'a str, pos: Position) -> ServiceFuture<'a, Option<HoverInfo>>;

    /// All references to the symbol at `pos`.
    fn references<'a>(&'a self, file_id: &'a str, pos: Position)
    -> ServiceFuture<'a, Vec<Location>>;
}
