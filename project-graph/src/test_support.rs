//! Canned language service and symbol builders for unit tests.

use crate::{
    errors::{GraphError, Result},
    lsp::{HoverInfo, LanguageService, Location, ServiceFuture},
    model::{
        kind::SymbolKind,
        span::{Position, Range},
        symbol::{RawSymbol, Symbol},
    },
};
use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

#[derive(Default)]
pub struct CannedService {
    pub symbols: HashMap<String, Vec<RawSymbol>>,
    pub hovers: HashMap<(String, u32), String>,
    pub references: HashMap<(String, u32), Vec<Location>>,
    pub failing_hover: bool,
    pub hover_calls: AtomicUsize,
    pub reference_calls: AtomicUsize,
}

impl CannedService {
    /// Hover text for any position on `line` of `file_id`.
    pub fn with_hover(mut self, file_id: &str, line: u32, text: &str) -> Self {
        self.hovers.insert((file_id.to_string(), line), text.to_string());
        self
    }

    /// References for any position on `line` of `file_id`.
    pub fn with_references(mut self, file_id: &str, line: u32, refs: Vec<Location>) -> Self {
        self.references.insert((file_id.to_string(), line), refs);
        self
    }

    pub fn hover_count(&self) -> usize {
        self.hover_calls.load(Ordering::SeqCst)
    }
}

impl LanguageService for CannedService {
    fn lookup_symbols<'a>(&'a self, file_id: &'a str) -> ServiceFuture<'a, Vec<RawSymbol>> {
        let out = self.symbols.get(file_id).cloned().unwrap_or_default();
        Box::pin(async move { Ok(out) })
    }

    fn hover<'a>(&'a self, file_id: &'a str, pos: Position) -> ServiceFuture<'a, Option<HoverInfo>> {
        self.hover_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing_hover;
        let out = self
            .hovers
            .get(&(file_id.to_string(), pos.line))
            .map(|c| HoverInfo { contents: c.clone() });
        Box::pin(async move {
            if failing {
                return Err(GraphError::Service("hover timed out".into()));
            }
            Ok(out)
        })
    }

    fn references<'a>(&'a self, file_id: &'a str, pos: Position) -> ServiceFuture<'a, Vec<Location>> {
        self.reference_calls.fetch_add(1, Ordering::SeqCst);
        let out = self
            .references
            .get(&(file_id.to_string(), pos.line))
            .cloned()
            .unwrap_or_default();
        Box::pin(async move { Ok(out) })
    }
}

pub fn lines(start: u32, end: u32) -> Range {
    Range::new(Position::new(start, 0), Position::new(end, 80))
}

/// Symbol spanning lines `[start, end]`, selection on `start`.
pub fn sym(name: &str, kind: SymbolKind, file_id: &str, start: u32, end: u32) -> Symbol {
    let mut s = Symbol::new(name, kind, file_id);
    s.range = Some(lines(start, end));
    s.selection_range = Some(Range::new(Position::new(start, 2), Position::new(start, 3)));
    s
}

pub fn with_detail(mut s: Symbol, detail: &str) -> Symbol {
    s.detail = detail.to_string();
    s
}

pub fn with_children(mut s: Symbol, children: Vec<Symbol>) -> Symbol {
    s.children = children;
    s
}

pub fn location(file_id: &str, line: u32) -> Location {
    Location {
        file_id: file_id.to_string(),
        range: Range::new(Position::new(line, 4), Position::new(line, 8)),
    }
}
