//! Recursive orchestration of the enrichment chain.
//!
//! Fan-out points:
//! - every file of a run is processed concurrently
//! - siblings are processed concurrently, strictly after their parent
//!
//! Within one symbol the synchronous strategies run before the hover query
//! is planned, so hover is only issued for what detail parsing left missing.

use crate::{
    analysis::{
        context::AnalysisContext,
        enrich::{
            EnrichEnv, SymbolEnricher, basic::BasicInfo, detail::DetailTypes, hover::HoverTypes,
            source_regex::SourceRegex,
        },
    },
    lsp::LanguageService,
    model::{
        kind::SymbolKind,
        symbol::{FileSymbols, Symbol},
    },
};
use futures::future::{BoxFuture, FutureExt, join_all};
use tracing::{debug, info};

pub struct SymbolProcessor<'a> {
    ctx: &'a AnalysisContext,
    service: &'a dyn LanguageService,
    /// Runs before the hover query is planned.
    leading: Vec<Box<dyn SymbolEnricher>>,
    /// Runs after hover results are applied.
    trailing: Vec<Box<dyn SymbolEnricher>>,
    hover: HoverTypes,
}

impl<'a> SymbolProcessor<'a> {
    pub fn new(ctx: &'a AnalysisContext, service: &'a dyn LanguageService) -> Self {
        Self {
            ctx,
            service,
            leading: vec![Box::new(BasicInfo), Box::new(DetailTypes)],
            trailing: vec![Box::new(SourceRegex)],
            hover: HoverTypes,
        }
    }

    #[tracing::instrument(level = "info", skip_all, fields(files = files.len()))]
    pub async fn process_files(&self, files: &mut [FileSymbols]) {
        join_all(files.iter_mut().map(|f| self.process_file(f))).await;
        info!("Enrichment finished");
    }

    pub async fn process_file(&self, file: &mut FileSymbols) {
        let text = file.text.as_str();
        join_all(file.symbols.iter_mut().map(|s| self.process(s, text, None))).await;
        debug!(file = %file.file_id, "File enriched");
    }

    /// Enrich `sym`, then its children. `container` is the nearest enclosing class.
    pub fn process<'s>(
        &'s self,
        sym: &'s mut Symbol,
        text: &'s str,
        container: Option<&'s str>,
    ) -> BoxFuture<'s, ()> {
        async move {
            if sym.selection_range.is_none() {
                debug!(symbol = %sym.name, kind = %sym.kind, "No selection range, left raw");
                return;
            }
            let env = EnrichEnv {
                ctx: self.ctx,
                text,
                container,
            };

            run_stage(&self.leading, sym, &env);

            let request = self.hover.plan(sym, &env);
            if let Some((_, contents)) = self.hover.fetch(self.service, request).await {
                self.hover.apply(&contents, sym, &env);
            }

            run_stage(&self.trailing, sym, &env);

            let next = if sym.kind == SymbolKind::Class {
                Some(sym.name.as_str())
            } else {
                container
            };
            join_all(
                sym.children
                    .iter_mut()
                    .map(|child| self.process(child, text, next)),
            )
            .await;
        }
        .boxed()
    }
}

fn run_stage(stage: &[Box<dyn SymbolEnricher>], sym: &mut Symbol, env: &EnrichEnv<'_>) {
    for strategy in stage {
        if strategy.applies(sym, env) {
            strategy.enrich(sym, env);
            debug!(strategy = strategy.name(), symbol = %sym.name, container = ?env.container, "Applied");
        }
    }
}
