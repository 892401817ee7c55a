//! [`LanguageService`] backed by a live `dart language-server`.
//!
//! The stdio client is blocking, so every call takes the process lock inside
//! `spawn_blocking`. Concurrent callers are serialized on that lock.

use crate::{
    client::LspProcess,
    errors::{LspError, Result},
    parse,
};
use project_graph::{
    lsp::{HoverInfo, LanguageService, Location, ServiceFuture},
    model::{span::Position, symbol::RawSymbol},
};
use serde_json::{Value, json};
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::info;

pub struct DartLanguageService {
    process: Arc<Mutex<LspProcess>>,
}

/// `dart` from `override_path`, else from `PATH`.
pub fn locate_dart(override_path: Option<&Path>) -> Result<PathBuf> {
    match override_path {
        Some(p) if p.is_file() => Ok(p.to_path_buf()),
        Some(p) => Err(LspError::Spawn(format!("{} is not a file", p.display()))),
        None => which::which("dart").map_err(|e| LspError::Spawn(format!("dart not found on PATH: {e}"))),
    }
}

impl DartLanguageService {
    pub fn start(root: &Path, dart: Option<&Path>) -> Result<Self> {
        let dart = locate_dart(dart)?;
        info!(dart = %dart.display(), "Starting Dart language server");
        let process = LspProcess::start(&dart, root)?;
        Ok(Self {
            process: Arc::new(Mutex::new(process)),
        })
    }

    /// Open `file_id` if needed, then run one request on the blocking pool.
    async fn call<T, F>(&self, file_id: &str, method: &'static str, params: Value, decode: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Value) -> T + Send + 'static,
    {
        let process = Arc::clone(&self.process);
        let uri = file_id.to_string();
        tokio::task::spawn_blocking(move || {
            let mut lsp = process.lock().map_err(|_| LspError::Poisoned)?;
            lsp.ensure_open(&uri)?;
            lsp.request(method, params).map(decode)
        })
        .await
        .map_err(|e| LspError::Join(e.to_string()))?
    }
}

fn text_position(file_id: &str, pos: Position) -> Value {
    json!({
        "textDocument": { "uri": file_id },
        "position": { "line": pos.line, "character": pos.character }
    })
}

impl LanguageService for DartLanguageService {
    fn lookup_symbols<'a>(&'a self, file_id: &'a str) -> ServiceFuture<'a, Vec<RawSymbol>> {
        Box::pin(async move {
            let params = json!({ "textDocument": { "uri": file_id } });
            Ok(self
                .call(file_id, "textDocument/documentSymbol", params, parse::document_symbols)
                .await?)
        })
    }

    fn hover<'a>(&'a self, file_id: &'a str, pos: Position) -> ServiceFuture<'a, Option<HoverInfo>> {
        Box::pin(async move {
            Ok(self
                .call(file_id, "textDocument/hover", text_position(file_id, pos), parse::hover)
                .await?)
        })
    }

    fn references<'a>(&'a self, file_id: &'a str, pos: Position) -> ServiceFuture<'a, Vec<Location>> {
        Box::pin(async move {
            let mut params = text_position(file_id, pos);
            params["context"] = json!({ "includeDeclaration": false });
            Ok(self
                .call(file_id, "textDocument/references", params, parse::locations)
                .await?)
        })
    }
}
