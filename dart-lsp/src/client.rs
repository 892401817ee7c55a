//! Blocking JSON-RPC stdio client for `dart language-server`.
//!
//! - Frames are `Content-Length` delimited, as on any LSP transport
//! - Requests block until the response with the matching `id` arrives
//! - Server-to-client requests get an empty reply so the server never stalls
//! - Notifications (diagnostics, progress) are logged and dropped

use crate::errors::{LspError, Result};
use serde::Deserialize;
use serde_json::{Value, json};
use std::{
    collections::HashSet,
    fs,
    io::{Read, Write},
    path::Path,
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
    time::{Duration, Instant},
};
use tracing::{debug, info, trace, warn};
use url::Url;

const MAX_HEADER_BYTES: usize = 8192;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RpcMessage {
    /// Server-to-client request; must be listed before `Response`.
    Request {
        id: Value,
        method: String,
        #[serde(default)]
        params: Value,
    },
    Response {
        id: Value,
        #[serde(default)]
        result: Option<Value>,
        #[serde(default)]
        error: Option<Value>,
    },
    Notification {
        method: String,
        #[serde(default)]
        params: Value,
    },
}

/// Write one framed message.
pub fn write_frame<W: Write>(out: &mut W, msg: &Value) -> Result<()> {
    let body = serde_json::to_vec(msg)?;
    write!(out, "Content-Length: {}\r\n\r\n", body.len())?;
    out.write_all(&body)?;
    out.flush()?;
    Ok(())
}

/// Read one framed message body. Blocks until the frame is complete.
pub fn read_frame<R: Read>(input: &mut R) -> Result<Vec<u8>> {
    let mut header = Vec::<u8>::new();
    let mut b = [0u8; 1];
    while !header.ends_with(b"\r\n\r\n") {
        input.read_exact(&mut b)?;
        header.push(b[0]);
        if header.len() > MAX_HEADER_BYTES {
            return Err(LspError::Protocol("header too large"));
        }
    }

    let header = String::from_utf8(header)?;
    let content_len = header
        .split("\r\n")
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .filter(|len| *len > 0)
        .ok_or(LspError::Protocol("missing content length"))?;

    let mut body = vec![0u8; content_len];
    input.read_exact(&mut body)?;
    Ok(body)
}

pub struct LspProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
    next_id: u64,
    opened: HashSet<String>,
}

impl LspProcess {
    /// Spawn `<dart> language-server` and run the initialize handshake for `root`.
    pub fn start(dart: &Path, root: &Path) -> Result<Self> {
        let mut child = Command::new(dart)
            .arg("language-server")
            .arg("--client-id=archgraph")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| LspError::Spawn(format!("{}: {e}", dart.display())))?;

        let stdin = child.stdin.take().ok_or(LspError::Protocol("no stdin"))?;
        let stdout = child.stdout.take().ok_or(LspError::Protocol("no stdout"))?;
        let mut process = Self {
            child,
            stdin,
            stdout,
            next_id: 1,
            opened: HashSet::new(),
        };
        process.initialize(root)?;
        Ok(process)
    }

    fn initialize(&mut self, root: &Path) -> Result<()> {
        let root_uri = Url::from_directory_path(root)
            .map_err(|_| LspError::Protocol("project root is not absolute"))?;
        self.request(
            "initialize",
            json!({
                "processId": std::process::id(),
                "rootUri": root_uri.as_str(),
                "capabilities": {
                    "textDocument": {
                        "documentSymbol": { "hierarchicalDocumentSymbolSupport": true },
                        "hover": { "contentFormat": ["markdown", "plaintext"] }
                    }
                },
                "initializationOptions": { "onlyAnalyzeProjectsWithOpenFiles": false }
            }),
        )?;
        self.notify("initialized", json!({}))?;
        info!(root = %root.display(), "Dart language server initialized");
        Ok(())
    }

    fn next_id(&mut self) -> Value {
        let id = self.next_id;
        self.next_id += 1;
        Value::from(id)
    }

    fn send(&mut self, msg: &Value) -> Result<()> {
        trace!(msg = %msg, "LSP →");
        write_frame(&mut self.stdin, msg)
    }

    fn recv(&mut self) -> Result<RpcMessage> {
        let body = read_frame(&mut self.stdout)?;
        trace!(msg = %String::from_utf8_lossy(&body), "LSP ←");
        Ok(serde_json::from_slice(&body)?)
    }

    pub fn notify(&mut self, method: &str, params: Value) -> Result<()> {
        self.send(&json!({ "jsonrpc": "2.0", "method": method, "params": params }))
    }

    /// Send a request and block until its response. `Null` results come back
    /// as `Value::Null`.
    pub fn request(&mut self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id();
        self.send(&json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }))?;
        loop {
            match self.recv()? {
                RpcMessage::Response { id: rid, result, error } if rid == id => {
                    if let Some(err) = error {
                        let message = err
                            .get("message")
                            .and_then(Value::as_str)
                            .unwrap_or("unknown error")
                            .to_string();
                        return Err(LspError::Server {
                            method: method.to_string(),
                            message,
                        });
                    }
                    return Ok(result.unwrap_or(Value::Null));
                }
                RpcMessage::Response { id: rid, .. } => debug!(id = %rid, "Stale response dropped"),
                RpcMessage::Request { id: rid, method: m, params } => self.reply_to_server(rid, &m, &params)?,
                RpcMessage::Notification { method: m, .. } => trace!(method = %m, "Notification"),
            }
        }
    }

    /// `workspace/configuration` wants one entry per item; everything else
    /// accepts `null`.
    fn reply_to_server(&mut self, id: Value, method: &str, params: &Value) -> Result<()> {
        debug!(%method, "Server request");
        let result = match method {
            "workspace/configuration" => {
                let items = params.get("items").and_then(Value::as_array).map_or(0, Vec::len);
                Value::Array(vec![Value::Null; items])
            }
            _ => Value::Null,
        };
        self.send(&json!({ "jsonrpc": "2.0", "id": id, "result": result }))
    }

    /// `didOpen` the document once, reading its text from disk.
    pub fn ensure_open(&mut self, uri: &str) -> Result<()> {
        if self.opened.contains(uri) {
            return Ok(());
        }
        let path = Url::parse(uri)
            .ok()
            .and_then(|u| u.to_file_path().ok())
            .ok_or(LspError::Protocol("document uri is not a file path"))?;
        let text = fs::read_to_string(&path)?;
        self.notify(
            "textDocument/didOpen",
            json!({
                "textDocument": { "uri": uri, "languageId": "dart", "version": 1, "text": text }
            }),
        )?;
        self.opened.insert(uri.to_string());
        Ok(())
    }

    /// Best-effort graceful shutdown.
    pub fn shutdown(&mut self) -> Result<()> {
        let id = self.next_id();
        self.send(&json!({ "jsonrpc": "2.0", "id": id, "method": "shutdown" }))?;
        let deadline = Instant::now() + Duration::from_millis(400);
        while Instant::now() < deadline {
            match self.recv() {
                Ok(RpcMessage::Response { id: rid, .. }) if rid == id => break,
                Ok(_) => {}
                Err(_) => break,
            }
        }
        self.notify("exit", json!({}))?;
        let _ = self.child.wait();
        Ok(())
    }
}

impl Drop for LspProcess {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(error = %err, "Language server shutdown failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn frames_round_trip_through_a_buffer() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &json!({ "jsonrpc": "2.0", "method": "exit" })).unwrap();
        assert!(buf.starts_with(b"Content-Length: "));

        let body = read_frame(&mut Cursor::new(buf)).unwrap();
        let msg: RpcMessage = serde_json::from_slice(&body).unwrap();
        assert!(matches!(msg, RpcMessage::Notification { method, .. } if method == "exit"));
    }

    #[test]
    fn header_without_length_is_rejected() {
        let raw = b"Content-Type: x\r\n\r\n{}".to_vec();
        assert!(matches!(
            read_frame(&mut Cursor::new(raw)),
            Err(LspError::Protocol("missing content length"))
        ));
    }

    #[test]
    fn server_requests_are_not_mistaken_for_responses() {
        let req: RpcMessage = serde_json::from_value(json!({
            "jsonrpc": "2.0", "id": 3, "method": "workspace/configuration", "params": { "items": [{}] }
        }))
        .unwrap();
        assert!(matches!(req, RpcMessage::Request { .. }));

        let resp: RpcMessage = serde_json::from_value(json!({ "jsonrpc": "2.0", "id": 3, "result": null })).unwrap();
        assert!(matches!(resp, RpcMessage::Response { result: None, .. }));
    }
}
