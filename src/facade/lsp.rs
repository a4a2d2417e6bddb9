//! The LSP-backed `Facade`: spawns a language server as a subprocess and
//! drives it over stdio JSON-RPC, matching responses to requests by id
//! on a background reader thread. Answers declaration and hover
//! requests through the `Facade` trait.

use std::collections::HashSet;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{channel, Receiver};
use std::thread::JoinHandle;

use anyhow::Context;
use jsonrpc_lite::{Id as RpcId, JsonRpc, Params};
use languageserver_types::{
    notification::{DidOpenTextDocument, Initialized, Notification},
    request::{GotoDefinitionResponse, HoverRequest, Request},
    ClientCapabilities, DidOpenTextDocumentParams, Hover, InitializeParams, InitializeResult,
    InitializedParams, Position, TextDocumentIdentifier, TextDocumentItem, TextDocumentPositionParams,
    TraceOption, Url,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::lsp_wire::read_message;
use super::{DeclarationLink, Facade};
use crate::protocol::types::PackageManifest;
use crate::Result;

/// Which extensions/keywords/start command apply to one supported
/// language. Distinct from `PackageManifest`: this is server-launch
/// configuration, not a dependency manifest.
#[derive(Debug, Clone)]
pub struct LanguageServerConfig {
    pub start_command: String,
    pub start_args: Option<String>,
    pub installation_command: Option<String>,
    pub extensions: Vec<String>,
    pub keywords: HashSet<String>,
}

pub struct LspFacade {
    writer: Box<dyn std::io::Write + Send>,
    message_rx: Receiver<String>,
    next_id: u64,
    child: Child,
    _reader_thread: JoinHandle<()>,
}

impl LspFacade {
    pub fn spawn(config: &LanguageServerConfig, root_path: &Path) -> Result<Self> {
        let args = config
            .start_args
            .as_ref()
            .map(|it| it.split(' ').map(str::to_string).collect::<Vec<_>>())
            .unwrap_or_default();

        let mut process = Command::new(&config.start_command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn language server `{}`", config.start_command))?;

        let stdout = process.stdout.take().expect("piped stdout");
        let (message_tx, message_rx) = channel();

        let reader_thread = std::thread::Builder::new()
            .name("lsp-stdout-reader".into())
            .spawn(move || {
                let mut reader = BufReader::new(stdout);
                loop {
                    match read_message(&mut reader) {
                        Ok(message) => {
                            if message_tx.send(message).is_err() {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
            })?;

        let writer = Box::new(BufWriter::new(process.stdin.take().expect("piped stdin")));

        let mut facade = Self {
            writer,
            message_rx,
            next_id: 0,
            child: process,
            _reader_thread: reader_thread,
        };

        let init_params = InitializeParams {
            process_id: Some(u64::from(std::process::id())),
            initialization_options: None,
            capabilities: ClientCapabilities::default(),
            trace: Some(TraceOption::Verbose),
            workspace_folders: None,
            root_uri: Some(Url::from_directory_path(root_path).map_err(|_| {
                crate::error!("project root is not representable as a file:// URI: {}", root_path.display())
            })?),
            root_path: None,
        };

        facade.request::<InitializeResult>("initialize", serde_json::to_value(init_params)?)?;
        facade.notify::<Initialized>(InitializedParams {});

        Ok(facade)
    }

    fn send_rpc(&mut self, value: &Value) -> Result<()> {
        let body = serde_json::to_string(value)?;
        let framed = format!("Content-Length: {}\r\n\r\n{}", body.len(), body);
        self.writer.write_all(framed.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    fn notify<N>(&mut self, params: N::Params)
    where
        N: Notification,
        N::Params: Serialize,
    {
        if let Ok(value) = serde_json::to_value(params) {
            let notification = JsonRpc::notification_with_params(N::METHOD, Params::from(value));
            if let Ok(v) = serde_json::to_value(&notification) {
                let _ = self.send_rpc(&v);
            }
        }
    }

    fn request<T: DeserializeOwned>(&mut self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id;
        self.next_id += 1;

        let request = JsonRpc::request_with_params(RpcId::Num(id as i64), method, Params::from(params));
        self.send_rpc(&serde_json::to_value(&request)?)?;

        loop {
            let message = self.message_rx.recv()?;
            if let Some(result) = self.match_response(id, &message) {
                let value = result.with_context(|| format!("language server rejected `{}`", method))?;
                return Ok(serde_json::from_value(value)?);
            }
        }
    }

    fn match_response(&self, expected_id: u64, message: &str) -> Option<std::result::Result<Value, anyhow::Error>> {
        match JsonRpc::parse(message).ok()? {
            JsonRpc::Success(_) | JsonRpc::Error(_) => {}
            _ => return None,
        }
        let reply = JsonRpc::parse(message).ok()?;
        let id = match reply.get_id()? {
            RpcId::Num(n) => n as u64,
            RpcId::Str(s) => s.parse().ok()?,
            RpcId::None(_) => return None,
        };
        if id != expected_id {
            return None;
        }
        match reply {
            JsonRpc::Success(_) => Some(Ok(reply.get_result()?.clone())),
            JsonRpc::Error(_) => Some(Err(crate::error!("{:?}", reply.get_error()))),
            _ => None,
        }
    }
}

impl Facade for LspFacade {
    fn open_document(&mut self, path: &Path, text: &str) -> Result<()> {
        let uri = Url::from_file_path(path).map_err(|_| crate::error!("not a file path: {}", path.display()))?;
        self.notify::<DidOpenTextDocument>(DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri,
                language_id: String::new(),
                version: 0,
                text: text.to_string(),
            },
        });
        Ok(())
    }

    fn resolve_declaration(&mut self, path: &Path, position: Position) -> Result<Option<DeclarationLink>> {
        let uri = Url::from_file_path(path).map_err(|_| crate::error!("not a file path: {}", path.display()))?;
        let params = TextDocumentPositionParams {
            text_document: TextDocumentIdentifier { uri: uri.clone() },
            position,
        };
        let response: GotoDefinitionResponse =
            self.request("textDocument/definition", serde_json::to_value(params)?)?;

        let location = match response {
            GotoDefinitionResponse::Scalar(loc) => Some(loc),
            GotoDefinitionResponse::Array(mut locs) => {
                if locs.is_empty() {
                    None
                } else {
                    Some(locs.remove(0))
                }
            }
            GotoDefinitionResponse::Link(_) => None,
        };

        Ok(location.map(|loc| {
            if loc.range.start == position && loc.uri == uri {
                DeclarationLink::IsDeclaration
            } else {
                DeclarationLink::RefersTo {
                    file: PathBuf::from(loc.uri.path()),
                    range: loc.range,
                }
            }
        }))
    }

    fn hover(&mut self, path: &Path, position: Position) -> Result<Option<String>> {
        let uri = Url::from_file_path(path).map_err(|_| crate::error!("not a file path: {}", path.display()))?;
        let params = TextDocumentPositionParams {
            text_document: TextDocumentIdentifier { uri },
            position,
        };
        let response: Option<Hover> =
            self.request::<Option<Hover>>(HoverRequest::METHOD, serde_json::to_value(params)?)?;

        Ok(response.and_then(|hover| match hover.contents {
            languageserver_types::HoverContents::Scalar(ms) => Some(marked_string_text(&ms)),
            languageserver_types::HoverContents::Array(arr) => arr.first().map(marked_string_text),
            languageserver_types::HoverContents::Markup(m) => Some(m.value),
        }))
    }

    fn owning_manifest(&self, _path: &Path) -> Option<PackageManifest> {
        // Manifest discovery is filesystem-based, not a server capability;
        // callers compose this facade with `moniker::manifest` directly.
        None
    }
}

fn marked_string_text(ms: &languageserver_types::MarkedString) -> String {
    match ms {
        languageserver_types::MarkedString::String(s) => s.clone(),
        languageserver_types::MarkedString::LanguageString(ls) => ls.value.clone(),
    }
}

impl Drop for LspFacade {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}
