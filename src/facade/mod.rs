//! The type-checker collaborator abstraction. The project indexer never
//! talks to a language server directly; it asks a `Facade` for
//! declarations, references, hovers, and manifests, so a deterministic
//! in-memory double can stand in during tests.

pub mod fake;
pub mod lsp;

use std::path::{Path, PathBuf};

use languageserver_types::{Position, Range};

pub use fake::FakeFacade;
pub use lsp::LspFacade;

use crate::data_manager::OccurrenceKind;
use crate::protocol::types::PackageManifest;
use crate::Result;

/// One word-like token discovered while scanning a document, together
/// with its range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub text: String,
    pub range: Range,
}

/// What the language server reported for a single occurrence: either it
/// is the declaration site itself, or it points elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationLink {
    /// This occurrence IS the declaration.
    IsDeclaration,
    /// This occurrence refers to a declaration elsewhere.
    RefersTo { file: PathBuf, range: Range },
}

/// What symbol (by declaration site) a declaration aliases, when the
/// façade can tell (re-exports, `export = x`, rename-assignments).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasLink {
    pub target_file: PathBuf,
    pub target_position: Position,
}

/// Declaration and reference facts, a position-encoded type, and (when
/// the underlying language exposes one) project manifests: everything
/// the Project Indexer needs without knowing whether it is backed by a
/// live LSP server or a fixture.
pub trait Facade: Send {
    /// Registers a document's text with the underlying server so
    /// position queries against it can be answered.
    fn open_document(&mut self, path: &Path, text: &str) -> Result<()>;

    /// Scans a document for symbol-like occurrences. The default
    /// word-boundary scan lives in `scan_words`; a facade backed by a
    /// real parser may override this with exact token boundaries.
    fn occurrences(&self, text: &str) -> Vec<Occurrence> {
        scan_words(text)
    }

    /// Resolves where the symbol at `position` in `path` is declared.
    /// `None` means the server had no answer (e.g. a keyword or
    /// literal).
    fn resolve_declaration(&mut self, path: &Path, position: Position) -> Result<Option<DeclarationLink>>;

    /// Hover text for the symbol at `position`, when the server
    /// supports it.
    fn hover(&mut self, path: &Path, position: Position) -> Result<Option<String>>;

    /// Reads the package manifest that owns `path`, if any.
    fn owning_manifest(&self, path: &Path) -> Option<PackageManifest>;

    /// Reports whether the declaration at `path`/`position` aliases
    /// another declaration. Most façades have no such notion; the
    /// default declines.
    fn resolve_alias(&self, _path: &Path, _position: Position) -> Option<AliasLink> {
        None
    }

    /// Classifies a resolved occurrence into the navigational kind the
    /// data manager files it under. A façade with richer type
    /// information may override this to distinguish type references and
    /// implementations; the default treats the declaration site as a
    /// definition and everything else as a plain reference.
    fn classify(&self, link: &Option<DeclarationLink>) -> OccurrenceKind {
        match link {
            Some(DeclarationLink::IsDeclaration) => OccurrenceKind::Definition,
            _ => OccurrenceKind::Reference,
        }
    }
}

/// Splits `text` into word-like tokens and their ranges: a
/// language-agnostic fallback occurrence scan for façades with no
/// richer tokenizer.
pub fn scan_words(text: &str) -> Vec<Occurrence> {
    lazy_static::lazy_static! {
        static ref WORD: regex::Regex = regex::Regex::new(r"\w+(?:'\w+)*").unwrap();
    }

    let mut out = Vec::new();
    for (line_idx, line) in text.split('\n').enumerate() {
        for m in WORD.find_iter(line) {
            out.push(Occurrence {
                text: m.as_str().to_string(),
                range: Range {
                    start: Position {
                        line: line_idx as u64,
                        character: m.start() as u64,
                    },
                    end: Position {
                        line: line_idx as u64,
                        character: m.end() as u64,
                    },
                },
            });
        }
    }
    out
}
