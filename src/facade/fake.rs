//! A deterministic in-memory `Facade`, standing in for a real language
//! server in integration tests: answers declaration/hover/manifest
//! queries from a table the test builds, instead of spawning an external
//! binary.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use languageserver_types::Position;

use super::{DeclarationLink, Facade};
use crate::protocol::types::PackageManifest;
use crate::Result;

/// `languageserver_types::Position` does not implement `Hash`; keyed
/// lookups go through its two `u64` fields directly instead.
type PositionKey = (u64, u64);

fn key(position: Position) -> PositionKey {
    (position.line, position.character)
}

#[derive(Default)]
pub struct FakeFacade {
    documents: HashMap<PathBuf, String>,
    declarations: HashMap<(PathBuf, PositionKey), DeclarationLink>,
    hovers: HashMap<(PathBuf, PositionKey), String>,
    manifests: HashMap<PathBuf, PackageManifest>,
}

impl FakeFacade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the answer to `resolve_declaration(path, position)`.
    pub fn with_declaration(mut self, path: impl Into<PathBuf>, position: Position, link: DeclarationLink) -> Self {
        self.declarations.insert((path.into(), key(position)), link);
        self
    }

    /// Scripts the answer to `hover(path, position)`.
    pub fn with_hover(mut self, path: impl Into<PathBuf>, position: Position, text: impl Into<String>) -> Self {
        self.hovers.insert((path.into(), key(position)), text.into());
        self
    }

    /// Scripts the manifest that owns `path`.
    pub fn with_manifest(mut self, path: impl Into<PathBuf>, manifest: PackageManifest) -> Self {
        self.manifests.insert(path.into(), manifest);
        self
    }
}

impl Facade for FakeFacade {
    fn open_document(&mut self, path: &Path, text: &str) -> Result<()> {
        self.documents.insert(path.to_path_buf(), text.to_string());
        Ok(())
    }

    fn resolve_declaration(&mut self, path: &Path, position: Position) -> Result<Option<DeclarationLink>> {
        Ok(self.declarations.get(&(path.to_path_buf(), key(position))).cloned())
    }

    fn hover(&mut self, path: &Path, position: Position) -> Result<Option<String>> {
        Ok(self.hovers.get(&(path.to_path_buf(), key(position))).cloned())
    }

    fn owning_manifest(&self, path: &Path) -> Option<PackageManifest> {
        self.manifests.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_declaration_is_returned_verbatim() {
        let pos = Position { line: 0, character: 4 };
        let mut facade = FakeFacade::new().with_declaration("/a.rs", pos, DeclarationLink::IsDeclaration);
        assert_eq!(
            facade.resolve_declaration(Path::new("/a.rs"), pos).unwrap(),
            Some(DeclarationLink::IsDeclaration)
        );
    }

    #[test]
    fn unscripted_position_returns_none() {
        let mut facade = FakeFacade::new();
        let pos = Position { line: 0, character: 0 };
        assert_eq!(facade.resolve_declaration(Path::new("/a.rs"), pos).unwrap(), None);
    }
}
