//! The Import sub-resolver.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::protocol::types::{Moniker, MonikerKind, PackageInformation};

use super::manifest::{find_owning_manifest, ManifestReader};

pub struct ImportResolver {
    workspace_manifest_path: PathBuf,
    reader: Arc<dyn ManifestReader>,
    scheme: String,
}

impl ImportResolver {
    pub fn new(workspace_manifest_path: PathBuf, reader: Arc<dyn ManifestReader>, scheme: impl Into<String>) -> Self {
        Self {
            workspace_manifest_path,
            reader,
            scheme: scheme.into(),
        }
    }

    /// Resolves `declaration_file`/`symbol_path` to an `import` moniker
    /// plus the `PackageInformation` of the manifest it belongs to, or
    /// `None` when the symbol's owning manifest is the workspace's own.
    pub fn resolve(&self, declaration_file: &Path, symbol_path: &str) -> Option<(Moniker, PackageInformation)> {
        let (manifest_path, manifest) = find_owning_manifest(declaration_file, self.reader.as_ref())?;

        if manifest_path == self.workspace_manifest_path {
            return None;
        }

        let package_dir = manifest_path.parent()?;
        let relative = declaration_file.strip_prefix(package_dir).ok()?;
        let identifier = format!(
            "{}:{}:{}",
            manifest.name,
            relative.to_string_lossy().replace('\\', "/"),
            symbol_path
        );

        let moniker = Moniker {
            kind: MonikerKind::Import,
            scheme: self.scheme.clone(),
            identifier,
        };
        let package = PackageInformation {
            name: manifest.name,
            manager: self.scheme.clone(),
            version: manifest.version,
            repository: None,
        };
        Some((moniker, package))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moniker::manifest::CargoManifestReader;

    fn write_package(dir: &Path, name: &str) {
        std::fs::write(
            dir.join("Cargo.toml"),
            format!("[package]\nname = \"{}\"\nversion = \"0.1.0\"\n", name),
        )
        .unwrap();
    }

    #[test]
    fn returns_none_for_symbols_owned_by_the_workspace_itself() {
        let dir = tempfile::tempdir().unwrap();
        write_package(dir.path(), "workspace-crate");
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        let file = dir.path().join("src").join("lib.rs");
        std::fs::write(&file, "").unwrap();

        let resolver = ImportResolver::new(
            dir.path().join("Cargo.toml"),
            Arc::new(CargoManifestReader),
            "cargo",
        );
        assert!(resolver.resolve(&file, "Foo").is_none());
    }

    #[test]
    fn builds_a_scoped_identifier_for_a_dependency_symbol() {
        let workspace = tempfile::tempdir().unwrap();
        write_package(workspace.path(), "workspace-crate");

        let dep = tempfile::tempdir().unwrap();
        write_package(dep.path(), "dep-crate");
        std::fs::create_dir_all(dep.path().join("src")).unwrap();
        let dep_file = dep.path().join("src").join("lib.rs");
        std::fs::write(&dep_file, "").unwrap();

        let resolver = ImportResolver::new(
            workspace.path().join("Cargo.toml"),
            Arc::new(CargoManifestReader),
            "cargo",
        );
        let (moniker, package) = resolver.resolve(&dep_file, "Foo").unwrap();
        assert_eq!(moniker.kind, MonikerKind::Import);
        assert_eq!(moniker.identifier, "dep-crate:src/lib.rs:Foo");
        assert_eq!(package.name, "dep-crate");
    }
}
