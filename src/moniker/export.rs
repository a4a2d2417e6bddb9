//! The Export sub-resolver. Constructed per-project only when a manifest
//! is bound to that project.

use std::path::{Path, PathBuf};

use crate::protocol::types::{Moniker, MonikerKind, PackageInformation, PackageManifest};

pub struct ExportResolver {
    manifest: PackageManifest,
    project_root: PathBuf,
    scheme: String,
}

impl ExportResolver {
    pub fn new(manifest: PackageManifest, project_root: PathBuf, scheme: impl Into<String>) -> Self {
        Self {
            manifest,
            project_root,
            scheme: scheme.into(),
        }
    }

    /// Resolves `declaration_file`/`symbol_path` to an `export` moniker
    /// plus this project's `PackageInformation` when `reachable_from_entry`
    /// says the symbol is visible from the manifest's main/typings entry.
    pub fn resolve(
        &self,
        declaration_file: &Path,
        symbol_path: &str,
        reachable_from_entry: bool,
    ) -> Option<(Moniker, PackageInformation)> {
        if !reachable_from_entry {
            return None;
        }

        let relative = declaration_file.strip_prefix(&self.project_root).ok()?;
        let identifier = format!(
            "{}:{}:{}",
            self.manifest.name,
            relative.to_string_lossy().replace('\\', "/"),
            symbol_path
        );

        let moniker = Moniker {
            kind: MonikerKind::Export,
            scheme: self.scheme.clone(),
            identifier,
        };
        let package = PackageInformation {
            name: self.manifest.name.clone(),
            manager: self.scheme.clone(),
            version: self.manifest.version.clone(),
            repository: None,
        };
        Some((moniker, package))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declines_when_symbol_is_not_reachable_from_the_entry_point() {
        let resolver = ExportResolver::new(
            PackageManifest {
                name: "libA".into(),
                version: "1.0.0".into(),
                main_entry: None,
                dependencies: Default::default(),
            },
            PathBuf::from("/ws/libA"),
            "cargo",
        );
        assert!(resolver
            .resolve(Path::new("/ws/libA/src/internal.rs"), "Helper", false)
            .is_none());
    }

    #[test]
    fn builds_a_package_scoped_identifier_for_a_reachable_symbol() {
        let resolver = ExportResolver::new(
            PackageManifest {
                name: "libA".into(),
                version: "1.0.0".into(),
                main_entry: None,
                dependencies: Default::default(),
            },
            PathBuf::from("/ws/libA"),
            "cargo",
        );
        let (moniker, package) = resolver
            .resolve(Path::new("/ws/libA/src/lib.rs"), "Foo", true)
            .unwrap();
        assert_eq!(moniker.kind, MonikerKind::Export);
        assert_eq!(moniker.identifier, "libA:src/lib.rs:Foo");
        assert_eq!(package.version, "1.0.0");
    }
}
