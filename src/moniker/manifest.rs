//! Package manifest discovery: walking upward from a source file until a
//! package manifest is found.

use std::path::{Path, PathBuf};

use crate::protocol::types::PackageManifest;
use crate::Result;

/// Reads a single manifest format (Cargo.toml, package.json, go.mod, ...).
/// The concrete format stays an external collaborator; this crate only
/// reads name, version, main/typings entry, and the dependency map.
pub trait ManifestReader: Send + Sync {
    /// File names this reader recognizes while walking upward, tried in
    /// order at each directory (e.g. `["Cargo.toml"]`).
    fn manifest_file_names(&self) -> &[&str];

    fn read(&self, path: &Path) -> Result<PackageManifest>;
}

/// Walks `start`'s ancestors (including `start`'s own directory) looking
/// for a file `reader` recognizes. Returns the manifest path and its
/// parsed contents.
pub fn find_owning_manifest(
    start: &Path,
    reader: &dyn ManifestReader,
) -> Option<(PathBuf, PackageManifest)> {
    let mut dir = if start.is_dir() {
        Some(start)
    } else {
        start.parent()
    };

    while let Some(d) = dir {
        for name in reader.manifest_file_names() {
            let candidate = d.join(name);
            if candidate.is_file() {
                if let Ok(manifest) = reader.read(&candidate) {
                    return Some((candidate, manifest));
                }
            }
        }
        dir = d.parent();
    }
    None
}

/// Reads Cargo.toml manifests, the default for this crate's own
/// ecosystem target.
pub struct CargoManifestReader;

impl ManifestReader for CargoManifestReader {
    fn manifest_file_names(&self) -> &[&str] {
        &["Cargo.toml"]
    }

    fn read(&self, path: &Path) -> Result<PackageManifest> {
        let text = std::fs::read_to_string(path)?;
        let value: toml::Value = text.parse()?;
        let package = value
            .get("package")
            .ok_or_else(|| crate::error!("manifest {} has no [package] table", path.display()))?;
        let name = package
            .get("name")
            .and_then(toml::Value::as_str)
            .unwrap_or_default()
            .to_string();
        let version = package
            .get("version")
            .and_then(toml::Value::as_str)
            .unwrap_or("0.0.0")
            .to_string();

        let dependencies = value
            .get("dependencies")
            .and_then(toml::Value::as_table)
            .map(|t| {
                t.iter()
                    .map(|(k, v)| {
                        let version = match v {
                            toml::Value::String(s) => s.clone(),
                            toml::Value::Table(t) => t
                                .get("version")
                                .and_then(toml::Value::as_str)
                                .unwrap_or("*")
                                .to_string(),
                            _ => "*".to_string(),
                        };
                        (k.clone(), version)
                    })
                    .collect()
            })
            .unwrap_or_default();

        let main_entry = path.parent().map(|dir| dir.join("src").join("lib.rs"));

        Ok(PackageManifest {
            name,
            version,
            main_entry,
            dependencies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_manifest_in_ancestor_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"foo\"\nversion = \"1.2.3\"\n[dependencies]\nbar = \"0.1\"\n",
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        let file = dir.path().join("src").join("lib.rs");
        std::fs::write(&file, "").unwrap();

        let (found_path, manifest) = find_owning_manifest(&file, &CargoManifestReader).unwrap();
        assert_eq!(found_path, dir.path().join("Cargo.toml"));
        assert_eq!(manifest.name, "foo");
        assert_eq!(manifest.version, "1.2.3");
        assert_eq!(manifest.dependencies.get("bar").map(String::as_str), Some("0.1"));
    }

    #[test]
    fn returns_none_when_no_manifest_exists() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lib.rs");
        std::fs::write(&file, "").unwrap();
        assert!(find_owning_manifest(&file, &CargoManifestReader).is_none());
    }
}
