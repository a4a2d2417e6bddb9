//! The validated, canonicalized form of `cli::IndexArgs`. Resolves
//! relative paths against the current directory and rejects
//! `--package`/`--published-package` combinations that can't both hold;
//! `normalize_path` handles a not-yet-existent output path that
//! `std::fs::canonicalize` can't.

use std::path::{Component, Path, PathBuf};

use crate::cli::{IdKind, IndexArgs, MonikerModeArg, OutputFormat};
use crate::error::ReportedErrorKind;
use crate::moniker::MonikerMode;
use crate::protocol::ContentPolicy;
use crate::Result;

/// A manifest path paired with the project name it publishes as, parsed
/// from a repeated `--published-package path=name` flag.
#[derive(Debug, Clone)]
pub struct PublishedPackage {
    pub manifest_path: PathBuf,
    pub project_name: String,
}

pub struct Config {
    pub project_root: PathBuf,
    pub workspace_root: PathBuf,
    pub output: PathBuf,
    pub output_format: OutputFormat,
    pub id_kind: IdKind,
    pub moniker_mode: MonikerMode,
    pub content_policy: ContentPolicy,
    pub project_references: bool,
    pub package: Option<PathBuf>,
    pub published_packages: Vec<PublishedPackage>,
    pub repository_url: Option<String>,
    pub repository_type: Option<String>,
    pub probe_repository: bool,
    pub project_name: Option<String>,
    pub language: String,
    pub init_server_command: Option<String>,
    pub server_args: Option<String>,
    pub log_level: log::LevelFilter,
}

impl Config {
    /// Validates and canonicalizes `args`: `package` and
    /// `published_packages` are mutually exclusive.
    pub fn from_args(mut args: IndexArgs) -> Result<Self> {
        if args.package.is_some() && !args.published_packages.is_empty() {
            return Err(ReportedErrorKind::Configuration(
                "`--package` and `--published-package` are mutually exclusive".to_string(),
            )
            .into());
        }

        let project_root = args
            .project_root
            .take()
            .unwrap_or_else(|| PathBuf::from("."))
            .canonicalize()
            .map_err(|e| ReportedErrorKind::Configuration(format!("invalid project root: {}", e)))?;

        let workspace_root = args
            .workspace_root
            .take()
            .map(|p| p.canonicalize())
            .transpose()
            .map_err(|e| ReportedErrorKind::Configuration(format!("invalid workspace root: {}", e)))?
            .unwrap_or_else(|| project_root.clone());

        let default_extension = match args.output_format {
            OutputFormat::Json => "json",
            OutputFormat::Line => "jsonl",
            OutputFormat::Vis => "vis.json",
            OutputFormat::Graphson => "graphson",
        };
        let output = args
            .output
            .as_ref()
            .map(|p| normalize_path(p))
            .unwrap_or_else(|| normalize_path(&project_root.join(format!("dump.{}", default_extension))));

        let published_packages = args
            .published_packages
            .iter()
            .map(|spec| parse_published_package(spec))
            .collect::<Result<Vec<_>>>()?;

        let log_level = if args.quiet {
            log::LevelFilter::Error
        } else {
            match args.verbose {
                0 => log::LevelFilter::Info,
                1 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            }
        };

        Ok(Config {
            project_root,
            workspace_root,
            output,
            output_format: args.output_format,
            id_kind: args.id,
            moniker_mode: match args.moniker {
                MonikerModeArg::Strict => MonikerMode::Strict,
                MonikerModeArg::Lenient => MonikerMode::Lenient,
            },
            content_policy: if args.no_contents {
                ContentPolicy::Omit
            } else {
                ContentPolicy::Include
            },
            project_references: !args.no_project_references,
            package: args.package,
            published_packages,
            repository_url: args.repository_url,
            repository_type: args.repository_type,
            probe_repository: args.probe_repository,
            project_name: args.project_name,
            language: args.language,
            init_server_command: args.init_server_command,
            server_args: args.server_args,
            log_level,
        })
    }
}

fn parse_published_package(spec: &str) -> Result<PublishedPackage> {
    let (path, name) = spec
        .split_once('=')
        .ok_or_else(|| ReportedErrorKind::Configuration(format!("expected `path=name`, got `{}`", spec)))?;
    Ok(PublishedPackage {
        manifest_path: normalize_path(Path::new(path)),
        project_name: name.to_string(),
    })
}

/// Same as `std::path::Path::canonicalize`, but does not require that the
/// given path exists.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = path.components().peekable();
    let mut ret = if let Some(c @ Component::Prefix(..)) = components.peek().cloned() {
        components.next();
        PathBuf::from(c.as_os_str())
    } else {
        PathBuf::new()
    };

    for component in components {
        match component {
            Component::Prefix(..) => unreachable!(),
            Component::RootDir => ret.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                ret.pop();
            }
            Component::Normal(c) => ret.push(c),
        }
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_resolves_parent_dir_components() {
        assert_eq!(normalize_path(Path::new("/a/b/../c")), PathBuf::from("/a/c"));
    }

    #[test]
    fn published_package_spec_splits_on_the_first_equals() {
        let pkg = parse_published_package("./libs/a/Cargo.toml=libA").unwrap();
        assert_eq!(pkg.project_name, "libA");
    }

    #[test]
    fn published_package_spec_without_equals_is_rejected() {
        assert!(parse_published_package("no-equals-here").is_err());
    }
}
