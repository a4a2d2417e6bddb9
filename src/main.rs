//! Thin binary entry point: parses the CLI, spawns the language server,
//! assembles a façade and an emitter, and hands both to the pipeline
//! driver to walk the discovered project DAG.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use languageserver_types::Url;

use universal_lsif::cli::{Cli, Command, IndexArgs, OutputFormat};
use universal_lsif::config::Config;
use universal_lsif::configs;
use universal_lsif::driver::PipelineDriver;
use universal_lsif::emitter::{ArrayEmitter, Emitter, GraphSonEmitter, LineEmitter, VisEmitter};
use universal_lsif::error::ReportedErrorKind;
use universal_lsif::facade::lsp::{LanguageServerConfig, LspFacade};
use universal_lsif::indexer::ProjectDescriptor;
use universal_lsif::moniker::{CargoManifestReader, ManifestReader};
use universal_lsif::protocol::types::{Capabilities, MetaData, ToolInfo};
use universal_lsif::protocol::{Builder, SequentialIds, UuidIds};
use universal_lsif::reporter::{NullReporter, Reporter, StdoutReporter};
use universal_lsif::source_control;
use universal_lsif::{cli, Result};

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Languages => {
            print_languages();
            Ok(())
        }
        Command::Index(args) => run_index(args),
    }
}

fn print_languages() {
    println!("Supported languages:");
    let mut configs: Vec<(String, LanguageServerConfig)> = configs::language_configs().into_iter().collect();
    configs.sort_by(|a, b| a.0.cmp(&b.0));
    for (language, config) in configs {
        println!("    - {} using `{}`", language, config.start_command);
    }
}

fn run_index(args: IndexArgs) -> Result<()> {
    let config = Config::from_args(args)?;

    env_logger::Builder::from_default_env()
        .filter_level(config.log_level)
        .init();

    let mut language_config = configs::language_configs().get(&config.language).cloned().ok_or_else(|| {
        ReportedErrorKind::Configuration(format!(
            "language `{}` is not configured; run `universal-lsif languages` to see the supported set",
            config.language
        ))
    })?;
    if let Some(command) = &config.init_server_command {
        language_config.start_command = command.clone();
    }
    if let Some(server_args) = &config.server_args {
        language_config.start_args = Some(server_args.clone());
    }

    let manifest_reader: Arc<dyn ManifestReader> = Arc::new(CargoManifestReader);
    let projects = discover_projects(&config, manifest_reader.as_ref())?;
    let total_files: u64 = projects.iter().map(|p| p.files.len() as u64).sum();

    let mut facade = LspFacade::spawn(&language_config, &config.project_root).map_err(|err| {
        match &language_config.installation_command {
            Some(install) => crate::hint(err, &format!(
                "if you haven't installed `{}` yet, try `{}`",
                language_config.start_command, install
            )),
            None => err,
        }
    })?;

    let source = if config.repository_url.is_some() || config.probe_repository {
        source_control::probe(&config.project_root, config.repository_url.clone(), config.repository_type.clone())
    } else {
        None
    };

    let workspace_manifest_path = config.workspace_root.join("Cargo.toml");
    let metadata = MetaData {
        version: "0.4.3".to_string(),
        position_encoding: "utf-16".to_string(),
        tool_info: Some(ToolInfo::default()),
        project_root: Url::from_directory_path(&config.project_root)
            .map_err(|_| universal_lsif::error!("project root is not representable as a file:// URI: {}", config.project_root.display()))?,
    };
    let capabilities = Capabilities::default();

    let ids: Box<dyn universal_lsif::protocol::IdGenerator> = match config.id_kind {
        cli::IdKind::Number => Box::new(SequentialIds::new()),
        cli::IdKind::Uuid => Box::new(UuidIds),
    };
    let mut builder = Builder::new(ids, config.content_policy);

    let write_to_stdout = config.output == Path::new("-");
    let sink: Box<dyn Write> = if write_to_stdout {
        Box::new(std::io::stdout())
    } else {
        Box::new(BufWriter::new(File::create(&config.output)?))
    };
    let mut emitter: Box<dyn Emitter> = match config.output_format {
        OutputFormat::Json => Box::new(ArrayEmitter::new(sink)),
        OutputFormat::Line => Box::new(LineEmitter::new(sink)),
        OutputFormat::Vis => Box::new(VisEmitter::new(sink)),
        OutputFormat::Graphson => Box::new(GraphSonEmitter::new(sink)),
    };

    let reporter: Box<dyn Reporter> = if write_to_stdout {
        Box::new(NullReporter)
    } else {
        Box::new(StdoutReporter::new(total_files))
    };

    let mut driver = PipelineDriver {
        builder: &mut builder,
        emitter: emitter.as_mut(),
        facade: &mut facade,
        reporter: reporter.as_ref(),
        manifest_reader,
        workspace_manifest_path,
        moniker_mode: config.moniker_mode,
        moniker_scheme: "cargo".to_string(),
    };
    driver.run(metadata, source, capabilities, &config.language, projects)
}

fn hint(err: universal_lsif::Error, message: &str) -> universal_lsif::Error {
    universal_lsif::error!("{}\n{}", err, message)
}

/// Builds the project DAG the driver walks: single-package mode indexes
/// `project_root` as one project; multi-package mode builds one project
/// per `--published-package`, with `depends_on` derived from each
/// manifest's own dependency table.
fn discover_projects(config: &Config, manifest_reader: &dyn ManifestReader) -> Result<Vec<ProjectDescriptor>> {
    if !config.published_packages.is_empty() {
        let mut names_by_manifest = std::collections::HashMap::new();
        let mut loaded = Vec::new();
        for published in &config.published_packages {
            let manifest = manifest_reader.read(&published.manifest_path)?;
            names_by_manifest.insert(manifest.name.clone(), published.project_name.clone());
            let root = published
                .manifest_path
                .parent()
                .ok_or_else(|| universal_lsif::error!("manifest path has no parent directory: {}", published.manifest_path.display()))?
                .to_path_buf();
            loaded.push((published.project_name.clone(), root, manifest));
        }

        loaded
            .into_iter()
            .map(|(name, root, manifest)| {
                let files = collect_source_files(&root, &config_language_extensions(config))?;
                let depends_on = manifest
                    .dependencies
                    .keys()
                    .filter_map(|dep| names_by_manifest.get(dep).cloned())
                    .filter(|dep_name| dep_name != &name)
                    .collect();
                Ok(ProjectDescriptor { name, root, files, depends_on })
            })
            .collect()
    } else {
        let project_name = config
            .project_name
            .clone()
            .or_else(|| {
                config
                    .package
                    .as_ref()
                    .and_then(|p| manifest_reader.read(p).ok())
                    .map(|m| m.name)
            })
            .unwrap_or_else(|| {
                config
                    .project_root
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "project".to_string())
            });
        let files = collect_source_files(&config.project_root, &config_language_extensions(config))?;
        Ok(vec![ProjectDescriptor {
            name: project_name,
            root: config.project_root.clone(),
            files,
            depends_on: vec![],
        }])
    }
}

fn config_language_extensions(config: &Config) -> Vec<String> {
    configs::language_configs()
        .get(&config.language)
        .map(|c| c.extensions.clone())
        .unwrap_or_default()
}

fn collect_source_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in ignore::WalkBuilder::new(root).build() {
        let entry = entry?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) {
            if extensions.iter().any(|e| e == ext) {
                files.push(entry.path().to_path_buf());
            }
        }
    }
    files.sort();
    Ok(files)
}
