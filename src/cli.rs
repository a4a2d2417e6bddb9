//! Command-line surface: project root, output path, language, language
//! server launch args, output format/id/moniker-mode selection, and the
//! single-package vs. published-workspace manifest flags, built with
//! `clap` derive.

use std::path::PathBuf;

use clap::{ArgEnum, Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(name = "universal-lsif", about = "An LSIF indexer for every language")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Indexes a project and writes an LSIF dump.
    Index(IndexArgs),
    /// Lists the languages this build knows how to start a server for.
    Languages,
}

#[derive(Debug, Clone, Parser)]
pub struct IndexArgs {
    /// Path to the root of the project; the current directory if absent.
    pub project_root: Option<PathBuf>,

    /// The language to index (must match a configured language server).
    #[clap(long)]
    pub language: String,

    /// Command for starting the language server.
    #[clap(long)]
    pub init_server_command: Option<String>,

    /// Extra arguments passed to the language server process.
    #[clap(long)]
    pub server_args: Option<String>,

    /// Output path; `dump.<ext>` under the project root if absent.
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    #[clap(long, arg_enum, default_value = "line")]
    pub output_format: OutputFormat,

    #[clap(long, arg_enum, default_value = "number")]
    pub id: IdKind,

    #[clap(long, arg_enum, default_value = "strict")]
    pub moniker: MonikerModeArg,

    /// Omit document text content from the dump.
    #[clap(long)]
    pub no_contents: bool,

    /// Suppress project-to-project `contains`/reference wiring.
    #[clap(long)]
    pub no_project_references: bool,

    /// This project's own manifest (single-package mode).
    #[clap(long, conflicts_with = "published_packages")]
    pub package: Option<PathBuf>,

    /// `<manifest path>=<project name>`, repeatable (multi-package
    /// workspace mode).
    #[clap(long = "published-package", conflicts_with = "package")]
    pub published_packages: Vec<String>,

    #[clap(long)]
    pub repository_url: Option<String>,

    #[clap(long)]
    pub repository_type: Option<String>,

    /// Probe `git` for revision/branch info when no explicit URL is given.
    #[clap(long)]
    pub probe_repository: bool,

    /// Root used for import-moniker relative paths, defaults to
    /// `project_root`.
    #[clap(long)]
    pub workspace_root: Option<PathBuf>,

    #[clap(long)]
    pub project_name: Option<String>,

    #[clap(short, long, parse(from_occurrences))]
    pub verbose: u8,

    #[clap(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum)]
pub enum OutputFormat {
    Json,
    Line,
    Vis,
    Graphson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum)]
pub enum IdKind {
    Number,
    Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum)]
pub enum MonikerModeArg {
    Strict,
    Lenient,
}
