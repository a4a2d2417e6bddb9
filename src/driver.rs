//! Topologically orders projects by their declared-reference relation
//! and drives the project indexer across all of them, sharing one data
//! manager and moniker resolver. Cycle detection is via `petgraph`.

use std::collections::HashMap;
use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::data_manager::{DataManager, DataManagerMode};
use crate::emitter::Emitter;
use crate::error::ReportedErrorKind;
use crate::facade::Facade;
use crate::indexer::{ProjectDescriptor, ProjectIndexer};
use crate::moniker::manifest::ManifestReader;
use crate::moniker::{ExportResolver, ImportResolver, MonikerMode, Resolver};
use crate::protocol::types::{Capabilities, MetaData, Source, ToolInfo, Vertex};
use crate::protocol::Builder;
use crate::reporter::Reporter;
use crate::Result;

pub struct PipelineDriver<'a> {
    pub builder: &'a mut Builder,
    pub emitter: &'a mut dyn Emitter,
    pub facade: &'a mut dyn Facade,
    pub reporter: &'a dyn Reporter,
    pub manifest_reader: Arc<dyn ManifestReader>,
    pub workspace_manifest_path: std::path::PathBuf,
    pub moniker_mode: MonikerMode,
    pub moniker_scheme: String,
}

impl<'a> PipelineDriver<'a> {
    /// Runs the whole pipeline: header vertices, topological project
    /// walk, pipeline close, emitter close.
    pub fn run(
        &mut self,
        metadata: MetaData,
        source: Option<Source>,
        capabilities: Capabilities,
        language_id: &str,
        projects: Vec<ProjectDescriptor>,
    ) -> Result<()> {
        self.emitter.start()?;
        self.reporter.begin();

        let (_, entry) = self.builder.vertex(Vertex::MetaData(metadata));
        self.emitter.emit(&entry)?;

        // MetaData, Source, Capabilities are the dump's required first
        // three elements; a repository-less run still gets an `unknown`
        // Source rather than skipping it.
        let source = source.unwrap_or_else(|| Source {
            repository: "unknown".to_string(),
            repository_type: "unknown".to_string(),
            revision: None,
            branch: None,
        });
        let (_, entry) = self.builder.vertex(Vertex::Source(source));
        self.emitter.emit(&entry)?;

        let (_, entry) = self.builder.vertex(Vertex::Capabilities(capabilities));
        self.emitter.emit(&entry)?;

        let order = topological_order(&projects)?;
        let mode = match self.moniker_mode {
            MonikerMode::Strict => DataManagerMode::Free,
            MonikerMode::Lenient => DataManagerMode::Keep,
        };
        let mut data = DataManager::new(mode);

        for project in order {
            let export = self.export_resolver_for(&project);
            // Each project's own manifest is its "home": a symbol
            // declared under `project.root` never resolves as an import
            // moniker for that project's own walk, even in a multi-package
            // workspace where no single manifest covers every project.
            let own_manifest_path = project.root.join("Cargo.toml");
            let workspace_home = if own_manifest_path.is_file() {
                own_manifest_path
            } else {
                self.workspace_manifest_path.clone()
            };
            let import = Some(ImportResolver::new(
                workspace_home,
                self.manifest_reader.clone(),
                self.moniker_scheme.clone(),
            ));
            let resolver = Resolver {
                import,
                export,
                mode: self.moniker_mode,
                local_scheme: "local".to_string(),
            };

            let mut indexer = ProjectIndexer {
                facade: self.facade,
                data: &mut data,
                builder: self.builder,
                emitter: self.emitter,
                reporter: self.reporter,
                resolver: &resolver,
            };
            indexer.index_project(&project, language_id)?;
        }

        data.close_pipeline(self.builder, self.emitter)?;
        self.reporter.end();
        self.emitter.end()?;
        Ok(())
    }

    fn export_resolver_for(&self, project: &ProjectDescriptor) -> Option<ExportResolver> {
        let manifest = self.manifest_reader.read(&project.root.join("Cargo.toml")).ok()?;
        Some(ExportResolver::new(manifest, project.root.clone(), self.moniker_scheme.clone()))
    }
}

/// Orders `projects` so every project appears after all projects it
/// depends on. A cycle is a fatal configuration error.
fn topological_order(projects: &[ProjectDescriptor]) -> Result<Vec<ProjectDescriptor>> {
    let mut graph = DiGraph::<String, ()>::new();
    let mut nodes: HashMap<String, NodeIndex> = HashMap::new();

    for project in projects {
        let idx = graph.add_node(project.name.clone());
        nodes.insert(project.name.clone(), idx);
    }
    for project in projects {
        let from = nodes[&project.name];
        for dep in &project.depends_on {
            if let Some(&to) = nodes.get(dep) {
                // an edge dependency -> dependent so toposort visits the
                // dependency first
                graph.add_edge(to, from, ());
            }
        }
    }

    let sorted = toposort(&graph, None).map_err(|cycle| {
        let participants = vec![graph[cycle.node_id()].clone()];
        ReportedErrorKind::ProjectCycle { participants }
    })?;

    let by_name: HashMap<String, &ProjectDescriptor> = projects.iter().map(|p| (p.name.clone(), p)).collect();
    Ok(sorted
        .into_iter()
        .map(|idx| by_name[&graph[idx]].clone())
        .collect())
}

impl Clone for ProjectDescriptor {
    fn clone(&self) -> Self {
        ProjectDescriptor {
            name: self.name.clone(),
            root: self.root.clone(),
            files: self.files.clone(),
            depends_on: self.depends_on.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn project(name: &str, depends_on: &[&str]) -> ProjectDescriptor {
        ProjectDescriptor {
            name: name.to_string(),
            root: PathBuf::from(name),
            files: vec![],
            depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn dependencies_are_ordered_before_dependents() {
        let projects = vec![project("app", &["lib"]), project("lib", &[])];
        let ordered = topological_order(&projects).unwrap();
        let names: Vec<&str> = ordered.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["lib", "app"]);
    }

    #[test]
    fn a_cycle_is_reported_as_a_fatal_error() {
        let projects = vec![project("a", &["b"]), project("b", &["a"])];
        assert!(topological_order(&projects).is_err());
    }
}
