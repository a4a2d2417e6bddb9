//! Walks one compilation unit: iterates its documents, visits every
//! occurrence the façade reports, resolves monikers, and deposits facts
//! into the data manager.

use std::path::{Path, PathBuf};
use std::time::Instant;

use languageserver_types::Url;

use crate::data_manager::{DataManager, OccurrenceKind};
use crate::emitter::Emitter;
use crate::facade::Facade;
use crate::moniker::{MonikerDecision, Resolver, SymbolContext};
use crate::protocol::types::{Id, RangeVertex, Vertex};
use crate::protocol::Builder;
use crate::reporter::{ProjectSummary, Reporter, SymbolDiagnostic};
use crate::Result;

/// One compilation unit as the driver sees it: its source files, the
/// manifest governing its export monikers (if any), and the names of
/// the projects it declares references to.
pub struct ProjectDescriptor {
    pub name: String,
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
    pub depends_on: Vec<String>,
}

pub struct ProjectIndexer<'a> {
    pub facade: &'a mut dyn Facade,
    pub data: &'a mut DataManager,
    pub builder: &'a mut Builder,
    pub emitter: &'a mut dyn Emitter,
    pub reporter: &'a dyn Reporter,
    pub resolver: &'a Resolver,
}

impl<'a> ProjectIndexer<'a> {
    /// Indexes every file of `project`, returning the summary the driver
    /// passes to the reporter, and closes the project on the data
    /// manager before returning.
    pub fn index_project(&mut self, project: &ProjectDescriptor, language_id: &str) -> Result<ProjectSummary> {
        let started = Instant::now();
        let (project_id, entry) = self.builder.vertex(Vertex::Project(crate::protocol::types::Project {
            name: project.name.clone(),
        }));
        self.emitter.emit(&entry)?;

        let mut symbol_count = 0u64;
        let mut document_count = 0u64;
        let mut document_ids = Vec::new();
        let mut document_uris = Vec::new();

        for path in &project.files {
            let text = std::fs::read_to_string(path)?;
            self.facade.open_document(path, &text)?;

            let uri = doc_uri(path)?;
            let doc_id = self.data.open_document(uri.as_str(), language_id, Some(&text), self.builder, self.emitter)?;
            document_ids.push(doc_id.clone());
            document_uris.push(uri.clone());
            document_count += 1;

            for occurrence in self.facade.occurrences(&text) {
                if let Some(count) = self.index_occurrence(project, path, &uri, &occurrence)? {
                    symbol_count += count;
                }
            }

            self.data.close_document(uri.as_str(), self.builder, self.emitter)?;
            self.reporter.report_progress(document_count);
        }

        let contains = self.builder.contains(project_id, document_ids);
        self.emitter.emit(&contains)?;

        self.data.close_project(&project.name, &document_uris, self.builder, self.emitter)?;

        let summary = ProjectSummary {
            project_name: project.name.clone(),
            symbol_count,
            document_count,
            elapsed_ms: started.elapsed().as_millis(),
        };
        self.reporter.report_status(&summary);
        Ok(summary)
    }

    /// Returns `Some(1)` when a new symbol identity was allocated (used
    /// only for the summary's symbol count), `Some(0)` for a repeat
    /// occurrence of a known symbol, `None` for occurrences the façade
    /// declined to resolve.
    fn index_occurrence(
        &mut self,
        project: &ProjectDescriptor,
        path: &Path,
        doc_uri: &str,
        occurrence: &crate::facade::Occurrence,
    ) -> Result<Option<u64>> {
        let link = self.facade.resolve_declaration(path, occurrence.range.start)?;

        let (decl_file, decl_position) = match &link {
            Some(crate::facade::DeclarationLink::IsDeclaration) => (path.to_path_buf(), occurrence.range.start),
            Some(crate::facade::DeclarationLink::RefersTo { file, range }) => (file.clone(), range.start),
            None => {
                self.emit_unresolved_range(&project.name, doc_uri, occurrence)?;
                return Ok(None);
            }
        };

        let identity = format!(
            "{}:{}:{}",
            decl_file.display(),
            decl_position.line,
            decl_position.character
        );

        let referenced_outside_declaring_document = decl_file != path;
        let first_seen = !self.data.knows(&identity);

        if first_seen {
            let ctx = SymbolContext {
                declaration_file: &decl_file,
                canonical_identity: &identity,
                is_re_export: false,
                reachable_from_export_entry: decl_file.starts_with(&project.root),
                referenced_outside_declaring_document,
            };
            let decision = self.resolver.resolve(&ctx);
            let decl_doc_uri = doc_uri(&decl_file)?;
            self.allocate_symbol(&project.name, &decl_doc_uri, &identity, decision)?;

            if let Some(text) = self.facade.hover(&decl_file, decl_position)? {
                self.data.record_hover(&identity, &text, "text", self.builder, self.emitter)?;
            }
        }

        if let Some(alias) = self.facade.resolve_alias(path, occurrence.range.start) {
            let target_identity = format!(
                "{}:{}:{}",
                alias.target_file.display(),
                alias.target_position.line,
                alias.target_position.character
            );
            self.data.alias(&identity, &target_identity, self.builder, self.emitter, self.reporter)?;
        }

        let (range_id, entry) = self.builder.vertex(Vertex::Range(RangeVertex { range: occurrence.range }));
        self.emitter.emit(&entry)?;
        self.data.record_range_in_document(doc_uri, range_id.clone());

        let kind = self.facade.classify(&link);
        self.data.record_occurrence(&identity, doc_uri, range_id, kind, self.builder, self.emitter)?;

        Ok(Some(if first_seen { 1 } else { 0 }))
    }

    fn allocate_symbol(
        &mut self,
        project_name: &str,
        decl_doc_uri: &str,
        identity: &str,
        decision: MonikerDecision,
    ) -> Result<Id> {
        match decision {
            MonikerDecision::Resolved(moniker, package) => self.data.ensure_symbol(
                identity,
                project_name,
                Some(&moniker),
                package.as_ref(),
                self.builder,
                self.emitter,
            ),
            MonikerDecision::ImportedAndReExported { import, export } => {
                let (export_moniker, export_package) = export;
                let (import_moniker, import_package) = import;
                let result_set_id = self.data.ensure_symbol(
                    identity,
                    project_name,
                    Some(&export_moniker),
                    Some(&export_package),
                    self.builder,
                    self.emitter,
                )?;
                let import_identity = format!("{}\u{0}import", identity);
                self.data.ensure_symbol(
                    &import_identity,
                    project_name,
                    Some(&import_moniker),
                    Some(&import_package),
                    self.builder,
                    self.emitter,
                )?;
                self.data.alias(identity, &import_identity, self.builder, self.emitter, self.reporter)?;
                Ok(result_set_id)
            }
            MonikerDecision::Local { moniker, report_as_internal } => {
                if report_as_internal {
                    self.reporter.report_internal_symbol(SymbolDiagnostic {
                        identity: identity.to_string(),
                        display_name: identity.to_string(),
                        message: "referenced outside its declaring document".to_string(),
                    });
                }
                // Allocated document-local regardless of mode: a later
                // occurrence in another document promotes it to global
                // under this same ResultSet (`DataManager::record_occurrence`).
                self.data
                    .ensure_symbol_local(identity, project_name, decl_doc_uri, Some(&moniker), None, self.builder, self.emitter)
            }
        }
    }

    /// An occurrence the façade could not resolve still gets a Range,
    /// linked to a synthetic, moniker-less, document-local ResultSet of
    /// its own.
    fn emit_unresolved_range(&mut self, project_name: &str, doc_uri: &str, occurrence: &crate::facade::Occurrence) -> Result<()> {
        let (range_id, range_entry) = self.builder.vertex(Vertex::Range(RangeVertex { range: occurrence.range }));
        self.emitter.emit(&range_entry)?;
        self.data.record_range_in_document(doc_uri, range_id.clone());

        let identity = format!("{}#unresolved#{}:{}", doc_uri, occurrence.range.start.line, occurrence.range.start.character);
        self.data
            .ensure_symbol_local(&identity, project_name, doc_uri, None, None, self.builder, self.emitter)?;
        self.data
            .record_occurrence(&identity, doc_uri, range_id, OccurrenceKind::Reference, self.builder, self.emitter)?;
        Ok(())
    }
}

fn doc_uri(path: &Path) -> Result<String> {
    Url::from_file_path(path)
        .map(|u| u.to_string())
        .map_err(|_| crate::error!("not an absolute file path: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::LineEmitter;
    use crate::facade::FakeFacade;
    use crate::moniker::MonikerMode;
    use crate::protocol::{ContentPolicy, SequentialIds};
    use crate::reporter::NullReporter;
    use languageserver_types::Position;
    use std::io::Write;

    fn pos(line: u64, character: u64) -> Position {
        Position { line, character }
    }

    #[test]
    fn single_file_single_local_symbol_produces_one_result_set() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.rs");
        std::fs::write(&file, "f f").unwrap();

        let decl_pos = pos(0, 0);
        let ref_pos = pos(0, 2);
        let mut facade = FakeFacade::new()
            .with_declaration(&file, decl_pos, crate::facade::DeclarationLink::IsDeclaration)
            .with_declaration(
                &file,
                ref_pos,
                crate::facade::DeclarationLink::RefersTo { file: file.clone(), range: languageserver_types::Range { start: decl_pos, end: decl_pos } },
            );

        let mut builder = Builder::new(Box::new(SequentialIds::new()), ContentPolicy::Omit);
        let mut buf = Vec::new();
        let mut emitter = LineEmitter::new(&mut buf);
        let mut data = DataManager::new(crate::data_manager::DataManagerMode::Keep);
        let reporter = NullReporter;
        let resolver = Resolver {
            import: None,
            export: None,
            mode: MonikerMode::Lenient,
            local_scheme: "local".to_string(),
        };

        let project = ProjectDescriptor {
            name: "p".to_string(),
            root: dir.path().to_path_buf(),
            files: vec![file.clone()],
            depends_on: vec![],
        };

        let mut indexer = ProjectIndexer {
            facade: &mut facade,
            data: &mut data,
            builder: &mut builder,
            emitter: &mut emitter,
            reporter: &reporter,
            resolver: &resolver,
        };

        let summary = indexer.index_project(&project, "rust").unwrap();
        assert_eq!(summary.document_count, 1);
        emitter.end().unwrap();
        drop(emitter);

        let text = String::from_utf8(buf).unwrap();
        assert!(text.lines().count() > 0);
    }
}
