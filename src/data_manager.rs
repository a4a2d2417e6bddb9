//! The lifetime controller for deferred per-symbol and per-document
//! data. Holds open result sets, pending range assignments, and partial
//! edge sets until it is safe to flush them; owns the global/local
//! partitioning decision.

use std::collections::{HashMap, HashSet};

use crate::emitter::Emitter;
use crate::protocol::types::{
    Capabilities, Contents, Edge, EdgeData, HoverResult, Id, MarkedString, Moniker,
    PackageInformation, ResultSet, Vertex,
};
use crate::protocol::Builder;
use crate::reporter::{Reporter, SymbolDiagnostic};
use crate::Result;

/// Whether a symbol's lifetime is scoped to the whole pipeline or to a
/// single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Global,
    DocumentLocal,
}

/// When document-local bookkeeping is finalized: `Free` (moniker=strict)
/// flushes it as soon as its document closes; `Keep` (moniker=lenient)
/// holds it open until the owning project closes, so a later sibling
/// document can still be the one that promotes it to `global`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataManagerMode {
    Free,
    Keep,
}

impl Default for DataManagerMode {
    fn default() -> Self {
        DataManagerMode::Keep
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OccurrenceKind {
    Declaration,
    Definition,
    Reference,
    TypeReference,
    Implementation,
}

#[derive(Clone)]
enum SymbolLocation {
    Global,
    Local(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ItemKind {
    Declarations,
    Definitions,
    References,
    Plain,
}

fn item_edge(kind: ItemKind, out_v: Id, in_vs: Vec<Id>, document: Id) -> Edge {
    match kind {
        ItemKind::Declarations => Edge::item_declarations(out_v, in_vs, document),
        ItemKind::Definitions => Edge::item_definitions(out_v, in_vs, document),
        ItemKind::References => Edge::item_references(out_v, in_vs, document),
        ItemKind::Plain => Edge::item(out_v, in_vs, document),
    }
}

/// Buffers item contributions for one navigational result kind. The
/// vertex is allocated and emitted the first time a contributing range
/// is recorded; the per-document item edges are held back until
/// `flush_document`/`finalize_remaining` runs at the appropriate
/// lifetime boundary.
#[derive(Default)]
struct DeferredResult {
    vertex_id: Option<Id>,
    pending: HashMap<(String, ItemKind), Vec<Id>>,
    doc_ids: HashMap<String, Id>,
}

impl DeferredResult {
    fn ensure_vertex(
        &mut self,
        builder: &mut Builder,
        emitter: &mut dyn Emitter,
        result_set_id: &Id,
        make_vertex: impl FnOnce() -> Vertex,
        make_label_edge: impl FnOnce(Id, Id) -> Edge,
    ) -> Result<Id> {
        if let Some(id) = &self.vertex_id {
            return Ok(id.clone());
        }
        let (id, entry) = builder.vertex(make_vertex());
        emitter.emit(&entry)?;
        let edge = builder.edge(make_label_edge(result_set_id.clone(), id.clone()));
        emitter.emit(&edge)?;
        self.vertex_id = Some(id.clone());
        Ok(id)
    }

    fn record(&mut self, doc_uri: &str, doc_id: &Id, kind: ItemKind, range_id: Id) {
        self.doc_ids.entry(doc_uri.to_string()).or_insert_with(|| doc_id.clone());
        self.pending.entry((doc_uri.to_string(), kind)).or_default().push(range_id);
    }

    fn flush_document(&mut self, builder: &mut Builder, emitter: &mut dyn Emitter, doc_uri: &str) -> Result<()> {
        let vertex_id = match &self.vertex_id {
            Some(id) => id.clone(),
            None => return Ok(()),
        };
        let doc_id = match self.doc_ids.get(doc_uri) {
            Some(id) => id.clone(),
            None => return Ok(()),
        };
        let keys: Vec<(String, ItemKind)> = self.pending.keys().filter(|(d, _)| d == doc_uri).cloned().collect();
        for key in keys {
            if let Some(range_ids) = self.pending.remove(&key) {
                if range_ids.is_empty() {
                    continue;
                }
                let edge = item_edge(key.1, vertex_id.clone(), range_ids, doc_id.clone());
                let entry = builder.edge(edge);
                emitter.emit(&entry)?;
            }
        }
        Ok(())
    }

    fn finalize_remaining(&mut self, builder: &mut Builder, emitter: &mut dyn Emitter) -> Result<()> {
        let docs: Vec<String> = self.doc_ids.keys().cloned().collect();
        for doc in docs {
            self.flush_document(builder, emitter, &doc)?;
        }
        Ok(())
    }
}

fn definitions_vertex() -> Vertex {
    Vertex::DefinitionResult(crate::protocol::types::DefinitionResult {})
}
fn references_vertex() -> Vertex {
    Vertex::ReferenceResult(crate::protocol::types::ReferenceResult {})
}
fn type_definitions_vertex() -> Vertex {
    Vertex::TypeDefinitionResult(crate::protocol::types::TypeDefinitionResult {})
}
fn implementations_vertex() -> Vertex {
    Vertex::ImplementationResult(crate::protocol::types::ImplementationResult {})
}
fn definitions_edge(out_v: Id, in_v: Id) -> Edge {
    Edge::Definition(EdgeData { out_v, in_v })
}
fn references_edge(out_v: Id, in_v: Id) -> Edge {
    Edge::References(EdgeData { out_v, in_v })
}
fn type_definitions_edge(out_v: Id, in_v: Id) -> Edge {
    Edge::TypeDefinition(EdgeData { out_v, in_v })
}
fn implementations_edge(out_v: Id, in_v: Id) -> Edge {
    Edge::Implementation(EdgeData { out_v, in_v })
}

pub struct SymbolRecord {
    pub result_set_id: Id,
    pub partition: Partition,
    pub owning_project: Option<String>,
    definitions: DeferredResult,
    references: DeferredResult,
    type_definitions: DeferredResult,
    implementations: DeferredResult,
    hover_emitted: bool,
}

fn apply_occurrence(
    record: &mut SymbolRecord,
    result_set_id: &Id,
    doc_uri: &str,
    doc_id: &Id,
    range_id: Id,
    kind: OccurrenceKind,
    builder: &mut Builder,
    emitter: &mut dyn Emitter,
) -> Result<()> {
    match kind {
        OccurrenceKind::Declaration => {
            record
                .definitions
                .ensure_vertex(builder, emitter, result_set_id, definitions_vertex, definitions_edge)?;
            record.definitions.record(doc_uri, doc_id, ItemKind::Declarations, range_id);
        }
        OccurrenceKind::Definition => {
            record
                .definitions
                .ensure_vertex(builder, emitter, result_set_id, definitions_vertex, definitions_edge)?;
            record.definitions.record(doc_uri, doc_id, ItemKind::Definitions, range_id);
        }
        OccurrenceKind::Reference => {
            record
                .references
                .ensure_vertex(builder, emitter, result_set_id, references_vertex, references_edge)?;
            record.references.record(doc_uri, doc_id, ItemKind::References, range_id);
        }
        OccurrenceKind::TypeReference => {
            record.type_definitions.ensure_vertex(
                builder,
                emitter,
                result_set_id,
                type_definitions_vertex,
                type_definitions_edge,
            )?;
            record.type_definitions.record(doc_uri, doc_id, ItemKind::Plain, range_id);
        }
        OccurrenceKind::Implementation => {
            record.implementations.ensure_vertex(
                builder,
                emitter,
                result_set_id,
                implementations_vertex,
                implementations_edge,
            )?;
            record.implementations.record(doc_uri, doc_id, ItemKind::Plain, range_id);
        }
    }
    Ok(())
}

struct DocumentState {
    id: Id,
    open_count: u32,
    pending_range_ids: Vec<Id>,
}

#[derive(Default)]
pub struct DataManager {
    mode: DataManagerMode,
    documents: HashMap<String, DocumentState>,
    global_symbols: HashMap<String, SymbolRecord>,
    local_symbols: HashMap<String, HashMap<String, SymbolRecord>>,
    symbol_location: HashMap<String, SymbolLocation>,
    doc_pending_global: HashMap<String, HashSet<String>>,
    alias_adjacency: HashMap<String, Vec<String>>,
    emitted_next_edges: HashSet<(String, String)>,
    package_cache: HashMap<(String, String, String), Id>,
}

impl DataManager {
    pub fn new(mode: DataManagerMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    // ---- documents ------------------------------------------------------

    /// Opens a document, emitting its vertex only the first time this URI
    /// is seen (documents are re-entrant across projects but emitted only
    /// once).
    pub fn open_document(
        &mut self,
        uri: &str,
        language_id: &str,
        text: Option<&str>,
        builder: &mut Builder,
        emitter: &mut dyn Emitter,
    ) -> Result<Id> {
        if let Some(state) = self.documents.get_mut(uri) {
            state.open_count += 1;
            return Ok(state.id.clone());
        }

        let url = languageserver_types::Url::from_file_path(uri)
            .or_else(|_| languageserver_types::Url::parse(uri))
            .map_err(|_| crate::error!("invalid document uri: {}", uri))?;
        let (id, entry) = builder.document(url, language_id.to_string(), text);
        emitter.emit(&entry)?;

        self.documents.insert(
            uri.to_string(),
            DocumentState {
                id: id.clone(),
                open_count: 1,
                pending_range_ids: Vec::new(),
            },
        );
        Ok(id)
    }

    pub fn document_id(&self, uri: &str) -> Option<Id> {
        self.documents.get(uri).map(|d| d.id.clone())
    }

    /// Registers a newly-emitted Range as belonging to `uri`, to be
    /// covered by a later `contains` edge.
    pub fn record_range_in_document(&mut self, uri: &str, range_id: Id) {
        if let Some(state) = self.documents.get_mut(uri) {
            state.pending_range_ids.push(range_id);
        }
    }

    /// Flushes pending item edges scoped to `uri` for still-open global
    /// symbols, finalizes document-local symbols homed at `uri` when in
    /// `Free` mode, and emits the `contains` edge covering ranges added
    /// since the document was last open.
    ///
    /// A document-local symbol is never dropped here: if a later document
    /// still in the same project turns out to reference it, `record_occurrence`
    /// needs the record intact to promote it to `global` under its original
    /// ResultSet rather than allocating a second one.
    pub fn close_document(&mut self, uri: &str, builder: &mut Builder, emitter: &mut dyn Emitter) -> Result<()> {
        if let Some(identities) = self.doc_pending_global.remove(uri) {
            for identity in identities {
                if let Some(record) = self.global_symbols.get_mut(&identity) {
                    record.definitions.flush_document(builder, emitter, uri)?;
                    record.type_definitions.flush_document(builder, emitter, uri)?;
                    record.implementations.flush_document(builder, emitter, uri)?;
                    // References stay open until pipeline close: importers
                    // in a later project may still add to them.
                }
            }
        }

        if self.mode == DataManagerMode::Free {
            if let Some(locals) = self.local_symbols.get_mut(uri) {
                for record in locals.values_mut() {
                    record.definitions.finalize_remaining(builder, emitter)?;
                    record.references.finalize_remaining(builder, emitter)?;
                    record.type_definitions.finalize_remaining(builder, emitter)?;
                    record.implementations.finalize_remaining(builder, emitter)?;
                }
            }
        }

        if let Some(state) = self.documents.get_mut(uri) {
            state.open_count = state.open_count.saturating_sub(1);
            if !state.pending_range_ids.is_empty() {
                let ranges = std::mem::take(&mut state.pending_range_ids);
                let entry = builder.contains(state.id.clone(), ranges);
                emitter.emit(&entry)?;
            }
        }

        Ok(())
    }

    // ---- symbols ----------------------------------------------------------

    /// Whether `identity` has already had a symbol record allocated
    /// (global or document-local), used by the Project Indexer to decide
    /// whether to run moniker resolution again for a repeat occurrence.
    pub fn knows(&self, identity: &str) -> bool {
        self.symbol_location.contains_key(identity)
    }

    fn existing_result_set(&self, identity: &str) -> Option<Id> {
        match self.symbol_location.get(identity)? {
            SymbolLocation::Global => self.global_symbols.get(identity).map(|r| r.result_set_id.clone()),
            SymbolLocation::Local(doc) => self
                .local_symbols
                .get(doc)
                .and_then(|m| m.get(identity))
                .map(|r| r.result_set_id.clone()),
        }
    }

    fn new_result_set(
        &mut self,
        moniker: Option<&Moniker>,
        package: Option<&PackageInformation>,
        builder: &mut Builder,
        emitter: &mut dyn Emitter,
    ) -> Result<Id> {
        let (result_set_id, entry) = builder.vertex(Vertex::ResultSet(ResultSet {}));
        emitter.emit(&entry)?;

        if let Some(m) = moniker {
            let (moniker_id, moniker_entry) = builder.vertex(Vertex::Moniker(m.clone()));
            emitter.emit(&moniker_entry)?;
            let moniker_edge = builder.edge(Edge::moniker(result_set_id.clone(), moniker_id.clone()));
            emitter.emit(&moniker_edge)?;

            if let Some(pkg) = package {
                let pkg_id = self.package_information_id(pkg, builder, emitter)?;
                let pkg_edge = builder.edge(Edge::package_information(moniker_id, pkg_id));
                emitter.emit(&pkg_edge)?;
            }
        }

        Ok(result_set_id)
    }

    /// Allocates a global symbol's ResultSet the first time it is seen,
    /// emitting the ResultSet vertex and its moniker/packageInformation
    /// edges immediately — these are NOT deferred, unlike the four
    /// navigational result vertices.
    pub fn ensure_symbol(
        &mut self,
        identity: &str,
        owning_project: &str,
        moniker: Option<&Moniker>,
        package: Option<&PackageInformation>,
        builder: &mut Builder,
        emitter: &mut dyn Emitter,
    ) -> Result<Id> {
        if let Some(id) = self.existing_result_set(identity) {
            return Ok(id);
        }

        let result_set_id = self.new_result_set(moniker, package, builder, emitter)?;

        self.global_symbols.insert(
            identity.to_string(),
            SymbolRecord {
                result_set_id: result_set_id.clone(),
                partition: Partition::Global,
                owning_project: Some(owning_project.to_string()),
                definitions: DeferredResult::default(),
                references: DeferredResult::default(),
                type_definitions: DeferredResult::default(),
                implementations: DeferredResult::default(),
                hover_emitted: false,
            },
        );
        self.symbol_location.insert(identity.to_string(), SymbolLocation::Global);

        Ok(result_set_id)
    }

    /// Document-local variant of `ensure_symbol`: the symbol is keyed
    /// under `doc_uri` and is promoted to `global` the moment an
    /// occurrence in a different document references it (see
    /// `record_occurrence`), never re-allocated under a second ResultSet.
    pub fn ensure_symbol_local(
        &mut self,
        identity: &str,
        owning_project: &str,
        doc_uri: &str,
        moniker: Option<&Moniker>,
        package: Option<&PackageInformation>,
        builder: &mut Builder,
        emitter: &mut dyn Emitter,
    ) -> Result<Id> {
        if let Some(id) = self.existing_result_set(identity) {
            return Ok(id);
        }

        let result_set_id = self.new_result_set(moniker, package, builder, emitter)?;

        self.local_symbols.entry(doc_uri.to_string()).or_default().insert(
            identity.to_string(),
            SymbolRecord {
                result_set_id: result_set_id.clone(),
                partition: Partition::DocumentLocal,
                owning_project: Some(owning_project.to_string()),
                definitions: DeferredResult::default(),
                references: DeferredResult::default(),
                type_definitions: DeferredResult::default(),
                implementations: DeferredResult::default(),
                hover_emitted: false,
            },
        );
        self.symbol_location
            .insert(identity.to_string(), SymbolLocation::Local(doc_uri.to_string()));

        Ok(result_set_id)
    }

    /// A document-local symbol's declaring scope transcends a single
    /// document the moment an occurrence for it shows up in a document
    /// other than its home; at that point it is no longer document-local
    /// by definition, independent of the moniker mode that produced the
    /// `Local` decision in the first place. Moves the record (and
    /// whatever of its four deferred results is already populated) into
    /// `global_symbols` under the same ResultSet id.
    fn promote_if_cross_document(&mut self, identity: &str, doc_uri: &str) {
        let home = match self.symbol_location.get(identity) {
            Some(SymbolLocation::Local(home)) if home != doc_uri => home.clone(),
            _ => return,
        };
        if let Some(mut record) = self.local_symbols.get_mut(&home).and_then(|m| m.remove(identity)) {
            record.partition = Partition::Global;
            self.global_symbols.insert(identity.to_string(), record);
            self.symbol_location.insert(identity.to_string(), SymbolLocation::Global);
        }
    }

    /// Deduplicates `PackageInformation` vertices by (name, version,
    /// manager).
    fn package_information_id(
        &mut self,
        pkg: &PackageInformation,
        builder: &mut Builder,
        emitter: &mut dyn Emitter,
    ) -> Result<Id> {
        let key = (pkg.name.clone(), pkg.version.clone(), pkg.manager.clone());
        if let Some(id) = self.package_cache.get(&key) {
            return Ok(id.clone());
        }
        let (id, entry) = builder.vertex(Vertex::PackageInformation(pkg.clone()));
        emitter.emit(&entry)?;
        self.package_cache.insert(key, id.clone());
        Ok(id)
    }

    /// Attaches a Range to a symbol's ResultSet via `next`, and deposits
    /// the occurrence into the appropriate deferred result buffer.
    pub fn record_occurrence(
        &mut self,
        identity: &str,
        doc_uri: &str,
        range_id: Id,
        kind: OccurrenceKind,
        builder: &mut Builder,
        emitter: &mut dyn Emitter,
    ) -> Result<()> {
        let doc_id = self
            .document_id(doc_uri)
            .ok_or_else(|| crate::error!("document {} not open", doc_uri))?;

        self.promote_if_cross_document(identity, doc_uri);

        let result_set_id = self
            .existing_result_set(identity)
            .ok_or_else(|| crate::error!("symbol {} not allocated before recording an occurrence", identity))?;

        let next_entry = builder.next_edge(range_id.clone(), result_set_id.clone());
        emitter.emit(&next_entry)?;

        let location = self
            .symbol_location
            .get(identity)
            .cloned()
            .ok_or_else(|| crate::error!("symbol {} has no location", identity))?;

        match location {
            SymbolLocation::Global => {
                let record = self.global_symbols.get_mut(identity).unwrap();
                apply_occurrence(record, &result_set_id, doc_uri, &doc_id, range_id, kind, builder, emitter)?;
                self.doc_pending_global
                    .entry(doc_uri.to_string())
                    .or_default()
                    .insert(identity.to_string());
            }
            SymbolLocation::Local(doc) => {
                let record = self.local_symbols.get_mut(&doc).unwrap().get_mut(identity).unwrap();
                apply_occurrence(record, &result_set_id, doc_uri, &doc_id, range_id, kind, builder, emitter)?;
            }
        }

        Ok(())
    }

    /// Attaches hover text to a symbol's ResultSet (taken from the
    /// canonical declaration site); a no-op on repeated calls.
    pub fn record_hover(
        &mut self,
        identity: &str,
        text: &str,
        language_id: &str,
        builder: &mut Builder,
        emitter: &mut dyn Emitter,
    ) -> Result<()> {
        let location = match self.symbol_location.get(identity).cloned() {
            Some(l) => l,
            None => return Ok(()),
        };

        let (result_set_id, already_emitted) = match &location {
            SymbolLocation::Global => {
                let record = self.global_symbols.get(identity).unwrap();
                (record.result_set_id.clone(), record.hover_emitted)
            }
            SymbolLocation::Local(doc) => {
                let record = self.local_symbols.get(doc).unwrap().get(identity).unwrap();
                (record.result_set_id.clone(), record.hover_emitted)
            }
        };
        if already_emitted {
            return Ok(());
        }

        let (hover_id, entry) = builder.vertex(Vertex::HoverResult(HoverResult {
            result: Contents {
                contents: vec![MarkedString {
                    language: language_id.to_string(),
                    value: text.to_string(),
                }],
            },
        }));
        emitter.emit(&entry)?;
        let edge = builder.edge(Edge::Hover(EdgeData {
            out_v: result_set_id,
            in_v: hover_id,
        }));
        emitter.emit(&edge)?;

        match location {
            SymbolLocation::Global => self.global_symbols.get_mut(identity).unwrap().hover_emitted = true,
            SymbolLocation::Local(doc) => {
                self.local_symbols.get_mut(&doc).unwrap().get_mut(identity).unwrap().hover_emitted = true
            }
        }
        Ok(())
    }

    // ---- aliasing -----------------------------------------------------------

    /// Records that `from` aliases `to` (re-export, `export = x`, a
    /// rename assignment): emits `from.resultSet --next--> to.resultSet`
    /// unless doing so would close a cycle, in which case the edge is
    /// suppressed and a diagnostic is reported.
    pub fn alias(
        &mut self,
        from_identity: &str,
        to_identity: &str,
        builder: &mut Builder,
        emitter: &mut dyn Emitter,
        reporter: &dyn Reporter,
    ) -> Result<()> {
        let from_id = match self.existing_result_set(from_identity) {
            Some(id) => id,
            None => return Ok(()),
        };
        let to_id = match self.existing_result_set(to_identity) {
            Some(id) => id,
            None => return Ok(()),
        };

        let from_key = id_key(&from_id);
        let to_key = id_key(&to_id);

        if self.emitted_next_edges.contains(&(from_key.clone(), to_key.clone())) {
            return Ok(());
        }

        if self.would_create_cycle(&from_key, &to_key) {
            reporter.report_internal_symbol(SymbolDiagnostic {
                identity: from_identity.to_string(),
                display_name: from_identity.to_string(),
                message: format!(
                    "alias cycle detected: {} -> {} would close a cycle; edge suppressed",
                    from_identity, to_identity
                ),
            });
            return Ok(());
        }

        self.alias_adjacency.entry(from_key.clone()).or_default().push(to_key.clone());
        self.emitted_next_edges.insert((from_key, to_key));

        let entry = builder.next_edge(from_id, to_id);
        emitter.emit(&entry)?;
        Ok(())
    }

    fn would_create_cycle(&self, from: &str, to: &str) -> bool {
        let mut stack = vec![to.to_string()];
        let mut seen = HashSet::new();
        while let Some(node) = stack.pop() {
            if node == from {
                return true;
            }
            if !seen.insert(node.clone()) {
                continue;
            }
            if let Some(neighbors) = self.alias_adjacency.get(&node) {
                stack.extend(neighbors.iter().cloned());
            }
        }
        false
    }

    // ---- lifecycle boundaries -----------------------------------------------

    /// Forces the definition/type-definition/implementation results of
    /// every global symbol first allocated within `project` to their
    /// final state: these never receive contributions from a later
    /// project, unlike reference results. In `Keep` mode, also finalizes
    /// any document-local symbol still homed in one of `documents` that
    /// was never cross-document promoted during this project's walk.
    pub fn close_project(
        &mut self,
        project: &str,
        documents: &[String],
        builder: &mut Builder,
        emitter: &mut dyn Emitter,
    ) -> Result<()> {
        let identities: Vec<String> = self
            .global_symbols
            .iter()
            .filter(|(_, r)| r.owning_project.as_deref() == Some(project))
            .map(|(k, _)| k.clone())
            .collect();

        for identity in identities {
            let record = self.global_symbols.get_mut(&identity).unwrap();
            record.definitions.finalize_remaining(builder, emitter)?;
            record.type_definitions.finalize_remaining(builder, emitter)?;
            record.implementations.finalize_remaining(builder, emitter)?;
        }

        if self.mode == DataManagerMode::Keep {
            for doc in documents {
                if let Some(locals) = self.local_symbols.get_mut(doc) {
                    for record in locals.values_mut() {
                        record.definitions.finalize_remaining(builder, emitter)?;
                        record.references.finalize_remaining(builder, emitter)?;
                        record.type_definitions.finalize_remaining(builder, emitter)?;
                        record.implementations.finalize_remaining(builder, emitter)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Flushes every remaining open global symbol's reference result:
    /// shared across projects, so held open until now.
    pub fn close_pipeline(&mut self, builder: &mut Builder, emitter: &mut dyn Emitter) -> Result<()> {
        let identities: Vec<String> = self.global_symbols.keys().cloned().collect();
        for identity in identities {
            let record = self.global_symbols.get_mut(&identity).unwrap();
            record.references.finalize_remaining(builder, emitter)?;
            // Defensive: a symbol whose owning project never explicitly
            // closed still gets its remaining buffers flushed here, so
            // no open data survives past pipeline close.
            record.definitions.finalize_remaining(builder, emitter)?;
            record.type_definitions.finalize_remaining(builder, emitter)?;
            record.implementations.finalize_remaining(builder, emitter)?;
        }
        Ok(())
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }
}

fn id_key(id: &Id) -> String {
    match id {
        Id::Number(n) => format!("#{}", n),
        Id::Uuid(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::LineEmitter;
    use crate::protocol::{Builder, ContentPolicy, SequentialIds};
    use crate::reporter::NullReporter;

    fn fresh() -> (Builder, LineEmitter<Vec<u8>>) {
        (
            Builder::new(Box::new(SequentialIds::new()), ContentPolicy::Omit),
            LineEmitter::new(Vec::new()),
        )
    }

    #[test]
    fn same_identity_resolves_to_the_same_result_set() {
        let (mut builder, mut emitter) = fresh();
        let mut dm = DataManager::new(DataManagerMode::Free);
        let a = dm.ensure_symbol("x", "p", None, None, &mut builder, &mut emitter).unwrap();
        let b = dm.ensure_symbol("x", "p", None, None, &mut builder, &mut emitter).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn free_mode_finalizes_a_local_symbol_on_document_close_but_keeps_its_record() {
        let (mut builder, mut emitter) = fresh();
        let mut dm = DataManager::new(DataManagerMode::Free);
        dm.open_document("file:///a.rs", "rust", None, &mut builder, &mut emitter).unwrap();
        dm.ensure_symbol_local("a.local", "p", "file:///a.rs", None, None, &mut builder, &mut emitter)
            .unwrap();
        let before = dm.existing_result_set("a.local").unwrap();
        dm.close_document("file:///a.rs", &mut builder, &mut emitter).unwrap();
        // still resolvable to the same ResultSet: a late cross-document
        // reference must reuse it, not allocate a second one.
        assert_eq!(dm.existing_result_set("a.local"), Some(before));
    }

    #[test]
    fn a_reference_from_another_document_promotes_the_symbol_to_global() {
        let (mut builder, mut emitter) = fresh();
        let mut dm = DataManager::new(DataManagerMode::Keep);
        dm.open_document("file:///a.rs", "rust", None, &mut builder, &mut emitter).unwrap();
        dm.open_document("file:///b.rs", "rust", None, &mut builder, &mut emitter).unwrap();

        let result_set = dm
            .ensure_symbol_local("x", "p", "file:///a.rs", None, None, &mut builder, &mut emitter)
            .unwrap();
        let range_a = builder.vertex(Vertex::Range(crate::protocol::types::RangeVertex {
            range: languageserver_types::Range {
                start: languageserver_types::Position { line: 0, character: 0 },
                end: languageserver_types::Position { line: 0, character: 1 },
            },
        })).0;
        dm.record_occurrence("x", "file:///a.rs", range_a, OccurrenceKind::Definition, &mut builder, &mut emitter)
            .unwrap();
        dm.close_document("file:///a.rs", &mut builder, &mut emitter).unwrap();

        let range_b = builder.vertex(Vertex::Range(crate::protocol::types::RangeVertex {
            range: languageserver_types::Range {
                start: languageserver_types::Position { line: 0, character: 0 },
                end: languageserver_types::Position { line: 0, character: 1 },
            },
        })).0;
        dm.record_occurrence("x", "file:///b.rs", range_b, OccurrenceKind::Reference, &mut builder, &mut emitter)
            .unwrap();

        assert_eq!(dm.existing_result_set("x"), Some(result_set));
        assert!(dm.global_symbols.contains_key("x"));
        assert!(!dm.local_symbols.get("file:///a.rs").map(|m| m.contains_key("x")).unwrap_or(false));
    }

    #[test]
    fn alias_is_idempotent() {
        let (mut builder, mut emitter) = fresh();
        let mut dm = DataManager::new(DataManagerMode::Free);
        dm.ensure_symbol("a", "p", None, None, &mut builder, &mut emitter).unwrap();
        dm.ensure_symbol("b", "p", None, None, &mut builder, &mut emitter).unwrap();
        let reporter = NullReporter;
        dm.alias("a", "b", &mut builder, &mut emitter, &reporter).unwrap();
        dm.alias("a", "b", &mut builder, &mut emitter, &reporter).unwrap();
        assert_eq!(dm.alias_adjacency.get(&id_key(&dm.existing_result_set("a").unwrap())).unwrap().len(), 1);
    }

    #[test]
    fn alias_cycle_is_rejected() {
        let (mut builder, mut emitter) = fresh();
        let mut dm = DataManager::new(DataManagerMode::Free);
        dm.ensure_symbol("a", "p", None, None, &mut builder, &mut emitter).unwrap();
        dm.ensure_symbol("b", "p", None, None, &mut builder, &mut emitter).unwrap();
        let reporter = NullReporter;
        dm.alias("a", "b", &mut builder, &mut emitter, &reporter).unwrap();
        dm.alias("b", "a", &mut builder, &mut emitter, &reporter).unwrap();

        let a_key = id_key(&dm.existing_result_set("a").unwrap());
        let b_key = id_key(&dm.existing_result_set("b").unwrap());
        assert!(!dm.alias_adjacency.get(&b_key).map(|v| v.contains(&a_key)).unwrap_or(false));
    }
}
