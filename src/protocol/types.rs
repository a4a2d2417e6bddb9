//! The closed set of LSIF vertices and edges this indexer emits.

use std::collections::BTreeMap;

use languageserver_types as lsp;
use serde::{Deserialize, Serialize};

/// A graph element identifier: either a sequential integer or a UUID
/// string, chosen once at startup. Kept distinct from the wire-level
/// `NumberOrString` so it can be used directly as a hash map key inside
/// the data manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(u64),
    Uuid(String),
}

impl From<&Id> for lsp::NumberOrString {
    fn from(id: &Id) -> Self {
        match id {
            Id::Number(n) => lsp::NumberOrString::Number(*n),
            Id::Uuid(s) => lsp::NumberOrString::String(s.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: Id,
    #[serde(flatten)]
    pub data: Element,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(tag = "type")]
pub enum Element {
    Vertex(Vertex),
    Edge(Edge),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(tag = "label")]
pub enum Vertex {
    MetaData(MetaData),
    Source(Source),
    Capabilities(Capabilities),
    Project(Project),
    Document(Document),
    Range(RangeVertex),
    ResultSet(ResultSet),
    Moniker(Moniker),
    PackageInformation(PackageInformation),

    DefinitionResult(DefinitionResult),
    ReferenceResult(ReferenceResult),
    TypeDefinitionResult(TypeDefinitionResult),
    ImplementationResult(ImplementationResult),
    HoverResult(HoverResult),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(tag = "label")]
pub enum Edge {
    Contains(MultiEdgeData),
    Next(EdgeData),
    Moniker(EdgeData),
    PackageInformation(EdgeData),

    Item(Item),

    #[serde(rename = "textDocument/definition")]
    Definition(EdgeData),
    #[serde(rename = "textDocument/references")]
    References(EdgeData),
    #[serde(rename = "textDocument/typeDefinition")]
    TypeDefinition(EdgeData),
    #[serde(rename = "textDocument/implementation")]
    Implementation(EdgeData),
    #[serde(rename = "textDocument/hover")]
    Hover(EdgeData),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    pub out_v: Id,
    pub in_v: Id,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiEdgeData {
    pub out_v: Id,
    pub in_vs: Vec<Id>,
}

/// The scoping-document variant of `item`; the `property` discriminates
/// which navigational list the referenced ranges belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(tag = "property")]
pub enum Item {
    #[serde(rename = "declarations")]
    Declarations(ItemData),
    #[serde(rename = "definitions")]
    Definitions(ItemData),
    #[serde(rename = "references")]
    References(ItemData),
    #[serde(rename = "referenceResults")]
    ReferenceResults(ItemData),
    #[serde(rename = "")]
    Neither(ItemData),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemData {
    pub out_v: Id,
    pub in_vs: Vec<Id>,
    pub document: Id,
}

impl Edge {
    pub fn contains(out_v: Id, in_vs: Vec<Id>) -> Self {
        Edge::Contains(MultiEdgeData { out_v, in_vs })
    }

    pub fn next(out_v: Id, in_v: Id) -> Self {
        Edge::Next(EdgeData { out_v, in_v })
    }

    pub fn moniker(out_v: Id, in_v: Id) -> Self {
        Edge::Moniker(EdgeData { out_v, in_v })
    }

    pub fn package_information(out_v: Id, in_v: Id) -> Self {
        Edge::PackageInformation(EdgeData { out_v, in_v })
    }

    pub fn item(out_v: Id, in_vs: Vec<Id>, document: Id) -> Self {
        Edge::Item(Item::Neither(ItemData { out_v, in_vs, document }))
    }

    pub fn item_declarations(out_v: Id, in_vs: Vec<Id>, document: Id) -> Self {
        Edge::Item(Item::Declarations(ItemData { out_v, in_vs, document }))
    }

    pub fn item_definitions(out_v: Id, in_vs: Vec<Id>, document: Id) -> Self {
        Edge::Item(Item::Definitions(ItemData { out_v, in_vs, document }))
    }

    pub fn item_references(out_v: Id, in_vs: Vec<Id>, document: Id) -> Self {
        Edge::Item(Item::References(ItemData { out_v, in_vs, document }))
    }

    pub fn item_reference_results(out_v: Id, in_vs: Vec<Id>, document: Id) -> Self {
        Edge::Item(Item::ReferenceResults(ItemData { out_v, in_vs, document }))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaData {
    pub version: String,
    pub position_encoding: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_info: Option<ToolInfo>,
    #[serde(with = "url_serde")]
    pub project_root: lsp::Url,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
}

impl Default for ToolInfo {
    fn default() -> Self {
        ToolInfo {
            name: "universal-lsif".to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
            args: None,
        }
    }
}

/// Workspace-wide source-control info.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub repository: String,
    pub repository_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Booleans advertising which result kinds this dump provides.
/// `declaration_provider` defaults to `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub hover_provider: bool,
    pub declaration_provider: bool,
    pub definition_provider: bool,
    pub type_definition_provider: bool,
    pub references_provider: bool,
    pub implementation_provider: bool,
    pub document_symbol_provider: bool,
    pub folding_range_provider: bool,
    pub diagnostic_provider: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities {
            hover_provider: true,
            declaration_provider: false,
            definition_provider: true,
            type_definition_provider: true,
            references_provider: true,
            implementation_provider: true,
            document_symbol_provider: false,
            folding_range_provider: false,
            diagnostic_provider: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(with = "url_serde")]
    pub uri: lsp::Url,
    pub language_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeVertex {
    #[serde(flatten)]
    pub range: lsp::Range,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionResult {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceResult {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDefinitionResult {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationResult {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverResult {
    pub result: Contents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contents {
    pub contents: Vec<MarkedString>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkedString {
    pub language: String,
    pub value: String,
}

/// Cross-project identity for a symbol. `kind` is one of `import`,
/// `export`, `local`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Moniker {
    pub kind: MonikerKind,
    pub scheme: String,
    pub identifier: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MonikerKind {
    Import,
    Export,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct PackageInformation {
    pub name: String,
    pub manager: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositoryInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// Opaque payload used by `moniker::manifest` to describe the package
/// owning a source file. Not an LSIF vertex itself; carried alongside
/// `PackageInformation` for convenience when resolvers need the raw
/// dependency table.
#[derive(Debug, Clone, Default)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub main_entry: Option<std::path::PathBuf>,
    pub dependencies: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trips_as_json_number_or_string() {
        assert_eq!(serde_json::to_string(&Id::Number(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Id::Uuid("a-b".into())).unwrap(), "\"a-b\"");
    }

    #[test]
    fn capabilities_default_hides_declaration_provider() {
        assert_eq!(Capabilities::default().declaration_provider, false);
    }

    #[test]
    fn vertex_serializes_with_label_tag() {
        let v = Vertex::ResultSet(ResultSet {});
        let s = serde_json::to_string(&v).unwrap();
        assert!(s.contains("\"label\":\"resultSet\""));
    }
}
