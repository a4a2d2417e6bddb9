//! ID generation and the stateless vertex/edge factory.

use uuid::Uuid;

use super::types::{Document, Edge, EdgeData, Element, Entry, Id, MultiEdgeData, Vertex};

/// The sole source of IDs for a pipeline run. Injected, not a static, so
/// tests can substitute a deterministic generator.
pub trait IdGenerator: Send {
    fn next(&mut self) -> Id;
}

/// Monotonic integers starting at 1.
#[derive(Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self { next: 1 }
    }
}

impl IdGenerator for SequentialIds {
    fn next(&mut self) -> Id {
        let id = self.next;
        self.next += 1;
        Id::Number(id)
    }
}

/// UUIDv4 strings.
#[derive(Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next(&mut self) -> Id {
        Id::Uuid(Uuid::new_v4().to_string())
    }
}

/// Whether Document vertices should carry the file's text contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentPolicy {
    Include,
    Omit,
}

/// Pure factory: given an ID and a payload it returns a value with no
/// side effects. The only state it carries is the ID generator and the
/// content policy, neither of which any constructor mutates based on the
/// payload.
pub struct Builder {
    ids: Box<dyn IdGenerator>,
    contents: ContentPolicy,
}

impl Builder {
    pub fn new(ids: Box<dyn IdGenerator>, contents: ContentPolicy) -> Self {
        Self { ids, contents }
    }

    pub fn next_id(&mut self) -> Id {
        self.ids.next()
    }

    pub fn vertex(&mut self, vertex: Vertex) -> (Id, Entry) {
        let id = self.next_id();
        (
            id.clone(),
            Entry {
                id,
                data: Element::Vertex(vertex),
            },
        )
    }

    pub fn edge(&mut self, edge: Edge) -> Entry {
        let id = self.next_id();
        Entry {
            id,
            data: Element::Edge(edge),
        }
    }

    /// Builds a Document vertex, attaching base64 contents unless the
    /// caller configured `noContents`.
    pub fn document(&mut self, uri: languageserver_types::Url, language_id: String, text: Option<&str>) -> (Id, Entry) {
        let contents = match self.contents {
            ContentPolicy::Include => text.map(|t| base64::encode(t.as_bytes())),
            ContentPolicy::Omit => None,
        };
        self.vertex(Vertex::Document(Document {
            uri,
            language_id,
            contents,
        }))
    }

    pub fn contains(&mut self, out_v: Id, in_vs: Vec<Id>) -> Entry {
        self.edge(Edge::Contains(MultiEdgeData { out_v, in_vs }))
    }

    pub fn next_edge(&mut self, out_v: Id, in_v: Id) -> Entry {
        self.edge(Edge::Next(EdgeData { out_v, in_v }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_start_at_one_and_increment() {
        let mut gen = SequentialIds::new();
        assert_eq!(gen.next(), Id::Number(1));
        assert_eq!(gen.next(), Id::Number(2));
    }

    #[test]
    fn uuid_ids_are_distinct() {
        let mut gen = UuidIds;
        let a = gen.next();
        let b = gen.next();
        assert_ne!(a, b);
    }

    #[test]
    fn base64_round_trips_through_known_vector() {
        assert_eq!(base64::encode(b"hello"), "aGVsbG8=");
    }
}
