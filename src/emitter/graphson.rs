//! A GraphSON 3.0-flavored line format: each vertex becomes a
//! `g:Vertex`-shaped record and each edge a `g:Edge`-shaped record, one
//! per line, suitable for bulk loaders that consume GraphSON in a single
//! streaming pass (unlike `VisEmitter`, this format does not need to
//! buffer).

use std::io::Write;

use serde_json::{json, Value};

use crate::protocol::types::{Element, Entry, Id};
use crate::Result;

use super::Emitter;

pub struct GraphSonEmitter<W: Write> {
    sink: W,
}

impl<W: Write> GraphSonEmitter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }
}

fn id_value(id: &Id) -> Value {
    match id {
        Id::Number(n) => json!(n),
        Id::Uuid(s) => json!(s),
    }
}

impl<W: Write> Emitter for GraphSonEmitter<W> {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn emit(&mut self, entry: &Entry) -> Result<()> {
        let record = match &entry.data {
            Element::Vertex(_) => {
                let props = serde_json::to_value(&entry.data)?;
                json!({
                    "id": id_value(&entry.id),
                    "label": props.get("label"),
                    "type": "vertex",
                    "properties": props,
                })
            }
            Element::Edge(_) => {
                let props = serde_json::to_value(&entry.data)?;
                json!({
                    "id": id_value(&entry.id),
                    "label": props.get("label"),
                    "type": "edge",
                    "outV": props.get("outV"),
                    "inV": props.get("inV").or_else(|| props.get("inVs")),
                    "properties": props,
                })
            }
        };
        serde_json::to_writer(&mut self.sink, &record)?;
        self.sink.write_all(b"\n")?;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::{Element, ResultSet, Vertex};

    #[test]
    fn emits_graphson_style_records() {
        let mut buf = Vec::new();
        let mut emitter = GraphSonEmitter::new(&mut buf);
        emitter.start().unwrap();
        emitter
            .emit(&Entry {
                id: Id::Number(1),
                data: Element::Vertex(Vertex::ResultSet(ResultSet {})),
            })
            .unwrap();
        emitter.end().unwrap();

        let text = String::from_utf8(buf).unwrap();
        let parsed: Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(parsed["type"], "vertex");
        assert_eq!(parsed["label"], "resultSet");
    }
}
