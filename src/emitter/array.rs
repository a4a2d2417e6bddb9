//! Single top-level JSON array framing. Bracket and comma handling is done
//! by hand in `start`/`emit`/`end` rather than buffering every element,
//! since the Data Manager may hold the stream open across a large project.

use std::io::Write;

use crate::protocol::types::Entry;
use crate::Result;

use super::Emitter;

pub struct ArrayEmitter<W: Write> {
    sink: W,
    emitted_any: bool,
}

impl<W: Write> ArrayEmitter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            emitted_any: false,
        }
    }
}

impl<W: Write> Emitter for ArrayEmitter<W> {
    fn start(&mut self) -> Result<()> {
        self.sink.write_all(b"[")?;
        Ok(())
    }

    fn emit(&mut self, entry: &Entry) -> Result<()> {
        if self.emitted_any {
            self.sink.write_all(b",")?;
        }
        serde_json::to_writer(&mut self.sink, entry)?;
        self.emitted_any = true;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.sink.write_all(b"]")?;
        self.sink.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::{Element, ResultSet, Vertex};

    #[test]
    fn wraps_elements_in_a_single_array() {
        let mut buf = Vec::new();
        let mut emitter = ArrayEmitter::new(&mut buf);
        emitter.start().unwrap();
        emitter
            .emit(&Entry {
                id: crate::protocol::Id::Number(1),
                data: Element::Vertex(Vertex::ResultSet(ResultSet {})),
            })
            .unwrap();
        emitter
            .emit(&Entry {
                id: crate::protocol::Id::Number(2),
                data: Element::Vertex(Vertex::ResultSet(ResultSet {})),
            })
            .unwrap();
        emitter.end().unwrap();

        let text = String::from_utf8(buf).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(parsed.is_array());
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }
}
