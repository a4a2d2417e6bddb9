//! One JSON value per line (JSONL), the default output format.

use std::io::Write;

use crate::protocol::types::Entry;
use crate::Result;

use super::Emitter;

pub struct LineEmitter<W: Write> {
    sink: W,
}

impl<W: Write> LineEmitter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }
}

impl<W: Write> Emitter for LineEmitter<W> {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn emit(&mut self, entry: &Entry) -> Result<()> {
        serde_json::to_writer(&mut self.sink, entry)?;
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
    fn emits_one_json_object_per_line() {
        let mut buf = Vec::new();
        let mut emitter = LineEmitter::new(&mut buf);
        emitter.start().unwrap();
        let e1 = Entry {
            id: crate::protocol::Id::Number(1),
            data: Element::Vertex(Vertex::ResultSet(ResultSet {})),
        };
        let e2 = Entry {
            id: crate::protocol::Id::Number(2),
            data: Element::Vertex(Vertex::ResultSet(ResultSet {})),
        };
        emitter.emit(&e1).unwrap();
        emitter.emit(&e2).unwrap();
        emitter.end().unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            assert!(serde_json::from_str::<serde_json::Value>(line).is_ok());
        }
    }
}
