//! Framed, append-only writer over a byte sink. Every element is
//! serialized exactly once, in call order; no component reads back from
//! the emitter, and nothing it has written may be modified afterwards.

pub mod array;
pub mod graphson;
pub mod line;
pub mod vis;

use crate::protocol::types::Entry;
use crate::Result;

/// `emit` appends to the sink in call order; `start`/`end` bracket the
/// stream with whatever framing the output format needs. The contract is
/// synchronous from the caller's perspective even though the sink may
/// buffer internally.
pub trait Emitter {
    fn start(&mut self) -> Result<()>;
    fn emit(&mut self, entry: &Entry) -> Result<()>;
    fn end(&mut self) -> Result<()>;
}

pub use array::ArrayEmitter;
pub use graphson::GraphSonEmitter;
pub use line::LineEmitter;
pub use vis::VisEmitter;
