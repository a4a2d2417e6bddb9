//! The LSIF graph data model and the stateless factory that constructs
//! it.

pub mod builder;
pub mod types;

pub use builder::{Builder, ContentPolicy, IdGenerator, SequentialIds, UuidIds};
pub use types::{Id, MonikerKind};
