//! Modelos neutrales (grafo de valores, registros de historial).

pub mod record;
pub mod value;

pub use record::{HistoryDocument, LogEntry, SnapshotRecord};
pub use value::{artifact, contents_of, Fields, Files, Metadata, Node, Value};
