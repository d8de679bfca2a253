use parking_lot::Mutex;

use crate::constants::{ANONYMOUS_STEP, BOUND_PREFIX};
use crate::model::{Files, HistoryDocument, LogEntry, Metadata, SnapshotRecord};
use crate::render::{serialize_map, tree_of};

/// Almacén append-only del historial de una ejecución.
///
/// Ambas secuencias viven bajo el mismo lock, así el orden relativo entre
/// líneas de log y snapshots es el orden real de emisión. Nunca se vacía
/// dentro de una ejecución; una ejecución nueva usa un store nuevo.
#[derive(Debug, Default)]
pub struct HistoryStore {
    inner: Mutex<HistoryDocument>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_log(&self, entry: LogEntry) {
        self.inner.lock().log.push(entry);
    }

    pub fn push_snapshot(&self, record: SnapshotRecord) -> usize {
        let mut doc = self.inner.lock();
        doc.snapshots.push(record);
        doc.snapshots.len()
    }

    /// Serializa el estado actual de artifacts y metadata y lo agrega como
    /// snapshot. La serialización ocurre fuera del lock.
    pub fn record(&self, name: Option<&str>, files: &Files, metadata: &Metadata) -> usize {
        let record = SnapshotRecord { step_name: display_name(name),
                                      artifact_tree: tree_of(serialize_map(files)),
                                      metadata: serialize_map(metadata) };
        self.push_snapshot(record)
    }

    pub fn snapshot_count(&self) -> usize {
        self.inner.lock().snapshots.len()
    }

    pub fn log_len(&self) -> usize {
        self.inner.lock().log.len()
    }

    /// Copia del documento acumulado.
    pub fn document(&self) -> HistoryDocument {
        self.inner.lock().clone()
    }

    /// Documento en JSON, listo para escribir en `debug-ui/data.json`.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        let doc = self.inner.lock();
        serde_json::to_vec(&*doc)
    }
}

/// Nombre visible de un step: `anonymous` si no tiene, sin el prefijo `bound `.
pub fn display_name(name: Option<&str>) -> String {
    let name = match name {
        Some(n) if !n.is_empty() => n,
        _ => ANONYMOUS_STEP,
    };
    name.replacen(BOUND_PREFIX, "", 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{artifact, Node};
    use serde_json::json;

    #[test]
    fn display_name_falls_back_and_strips_bound() {
        assert_eq!(display_name(None), "anonymous");
        assert_eq!(display_name(Some("")), "anonymous");
        assert_eq!(display_name(Some("bound markdown")), "markdown");
        assert_eq!(display_name(Some("layouts")), "layouts");
    }

    #[test]
    fn record_builds_directory_tree_and_metadata() {
        let store = HistoryStore::new();
        let files: Files = Node::default();
        files.insert("posts/a.md", artifact("# A"));
        files.insert("index.md", artifact("# Index"));
        let meta: Metadata = Node::default();
        meta.insert("site", "demo");
        meta.insert("self", meta.clone());

        assert_eq!(store.record(Some("bound collect"), &files, &meta), 1);
        let doc = store.document();
        let snap = &doc.snapshots[0];
        assert_eq!(snap.step_name, "collect");
        assert_eq!(snap.artifact_tree,
                   json!({"posts": {"a.md": {"contents": "..."}}, "index.md": {"contents": "..."}}));
        assert_eq!(snap.metadata, json!({"site": "demo", "self": "[Copy: root]"}));
    }

    #[test]
    fn snapshots_are_independent_of_later_mutation() {
        let store = HistoryStore::new();
        let files: Files = Node::default();
        let meta: Metadata = Node::default();
        meta.insert("count", 1);
        store.record(Some("one"), &files, &meta);
        meta.insert("count", 2);
        store.record(Some("two"), &files, &meta);

        let doc = store.document();
        assert_eq!(doc.snapshots[0].metadata, json!({"count": 1}));
        assert_eq!(doc.snapshots[1].metadata, json!({"count": 2}));
    }

    #[test]
    fn json_bytes_round_trip_into_document() {
        let store = HistoryStore::new();
        store.push_log(LogEntry { timestamp: "00:00:00.001".into(),
                                  plugin: "x".into(),
                                  message: "hello".into(),
                                  elapsed: "+0ms".into() });
        let bytes = store.to_json_bytes().expect("json");
        let back: HistoryDocument = serde_json::from_slice(&bytes).expect("parse");
        assert_eq!(back, store.document());
    }
}
