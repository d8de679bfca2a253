//! Registros persistidos en el documento de historial.
//!
//! Formato JSON (camelCase) consumido por el visor:
//! `{"log": [LogEntry...], "snapshots": [SnapshotRecord...]}`.
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Estado de artifacts + metadata justo después de un step exitoso.
/// Inmutable una vez creado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub step_name: String,
    pub artifact_tree: JsonValue,
    pub metadata: JsonValue,
}

/// Línea de log capturada.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String, // HH:MM:SS.mmm (UTC, sin fecha)
    pub plugin: String,
    pub message: String,
    pub elapsed: String,
}

/// Unidad persistida en `debug-ui/data.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryDocument {
    pub log: Vec<LogEntry>,
    pub snapshots: Vec<SnapshotRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_serializes_with_viewer_field_names() {
        let doc = HistoryDocument { log: vec![LogEntry { timestamp: "10:00:00.000".into(),
                                                         plugin: "p".into(),
                                                         message: "m".into(),
                                                         elapsed: "+1ms".into() }],
                                    snapshots: vec![SnapshotRecord { step_name: "a".into(),
                                                                     artifact_tree: json!({}),
                                                                     metadata: json!({"k": 1}) }] };
        let v = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(v["snapshots"][0]["stepName"], json!("a"));
        assert_eq!(v["snapshots"][0]["artifactTree"], json!({}));
        assert_eq!(v["log"][0]["elapsed"], json!("+1ms"));
    }
}
