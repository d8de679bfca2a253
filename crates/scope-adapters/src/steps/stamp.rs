//! Stamp (síncrono): copia parámetros a la metadata global.

use log::info;
use scope_core::{Step, StepCtx, Value};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StampParams {
    pub site: String,
    /// Claves adicionales, copiadas tal cual.
    #[serde(default)]
    pub extra: Map<String, JsonValue>,
}

pub fn stamp(params: StampParams) -> Step {
    Step::sync(move |ctx: &StepCtx| {
        ctx.metadata.insert("site", params.site.as_str());
        for (key, value) in &params.extra {
            ctx.metadata.insert(key.clone(), Value::from_json(value));
        }
        info!("stamped {} keys", 1 + params.extra.len());
        Ok(())
    }).named("stamp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scope_core::{MemoryWriter, Node};
    use std::sync::Arc;

    #[tokio::test]
    async fn writes_site_and_extra_keys() {
        let params: StampParams = serde_json::from_value(serde_json::json!({
            "site": "demo",
            "extra": {"lang": "es", "tags": ["a", "b"]}
        })).expect("params");
        let ctx = StepCtx::new(Node::default(), Node::default(), Arc::new(MemoryWriter::default()));
        stamp(params).invoke(ctx.clone()).await.expect("stamp");

        assert_eq!(ctx.metadata.keys(), vec!["site", "lang", "tags"]);
        assert_eq!(ctx.metadata.get("site").and_then(|v| v.as_str().map(str::to_string)), Some("demo".into()));
        assert_eq!(ctx.metadata.get("tags").and_then(|v| v.as_list().map(|l| l.len())), Some(2));
    }
}
