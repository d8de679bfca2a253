//! Collections (future): agrupa artifacts por prefijo de ruta en
//! `metadata.collections.<nombre>`.
//!
//! Cada miembro recibe un campo `collection` que apunta a la propia lista,
//! así la metadata y los artifacts comparten nodos y forman ciclos.

use log::info;
use scope_core::{Fields, Node, Step, StepCtx, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionParams {
    pub name: String,
    pub prefix: String,
}

pub fn collections(params: CollectionParams) -> Step {
    Step::future(move |ctx: StepCtx| {
        let params = params.clone();
        async move {
            tokio::task::yield_now().await;
            let n = collect(&ctx, &params);
            info!("{}: {n} members", params.name);
            Ok(())
        }
    }).named("collections")
}

fn collect(ctx: &StepCtx, params: &CollectionParams) -> usize {
    let members: Node<Vec<Value>> = Node::default();
    for (path, record) in ctx.files.entries() {
        if !path.starts_with(&params.prefix) {
            continue;
        }
        if let Some(rec) = record.as_map() {
            rec.insert("collection", members.clone());
            members.push(rec.clone());
        }
    }

    let all = match ctx.metadata.get("collections").and_then(|v| v.as_map().cloned()) {
        Some(existing) => existing,
        None => {
            let created: Node<Fields> = Node::default();
            ctx.metadata.insert("collections", created.clone());
            created
        }
    };
    all.insert(params.name.clone(), members.clone());
    members.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scope_core::{artifact, serialize_map, MemoryWriter};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn members_alias_file_records() {
        let files = Node::<Fields>::default();
        files.insert("posts/a.html", artifact("a"));
        files.insert("about.html", artifact("x"));
        let meta = Node::<Fields>::default();
        let ctx = StepCtx::new(files.clone(), meta.clone(), Arc::new(MemoryWriter::default()));

        collections(CollectionParams { name: "posts".into(),
                                       prefix: "posts/".into() }).invoke(ctx)
                                                                 .await
                                                                 .expect("collections");

        assert_eq!(serialize_map(&meta),
                   json!({"collections": {"posts": [{"contents": "...", "collection": "[Copy: root > collections > posts]"}]}}));
        let rendered = serialize_map(&files);
        assert_eq!(rendered["posts/a.html"]["collection"], json!(["[Copy: root > posts/a.html]"]));
        assert!(rendered["about.html"].get("collection").is_none());
    }
}
