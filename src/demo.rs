//! Demo en memoria: sitio de ejemplo + pipeline instrumentado.
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use scope_adapters::{collections, markdown, stamp, CollectionParams, StampParams};
use scope_core::engine::PerfSample;
use scope_core::{artifact, AssetSource, DebugUi, Files, HistoryDocument, MemoryWriter, Metadata, Node, PatchOptions,
                 SequentialPipeline};
use scope_persistence::DirWriter;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::DemoError;

/// Resumen imprimible de una ejecución de la demo.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSummary {
    pub run_id: Uuid,
    pub finished_at: DateTime<Utc>,
    pub steps: Vec<String>,
    pub log_lines: usize,
    pub perf: Vec<PerfSample>,
    pub outputs: Vec<String>,
}

pub struct DemoRun {
    pub summary: DemoSummary,
    pub document: HistoryDocument,
    pub writer: Arc<MemoryWriter>,
}

/// Sitio de ejemplo. La metadata contiene un ciclo (`config.root` -> raíz).
pub fn sample_site() -> (Files, Metadata) {
    let files: Files = Node::default();
    files.insert("index.md", artifact("---\ntitle: Home\n---\n# Welcome"));
    files.insert("posts/first.md", artifact("---\ntitle: First post\n---\nhello"));
    files.insert("posts/second.md", artifact("## Second\nmore text"));
    files.insert("assets/style.css", artifact("body { margin: 0 }"));

    let metadata: Metadata = Node::default();
    let config: Node<scope_core::Fields> = Node::default();
    config.insert("title", "stepscope demo");
    config.insert("root", metadata.clone());
    metadata.insert("config", config);
    (files, metadata)
}

/// Ejecuta la demo completa con un writer en memoria.
pub async fn run_demo(options: PatchOptions, assets: Option<Arc<dyn AssetSource>>) -> Result<DemoRun, DemoError> {
    let writer = Arc::new(MemoryWriter::default());
    let (files, metadata) = sample_site();

    let mut builder = DebugUi::builder(options);
    if let Some(assets) = assets {
        builder = builder.assets(assets);
    }
    let ui = builder.build();

    let pipeline = SequentialPipeline::with_writer(files, metadata, writer.clone())
        .use_step(stamp(StampParams { site: "demo".into(),
                                      ..Default::default() }))
        .use_step(markdown())
        .use_step(ui.report("after markdown"))
        .use_step(collections(CollectionParams { name: "posts".into(),
                                                 prefix: "posts/".into() }));
    let mut patched = ui.patch(pipeline);
    let out = patched.build().await?;
    info!("demo finished with {} files", out.len());

    let document = ui.document();
    let summary = DemoSummary { run_id: ui.run_id(),
                                finished_at: Utc::now(),
                                steps: document.snapshots.iter().map(|s| s.step_name.clone()).collect(),
                                log_lines: document.log.len(),
                                perf: ui.perf_samples(),
                                outputs: writer.paths() };
    Ok(DemoRun { summary,
                 document,
                 writer })
}

/// Copia a disco todo lo que la demo escribió en memoria.
pub async fn export(writer: &MemoryWriter, dir: &Path) -> Result<usize, DemoError> {
    let files: Files = Node::default();
    for path in writer.paths() {
        if let Some(bytes) = writer.get(&path) {
            files.insert(path, artifact(bytes));
        }
    }
    Ok(DirWriter::new(dir).write_all(&files).await?)
}

pub fn summary_json(summary: &DemoSummary) -> Result<String, DemoError> {
    Ok(serde_json::to_string_pretty(summary)?)
}
