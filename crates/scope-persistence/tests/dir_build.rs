use std::path::PathBuf;
use std::sync::Arc;

use scope_core::{DebugUi, HistoryDocument, Pipeline, SequentialPipeline, Step, StepCtx};
use scope_persistence::{read_dir_files, DirAssets, DirWriter, UiConfig};
use uuid::Uuid;

fn scratch(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("scope-{tag}-{}", Uuid::new_v4()))
}

#[tokio::test]
async fn patched_build_writes_viewer_and_history_to_disk() {
    let src = scratch("src");
    let dest = scratch("dest");
    std::fs::create_dir_all(src.join("posts")).expect("mkdir");
    std::fs::write(src.join("index.md"), "# Home").expect("seed");
    std::fs::write(src.join("posts/hello.md"), "# Hello").expect("seed");

    let files = read_dir_files(&src).await.expect("read source");
    let writer = Arc::new(DirWriter::new(&dest));
    let config = UiConfig::default();
    let ui = DebugUi::builder(config.patch_options()).capture_logs(false)
                                                    .assets(Arc::new(DirAssets::new(config.client_dir.clone())))
                                                    .build();

    let stamp = Step::sync(|c: &StepCtx| {
                    c.metadata.insert("site", "demo");
                    Ok(())
                }).named("stamp");
    let pipeline = SequentialPipeline::with_writer(files, scope_core::Node::default(), writer).use_step(stamp)
                                                                                            .use_step(ui.report("after stamp"));
    let mut patched = ui.patch(pipeline);
    let out = patched.build().await.expect("build");
    assert_eq!(out.len(), 2);

    for asset in ["index.html", "style.css", "app.js"] {
        assert!(dest.join("debug-ui").join(asset).is_file(), "missing viewer file {asset}");
    }
    assert!(dest.join("posts/hello.md").is_file());

    let raw = std::fs::read(dest.join("debug-ui/data.json")).expect("data.json");
    let doc: HistoryDocument = serde_json::from_slice(&raw).expect("history json");
    let names: Vec<_> = doc.snapshots.iter().map(|s| s.step_name.as_str()).collect();
    assert_eq!(names, vec!["stamp", "after stamp"]);
    assert_eq!(doc.snapshots[0].artifact_tree,
               serde_json::json!({"index.md": {"contents": "..."}, "posts": {"hello.md": {"contents": "..."}}}));
    assert_eq!(doc.snapshots[1].metadata, serde_json::json!({"site": "demo"}));

    let _ = std::fs::remove_dir_all(&src);
    let _ = std::fs::remove_dir_all(&dest);
}

#[tokio::test]
async fn unpatched_host_still_runs_plain() {
    let dest = scratch("plain");
    let files: scope_core::Files = scope_core::Node::default();
    files.insert("a.txt", scope_core::artifact("a"));
    let mut host = SequentialPipeline::with_writer(files, scope_core::Node::default(), Arc::new(DirWriter::new(&dest)));
    host.build().await.expect("build");
    assert_eq!(std::fs::read(dest.join("a.txt")).expect("a.txt"), b"a");
    assert!(!dest.join("debug-ui").exists());
    let _ = std::fs::remove_dir_all(&dest);
}
