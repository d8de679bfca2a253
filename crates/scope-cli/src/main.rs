use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;

use scope_adapters::{collections, markdown, stamp, CollectionParams, StampParams};
use scope_core::{capture, DebugUi, Pipeline, SequentialPipeline, Step};
use scope_persistence::{read_dir_files, DirAssets, DirWriter, UiConfig};

const USAGE: &str = "Uso: scope-cli build --source <DIR> --dest <DIR> [--perf] [--direct]";

#[derive(Debug, Clone, PartialEq, Eq)]
struct BuildArgs {
    source: PathBuf,
    dest: PathBuf,
    perf: bool,
    // sin wrapper: sólo steps `report` intercalados
    direct: bool,
}

fn parse_build_args(args: &[String]) -> Option<BuildArgs> {
    let mut source: Option<PathBuf> = None;
    let mut dest: Option<PathBuf> = None;
    let mut perf = false;
    let mut direct = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--source" => {
                i += 1;
                if i < args.len() { source = Some(PathBuf::from(&args[i])); }
            }
            "--dest" => {
                i += 1;
                if i < args.len() { dest = Some(PathBuf::from(&args[i])); }
            }
            "--perf" => perf = true,
            "--direct" => direct = true,
            _ => {}
        }
        i += 1;
    }
    Some(BuildArgs { source: source?,
                     dest: dest?,
                     perf,
                     direct })
}

fn summary_line(run_id: &uuid::Uuid, snapshots: usize, dest: &Path) -> String {
    format!("build ok: run={run_id} snapshots={snapshots} dest={}", dest.display())
}

fn blog_steps() -> Vec<Step> {
    vec![stamp(StampParams { site: "stepscope".into(),
                             ..Default::default() }),
         markdown(),
         collections(CollectionParams { name: "posts".into(),
                                        prefix: "posts/".into() })]
}

#[tokio::main]
async fn main() {
    // Cargar .env si existe
    let _ = dotenvy::dotenv();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args[1] != "build" {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }
    let Some(build) = parse_build_args(&args[2..]) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let config = UiConfig::from_env();
    if capture::install(config.log_level).is_err() {
        eprintln!("[scope build] logger ya instalado; la captura queda inactiva");
    }
    let mut options = config.patch_options();
    options.perf |= build.perf;

    let files = match read_dir_files(&build.source).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("[scope build] source error: {e}");
            std::process::exit(3);
        }
    };

    let ui = DebugUi::builder(options).assets(Arc::new(DirAssets::new(config.client_dir.clone())))
                                      .build();
    let mut pipeline = SequentialPipeline::with_writer(files,
                                                       scope_core::Node::default(),
                                                       Arc::new(DirWriter::new(&build.dest)));

    let result = if build.direct {
        for step in blog_steps() {
            let name = step.name().unwrap_or("step").to_string();
            pipeline.push_step(step);
            pipeline.push_step(ui.report(name));
        }
        pipeline.build().await.map(|_| ()).map_err(|e| e.to_string())
    } else {
        for step in blog_steps() {
            pipeline.push_step(step);
        }
        let mut patched = ui.patch(pipeline);
        patched.build().await.map(|_| ()).map_err(|e| e.to_string())
    };

    match result {
        Ok(()) => {
            info!(target: "scope:cli", "{}", summary_line(&ui.run_id(), ui.history().snapshot_count(), &build.dest));
        }
        Err(e) => {
            eprintln!("[scope build] error: {e}");
            std::process::exit(4);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_required_and_optional_flags() {
        let parsed = parse_build_args(&args(&["--source", "site", "--dest", "out", "--perf"])).expect("args");
        assert_eq!(parsed,
                   BuildArgs { source: PathBuf::from("site"),
                               dest: PathBuf::from("out"),
                               perf: true,
                               direct: false });
    }

    #[test]
    fn missing_dest_is_rejected() {
        assert!(parse_build_args(&args(&["--source", "site", "--direct"])).is_none());
        assert!(parse_build_args(&args(&["--source"])).is_none());
    }

    #[test]
    fn summary_names_run_and_destination() {
        let id = uuid::Uuid::nil();
        assert_eq!(summary_line(&id, 3, Path::new("out")),
                   "build ok: run=00000000-0000-0000-0000-000000000000 snapshots=3 dest=out");
    }

    #[test]
    fn blog_steps_are_named() {
        let names: Vec<_> = blog_steps().iter().map(|s| s.name().map(str::to_string)).collect();
        assert_eq!(names,
                   vec![Some("stamp".to_string()), Some("markdown".to_string()), Some("collections".to_string())]);
    }
}
