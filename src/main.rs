use std::path::PathBuf;
use std::sync::Arc;

use scope_persistence::{DirAssets, UiConfig};
use stepscope::capture;
use stepscope::demo::{export, run_demo, summary_json};

#[tokio::main]
async fn main() {
    // Cargar .env si existe
    let _ = dotenvy::dotenv();
    let config = UiConfig::from_env();
    if capture::install(config.log_level).is_err() {
        eprintln!("[main-demo] logger ya instalado");
    }

    let assets = Arc::new(DirAssets::new(config.client_dir.clone()));
    let run = match run_demo(config.patch_options(), Some(assets)).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("[main-demo] error: {e}");
            std::process::exit(4);
        }
    };

    // Uso: main-demo [DIR] -> además vuelca la salida a DIR
    if let Some(dir) = std::env::args().nth(1).map(PathBuf::from) {
        match export(&run.writer, &dir).await {
            Ok(n) => println!("exportados {n} ficheros a {}", dir.display()),
            Err(e) => {
                eprintln!("[main-demo] export error: {e}");
                std::process::exit(5);
            }
        }
    }

    match summary_json(&run.summary) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("[main-demo] error: {e}");
            std::process::exit(5);
        }
    }
}
