//! scope-core: instrumentación de pipelines de build por steps.
//!
//! Envuelve cada step del pipeline anfitrión, registra un snapshot del
//! estado (artifacts + metadata) tras cada step exitoso, captura los logs del
//! proceso y persiste todo en `debug-ui/data.json` para el visor.
pub mod capture;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod hashing;
pub mod history;
pub mod host;
pub mod model;
pub mod render;
pub mod step;

pub use engine::{patch, DebugUi, DebugUiBuilder, NameResolver, PatchOptions, Patched, PerfSample, RunPhase, RunState};
pub use errors::{DebugUiError, HostError, StepError};
pub use history::HistoryStore;
pub use host::{AssetSource, MemoryWriter, OutputWriter, Pipeline, SequentialPipeline, StaticAssets};
pub use model::{artifact, contents_of, Fields, Files, HistoryDocument, LogEntry, Metadata, Node, SnapshotRecord, Value};
pub use render::{build_tree, serialize, serialize_map};
pub use step::{Completion, Done, Step, StepCtx, StepResult, StepStyle};
