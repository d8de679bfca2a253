//! stepscope
//!
//! Fachada del workspace:
//! - `scope_core`: serializador de snapshots, historial, captura de logs y wrapper.
//! - `scope_persistence`: writer/lector de directorios, visor incluido y configuración.
//! - `scope_adapters`: steps de ejemplo.
//!
//! `demo` arma un pipeline en memoria con los tres estilos de step y lo
//! ejecuta instrumentado; lo usa el binario `main-demo`.

pub mod demo;
pub mod errors;

pub use errors::DemoError;
pub use scope_adapters as adapters;
pub use scope_core::{capture, patch, DebugUi, DebugUiError, HistoryDocument, PatchOptions, Patched, Pipeline, Step,
                     StepCtx, StepError};
pub use scope_persistence as persistence;
