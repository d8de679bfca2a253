//! Instalación del wrapper y ciclo de una ejecución instrumentada.
//!
//! `DebugUi` es el contexto de la ejecución, `Patched` el pipeline con los
//! steps adaptados y `perf` la medición opcional de latencia.

pub mod core;
pub mod patched;
pub mod perf;
pub mod state;

pub use self::core::{patch, DebugUi, DebugUiBuilder, PatchOptions};
pub use patched::Patched;
pub use perf::{ConventionResolver, NameResolver, PerfSample, PerfTimers};
pub use state::{RunPhase, RunState};
