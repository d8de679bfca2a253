//! `DebugUi`: contexto de una ejecución instrumentada.
//!
//! Agrupa el historial, los flags de la ejecución, el origen de los assets
//! del visor y la instrumentación de latencia. Se construye uno nuevo por
//! ejecución; nada de esto es estado global del proceso salvo el logger de
//! captura, que apunta al historial del contexto vivo más reciente.
use std::fmt;
use std::io::{self, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::patched::Patched;
use super::perf::{ConventionResolver, NameResolver, PerfSample, PerfTimers};
use super::state::RunState;
use crate::capture;
use crate::constants::{CLIENT_DIR, DATA_PATH};
use crate::errors::{DebugUiError, StepError};
use crate::history::{display_name, HistoryStore};
use crate::host::{AssetSource, OutputWriter, Pipeline};
use crate::model::{artifact, Files, HistoryDocument, Metadata, Node};
use crate::step::{Step, StepCtx, StepResult};

/// Configuración reconocida por la instalación.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOptions {
    /// Mide la latencia de cada step y la reporta por stdout.
    #[serde(default)]
    pub perf: bool,
}

pub(crate) struct RunContext {
    pub(crate) run_id: Uuid,
    pub(crate) options: PatchOptions,
    pub(crate) state: RunState,
    pub(crate) history: Arc<HistoryStore>,
    assets: Option<Arc<dyn AssetSource>>,
    resolver: Arc<dyn NameResolver>,
    timers: PerfTimers,
    perf: Mutex<Vec<PerfSample>>,
}

impl RunContext {
    /// Ejecuta un step del usuario bajo el adaptador: fail-fast, latencia y snapshot.
    pub(crate) async fn run_adapted(&self, step: &Step, ctx: StepCtx) -> StepResult {
        if self.state.has_error() {
            debug!("skip {} after an earlier failure", display_name(step.name()));
            return Ok(());
        }

        let fingerprint = self.options.perf.then(|| {
                                                let fp = step.fingerprint();
                                                self.timers.start(&fp);
                                                fp
                                            });

        let outcome = step.invoke(ctx.clone()).await;

        if let Some(fp) = fingerprint {
            self.record_perf(step, fp);
        }

        match outcome {
            Ok(()) => {
                self.history.record(step.name(), &ctx.files, &ctx.metadata);
                Ok(())
            }
            Err(err) => {
                self.state.set_error();
                warn!("step {} failed: {err}", display_name(step.name()));
                Err(err)
            }
        }
    }

    /// Steps de instrumentación (`report`): mismo fail-fast, sin snapshot extra
    /// ni medición.
    pub(crate) async fn run_instrumentation(&self, step: &Step, ctx: StepCtx) -> StepResult {
        if self.state.has_error() {
            debug!("skip {} after an earlier failure", display_name(step.name()));
            return Ok(());
        }
        let outcome = step.invoke(ctx).await;
        if let Err(err) = &outcome {
            self.state.set_error();
            warn!("instrumentation step {} failed: {err}", display_name(step.name()));
        }
        outcome
    }

    fn record_perf(&self, step: &Step, fingerprint: String) {
        let Some(elapsed) = self.timers.stop(&fingerprint) else {
            return;
        };
        let name = catch_unwind(AssertUnwindSafe(|| self.resolver.resolve(step))).ok().flatten();
        let sample = PerfSample { fingerprint,
                                  name,
                                  elapsed_ms: elapsed.as_secs_f64() * 1000.0 };
        if let Err(e) = writeln!(io::stdout().lock(), "{}", sample.line()) {
            debug!("perf line not written: {e}");
        }
        self.perf.lock().push(sample);
    }

    /// Cuerpo del step `report`: snapshot, persistencia directa si no hay
    /// wrapper, y publicación única del visor.
    pub(crate) async fn report(&self, name: &str, ctx: &StepCtx) -> Result<(), DebugUiError> {
        self.history.record(Some(name), &ctx.files, &ctx.metadata);
        if !self.state.is_patched() {
            self.write_data(ctx.writer()).await?;
        }
        self.write_client(ctx.writer()).await
    }

    /// Escribe el documento de historial en `debug-ui/data.json`.
    pub(crate) async fn write_data(&self, writer: &Arc<dyn OutputWriter>) -> Result<(), DebugUiError> {
        debug!("writing data to build");
        let bytes = self.history.to_json_bytes()?;
        let out: Files = Node::default();
        out.insert(DATA_PATH, artifact(bytes));
        writer.write(out).await?;
        Ok(())
    }

    /// Copia los assets del visor a `debug-ui/`, una sola vez por ejecución.
    pub(crate) async fn write_client(&self, writer: &Arc<dyn OutputWriter>) -> Result<(), DebugUiError> {
        if !self.state.claim_client() {
            return Ok(());
        }
        let Some(assets) = self.assets.as_ref() else {
            debug!("no viewer assets configured");
            return Ok(());
        };
        let loaded = assets.load().await.map_err(|e| DebugUiError::Assets(e.to_string()))?;
        let out: Files = Node::default();
        for (name, bytes) in loaded {
            let path = format!("{CLIENT_DIR}/{name}");
            debug!("{path}");
            out.insert(path, artifact(bytes));
        }
        writer.write(out).await?;
        Ok(())
    }
}

impl Drop for RunContext {
    fn drop(&mut self) {
        capture::detach(&self.history);
    }
}

/// Handle a la ejecución instrumentada. Clonar comparte el mismo contexto.
#[derive(Clone)]
pub struct DebugUi {
    pub(crate) run: Arc<RunContext>,
}

impl DebugUi {
    /// Contexto nuevo con captura de logs y sin assets de visor.
    pub fn new(options: PatchOptions) -> Self {
        Self::builder(options).build()
    }

    pub fn builder(options: PatchOptions) -> DebugUiBuilder {
        DebugUiBuilder { options,
                         assets: None,
                         resolver: None,
                         capture_logs: true }
    }

    pub fn run_id(&self) -> Uuid {
        self.run.run_id
    }

    pub fn options(&self) -> PatchOptions {
        self.run.options
    }

    pub fn state(&self) -> &RunState {
        &self.run.state
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.run.history
    }

    /// Copia del documento de historial acumulado.
    pub fn document(&self) -> HistoryDocument {
        self.run.history.document()
    }

    pub fn perf_samples(&self) -> Vec<PerfSample> {
        self.run.perf.lock().clone()
    }

    /// Entrada de log directa al visor (además de stdout).
    pub fn log(&self, args: fmt::Arguments<'_>) {
        capture::record_line(&self.run.history, &args.to_string());
    }

    /// Instala el wrapper sobre `pipeline`. Instalar dos veces con el mismo
    /// contexto no cambia nada.
    pub fn patch<P: Pipeline>(&self, pipeline: P) -> Patched<P> {
        if self.run.state.mark_patched() {
            debug!("patched build fn (run {})", self.run.run_id);
        } else {
            debug!("already patched, keeping current wrapper");
        }
        Patched::new(pipeline, self.clone())
    }

    /// Step independiente que registra un snapshot con `name`. Usable con o
    /// sin wrapper; sin wrapper persiste el historial en cada invocación.
    pub fn report(&self, name: impl Into<String>) -> Step {
        let run = Arc::clone(&self.run);
        let name: String = name.into();
        let label = name.clone();
        Step::future(move |ctx: StepCtx| {
            let run = Arc::clone(&run);
            let name = name.clone();
            async move { run.report(&name, &ctx).await.map_err(StepError::from) }
        }).named(label)
          .instrumentation()
    }

    /// Persiste el documento ahora mismo (útil fuera de un build).
    pub async fn persist(&self, writer: &Arc<dyn OutputWriter>) -> Result<(), DebugUiError> {
        self.run.write_data(writer).await
    }

    /// Snapshot manual del estado dado.
    pub fn snapshot(&self, name: Option<&str>, files: &Files, metadata: &Metadata) -> usize {
        self.run.history.record(name, files, metadata)
    }
}

impl fmt::Debug for DebugUi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugUi")
         .field("run_id", &self.run.run_id)
         .field("options", &self.run.options)
         .field("state", &self.run.state)
         .finish_non_exhaustive()
    }
}

/// Builder de `DebugUi`.
pub struct DebugUiBuilder {
    options: PatchOptions,
    assets: Option<Arc<dyn AssetSource>>,
    resolver: Option<Arc<dyn NameResolver>>,
    capture_logs: bool,
}

impl DebugUiBuilder {
    /// Origen de los ficheros estáticos del visor.
    pub fn assets(mut self, assets: Arc<dyn AssetSource>) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn NameResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Si `false`, el logger de proceso no se instala ni se enlaza.
    pub fn capture_logs(mut self, enabled: bool) -> Self {
        self.capture_logs = enabled;
        self
    }

    pub fn build(self) -> DebugUi {
        let history = Arc::new(HistoryStore::new());
        if self.capture_logs && capture::ensure_installed() {
            capture::attach(Arc::clone(&history));
        }
        let run = RunContext { run_id: Uuid::new_v4(),
                               options: self.options,
                               state: RunState::default(),
                               history,
                               assets: self.assets,
                               resolver: self.resolver
                                             .unwrap_or_else(|| Arc::new(ConventionResolver::default()) as Arc<dyn NameResolver>),
                               timers: PerfTimers::default(),
                               perf: Mutex::new(Vec::new()) };
        DebugUi { run: Arc::new(run) }
    }
}

/// Atajo: contexto nuevo + wrapper instalado sobre `pipeline`.
pub fn patch<P: Pipeline>(pipeline: P, options: PatchOptions) -> Patched<P> {
    DebugUi::new(options).patch(pipeline)
}
