//! Pipeline con el wrapper instalado.
//!
//! `build` reemplaza la lista de steps por adaptadores que conservan nombre y
//! tipo del pipeline envuelto, añade un step final de persistencia y delega en el
//! `build` del host. Con fail-fast, un step que falla deja de propagar
//! snapshots y los siguientes adaptadores no ejecutan su step.
use std::fmt;
use std::sync::Arc;

use log::debug;

use super::core::{DebugUi, RunContext};
use crate::errors::{DebugUiError, StepError};
use crate::host::Pipeline;
use crate::model::Files;
use crate::step::{Step, StepCtx};

pub struct Patched<P: Pipeline> {
    pipeline: P,
    ui: DebugUi,
}

impl<P: Pipeline> Patched<P> {
    pub(crate) fn new(pipeline: P, ui: DebugUi) -> Self {
        Self { pipeline, ui }
    }

    pub fn ui(&self) -> &DebugUi {
        &self.ui
    }

    pub fn inner(&self) -> &P {
        &self.pipeline
    }

    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.pipeline
    }

    pub fn into_inner(self) -> P {
        self.pipeline
    }

    /// Entrada de log redirigida al visor.
    pub fn log(&self, args: fmt::Arguments<'_>) {
        self.ui.log(args);
    }

    /// Step `report` ligado a esta ejecución.
    pub fn report(&self, name: impl Into<String>) -> Step {
        self.ui.report(name)
    }

    /// Ejecuta el build del host con cada step adaptado.
    ///
    /// # Errors
    ///
    /// `AlreadyRan` si el contexto ya ejecutó un build; cualquier error del
    /// host (incluido el primer fallo de un step) se propaga tal cual.
    pub async fn build(&mut self) -> Result<Files, DebugUiError> {
        let run = Arc::clone(&self.ui.run);
        run.state.begin()?;
        debug!("build called (run {})", run.run_id);

        let steps = self.pipeline.take_steps();
        debug!("masking {} steps", steps.len());
        let masked: Vec<Step> = steps.into_iter()
                                     .map(|step| adapt(&run, step))
                                     .chain(std::iter::once(persist_step(&run)))
                                     .collect();
        self.pipeline.set_steps(masked);

        let result = self.pipeline.build().await;
        run.state.finish();
        result.map_err(DebugUiError::from)
    }
}

impl<P: Pipeline + fmt::Debug> fmt::Debug for Patched<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patched").field("pipeline", &self.pipeline).field("ui", &self.ui).finish()
    }
}

/// Envuelve un step del usuario. Los de instrumentación sólo respetan el
/// fail-fast: no generan un segundo snapshot.
fn adapt(run: &Arc<RunContext>, step: Step) -> Step {
    let name = step.name().map(str::to_string);
    let type_name = step.type_name();
    let instrumentation = step.is_instrumentation();
    let run = Arc::clone(run);
    let adapted = Step::future(move |ctx: StepCtx| {
                      let run = Arc::clone(&run);
                      let step = step.clone();
                      async move {
                          if step.is_instrumentation() {
                              run.run_instrumentation(&step, ctx).await
                          } else {
                              run.run_adapted(&step, ctx).await
                          }
                      }
                  }).with_identity(name, type_name);
    if instrumentation {
        adapted.instrumentation()
    } else {
        adapted
    }
}

/// Step final: escribe `debug-ui/data.json` con el historial acumulado.
fn persist_step(run: &Arc<RunContext>) -> Step {
    let run = Arc::clone(run);
    Step::future(move |ctx: StepCtx| {
        let run = Arc::clone(&run);
        async move { run.write_data(ctx.writer()).await.map_err(StepError::from) }
    }).named("debug-ui")
      .instrumentation()
}
