use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;

use super::completion::{Completion, Done, StepFuture, StepResult};
use super::context::StepCtx;
use crate::errors::StepError;
use crate::hashing::hash_str;

type SyncFn = dyn Fn(&StepCtx) -> StepResult + Send + Sync;
type CallbackFn = dyn Fn(&StepCtx, Done) + Send + Sync;
type FutureFn = dyn Fn(StepCtx) -> StepFuture + Send + Sync;

/// Cuerpo de un step según su estilo de finalización.
#[derive(Clone)]
pub enum StepFn {
    /// Termina al retornar.
    Sync(Arc<SyncFn>),
    /// Termina cuando invoca el `Done` recibido.
    Callback(Arc<CallbackFn>),
    /// Termina cuando resuelve el future devuelto.
    Future(Arc<FutureFn>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStyle { Sync, Callback, Future }

/// Step del pipeline: una transformación sobre artifacts + metadata.
#[derive(Clone)]
pub struct Step {
    name: Option<String>,
    type_name: &'static str,
    body: StepFn,
    instrumentation: bool,
}

impl Step {
    pub fn sync<F>(f: F) -> Self
        where F: Fn(&StepCtx) -> StepResult + Send + Sync + 'static
    {
        Self::from_parts(None, std::any::type_name::<F>(), StepFn::Sync(Arc::new(f)))
    }

    pub fn callback<F>(f: F) -> Self
        where F: Fn(&StepCtx, Done) + Send + Sync + 'static
    {
        Self::from_parts(None, std::any::type_name::<F>(), StepFn::Callback(Arc::new(f)))
    }

    pub fn future<F, Fut>(f: F) -> Self
        where F: Fn(StepCtx) -> Fut + Send + Sync + 'static,
              Fut: Future<Output = StepResult> + Send + 'static
    {
        let body: Arc<FutureFn> = Arc::new(move |ctx| f(ctx).boxed());
        Self::from_parts(None, std::any::type_name::<F>(), StepFn::Future(body))
    }

    pub(crate) fn from_parts(name: Option<String>, type_name: &'static str, body: StepFn) -> Self {
        Self { name,
               type_name,
               body,
               instrumentation: false }
    }

    /// Asigna el nombre visible del step.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Conserva nombre y tipo de otro step (el adaptador envuelve sin renombrar).
    pub(crate) fn with_identity(mut self, name: Option<String>, type_name: &'static str) -> Self {
        self.name = name;
        self.type_name = type_name;
        self
    }

    /// Marca el step como parte de la instrumentación (no genera snapshot propio).
    pub(crate) fn instrumentation(mut self) -> Self {
        self.instrumentation = true;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Nombre del tipo del cuerpo (p.ej. `scope_adapters::steps::markdown::{{closure}}`).
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Identificador estable del cuerpo del step (hash de su tipo).
    pub fn fingerprint(&self) -> String {
        hash_str(self.type_name)
    }

    pub fn style(&self) -> StepStyle {
        match self.body {
            StepFn::Sync(_) => StepStyle::Sync,
            StepFn::Callback(_) => StepStyle::Callback,
            StepFn::Future(_) => StepStyle::Future,
        }
    }

    pub fn is_instrumentation(&self) -> bool {
        self.instrumentation
    }

    /// Ejecuta el step bajo el contrato uniforme. Los panics se atrapan y se
    /// reportan como `StepError::Panicked`.
    pub fn invoke(&self, ctx: StepCtx) -> Completion {
        match &self.body {
            StepFn::Sync(f) => {
                let result = catch_unwind(AssertUnwindSafe(|| f(&ctx))).unwrap_or_else(|p| Err(panicked(p)));
                Completion::ready(result)
            }
            StepFn::Callback(f) => {
                let (done, rx) = Done::channel();
                match catch_unwind(AssertUnwindSafe(|| f(&ctx, done))) {
                    Ok(()) => Completion::from_callback(rx),
                    Err(p) => Completion::ready(Err(panicked(p))),
                }
            }
            StepFn::Future(f) => match catch_unwind(AssertUnwindSafe(|| f(ctx))) {
                Ok(fut) => {
                    let guarded = AssertUnwindSafe(fut).catch_unwind()
                                                       .map(|r| r.unwrap_or_else(|p| Err(panicked(p))));
                    Completion::from_future(guarded.boxed())
                }
                Err(p) => Completion::ready(Err(panicked(p))),
            },
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
         .field("name", &self.name)
         .field("type_name", &self.type_name)
         .field("style", &self.style())
         .field("instrumentation", &self.instrumentation)
         .finish()
    }
}

fn panicked(payload: Box<dyn std::any::Any + Send>) -> StepError {
    let msg = if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    };
    StepError::Panicked(msg)
}
