//! Definiciones relacionadas a Steps.
//!
//! Un Step es una transformación aplicada en secuencia sobre la colección de
//! artifacts y la metadata compartida. Este módulo define:
//! - `Step` / `StepFn`: los tres estilos de finalización (sync, callback, future).
//! - `Completion` / `Done`: el contrato uniforme del que depende el resto del core.
//! - `StepCtx`: lo que el anfitrión entrega a cada step.

mod completion;
mod context;
mod definition;

pub use completion::{Completion, Done, StepFuture, StepResult};
pub use context::StepCtx;
pub use definition::{Step, StepFn, StepStyle};
