use log::warn;
use scope_core::{Step, StepCtx, StepError};

/// Step que siempre falla con `message`.
pub fn fail(message: impl Into<String>) -> Step {
    let message = message.into();
    Step::sync(move |_ctx: &StepCtx| {
        warn!("failing on purpose");
        Err(StepError::failed(message.clone()))
    }).named("fail")
}
