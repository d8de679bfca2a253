//! Contrato de finalización uniforme.
//!
//! Un step puede terminar de tres formas (retorno síncrono, callback o
//! future). `Completion` las normaliza: es un future que resuelve una única
//! vez con `Ok(())` o con el error del step.
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tokio::sync::oneshot;

use crate::errors::StepError;

pub type StepResult = Result<(), StepError>;
pub type StepFuture = BoxFuture<'static, StepResult>;

/// Callback de finalización entregado a los steps de estilo callback.
/// Consumirlo garantiza que se señaliza como mucho una vez.
#[derive(Debug)]
pub struct Done {
    tx: oneshot::Sender<StepResult>,
}

impl Done {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<StepResult>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    pub fn call(self, result: StepResult) {
        // si el receptor ya no existe, nadie espera el resultado
        let _ = self.tx.send(result);
    }

    pub fn ok(self) {
        self.call(Ok(()));
    }

    pub fn err(self, error: impl Into<StepError>) {
        self.call(Err(error.into()));
    }
}

/// Señal de finalización de un step.
pub struct Completion {
    inner: StepFuture,
}

impl Completion {
    pub fn ready(result: StepResult) -> Self {
        Self { inner: Box::pin(futures::future::ready(result)) }
    }

    pub fn from_future(fut: StepFuture) -> Self {
        Self { inner: fut }
    }

    /// Espera el callback; si el step suelta `Done` sin llamarlo, falla con
    /// `StepError::Abandoned` en lugar de quedar colgado.
    pub(crate) fn from_callback(rx: oneshot::Receiver<StepResult>) -> Self {
        Self::from_future(Box::pin(async move { rx.await.unwrap_or(Err(StepError::Abandoned)) }))
    }
}

impl Future for Completion {
    type Output = StepResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn callback_resolves_once_with_its_value() {
        let (done, rx) = Done::channel();
        done.err(StepError::failed("nope"));
        assert_eq!(Completion::from_callback(rx).await, Err(StepError::Failed("nope".into())));
    }

    #[tokio::test]
    async fn dropped_callback_is_abandoned() {
        let (done, rx) = Done::channel();
        drop(done);
        assert_eq!(Completion::from_callback(rx).await, Err(StepError::Abandoned));
    }

    #[test]
    fn ready_completion_resolves_immediately() {
        let out = tokio_test::block_on(Completion::ready(Ok(())));
        assert_eq!(out, Ok(()));
    }

    #[test]
    fn callback_completion_stays_pending_until_signalled() {
        let (done, rx) = Done::channel();
        let mut pending = tokio_test::task::spawn(Completion::from_callback(rx));
        tokio_test::assert_pending!(pending.poll());
        done.ok();
        assert!(pending.is_woken());
        tokio_test::assert_ready_eq!(pending.poll(), Ok(()));
    }
}
