//! Estado de una ejecución instrumentada.
//!
//! Transiciones de fase válidas:
//! - `Idle` -> `Running` (al iniciar el build parcheado)
//! - `Running` -> `Done`
//!
//! Una segunda ejecución sobre el mismo contexto se rechaza.
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::errors::DebugUiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Done,
}

/// Flags de la ejecución. Todos son de un solo sentido: una vez en `true`
/// no vuelven a `false` dentro de la ejecución.
#[derive(Debug)]
pub struct RunState {
    patched: AtomicBool,
    client_written: AtomicBool,
    plugin_error: AtomicBool,
    phase: Mutex<RunPhase>,
}

impl Default for RunState {
    fn default() -> Self {
        Self { patched: AtomicBool::new(false),
               client_written: AtomicBool::new(false),
               plugin_error: AtomicBool::new(false),
               phase: Mutex::new(RunPhase::Idle) }
    }
}

impl RunState {
    /// Marca el wrapper como instalado. `true` sólo la primera vez.
    pub fn mark_patched(&self) -> bool {
        !self.patched.swap(true, Ordering::SeqCst)
    }

    pub fn is_patched(&self) -> bool {
        self.patched.load(Ordering::SeqCst)
    }

    /// Reclama la publicación del visor (compare-and-set). `true` sólo para
    /// el primer llamador.
    pub fn claim_client(&self) -> bool {
        self.client_written
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn client_written(&self) -> bool {
        self.client_written.load(Ordering::SeqCst)
    }

    pub fn set_error(&self) {
        self.plugin_error.store(true, Ordering::SeqCst);
    }

    pub fn has_error(&self) -> bool {
        self.plugin_error.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> RunPhase {
        *self.phase.lock()
    }

    pub(crate) fn begin(&self) -> Result<(), DebugUiError> {
        let mut phase = self.phase.lock();
        match *phase {
            RunPhase::Idle => {
                *phase = RunPhase::Running;
                Ok(())
            }
            RunPhase::Running | RunPhase::Done => Err(DebugUiError::AlreadyRan),
        }
    }

    pub(crate) fn finish(&self) {
        *self.phase.lock() = RunPhase::Done;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_one_way() {
        let s = RunState::default();
        assert!(s.mark_patched());
        assert!(!s.mark_patched());
        assert!(s.claim_client());
        assert!(!s.claim_client());
        assert!(!s.has_error());
        s.set_error();
        s.set_error();
        assert!(s.has_error());
    }

    #[test]
    fn phase_rejects_second_run() {
        let s = RunState::default();
        assert_eq!(s.phase(), RunPhase::Idle);
        s.begin().expect("first run");
        assert!(matches!(s.begin(), Err(DebugUiError::AlreadyRan)));
        s.finish();
        assert_eq!(s.phase(), RunPhase::Done);
        assert!(matches!(s.begin(), Err(DebugUiError::AlreadyRan)));
    }
}
