use scope_core::DebugUiError;
use scope_persistence::PersistenceError;
use thiserror::Error;

/// Errores de la demo y de los binarios de la fachada.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("Error del pipeline instrumentado: {0}")]
    Ui(#[from] DebugUiError),
    #[error("Error de persistencia: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("Error serializando el resumen: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ui_variant_format() {
        let err: DemoError = DebugUiError::AlreadyRan.into();
        assert_eq!(err.to_string(), "Error del pipeline instrumentado: patched build already ran for this run context");
    }

    #[test]
    fn persistence_variant_from() {
        let err: DemoError = PersistenceError::InvalidPath("../x".into()).into();
        assert_eq!(err.to_string(), "Error de persistencia: invalid output path: ../x");
    }
}
