//! Errores de persistencia.
//! Mapea errores de I/O del sistema de ficheros a variantes semánticas y,
//! en la frontera con el core, a `HostError`.

use std::io;
use std::path::{Path, PathBuf};

use scope_core::HostError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("invalid output path: {0}")]
    InvalidPath(String),
    #[error("viewer directory not found: {0}")]
    MissingClient(PathBuf),
    #[error("background read task failed: {0}")]
    Join(String),
}

impl PersistenceError {
    pub fn read(path: &Path, source: io::Error) -> Self {
        Self::Read { path: path.to_path_buf(),
                     source }
    }

    pub fn write(path: &Path, source: io::Error) -> Self {
        Self::Write { path: path.to_path_buf(),
                      source }
    }
}

impl From<PersistenceError> for HostError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Write { .. } | PersistenceError::InvalidPath(_) => HostError::Write(err.to_string()),
            PersistenceError::Read { .. } | PersistenceError::MissingClient(_) | PersistenceError::Join(_) => {
                HostError::Read(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_host_error_by_direction() {
        let w = PersistenceError::write(Path::new("out/a"), io::Error::new(io::ErrorKind::Other, "full"));
        assert!(matches!(HostError::from(w), HostError::Write(ref m) if m.contains("out/a")));

        let r: HostError = PersistenceError::MissingClient(PathBuf::from("nowhere")).into();
        assert_eq!(r, HostError::Read("viewer directory not found: nowhere".into()));

        let p: HostError = PersistenceError::InvalidPath("../x".into()).into();
        assert!(matches!(p, HostError::Write(_)));
    }
}
