use std::fmt;
use std::sync::Arc;

use crate::errors::HostError;
use crate::host::OutputWriter;
use crate::model::{Files, Metadata};

/// Lo que el anfitrión entrega a cada step: artifacts, metadata y la
/// primitiva de escritura del conjunto de salida. Clonar es barato (handles).
#[derive(Clone)]
pub struct StepCtx {
    pub files: Files,
    pub metadata: Metadata,
    writer: Arc<dyn OutputWriter>,
}

impl StepCtx {
    pub fn new(files: Files, metadata: Metadata, writer: Arc<dyn OutputWriter>) -> Self {
        Self { files,
               metadata,
               writer }
    }

    pub fn writer(&self) -> &Arc<dyn OutputWriter> {
        &self.writer
    }

    /// Escribe `out` en el conjunto de salida del anfitrión.
    pub async fn write(&self, out: Files) -> Result<(), HostError> {
        self.writer.write(out).await
    }
}

impl fmt::Debug for StepCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepCtx")
         .field("files", &self.files.len())
         .field("metadata", &self.metadata.len())
         .finish_non_exhaustive()
    }
}
