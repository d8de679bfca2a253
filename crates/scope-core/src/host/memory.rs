use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use log::debug;
use parking_lot::Mutex;

use super::{AssetSource, OutputWriter, Pipeline};
use crate::errors::HostError;
use crate::model::{contents_of, Files, Metadata};
use crate::step::{Step, StepCtx};

/// Writer en memoria: guarda el último contenido escrito por ruta.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    written: Mutex<IndexMap<String, Vec<u8>>>,
    journal: Mutex<Vec<String>>, // cada ruta escrita, en orden, con repeticiones
    calls: AtomicUsize,
}

impl MemoryWriter {
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.written.lock().get(path).cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        self.written.lock().keys().cloned().collect()
    }

    /// Veces que se escribió `path`.
    pub fn times_written(&self, path: &str) -> usize {
        self.journal.lock().iter().filter(|p| p.as_str() == path).count()
    }

    pub fn write_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OutputWriter for MemoryWriter {
    async fn write(&self, files: Files) -> Result<(), HostError> {
        let entries = files.entries();
        let mut written = self.written.lock();
        let mut journal = self.journal.lock();
        for (path, record) in entries {
            written.insert(path.clone(), contents_of(&record).unwrap_or_default());
            journal.push(path);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Bundle del visor fijo en memoria.
#[derive(Debug, Clone, Default)]
pub struct StaticAssets {
    files: Vec<(String, Vec<u8>)>,
}

impl StaticAssets {
    pub fn new(files: Vec<(String, Vec<u8>)>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl AssetSource for StaticAssets {
    async fn load(&self) -> Result<Vec<(String, Vec<u8>)>, HostError> {
        Ok(self.files.clone())
    }
}

/// Anfitrión mínimo: ejecuta los steps en orden, aborta en el primer fallo
/// y al final escribe todos los artifacts con su writer.
pub struct SequentialPipeline {
    files: Files,
    metadata: Metadata,
    steps: Vec<Step>,
    writer: Arc<dyn OutputWriter>,
}

impl SequentialPipeline {
    pub fn new(files: Files, metadata: Metadata) -> Self {
        Self::with_writer(files, metadata, Arc::new(MemoryWriter::default()))
    }

    pub fn with_writer(files: Files, metadata: Metadata, writer: Arc<dyn OutputWriter>) -> Self {
        Self { files,
               metadata,
               steps: Vec::new(),
               writer }
    }

    /// Añade un step al final (estilo builder).
    pub fn use_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push_step(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn files(&self) -> &Files {
        &self.files
    }
}

#[async_trait]
impl Pipeline for SequentialPipeline {
    fn take_steps(&mut self) -> Vec<Step> {
        std::mem::take(&mut self.steps)
    }

    fn set_steps(&mut self, steps: Vec<Step>) {
        self.steps = steps;
    }

    fn metadata(&self) -> Metadata {
        self.metadata.clone()
    }

    fn writer(&self) -> Arc<dyn OutputWriter> {
        Arc::clone(&self.writer)
    }

    async fn build(&mut self) -> Result<Files, HostError> {
        let ctx = StepCtx::new(self.files.clone(), self.metadata.clone(), Arc::clone(&self.writer));
        for (idx, step) in self.steps.iter().enumerate() {
            debug!("run step {idx} ({:?})", step.name());
            step.invoke(ctx.clone()).await?;
        }
        self.writer.write(self.files.clone()).await?;
        Ok(self.files.clone())
    }
}
