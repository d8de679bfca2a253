//! Frontera con el pipeline anfitrión.
//!
//! El anfitrión (ciclo de vida, lectura de ficheros, ejecución de steps) es
//! externo; aquí sólo se fija su interfaz:
//! - `Pipeline`: lista de steps mutable + runner nativo.
//! - `OutputWriter`: primitiva de escritura del conjunto de salida.
//! - `AssetSource`: origen de los ficheros estáticos del visor.
//!
//! `SequentialPipeline`, `MemoryWriter` y `StaticAssets` son implementaciones
//! en memoria usadas por la demo y los tests.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::HostError;
use crate::model::{Files, Metadata};
use crate::step::Step;

pub use memory::{MemoryWriter, SequentialPipeline, StaticAssets};

/// Escritura en el conjunto de salida: ruta -> registro con `contents`.
#[async_trait]
pub trait OutputWriter: Send + Sync {
    async fn write(&self, files: Files) -> Result<(), HostError>;
}

/// Ficheros estáticos del visor como `(nombre, bytes)`.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn load(&self) -> Result<Vec<(String, Vec<u8>)>, HostError>;
}

/// Pipeline anfitrión.
#[async_trait]
pub trait Pipeline: Send {
    /// Extrae la lista de steps (queda vacía).
    fn take_steps(&mut self) -> Vec<Step>;

    /// Reemplaza la lista de steps.
    fn set_steps(&mut self, steps: Vec<Step>);

    fn metadata(&self) -> Metadata;

    fn writer(&self) -> Arc<dyn OutputWriter>;

    /// Runner nativo: ejecuta los steps en orden y decide qué hacer ante un fallo.
    async fn build(&mut self) -> Result<Files, HostError>;
}
