//! scope-adapters: steps de ejemplo para pipelines instrumentados.
//!
//! Cubren los tres estilos de finalización del core:
//! - `stamp` (síncrono): escribe parámetros en la metadata global.
//! - `markdown` (callback): `.md` -> `.html` con front-matter.
//! - `collections` (future): agrupa artifacts en la metadata, con alias y ciclos.
//! - `fail` (síncrono): falla siempre; útil para probar fail-fast.

pub mod steps;

pub use steps::{collections, fail, markdown, stamp, CollectionParams, StampParams};
