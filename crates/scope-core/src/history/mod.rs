//! Historial de una ejecución: log capturado + snapshots por step.

mod store;

pub use store::{display_name, HistoryStore};
