//! Logger de proceso que captura cada registro del facade `log`.
//!
//! Cada registro se formatea como `<target> <mensaje> +<N>ms` (N = tiempo desde
//! el registro anterior del mismo target), se agrega limpio al historial de la
//! ejecución enlazada y se escribe siempre, sin modificar, en stdout.
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};

use super::parse::entry_from_line;
use crate::history::HistoryStore;

static LOGGER: Lazy<CaptureLogger> = Lazy::new(CaptureLogger::default);
static ACTIVE: AtomicBool = AtomicBool::new(false);

#[derive(Default)]
pub struct CaptureLogger {
    sink: RwLock<Option<Arc<HistoryStore>>>,
    last_seen: Mutex<HashMap<String, Instant>>,
}

impl CaptureLogger {
    fn elapsed_since_last(&self, target: &str) -> String {
        let now = Instant::now();
        let previous = self.last_seen.lock().insert(target.to_string(), now);
        let ms = previous.map(|p| now.duration_since(p).as_millis()).unwrap_or(0);
        format!("+{ms}ms")
    }

    fn capture(&self, raw: &str) {
        let sink = self.sink.read().clone();
        match sink {
            Some(store) => record_line(&store, raw),
            None => passthrough(raw),
        }
    }
}

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let raw = format!("{} {} {}", record.target(), record.args(), self.elapsed_since_last(record.target()));
        self.capture(&raw);
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

/// Instala el logger de captura como logger del proceso.
pub fn install(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&*LOGGER)?;
    log::set_max_level(level);
    ACTIVE.store(true, Ordering::SeqCst);
    Ok(())
}

/// Instala con nivel `Info` si nadie lo hizo antes. Devuelve `false` si el
/// proceso ya tiene otro logger (la captura queda inactiva).
pub fn ensure_installed() -> bool {
    if is_active() {
        return true;
    }
    install(LevelFilter::Info).is_ok() || is_active()
}

pub fn is_active() -> bool {
    ACTIVE.load(Ordering::SeqCst)
}

/// Enlaza el historial que recibirá las líneas capturadas. Reemplaza al anterior.
pub fn attach(store: Arc<HistoryStore>) {
    *LOGGER.sink.write() = Some(store);
}

/// Desenlaza `store` si sigue siendo el historial activo.
pub fn detach(store: &Arc<HistoryStore>) {
    let mut sink = LOGGER.sink.write();
    if sink.as_ref().is_some_and(|s| Arc::ptr_eq(s, store)) {
        *sink = None;
    }
}

/// Agrega la línea al historial y la reenvía a stdout.
pub fn record_line(store: &HistoryStore, raw: &str) {
    store.push_log(entry_from_line(raw, Utc::now()));
    passthrough(raw);
}

fn passthrough(raw: &str) {
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{raw}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_line_keeps_raw_on_stdout_and_clean_in_history() {
        let store = HistoryStore::new();
        record_line(&store, "\u{1b}[32mscope:test\u{1b}[0m hello world +0ms");
        let doc = store.document();
        assert_eq!(doc.log.len(), 1);
        assert_eq!(doc.log[0].plugin, "scope:test");
        assert_eq!(doc.log[0].message, "hello world");
        assert_eq!(doc.log[0].elapsed, "+0ms");
    }

    #[test]
    fn elapsed_is_tracked_per_target() {
        let logger = CaptureLogger::default();
        assert_eq!(logger.elapsed_since_last("a"), "+0ms");
        assert!(logger.elapsed_since_last("a").starts_with('+'));
        assert_eq!(logger.elapsed_since_last("b"), "+0ms");
    }
}
