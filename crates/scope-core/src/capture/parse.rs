//! Limpieza y parseo de líneas de log con forma `<plugin> <mensaje> <elapsed>`.
use std::borrow::Cow;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::LogEntry;

static ANSI: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]").expect("ansi pattern"));

// primer token, contenido intermedio, último token
static LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\S*)\s(.*)\s(\S*)$").expect("line pattern"));

/// Elimina secuencias de color/formato de terminal.
pub fn strip_ansi(input: &str) -> Cow<'_, str> {
    ANSI.replace_all(input, "")
}

/// Divide una línea limpia en `(plugin, message, elapsed)`. Si no encaja, la
/// línea completa queda como mensaje y los otros campos vacíos.
pub fn parse_line(clean: &str) -> (String, String, String) {
    match LINE.captures(clean) {
        Some(caps) => {
            let field = |i: usize| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();
            (field(1), field(2), field(3))
        }
        None => (String::new(), clean.to_string(), String::new()),
    }
}

/// Hora del día ISO-8601 con milisegundos, sin fecha (`HH:MM:SS.mmm`).
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.format("%H:%M:%S%.3f").to_string()
}

/// Entrada de log a partir de la línea cruda (con o sin códigos ANSI).
pub fn entry_from_line(raw: &str, now: DateTime<Utc>) -> LogEntry {
    let clean = strip_ansi(raw);
    let (plugin, message, elapsed) = parse_line(&clean);
    LogEntry { timestamp: timestamp(now),
               plugin,
               message,
               elapsed }
}
