//! Interceptor de logs: captura cada línea en el historial sin suprimir stdout.

mod logger;
mod parse;

pub use logger::{attach, detach, ensure_installed, install, is_active, record_line, CaptureLogger};
pub use parse::{entry_from_line, parse_line, strip_ansi, timestamp};
