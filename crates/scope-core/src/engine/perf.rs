//! Medición de latencia por step (best-effort).
//!
//! Ningún fallo aquí afecta el resultado real del step: si no se puede
//! identificar el componente, la muestra queda con `name: None`.
use std::backtrace::Backtrace;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use regex::Regex;
use serde::Serialize;

use crate::constants::COMPONENT_PREFIX;
use crate::step::Step;

/// Identifica el componente que aportó un step.
pub trait NameResolver: Send + Sync {
    fn resolve(&self, step: &Step) -> Option<String>;
}

/// Busca el primer crate que siga la convención de nombres (`scope_*`),
/// primero en el tipo del cuerpo del step y luego en la pila actual.
/// El propio core queda excluido.
pub struct ConventionResolver {
    pattern: Option<Regex>,
    exclude: &'static str,
}

impl ConventionResolver {
    pub fn new(prefix: &str) -> Self {
        let pattern = Regex::new(&format!(r"\b({}[A-Za-z0-9_]*)", regex::escape(prefix))).ok();
        Self { pattern,
               exclude: env!("CARGO_CRATE_NAME") }
    }

    fn find(&self, haystack: &str) -> Option<String> {
        let pattern = self.pattern.as_ref()?;
        pattern.captures_iter(haystack)
               .filter_map(|c| c.get(1).map(|m| m.as_str()))
               .find(|name| *name != self.exclude)
               .map(str::to_string)
    }
}

impl Default for ConventionResolver {
    fn default() -> Self {
        Self::new(COMPONENT_PREFIX)
    }
}

impl NameResolver for ConventionResolver {
    fn resolve(&self, step: &Step) -> Option<String> {
        self.find(step.type_name())
            .or_else(|| self.find(&Backtrace::force_capture().to_string()))
    }
}

/// Muestra de latencia de un step.
#[derive(Debug, Clone, Serialize)]
pub struct PerfSample {
    pub fingerprint: String,
    pub name: Option<String>,
    pub elapsed_ms: f64,
}

impl PerfSample {
    /// Línea para stdout: `perf <componente> <hash> <ms>ms`.
    pub fn line(&self) -> String {
        // el fingerprint ya es hex de blake3
        let short = self.fingerprint.get(..12).unwrap_or(&self.fingerprint);
        format!("perf {} {} {:.3}ms",
                self.name.as_deref().unwrap_or("unknown"),
                short,
                self.elapsed_ms)
    }
}

/// Cronómetros monotónicos indexados por fingerprint del step.
#[derive(Debug, Default)]
pub struct PerfTimers {
    started: DashMap<String, Instant>,
}

impl PerfTimers {
    pub fn start(&self, key: &str) {
        self.started.insert(key.to_string(), Instant::now());
    }

    pub fn stop(&self, key: &str) -> Option<Duration> {
        self.started.remove(key).map(|(_, t)| t.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepCtx;

    #[test]
    fn resolver_matches_convention_and_skips_core() {
        let r = ConventionResolver::default();
        assert_eq!(r.find("scope_adapters::steps::markdown::{{closure}}"), Some("scope_adapters".to_string()));
        assert_eq!(r.find("scope_core::engine::x scope_blog::y"), Some("scope_blog".to_string()));
        assert_eq!(r.find("other_crate::f"), None);
    }

    #[test]
    fn resolver_never_panics_on_unknown_steps() {
        let r = ConventionResolver::new("zz_no_such_prefix_");
        let step = Step::sync(|_c: &StepCtx| Ok(()));
        assert_eq!(r.resolve(&step), None);
    }

    #[test]
    fn timers_measure_once() {
        let t = PerfTimers::default();
        t.start("k");
        assert!(t.stop("k").is_some());
        assert!(t.stop("k").is_none());
    }

    #[test]
    fn sample_line_has_log_shape() {
        let s = PerfSample { fingerprint: "abc".into(),
                             name: None,
                             elapsed_ms: 1.5 };
        assert!(s.line().starts_with("perf unknown "));
        assert!(s.line().ends_with("1.500ms"));
    }

    #[test]
    fn sample_line_shows_the_fingerprint_prefix() {
        let fp = crate::hashing::hash_str("scope_blog::render");
        let s = PerfSample { fingerprint: fp.clone(),
                             name: Some("scope_blog".into()),
                             elapsed_ms: 0.25 };
        assert_eq!(s.line(), format!("perf scope_blog {} 0.250ms", &fp[..12]));
    }
}
