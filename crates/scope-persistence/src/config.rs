//! Carga de configuración desde variables de entorno.
//! Convención `STEPSCOPE_*`; un `.env` en el directorio actual también cuenta.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use log::LevelFilter;
use once_cell::sync::Lazy;
use scope_core::PatchOptions;
use serde::Serialize;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const ENV_PERF: &str = "STEPSCOPE_PERF";
pub const ENV_CLIENT_DIR: &str = "STEPSCOPE_CLIENT_DIR";
pub const ENV_LOG: &str = "STEPSCOPE_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiConfig {
    pub perf: bool,
    pub client_dir: PathBuf,
    #[serde(serialize_with = "level_name")]
    pub log_level: LevelFilter,
}

impl UiConfig {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let perf = lookup(ENV_PERF).map(|v| parse_flag(&v)).unwrap_or(false);
        let client_dir = lookup(ENV_CLIENT_DIR).filter(|v| !v.trim().is_empty())
                                               .map(PathBuf::from)
                                               .unwrap_or_else(default_client_dir);
        let log_level = lookup(ENV_LOG).and_then(|v| v.trim().parse().ok()).unwrap_or(LevelFilter::Info);
        Self { perf,
               client_dir,
               log_level }
    }

    pub fn patch_options(&self) -> PatchOptions {
        PatchOptions { perf: self.perf }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Visor incluido en el crate (`client/`).
pub fn default_client_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("client")
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn level_name<S: serde::Serializer>(level: &LevelFilter, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(level.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let cfg = UiConfig::default();
        assert!(!cfg.perf);
        assert_eq!(cfg.log_level, LevelFilter::Info);
        assert!(cfg.client_dir.ends_with("client"));
        assert_eq!(cfg.patch_options(), PatchOptions::default());
    }

    #[test]
    fn reads_flags_and_overrides() {
        let cfg = UiConfig::from_lookup(lookup(&[(ENV_PERF, "TRUE"), (ENV_CLIENT_DIR, "/tmp/viewer"), (ENV_LOG, "debug")]));
        assert!(cfg.perf);
        assert_eq!(cfg.client_dir, PathBuf::from("/tmp/viewer"));
        assert_eq!(cfg.log_level, LevelFilter::Debug);
        assert!(cfg.patch_options().perf);
    }

    #[test]
    fn unknown_values_fall_back() {
        let cfg = UiConfig::from_lookup(lookup(&[(ENV_PERF, "maybe"), (ENV_LOG, "loud"), (ENV_CLIENT_DIR, " ")]));
        assert!(!cfg.perf);
        assert_eq!(cfg.log_level, LevelFilter::Info);
        assert_eq!(cfg.client_dir, default_client_dir());
    }
}
