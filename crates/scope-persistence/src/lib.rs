//! scope-persistence
//!
//! Colaboradores de sistema de ficheros para `scope-core`:
//! - `fs`: lectura de un directorio fuente y `DirWriter` para la salida.
//! - `assets`: `DirAssets`, origen de los ficheros del visor (por defecto `client/`).
//! - `config`: carga de configuración desde entorno / .env.

pub mod assets;
pub mod config;
pub mod error;
pub mod fs;

pub use assets::DirAssets;
pub use config::{default_client_dir, init_dotenv, UiConfig};
pub use error::PersistenceError;
pub use fs::{read_dir_files, DirWriter};
