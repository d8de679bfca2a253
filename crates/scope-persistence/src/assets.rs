//! Origen de los ficheros del visor sobre un directorio.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use scope_core::{AssetSource, HostError};

use crate::config::default_client_dir;
use crate::error::PersistenceError;
use crate::fs::{read_parallel, walk};

#[derive(Debug, Clone)]
pub struct DirAssets {
    dir: PathBuf,
}

impl DirAssets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// El visor incluido en este crate.
    pub fn bundled() -> Self {
        Self::new(default_client_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn read_all(&self) -> Result<Vec<(String, Vec<u8>)>, PersistenceError> {
        if !tokio::fs::metadata(&self.dir).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Err(PersistenceError::MissingClient(self.dir.clone()));
        }
        let entries = walk(&self.dir).await?;
        debug!("loading {} viewer files from {}", entries.len(), self.dir.display());
        read_parallel(entries).await
    }
}

#[async_trait]
impl AssetSource for DirAssets {
    async fn load(&self) -> Result<Vec<(String, Vec<u8>)>, HostError> {
        Ok(self.read_all().await?)
    }
}
