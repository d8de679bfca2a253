//! Colaboradores sobre el sistema de ficheros: lectura de un directorio
//! fuente como colección de artifacts y escritura del conjunto de salida.
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use scope_core::{artifact, contents_of, Files, HostError, Node, OutputWriter};
use tokio::fs;
use tokio::task::JoinSet;

use crate::error::PersistenceError;

/// Writer que materializa cada ruta bajo un directorio destino.
#[derive(Debug, Clone)]
pub struct DirWriter {
    root: PathBuf,
}

impl DirWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ruta absoluta para `rel`. Rechaza rutas absolutas y cualquier `..`.
    pub fn target(&self, rel: &str) -> Result<PathBuf, PersistenceError> {
        let mut out = self.root.clone();
        let mut pushed = false;
        for comp in Path::new(rel).components() {
            match comp {
                Component::Normal(part) => {
                    out.push(part);
                    pushed = true;
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(PersistenceError::InvalidPath(rel.to_string()));
                }
            }
        }
        if !pushed {
            return Err(PersistenceError::InvalidPath(rel.to_string()));
        }
        Ok(out)
    }

    /// Escribe cada registro con `contents`; los demás se ignoran.
    /// Devuelve cuántos ficheros se escribieron.
    pub async fn write_all(&self, files: &Files) -> Result<usize, PersistenceError> {
        let mut written = 0;
        for (path, record) in files.entries() {
            let Some(bytes) = contents_of(&record) else {
                debug!("skip {path}: no contents");
                continue;
            };
            let target = self.target(&path)?;
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).await.map_err(|e| PersistenceError::write(parent, e))?;
            }
            fs::write(&target, &bytes).await.map_err(|e| PersistenceError::write(&target, e))?;
            written += 1;
        }
        Ok(written)
    }
}

#[async_trait]
impl OutputWriter for DirWriter {
    async fn write(&self, files: Files) -> Result<(), HostError> {
        let n = self.write_all(&files).await?;
        debug!("wrote {n} files under {}", self.root.display());
        Ok(())
    }
}

/// Lista los ficheros bajo `dir` como `(ruta relativa con '/', ruta real)`,
/// ordenados por ruta relativa.
pub async fn walk(dir: &Path) -> Result<Vec<(String, PathBuf)>, PersistenceError> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let mut entries = fs::read_dir(&current).await.map_err(|e| PersistenceError::read(&current, e))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| PersistenceError::read(&current, e))? {
            let path = entry.path();
            let kind = entry.file_type().await.map_err(|e| PersistenceError::read(&path, e))?;
            if kind.is_dir() {
                pending.push(path);
            } else if kind.is_file() {
                if let Some(rel) = relative_key(dir, &path) {
                    found.push((rel, path));
                }
            }
        }
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(found)
}

/// Lee todos los ficheros en paralelo (fan-out) y los devuelve juntos (fan-in),
/// ordenados por ruta relativa. El primer fallo aborta el resto.
pub async fn read_parallel(entries: Vec<(String, PathBuf)>) -> Result<Vec<(String, Vec<u8>)>, PersistenceError> {
    let mut set = JoinSet::new();
    for (rel, abs) in entries {
        set.spawn(async move {
            let bytes = fs::read(&abs).await.map_err(|e| PersistenceError::read(&abs, e))?;
            Ok::<_, PersistenceError>((rel, bytes))
        });
    }

    let mut out = Vec::with_capacity(set.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Ok(item)) => out.push(item),
            Ok(Err(err)) => {
                set.abort_all();
                return Err(err);
            }
            Err(join) => {
                set.abort_all();
                return Err(PersistenceError::Join(join.to_string()));
            }
        }
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

/// Colección de artifacts a partir de un directorio fuente.
pub async fn read_dir_files(dir: &Path) -> Result<Files, PersistenceError> {
    let entries = walk(dir).await?;
    let files: Files = Node::default();
    for (rel, bytes) in read_parallel(entries).await? {
        files.insert(rel, artifact(bytes));
    }
    debug!("read {} files from {}", files.len(), dir.display());
    Ok(files)
}

fn relative_key(base: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<String> = rel.components()
                                .filter_map(|c| match c {
                                    Component::Normal(p) => Some(p.to_string_lossy().into_owned()),
                                    _ => None,
                                })
                                .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch() -> PathBuf {
        std::env::temp_dir().join(format!("scope-fs-{}", Uuid::new_v4()))
    }

    #[test]
    fn target_rejects_escaping_paths() {
        let w = DirWriter::new("/out");
        assert_eq!(w.target("a/b.html").expect("ok"), PathBuf::from("/out/a/b.html"));
        assert_eq!(w.target("./a").expect("ok"), PathBuf::from("/out/a"));
        assert!(matches!(w.target("../etc/passwd"), Err(PersistenceError::InvalidPath(_))));
        assert!(matches!(w.target("/etc/passwd"), Err(PersistenceError::InvalidPath(_))));
        assert!(matches!(w.target(""), Err(PersistenceError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn writes_nested_paths_and_reads_them_back() {
        let dir = scratch();
        let writer = DirWriter::new(&dir);
        let files: Files = Node::default();
        files.insert("posts/2024/a.html", artifact("<p>a</p>"));
        files.insert("index.html", artifact("<p>i</p>"));
        files.insert("no-contents", scope_core::Value::map());

        assert_eq!(writer.write_all(&files).await.expect("write"), 2);

        let back = read_dir_files(&dir).await.expect("read");
        assert_eq!(back.keys(), vec!["index.html".to_string(), "posts/2024/a.html".to_string()]);
        assert_eq!(back.get("posts/2024/a.html").and_then(|v| contents_of(&v)), Some(b"<p>a</p>".to_vec()));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_source_is_a_read_error() {
        let err = read_dir_files(&scratch()).await.expect_err("missing");
        assert!(matches!(err, PersistenceError::Read { .. }));
    }
}
