//! `WorkerClient` sobre el sistema de archivos local.
//!
//! Cada `Artifact::volume` es un directorio bajo `root` (o una ruta directa
//! si el cliente no tiene raíz). Las rutas de archivo que escapan del
//! volumen (absolutas, `..` o symlinks hacia fuera) se rechazan.
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use pipe_core::{Artifact, ByteStream, ExecutionContext, Session, WorkerClient, WorkerError};

#[derive(Debug, Clone)]
pub struct VolumeWorkerClient {
    root: Option<PathBuf>,
}

impl VolumeWorkerClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()) }
    }

    /// Cliente cuyos volúmenes son rutas de directorio tal cual.
    pub fn unrooted() -> Self {
        Self { root: None }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn volume_path(&self, volume: &str) -> Result<PathBuf, WorkerError> {
        match &self.root {
            Some(root) => Ok(root.join(relative(volume)?)),
            None if volume.is_empty() => Err(WorkerError::VolumeNotFound(String::new())),
            None => Ok(PathBuf::from(volume)),
        }
    }
}

fn relative(raw: &str) -> Result<PathBuf, WorkerError> {
    let path = Path::new(raw);
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return Err(WorkerError::InvalidPath(raw.to_string())),
        }
    }
    if out.as_os_str().is_empty() {
        return Err(WorkerError::InvalidPath(raw.to_string()));
    }
    Ok(out)
}

#[async_trait]
impl WorkerClient for VolumeWorkerClient {
    async fn stream_file_from_artifact(&self,
                                       _ctx: &ExecutionContext,
                                       logger: &Session,
                                       artifact: &Artifact,
                                       file_path: &str)
                                       -> Result<ByteStream, WorkerError> {
        let logger = logger.session("stream-file", [("artifact", artifact.name.to_string()),
                                                    ("path", file_path.to_string())]);

        let volume_dir = self.volume_path(&artifact.volume)?;
        let volume_dir = match tokio::fs::canonicalize(&volume_dir).await {
            Ok(p) => p,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(WorkerError::VolumeNotFound(artifact.volume.clone())),
            Err(e) => return Err(e.into()),
        };

        let target = match tokio::fs::canonicalize(volume_dir.join(relative(file_path)?)).await {
            Ok(p) => p,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                logger.debug("file-not-found");
                return Err(WorkerError::FileNotFound);
            }
            Err(e) => return Err(e.into()),
        };
        if !target.starts_with(&volume_dir) {
            return Err(WorkerError::InvalidPath(file_path.to_string()));
        }

        let metadata = tokio::fs::metadata(&target).await?;
        if !metadata.is_file() {
            return Err(WorkerError::FileNotFound);
        }

        let file = tokio::fs::File::open(&target).await?;
        logger.debug("opened");
        Ok(Box::new(file))
    }
}
