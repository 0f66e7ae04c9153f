//! Frontera hacia el almacenamiento de los workers.
//!
//! El `WorkerClient` abre un archivo dentro del volumen que respalda un
//! `Artifact` y devuelve un stream propio del caller. Soltar el stream lo
//! libera, tanto tras consumirlo entero como a medias.
use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;

use crate::context::ExecutionContext;
use crate::logging::Session;
use crate::model::Artifact;

pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

#[derive(Debug, Error)]
pub enum WorkerError {
    /// La ruta no existe dentro del volumen. Se distingue del resto para que
    /// el step pueda informar artifact y ruta.
    #[error("file not found")]
    FileNotFound,
    #[error("volume not found: {0}")]
    VolumeNotFound(String),
    #[error("invalid path '{0}'")]
    InvalidPath(String),
    #[error("worker transport error: {0}")]
    Transport(String),
    #[error("worker io error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait WorkerClient: Send + Sync {
    async fn stream_file_from_artifact(&self,
                                       ctx: &ExecutionContext,
                                       logger: &Session,
                                       artifact: &Artifact,
                                       file_path: &str)
                                       -> Result<ByteStream, WorkerError>;
}
