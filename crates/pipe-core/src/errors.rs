//! Errores de ejecución de steps.
//!
//! `StepError` cubre las condiciones que el core entiende (entradas del plan,
//! búsqueda de artifacts, worker, cancelación). Los errores de colaboradores
//! externos (parseo de config, resolución de vars, persistencia) viajan
//! dentro de `External` conservando el error original como `source`.

use std::error::Error as StdError;

use thiserror::Error;

use crate::worker::WorkerError;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum StepError {
    /// Campo obligatorio del plan vacío (p. ej. `file`).
    #[error("{0} is not specified")]
    MissingField(&'static str),
    /// La ruta no tiene la forma `<artifact>/<archivo>`.
    #[error("path '{path}' does not specify where the file lives")]
    UnspecifiedArtifactSource { path: String },
    #[error("unknown artifact source: '{name}' in file path '{path}'")]
    UnknownArtifactSource { name: String, path: String },
    #[error("file '{path}' not found within artifact '{name}'")]
    FileNotFound { name: String, path: String },
    #[error(transparent)]
    Worker(#[from] WorkerError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("step interrupted: context cancelled")]
    Cancelled,
    #[error("step interrupted: deadline exceeded")]
    DeadlineExceeded,
    #[error("step already ran")]
    AlreadyRan,
    /// Error de un colaborador (config, vars, store) propagado sin cambios.
    #[error("{what}: {source}")]
    External {
        what: &'static str,
        #[source]
        source: BoxError,
    },
}

impl StepError {
    pub fn external<E>(what: &'static str, err: E) -> Self
        where E: StdError + Send + Sync + 'static
    {
        Self::External { what,
                         source: Box::new(err) }
    }

    /// Intenta recuperar el error original de un colaborador.
    pub fn external_source<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            Self::External { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// `true` si el error proviene de la señal de cancelación/deadline del
    /// contexto y no de la lógica del step.
    pub fn is_interruption(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
