//! Errores de persistencia.

use thiserror::Error;

use crate::store::ConfigVersion;

#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Otro escritor guardó una versión distinta entre la lectura y la
    /// escritura del caller.
    #[error("pipeline '{pipeline}' version conflict: expected {expected}, found {actual}")]
    VersionConflict {
        pipeline: String,
        expected: ConfigVersion,
        actual: ConfigVersion,
    },
    #[error("stored config for pipeline '{0}' does not match its hash")]
    Corrupted(String),
    #[error("config encoding: {0}")]
    Config(#[from] pipe_domain::ConfigError),
}
