use thiserror::Error;

/// Errores al cargar una configuración de pipeline.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed pipeline config: {0}")]
    Malformed(#[from] serde_yaml::Error),
}
