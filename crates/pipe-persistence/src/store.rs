//! Contratos del store de pipelines.
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pipe_domain::Config;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Versión monotónica de la configuración de un pipeline. `0` significa que
/// el pipeline no existe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConfigVersion(pub i64);

impl ConfigVersion {
    pub const NONE: ConfigVersion = ConfigVersion(0);

    pub fn next(self) -> Self {
        ConfigVersion(self.0 + 1)
    }

    pub fn exists(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for ConfigVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ConfigVersion {
    fn from(v: i64) -> Self {
        ConfigVersion(v)
    }
}

/// Resuelve un team por id. La resolución es perezosa: no toca el store.
pub trait TeamFactory: Send + Sync {
    fn team(&self, id: i32) -> Arc<dyn Team>;
}

#[async_trait]
pub trait Team: Send + Sync {
    fn id(&self) -> i32;
    fn name(&self) -> &str;

    /// `Ok(None)` si el pipeline no existe.
    async fn pipeline(&self, name: &str) -> Result<Option<Arc<dyn PipelineHandle>>, PersistenceError>;

    /// Guarda `config` sólo si la versión almacenada sigue siendo `from`.
    /// Con `apply_config_only = false` el pipeline queda además despausado.
    async fn save_pipeline(&self,
                           name: &str,
                           config: &Config,
                           from: ConfigVersion,
                           apply_config_only: bool)
                           -> Result<(Arc<dyn PipelineHandle>, ConfigVersion), PersistenceError>;
}

/// Vista inmutable de un pipeline guardado.
pub trait PipelineHandle: Send + Sync {
    fn name(&self) -> &str;
    fn config_version(&self) -> ConfigVersion;
    fn config(&self) -> Result<Config, PersistenceError>;
    fn paused(&self) -> bool;
    fn config_hash(&self) -> &str;
    fn last_updated(&self) -> DateTime<Utc>;
}

impl std::fmt::Debug for dyn PipelineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineHandle")
         .field("name", &self.name())
         .field("config_version", &self.config_version())
         .field("paused", &self.paused())
         .finish()
    }
}
