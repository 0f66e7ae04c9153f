//! Configuración del motor desde variables de entorno.
//!
//! Sigue la convención del resto del workspace: `.env` se carga una sola vez
//! de forma perezosa y cada parámetro tiene un default razonable. El flag de
//! tracing se pasa explícitamente al `StepRunner`; no hay estado global.
use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

use crate::constants::DEFAULT_SERVICE_NAME;

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const ENV_TRACING_ENABLED: &str = "PIPEFLOW_TRACING_ENABLED";
pub const ENV_TRACING_SERVICE: &str = "PIPEFLOW_TRACING_SERVICE";
pub const ENV_STEP_TIMEOUT_SECS: &str = "PIPEFLOW_STEP_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub enabled: bool,
    pub service_name: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self { enabled: false,
               service_name: DEFAULT_SERVICE_NAME.to_string() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub tracing: TracingConfig,
    /// Deadline aplicado a cada step ejecutado por el `StepRunner`.
    pub step_timeout: Option<Duration>,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Construye la configuración desde una función de lookup arbitraria
    /// (permite testear sin tocar el entorno del proceso).
    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let enabled = lookup(ENV_TRACING_ENABLED).map(|v| parse_bool(&v)).unwrap_or(false);
        let service_name = lookup(ENV_TRACING_SERVICE).filter(|v| !v.trim().is_empty())
                                                      .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());
        let step_timeout = lookup(ENV_STEP_TIMEOUT_SECS).and_then(|v| v.trim().parse::<u64>().ok())
                                                        .filter(|secs| *secs > 0)
                                                        .map(Duration::from_secs);
        Self { tracing: TracingConfig { enabled, service_name },
               step_timeout }
    }
}

fn parse_bool(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
