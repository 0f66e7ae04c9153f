//! Sesiones de log estructuradas sobre la fachada `log`.
//!
//! Una `Session` tiene un nombre jerárquico (`build.set-pipeline-step`) y
//! datos clave/valor que se adjuntan a cada línea emitida. Las sesiones hijas
//! heredan los datos del padre.
use std::collections::BTreeMap;
use std::fmt::{self, Display};

use log::{debug, error, info, warn};

pub const LOG_TARGET: &str = "pipeflow";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    name: String,
    data: BTreeMap<String, String>,
}

impl Session {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               data: BTreeMap::new() }
    }

    /// Crea una sesión hija `padre.task` con datos adicionales.
    pub fn session<K, V>(&self, task: &str, data: impl IntoIterator<Item = (K, V)>) -> Session
        where K: Into<String>,
              V: Display
    {
        let name = if self.name.is_empty() { task.to_string() } else { format!("{}.{}", self.name, task) };
        let mut merged = self.data.clone();
        for (k, v) in data {
            merged.insert(k.into(), v.to_string());
        }
        Session { name, data: merged }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    pub fn debug(&self, action: &str) {
        debug!(target: LOG_TARGET, "{}", self.line(action, &[]));
    }

    pub fn info(&self, action: &str, extra: &[(&str, &dyn Display)]) {
        info!(target: LOG_TARGET, "{}", self.line(action, extra));
    }

    pub fn warn(&self, action: &str, extra: &[(&str, &dyn Display)]) {
        warn!(target: LOG_TARGET, "{}", self.line(action, extra));
    }

    pub fn error(&self, action: &str, err: &dyn Display) {
        error!(target: LOG_TARGET, "{}", self.line(action, &[("error", err)]));
    }

    fn line(&self, action: &str, extra: &[(&str, &dyn Display)]) -> String {
        let mut out = format!("{}.{}", self.name, action);
        for (k, v) in &self.data {
            out.push_str(&format!(" {k}={v}"));
        }
        for (k, v) in extra {
            out.push_str(&format!(" {k}={v}"));
        }
        out
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
