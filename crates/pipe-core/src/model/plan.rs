use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identificador del nodo del plan que originó un step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(pub String);

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlanId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Parámetros del step `set_pipeline` tal como los entrega el compilador
/// del plan. El step sólo los lee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetPipelinePlan {
    /// Nombre del pipeline destino dentro del team.
    pub name: String,
    /// Referencia `<artifact>/<ruta>` al archivo de configuración.
    #[serde(default)]
    pub file: String,
    /// Variables inline; tienen prioridad sobre `var_files`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub vars: IndexMap<String, serde_yaml::Value>,
    /// Referencias `<artifact>/<ruta>` a archivos de variables, en orden.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub var_files: Vec<String>,
}
