//! Artifact neutral del árbol de ejecución.
//!
//! Un `Artifact` es un handle opaco hacia datos que viven en un worker (un
//! volumen/directorio). El core no lee su contenido: sólo lo registra bajo
//! un nombre y lo entrega al `WorkerClient` cuando un step necesita un
//! archivo de su interior.
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Nombre con el que un step registra/busca un artifact (`repo`, `ci-tasks`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactName(String);

impl ArtifactName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArtifactName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ArtifactName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Handle inmutable a datos residentes en un worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: Uuid,
    pub name: ArtifactName,
    pub volume: String, // handle del volumen en el worker (interpretado por el WorkerClient)
}

impl Artifact {
    pub fn new(name: impl Into<ArtifactName>, volume: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(),
               name: name.into(),
               volume: volume.into() }
    }
}
