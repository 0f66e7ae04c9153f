//! Registro de artifacts visibles para el árbol de steps en ejecución.
//!
//! Steps hermanos pueden correr en paralelo, por lo que el registro usa un
//! mapa concurrente. La disciplina esperada es escribir una vez y luego sólo
//! leer; el registro no lo impone (registrar de nuevo reemplaza).
use dashmap::DashMap;

use crate::model::{Artifact, ArtifactName};

#[derive(Debug, Default)]
pub struct ArtifactRepository {
    artifacts: DashMap<ArtifactName, Artifact>,
}

impl ArtifactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra `artifact` bajo `name`; devuelve el artifact reemplazado si
    /// el nombre ya existía en este scope.
    pub fn register_artifact(&self, name: impl Into<ArtifactName>, artifact: Artifact) -> Option<Artifact> {
        self.artifacts.insert(name.into(), artifact)
    }

    pub fn artifact_for(&self, name: &ArtifactName) -> Option<Artifact> {
        self.artifacts.get(name).map(|a| a.value().clone())
    }
}
