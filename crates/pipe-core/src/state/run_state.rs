use std::sync::Arc;

use super::ArtifactRepository;

/// Contexto por ejecución de árbol: se entrega por referencia a cada step.
#[derive(Debug, Default)]
pub struct RunState {
    repository: Arc<ArtifactRepository>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(repository: Arc<ArtifactRepository>) -> Self {
        Self { repository }
    }

    pub fn artifact_repository(&self) -> &ArtifactRepository {
        &self.repository
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Artifact;

    #[test]
    fn repository_is_shared_with_the_caller() {
        let repo = Arc::new(ArtifactRepository::new());
        let state = RunState::with_repository(Arc::clone(&repo));
        repo.register_artifact("repo", Artifact::new("repo", "v"));
        assert!(state.artifact_repository().artifact_for(&"repo".into()).is_some());
        assert!(RunState::new().artifact_repository().artifact_for(&"repo".into()).is_none());
    }
}
