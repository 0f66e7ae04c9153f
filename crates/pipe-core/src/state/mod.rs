//! Estado compartido de una ejecución de árbol de steps.

mod repository;
mod run_state;

pub use repository::ArtifactRepository;
pub use run_state::RunState;
