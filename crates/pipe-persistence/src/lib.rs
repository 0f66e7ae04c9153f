//! pipe-persistence
//!
//! Frontera de almacenamiento de pipelines por team y una implementación en
//! memoria con control de concurrencia optimista (compare-and-swap sobre la
//! versión de configuración).
//!
//! Módulos:
//! - `store`: contratos `TeamFactory` / `Team` / `PipelineHandle` y
//!   `ConfigVersion`.
//! - `memory`: `InMemoryTeamFactory`, usado por el binario y los tests.
//! - `error`: variantes semánticas de fallo del store.

pub mod error;
pub mod memory;
pub mod store;

pub use error::PersistenceError;
pub use memory::{InMemoryPipeline, InMemoryTeam, InMemoryTeamFactory};
pub use store::{ConfigVersion, PipelineHandle, Team, TeamFactory};
