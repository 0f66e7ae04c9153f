//! Modelos neutrales (Artifact, plan del step, metadata de build).

pub mod artifact;
pub mod metadata;
pub mod plan;

pub use artifact::{Artifact, ArtifactName};
pub use metadata::StepMetadata;
pub use plan::{PlanId, SetPipelinePlan};
