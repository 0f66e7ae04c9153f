//! pipeflow
//!
//! Fachada del workspace: re-exporta los crates `pipe-*` y expone el runner
//! local del step set-pipeline que usa el binario `pipeflow`.
//!
//! - `pipe_core`: contrato de steps, contexto, tracing y worker.
//! - `pipe_domain`: configuración de pipelines, variables, validación y diff.
//! - `pipe_persistence`: store de pipelines con concurrencia optimista.
//! - `pipe_adapters`: `SetPipelineStep` y `VolumeWorkerClient`.

pub mod cli;

pub use pipe_adapters::{SetPipelineStep, VolumeWorkerClient};
pub use pipe_core::{EngineConfig, ExecutionContext, RunState, Step, StepError, StepRunner};
pub use pipe_domain::Config;
pub use pipe_persistence::{ConfigVersion, InMemoryTeamFactory, TeamFactory};

pub use pipe_adapters as adapters;
pub use pipe_core as core;
pub use pipe_domain as domain;
pub use pipe_persistence as persistence;
