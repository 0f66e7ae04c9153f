//! pipe-core: contrato de ejecución de steps.
//!
//! Este crate define lo que todo step del motor necesita para correr, sin
//! conocer la semántica de ningún step concreto:
//! - `Step` / `StepKind` / `StepStatus`: contrato y máquina de estados.
//! - `RunState` + `ArtifactRepository`: estado compartido de un árbol de
//!   ejecución (artifacts registrados por steps previos).
//! - `WorkerClient`: frontera hacia el almacenamiento remoto de los workers.
//! - `BuildStepDelegate`: fases del step y streams de salida visibles al
//!   usuario.
//! - `ExecutionContext`: cancelación, deadline, logger y span actual.
//! - `Tracer` / `StepRunner`: envoltura de cada ejecución en un span.
pub mod config;
pub mod constants;
pub mod context;
pub mod delegate;
pub mod engine;
pub mod errors;
pub mod hashing;
pub mod logging;
pub mod model;
pub mod state;
pub mod step;
pub mod trace;
pub mod worker;

pub use config::{EngineConfig, TracingConfig};
pub use context::ExecutionContext;
pub use delegate::{BufferedDelegate, BuildStepDelegate, DelegatePhase, StdioDelegate};
pub use engine::StepRunner;
pub use errors::StepError;
pub use logging::Session;
pub use model::{Artifact, ArtifactName, PlanId, SetPipelinePlan, StepMetadata};
pub use state::{ArtifactRepository, RunState};
pub use step::{Step, StepKind, StepStatus};
pub use trace::{Attrs, NoopSpan, Span, SpanGuard, SubscriberProvider, TraceProvider, Tracer};
pub use worker::{ByteStream, WorkerClient, WorkerError};
