//! pipe-adapters: steps concretos y clientes de worker.
//!
//! - `steps::SetPipelineStep`: obtiene un archivo de configuración desde un
//!   artifact, resuelve variables, valida, muestra el diff y guarda el
//!   pipeline con control de concurrencia optimista.
//! - `workers::VolumeWorkerClient`: `WorkerClient` sobre directorios locales,
//!   un directorio por volumen.

pub mod steps;
pub mod workers;

pub use steps::{SetPipelineSource, SetPipelineStep};
pub use workers::VolumeWorkerClient;
