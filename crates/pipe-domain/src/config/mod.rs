//! Configuración estructurada de un pipeline.

mod load;
mod step;
mod types;

pub use load::{marshal_config, unmarshal_config};
pub use step::{InParallelConfig, InParallelSteps, StepConfig};
pub use types::{Config, GroupConfig, JobConfig, Params, ResourceConfig, ResourceTypeConfig, VarSourceConfig};
