//! pipe-domain: configuración estructurada de pipelines.
//!
//! - `config`: tipos `Config` (resources, jobs, groups, var sources...) y
//!   carga estricta desde YAML.
//! - `vars`: fuentes de variables y resolución de placeholders `((var))`.
//! - `validate`: chequeos semánticos que separan warnings de errores.
//! - `diff`: diferencias legibles entre dos configuraciones.

pub mod config;
pub mod diff;
pub mod error;
pub mod validate;
pub mod vars;

pub use config::{marshal_config, unmarshal_config, Config, GroupConfig, InParallelConfig, InParallelSteps, JobConfig,
                 Params, ResourceConfig, ResourceTypeConfig, StepConfig, VarSourceConfig};
pub use error::ConfigError;
pub use validate::{identifier_problem, validate, ConfigErrorEntry, ConfigWarning, WarningKind};
pub use vars::{MultiVariables, StaticVariables, TemplateResolver, VariableReference, Variables, VarsError};
