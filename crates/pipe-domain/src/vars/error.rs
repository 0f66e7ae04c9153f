use thiserror::Error;

#[derive(Debug, Error)]
pub enum VarsError {
    #[error("invalid var reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: &'static str },
    #[error("failed to find field '{field}' in var '{name}'")]
    MissingField { name: String, field: String },
    #[error("cannot interpolate non-primitive value from var '{name}' into a string")]
    NonScalarInterpolation { name: String },
    #[error("undefined vars: {}", .0.join(", "))]
    UndefinedVars(Vec<String>),
    #[error("unused vars: {}", .0.join(", "))]
    UnusedVars(Vec<String>),
    #[error("var file must be a mapping of names to values")]
    NotAMapping,
    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
