//! Fuentes de variables y resolución de placeholders `((var))`.

mod error;
mod reference;
mod resolver;
mod static_vars;

pub use error::VarsError;
pub use reference::VariableReference;
pub use resolver::TemplateResolver;
pub use static_vars::{MultiVariables, StaticVariables};

use serde_yaml::Value;

/// Fuente de variables consultable por referencia.
pub trait Variables: Send + Sync {
    /// `Ok(None)` si la fuente no conoce la clave raíz; error si la conoce
    /// pero el camino de campos no existe.
    fn get(&self, reference: &VariableReference) -> Result<Option<Value>, VarsError>;

    /// Claves raíz que la fuente ofrece.
    fn list(&self) -> Vec<String>;
}
