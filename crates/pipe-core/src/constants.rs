//! Constantes del motor core.

/// Versión lógica del motor. Se adjunta como atributo a los spans de cada
/// step y entra en el hash de configuraciones persistidas.
pub const ENGINE_VERSION: &str = "P1.0";

/// Nombre del servicio por defecto cuando el tracing está habilitado.
pub const DEFAULT_SERVICE_NAME: &str = "pipeflow";

/// Separador entre nombre de artifact y ruta de archivo (`repo/ci/p.yml`).
pub const ARTIFACT_PATH_SEPARATOR: char = '/';
