use super::Config;
use crate::error::ConfigError;

/// Decodifica bytes YAML en una `Config` estricta. Un documento vacío (o
/// sólo comentarios) es la configuración vacía. Las merge keys (`<<`) se
/// aplican antes de decodificar.
pub fn unmarshal_config(bytes: &[u8]) -> Result<Config, ConfigError> {
    let mut doc: serde_yaml::Value = serde_yaml::from_slice(bytes)?;
    if doc.is_null() {
        return Ok(Config::default());
    }
    doc.apply_merge()?;
    Ok(serde_yaml::from_value(doc)?)
}

/// Forma YAML usada para persistir y hashear la configuración;
/// `unmarshal_config` la lee de vuelta sin pérdida, tags incluidos.
pub fn marshal_config(config: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(config)?)
}
