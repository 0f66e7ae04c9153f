use indexmap::IndexMap;
use serde_yaml::Value;

use super::{VariableReference, Variables, VarsError};

/// Variables fijas (las `vars` del plan o un var file ya decodificado).
/// Sólo responden a referencias sin prefijo de fuente.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticVariables(IndexMap<String, Value>);

impl StaticVariables {
    pub fn new(vars: IndexMap<String, Value>) -> Self {
        Self(vars)
    }

    /// Decodifica un var file YAML. Un documento vacío no aporta variables.
    pub fn from_yaml(bytes: &[u8]) -> Result<Self, VarsError> {
        let doc: Value = serde_yaml::from_slice(bytes)?;
        match doc {
            Value::Null => Ok(Self::default()),
            Value::Mapping(map) => {
                let mut vars = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    let key = match k {
                        Value::String(s) => s,
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        _ => return Err(VarsError::NotAMapping),
                    };
                    vars.insert(key, v);
                }
                Ok(Self(vars))
            }
            _ => Err(VarsError::NotAMapping),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<IndexMap<String, Value>> for StaticVariables {
    fn from(vars: IndexMap<String, Value>) -> Self {
        Self(vars)
    }
}

impl Variables for StaticVariables {
    fn get(&self, reference: &VariableReference) -> Result<Option<Value>, VarsError> {
        if reference.source.is_some() {
            return Ok(None);
        }
        let Some(root) = self.0.get(&reference.path) else {
            return Ok(None);
        };
        let mut current = root;
        for field in &reference.fields {
            current = lookup_field(current, field).ok_or_else(|| VarsError::MissingField { name: reference.path.clone(),
                                                                                          field: field.clone() })?;
        }
        Ok(Some(current.clone()))
    }

    fn list(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }
}

fn lookup_field<'a>(value: &'a Value, field: &str) -> Option<&'a Value> {
    match value {
        Value::Mapping(map) => map.get(field),
        Value::Sequence(seq) => field.parse::<usize>().ok().and_then(|i| seq.get(i)),
        Value::Tagged(tagged) => lookup_field(&tagged.value, field),
        _ => None,
    }
}

/// Varias fuentes en orden; gana la primera que conoce la clave raíz.
#[derive(Default)]
pub struct MultiVariables {
    sources: Vec<Box<dyn Variables>>,
}

impl MultiVariables {
    pub fn new(sources: Vec<Box<dyn Variables>>) -> Self {
        Self { sources }
    }

    pub fn push(&mut self, source: Box<dyn Variables>) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Variables for MultiVariables {
    fn get(&self, reference: &VariableReference) -> Result<Option<Value>, VarsError> {
        for source in &self.sources {
            if let Some(v) = source.get(reference)? {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    fn list(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for name in self.sources.iter().flat_map(|s| s.list()) {
            if !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }
}
