use std::collections::BTreeSet;

use serde_yaml::{Mapping, Value};

use super::{MultiVariables, VariableReference, Variables, VarsError};

/// Interpola `((var))` en un documento YAML contra fuentes ordenadas.
pub struct TemplateResolver {
    bytes: Vec<u8>,
    sources: MultiVariables,
}

#[derive(Default)]
struct Tracker {
    used: BTreeSet<String>,
    missing: BTreeSet<String>,
}

impl TemplateResolver {
    pub fn new(bytes: impl Into<Vec<u8>>, sources: MultiVariables) -> Self {
        Self { bytes: bytes.into(),
               sources }
    }

    /// Devuelve el documento re-serializado, con las merge keys aplicadas y
    /// las variables conocidas sustituidas. Las desconocidas quedan tal cual salvo que
    /// `expect_all_keys` las convierta en error.
    pub fn resolve(&self, expect_all_keys: bool, expect_all_vars_used: bool) -> Result<Vec<u8>, VarsError> {
        let mut doc: Value = serde_yaml::from_slice(&self.bytes)?;
        if doc.is_null() {
            return Ok(self.bytes.clone());
        }
        doc.apply_merge()?;

        let mut tracker = Tracker::default();
        let resolved = self.interpolate(doc, &mut tracker)?;
        log::debug!(target: "pipeflow", "template.resolved used={} missing={}", tracker.used.len(), tracker.missing.len());

        if expect_all_keys && !tracker.missing.is_empty() {
            return Err(VarsError::UndefinedVars(tracker.missing.into_iter().collect()));
        }
        if expect_all_vars_used {
            let unused: Vec<String> = self.sources
                                          .list()
                                          .into_iter()
                                          .filter(|name| !tracker.used.contains(name))
                                          .collect();
            if !unused.is_empty() {
                return Err(VarsError::UnusedVars(unused));
            }
        }

        Ok(serde_yaml::to_string(&resolved)?.into_bytes())
    }

    fn interpolate(&self, value: Value, tracker: &mut Tracker) -> Result<Value, VarsError> {
        match value {
            Value::String(s) => self.interpolate_str(s, tracker),
            Value::Sequence(seq) => Ok(Value::Sequence(seq.into_iter()
                                                          .map(|v| self.interpolate(v, tracker))
                                                          .collect::<Result<_, _>>()?)),
            Value::Mapping(map) => {
                let mut out = Mapping::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(self.interpolate(k, tracker)?, self.interpolate(v, tracker)?);
                }
                Ok(Value::Mapping(out))
            }
            Value::Tagged(mut tagged) => {
                tagged.value = self.interpolate(tagged.value, tracker)?;
                Ok(Value::Tagged(tagged))
            }
            other => Ok(other),
        }
    }

    fn interpolate_str(&self, s: String, tracker: &mut Tracker) -> Result<Value, VarsError> {
        let placeholders = find_placeholders(&s);
        if placeholders.is_empty() {
            return Ok(Value::String(s));
        }

        // un único placeholder que ocupa todo el escalar conserva el tipo
        if let [(0, end, inner)] = placeholders.as_slice() {
            if *end == s.len() {
                return Ok(self.lookup(inner, tracker)?.unwrap_or(Value::String(s)));
            }
        }

        let mut out = String::with_capacity(s.len());
        let mut cursor = 0;
        for (start, end, inner) in &placeholders {
            out.push_str(&s[cursor..*start]);
            match self.lookup(inner, tracker)? {
                Some(v) => out.push_str(&scalar_to_string(inner, v)?),
                None => out.push_str(&s[*start..*end]),
            }
            cursor = *end;
        }
        out.push_str(&s[cursor..]);
        Ok(Value::String(out))
    }

    fn lookup(&self, inner: &str, tracker: &mut Tracker) -> Result<Option<Value>, VarsError> {
        let reference = VariableReference::parse(inner)?;
        match self.sources.get(&reference)? {
            Some(v) => {
                tracker.used.insert(reference.path);
                Ok(Some(v))
            }
            None => {
                tracker.missing.insert(reference.to_string());
                Ok(None)
            }
        }
    }
}

/// Posiciones `(inicio, fin, interior)` de cada `((...))` en `s`.
fn find_placeholders(s: &str) -> Vec<(usize, usize, String)> {
    let mut out = Vec::new();
    let mut from = 0;
    while let Some(rel) = s[from..].find("((") {
        let start = from + rel;
        let Some(close_rel) = s[start + 2..].find("))") else {
            break;
        };
        let inner = &s[start + 2..start + 2 + close_rel];
        let end = start + 2 + close_rel + 2;
        if inner.contains('(') || inner.contains(')') || inner.trim().is_empty() {
            from = start + 1;
            continue;
        }
        out.push((start, end, inner.trim().to_string()));
        from = end;
    }
    out
}

fn scalar_to_string(name: &str, value: Value) -> Result<String, VarsError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(VarsError::NonScalarInterpolation { name: name.to_string() }),
    }
}
