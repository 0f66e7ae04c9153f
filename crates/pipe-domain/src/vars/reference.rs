use std::fmt;

use super::VarsError;

/// Referencia parseada desde el interior de `((...))`.
///
/// Formas admitidas: `name`, `name.field.sub`, `source:name.field` y
/// segmentos entre comillas (`"a.b".c`) que pueden contener puntos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    pub source: Option<String>,
    pub path: String,
    pub fields: Vec<String>,
}

impl VariableReference {
    pub fn parse(raw: &str) -> Result<Self, VarsError> {
        let invalid = |reason| VarsError::InvalidReference { reference: raw.to_string(),
                                                             reason };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty reference"));
        }

        let (source, rest) = match split_outside_quotes(trimmed, ':').as_slice() {
            [only] => (None, only.clone()),
            [src, rest] => {
                if src.is_empty() {
                    return Err(invalid("empty source name"));
                }
                (Some(src.clone()), rest.clone())
            }
            _ => return Err(invalid("more than one source separator")),
        };

        let mut segments = Vec::new();
        for seg in split_outside_quotes(&rest, '.') {
            let seg = unquote(&seg).ok_or_else(|| invalid("unbalanced quotes"))?;
            if seg.is_empty() {
                return Err(invalid("empty path segment"));
            }
            segments.push(seg);
        }
        let mut iter = segments.into_iter();
        let path = iter.next().ok_or_else(|| invalid("empty reference"))?;
        Ok(Self { source,
                  path,
                  fields: iter.collect() })
    }
}

impl fmt::Display for VariableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(src) = &self.source {
            write!(f, "{src}:")?;
        }
        write!(f, "{}", self.path)?;
        for field in &self.fields {
            write!(f, ".{field}")?;
        }
        Ok(())
    }
}

fn split_outside_quotes(s: &str, sep: char) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in s.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            c if c == sep && !quoted => out.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    out.push(current);
    out
}

fn unquote(seg: &str) -> Option<String> {
    let seg = seg.trim();
    match (seg.starts_with('"'), seg.ends_with('"')) {
        (true, true) if seg.len() >= 2 => Some(seg[1..seg.len() - 1].to_string()),
        (false, false) if !seg.contains('"') => Some(seg.to_string()),
        _ => None,
    }
}
