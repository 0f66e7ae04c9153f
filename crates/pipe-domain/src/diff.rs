//! Diferencias legibles entre dos configuraciones.
use std::io::{self, Write};

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::config::{Config, GroupConfig, JobConfig, ResourceConfig, ResourceTypeConfig, VarSourceConfig};

trait Named: Serialize + PartialEq {
    fn name(&self) -> &str;
}

macro_rules! named {
    ($($ty:ty),*) => {
        $(impl Named for $ty {
            fn name(&self) -> &str {
                &self.name
            }
        })*
    };
}

named!(GroupConfig, ResourceConfig, ResourceTypeConfig, VarSourceConfig, JobConfig);

impl Config {
    /// Escribe en `out` lo que cambia de `self` a `new` y devuelve si hubo
    /// alguna diferencia.
    pub fn diff(&self, out: &mut dyn Write, new: &Config) -> io::Result<bool> {
        let mut changed = false;
        changed |= diff_section(out, "group", &self.groups, &new.groups)?;
        changed |= diff_group_order(out, &self.groups, &new.groups)?;
        changed |= diff_section(out, "resource", &self.resources, &new.resources)?;
        changed |= diff_section(out, "resource type", &self.resource_types, &new.resource_types)?;
        changed |= diff_section(out, "var source", &self.var_sources, &new.var_sources)?;
        changed |= diff_section(out, "job", &self.jobs, &new.jobs)?;
        Ok(changed)
    }
}

fn diff_section<T: Named>(out: &mut dyn Write, kind: &str, old: &[T], new: &[T]) -> io::Result<bool> {
    let mut changed = false;

    for item in old {
        match new.iter().find(|n| n.name() == item.name()) {
            None => {
                writeln!(out, "{kind} {} has been removed:", item.name())?;
                write_diff(out, &render(item)?, "")?;
                changed = true;
            }
            Some(updated) if updated != item => {
                writeln!(out, "{kind} {} has changed:", item.name())?;
                write_diff(out, &render(item)?, &render(updated)?)?;
                changed = true;
            }
            Some(_) => {}
        }
    }

    for item in new {
        if !old.iter().any(|o| o.name() == item.name()) {
            writeln!(out, "{kind} {} has been added:", item.name())?;
            write_diff(out, "", &render(item)?)?;
            changed = true;
        }
    }

    Ok(changed)
}

/// Mismos groups en distinto orden también es un cambio visible en la UI.
fn diff_group_order(out: &mut dyn Write, old: &[GroupConfig], new: &[GroupConfig]) -> io::Result<bool> {
    let old_names: Vec<&str> = old.iter().map(|g| g.name.as_str()).collect();
    let new_names: Vec<&str> = new.iter().filter(|g| old_names.contains(&g.name.as_str())).map(|g| g.name.as_str()).collect();
    let kept: Vec<&str> = old_names.iter().copied().filter(|n| new_names.contains(n)).collect();
    if kept == new_names {
        return Ok(false);
    }
    writeln!(out, "groups have been reordered:")?;
    write_diff(out, &(kept.join("\n") + "\n"), &(new_names.join("\n") + "\n"))?;
    Ok(true)
}

fn render<T: Serialize>(item: &T) -> io::Result<String> {
    serde_yaml::to_string(item).map_err(io::Error::other)
}

fn write_diff(out: &mut dyn Write, old: &str, new: &str) -> io::Result<()> {
    let diff = TextDiff::from_lines(old, new);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        write!(out, "{sign} {}", change.value())?;
        if change.missing_newline() {
            writeln!(out)?;
        }
    }
    writeln!(out)
}
