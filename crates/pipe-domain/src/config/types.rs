//! Tipos de la configuración de un pipeline.
//!
//! La deserialización es estricta (`deny_unknown_fields`): una clave mal
//! escrita es un error de carga, no un campo ignorado. Los campos opcionales
//! se omiten al serializar para que el diff sólo muestre lo declarado.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::StepConfig;

/// Mapa libre de parámetros (`source`, `params`...).
pub type Params = BTreeMap<String, serde_yaml::Value>;

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub var_sources: Vec<VarSourceConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_types: Vec<ResourceTypeConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<JobConfig>,
}

impl Config {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
        && self.var_sources.is_empty()
        && self.resources.is_empty()
        && self.resource_types.is_empty()
        && self.jobs.is_empty()
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceConfig> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn job(&self, name: &str) -> Option<&JobConfig> {
        self.jobs.iter().find(|j| j.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VarSourceConfig {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_name: Option<String>,
    #[serde(rename = "type", default)]
    pub type_: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Params>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_every: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_token: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub public: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceTypeConfig {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Params>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Params>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_every: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub privileged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_name: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub public: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub serial: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub serial_groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_in_flight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_logs_to_retain: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disable_manual_trigger: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub interruptible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success: Option<Box<StepConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<Box<StepConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<Box<StepConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_abort: Option<Box<StepConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ensure: Option<Box<StepConfig>>,
    #[serde(default)]
    pub plan: Vec<StepConfig>,
}

impl JobConfig {
    /// Recorre todos los steps del job, incluidos anidados y hooks.
    pub fn for_each_step<'a>(&'a self, f: &mut dyn FnMut(&'a StepConfig)) {
        for s in &self.plan {
            s.walk(f);
        }
        for hook in [&self.on_success, &self.on_failure, &self.on_error, &self.on_abort, &self.ensure].into_iter()
                                                                                                         .flatten()
        {
            hook.walk(f);
        }
    }

    /// Nombres de resources (no alias) que el job consume con `get`.
    pub fn inputs(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.for_each_step(&mut |s| {
                if let Some(name) = s.resource_name_for_get() {
                    out.push(name.to_string());
                }
            });
        out
    }

    /// Nombres de resources que el job usa (get o put).
    pub fn used_resources(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.for_each_step(&mut |s| {
                if let Some(name) = s.resource_name_for_get().or_else(|| s.resource_name_for_put()) {
                    out.push(name.to_string());
                }
            });
        out
    }
}
