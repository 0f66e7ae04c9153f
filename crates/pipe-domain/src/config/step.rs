use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Params;

fn is_false(b: &bool) -> bool {
    !*b
}

/// Un step dentro del plan de un job. Exactamente una de las claves de
/// acción (`get`, `put`, `task`, `set_pipeline`, `load_var`, `in_parallel`,
/// `do`, `try`) debería estar presente; la validación lo comprueba.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_pipeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_var: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_parallel: Option<InParallelConfig>,
    #[serde(rename = "do", default, skip_serializing_if = "Option::is_none")]
    pub do_steps: Option<Vec<StepConfig>>,
    #[serde(rename = "try", default, skip_serializing_if = "Option::is_none")]
    pub try_step: Option<Box<StepConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub passed: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub trigger: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_params: Option<Params>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<serde_yaml::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub privileged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_mapping: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_mapping: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vars: Option<Params>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub var_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub reveal: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

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
}

/// `in_parallel` admite una lista de steps o la forma extendida con límite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InParallelConfig {
    Steps(Vec<StepConfig>),
    Config(InParallelSteps),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InParallelSteps {
    pub steps: Vec<StepConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub fail_fast: bool,
}

impl InParallelConfig {
    pub fn steps(&self) -> &[StepConfig] {
        match self {
            InParallelConfig::Steps(s) => s,
            InParallelConfig::Config(c) => &c.steps,
        }
    }
}

impl StepConfig {
    /// Visita este step y todos los anidados (in_parallel, do, try, hooks).
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a StepConfig)) {
        f(self);
        if let Some(p) = &self.in_parallel {
            for s in p.steps() {
                s.walk(f);
            }
        }
        if let Some(steps) = &self.do_steps {
            for s in steps {
                s.walk(f);
            }
        }
        for nested in [&self.try_step, &self.on_success, &self.on_failure, &self.on_error, &self.on_abort, &self.ensure].into_iter()
                                                                                                                         .flatten()
        {
            nested.walk(f);
        }
    }

    /// Cantidad de claves de acción presentes en este step.
    pub fn action_count(&self) -> usize {
        [self.get.is_some(),
         self.put.is_some(),
         self.task.is_some(),
         self.set_pipeline.is_some(),
         self.load_var.is_some(),
         self.in_parallel.is_some(),
         self.do_steps.is_some(),
         self.try_step.is_some()].into_iter()
                                 .filter(|b| *b)
                                 .count()
    }

    /// Resource que lee un `get` (`resource:` si hay alias).
    pub fn resource_name_for_get(&self) -> Option<&str> {
        self.get.as_deref().map(|g| self.resource.as_deref().unwrap_or(g))
    }

    pub fn resource_name_for_put(&self) -> Option<&str> {
        self.put.as_deref().map(|p| self.resource.as_deref().unwrap_or(p))
    }
}
