//! Chequeos semánticos de una `Config`.
//!
//! Los warnings no impiden guardar el pipeline; los errores sí. Ninguno de
//! los dos es un error de Rust: el caller decide qué hacer con cada lista.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::config::{Config, JobConfig, StepConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    InvalidIdentifier,
    UnusedResource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub kind: WarningKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrorEntry {
    pub message: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Display for ConfigErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Default)]
struct Report {
    warnings: Vec<ConfigWarning>,
    errors: Vec<ConfigErrorEntry>,
}

impl Report {
    fn warn(&mut self, kind: WarningKind, message: String) {
        self.warnings.push(ConfigWarning { kind, message });
    }

    fn error(&mut self, message: String) {
        self.errors.push(ConfigErrorEntry { message });
    }
}

pub fn validate(config: &Config) -> (Vec<ConfigWarning>, Vec<ConfigErrorEntry>) {
    let mut report = Report::default();

    validate_identifiers(config, &mut report);
    validate_groups(config, &mut report);
    validate_resources(config, &mut report);
    validate_resource_types(config, &mut report);
    validate_var_sources(config, &mut report);
    validate_jobs(config, &mut report);

    (report.warnings, report.errors)
}

/// Motivo por el que `name` no es un identificador válido, si lo hay.
/// Los nombres que contienen un placeholder se aceptan tal cual.
pub fn identifier_problem(name: &str) -> Option<String> {
    if name.contains("((") {
        return None;
    }
    let mut chars = name.chars();
    match chars.next() {
        None => return Some("identifier cannot be an empty string".to_string()),
        Some(c) if !c.is_lowercase() => return Some("must start with a lowercase letter".to_string()),
        _ => {}
    }
    chars.find(|c| !(c.is_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.')))
         .map(|c| format!("illegal character '{c}'"))
}

fn validate_identifiers(config: &Config, report: &mut Report) {
    let sections: [(&str, Vec<&str>); 5] =
        [("group", config.groups.iter().map(|g| g.name.as_str()).collect()),
         ("resource", config.resources.iter().map(|r| r.name.as_str()).collect()),
         ("resource type", config.resource_types.iter().map(|r| r.name.as_str()).collect()),
         ("var source", config.var_sources.iter().map(|v| v.name.as_str()).collect()),
         ("job", config.jobs.iter().map(|j| j.name.as_str()).collect())];

    for (kind, names) in sections {
        for name in names {
            if let Some(problem) = identifier_problem(name) {
                report.warn(WarningKind::InvalidIdentifier,
                            format!("{kind} '{name}' is not a valid identifier: {problem}"));
            }
        }
    }
}

fn report_duplicates<'a>(kind: &str, names: impl Iterator<Item = &'a str>, report: &mut Report) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }
    for (name, n) in counts {
        if n > 1 {
            report.error(format!("{kind} '{name}' appears {n} times"));
        }
    }
}

fn validate_groups(config: &Config, report: &mut Report) {
    report_duplicates("group", config.groups.iter().map(|g| g.name.as_str()), report);

    for group in &config.groups {
        for job in &group.jobs {
            // los globs (`build-*`) se resuelven contra todos los jobs
            let known = if job.contains('*') {
                config.jobs.iter().any(|j| glob_match(job, &j.name))
            } else {
                config.job(job).is_some()
            };
            if !known {
                report.error(format!("group '{}' has unknown job '{job}'", group.name));
            }
        }
        for resource in &group.resources {
            if config.resource(resource).is_none() {
                report.error(format!("group '{}' has unknown resource '{resource}'", group.name));
            }
        }
    }

    if !config.groups.is_empty() {
        for job in &config.jobs {
            let grouped = config.groups
                                .iter()
                                .any(|g| g.jobs.iter().any(|pattern| glob_match(pattern, &job.name)));
            if !grouped {
                report.error(format!("job '{}' belongs to no group", job.name));
            }
        }
    }
}

fn validate_resources(config: &Config, report: &mut Report) {
    report_duplicates("resource", config.resources.iter().map(|r| r.name.as_str()), report);

    let used: BTreeSet<String> = config.jobs.iter().flat_map(JobConfig::used_resources).collect();
    for resource in &config.resources {
        if resource.type_.is_empty() {
            report.error(format!("resource '{}' has no type", resource.name));
        }
        if !used.contains(&resource.name) {
            report.warn(WarningKind::UnusedResource,
                        format!("resource '{}' is not used", resource.name));
        }
    }
}

fn validate_resource_types(config: &Config, report: &mut Report) {
    report_duplicates("resource type", config.resource_types.iter().map(|r| r.name.as_str()), report);
    for rt in &config.resource_types {
        if rt.type_.is_empty() {
            report.error(format!("resource type '{}' has no type", rt.name));
        }
    }
}

fn validate_var_sources(config: &Config, report: &mut Report) {
    report_duplicates("var source", config.var_sources.iter().map(|v| v.name.as_str()), report);
    for vs in &config.var_sources {
        if vs.type_.is_empty() {
            report.error(format!("var source '{}' has no type", vs.name));
        }
    }
}

fn validate_jobs(config: &Config, report: &mut Report) {
    report_duplicates("job", config.jobs.iter().map(|j| j.name.as_str()), report);

    for job in &config.jobs {
        if job.plan.is_empty() {
            report.error(format!("job '{}' has no steps in its plan", job.name));
        }
        if job.serial && job.max_in_flight == Some(0) {
            report.error(format!("job '{}' sets serial with max_in_flight 0", job.name));
        }

        let mut step_errors = Vec::new();
        job.for_each_step(&mut |step| check_step(config, &job.name, step, &mut step_errors));
        for message in step_errors {
            report.error(message);
        }
    }
}

fn check_step(config: &Config, job: &str, step: &StepConfig, errors: &mut Vec<String>) {
    match step.action_count() {
        0 => errors.push(format!("job '{job}' has a step with no action")),
        1 => {}
        _ => errors.push(format!("job '{job}' has a step with more than one action")),
    }

    if let Some(resource) = step.resource_name_for_get() {
        if config.resource(resource).is_none() {
            errors.push(format!("job '{job}' gets unknown resource '{resource}'"));
        }
        for upstream in &step.passed {
            match config.job(upstream) {
                None => errors.push(format!("job '{job}' has get '{resource}' passed unknown job '{upstream}'")),
                Some(other) if !other.used_resources().iter().any(|r| r == resource) => {
                    errors.push(format!("job '{job}' has get '{resource}' passed job '{upstream}' which does not use it"))
                }
                Some(_) => {}
            }
        }
    }

    if let Some(resource) = step.resource_name_for_put() {
        if config.resource(resource).is_none() {
            errors.push(format!("job '{job}' puts unknown resource '{resource}'"));
        }
    }

    if let Some(task) = &step.task {
        if step.file.is_none() && step.config.is_none() {
            errors.push(format!("job '{job}' task '{task}' specifies neither file nor config"));
        }
    }

    if let Some(pipeline) = &step.set_pipeline {
        if step.file.as_deref().map_or(true, str::is_empty) {
            errors.push(format!("job '{job}' set_pipeline '{pipeline}' does not specify file"));
        }
    }
}

/// Glob mínimo para nombres de job en groups: sólo `*`.
fn glob_match(pattern: &str, name: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == name;
    }
    let mut rest = name;
    for (i, part) in parts.iter().enumerate() {
        if i == 0 {
            match rest.strip_prefix(part) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == parts.len() - 1 {
            return rest.ends_with(part);
        } else {
            match rest.find(part) {
                Some(idx) => rest = &rest[idx + part.len()..],
                None => return false,
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::unmarshal_config;

    fn check(yaml: &str) -> (Vec<ConfigWarning>, Vec<ConfigErrorEntry>) {
        validate(&unmarshal_config(yaml.as_bytes()).expect("config"))
    }

    fn messages(errors: &[ConfigErrorEntry]) -> Vec<&str> {
        errors.iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn valid_config_has_no_findings() {
        let (warnings, errors) = check(
            "resources:\n- name: repo\n  type: git\njobs:\n- name: unit\n  plan:\n  - get: repo\n  - task: test\n    file: repo/t.yml\n- name: deploy\n  plan:\n  - get: repo\n    passed: [unit]\n  - put: repo\n",
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn invalid_identifiers_are_warnings() {
        let (warnings, errors) = check("jobs:\n- name: Build_Job\n  plan:\n  - task: t\n    config: {}\n");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::InvalidIdentifier);
        assert!(warnings[0].message.contains("must start with a lowercase letter"));
        assert_eq!(identifier_problem("ok-name_1.x"), None);
        assert_eq!(identifier_problem("bad name"), Some("illegal character ' '".to_string()));
    }

    #[test]
    fn unused_resource_is_a_warning() {
        let (warnings, _) = check("resources:\n- name: idle\n  type: git\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::UnusedResource);
        assert_eq!(warnings[0].message, "resource 'idle' is not used");
    }

    #[test]
    fn structural_problems_are_errors() {
        let (_, errors) = check(
            "groups:\n- name: g\n  jobs: [a, ghost]\nresources:\n- name: r\n- name: r\n  type: git\njobs:\n- name: a\n  serial: true\n  max_in_flight: 0\n  plan:\n  - get: nope\n  - put: r\n  - task: t\n  - set_pipeline: p\n- name: b\n  plan: []\n",
        );
        let msgs = messages(&errors);
        for expected in ["resource 'r' appears 2 times",
                         "resource 'r' has no type",
                         "group 'g' has unknown job 'ghost'",
                         "job 'b' belongs to no group",
                         "job 'b' has no steps in its plan",
                         "job 'a' sets serial with max_in_flight 0",
                         "job 'a' gets unknown resource 'nope'",
                         "job 'a' task 't' specifies neither file nor config",
                         "job 'a' set_pipeline 'p' does not specify file"]
        {
            assert!(msgs.contains(&expected), "missing {expected:?} in {msgs:?}");
        }
    }

    #[test]
    fn passed_constraints_are_checked() {
        let (_, errors) = check(
            "resources:\n- name: r\n  type: git\n- name: s\n  type: git\njobs:\n- name: a\n  plan:\n  - get: s\n- name: b\n  plan:\n  - get: r\n    passed: [a, ghost]\n",
        );
        let msgs = messages(&errors);
        assert!(msgs.contains(&"job 'b' has get 'r' passed job 'a' which does not use it"), "{msgs:?}");
        assert!(msgs.contains(&"job 'b' has get 'r' passed unknown job 'ghost'"), "{msgs:?}");
    }

    #[test]
    fn group_job_globs_match() {
        assert!(glob_match("build-*", "build-linux"));
        assert!(glob_match("*-linux", "build-linux"));
        assert!(!glob_match("build-*", "test-linux"));
        let (_, errors) = check("groups:\n- name: g\n  jobs: ['build-*']\njobs:\n- name: build-a\n  plan:\n  - task: t\n    config: {}\n");
        assert!(errors.is_empty(), "{errors:?}");
    }
}
