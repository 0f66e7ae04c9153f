//! Runner local: `pipeflow set-pipeline ...`.
//!
//! Cada `--artifact name=dir` registra un artifact cuyo volumen es `dir`; el
//! step lee de ahí con un `VolumeWorkerClient` sin raíz.
use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use pipe_adapters::{SetPipelineStep, VolumeWorkerClient};
use pipe_core::{Artifact, ArtifactRepository, BuildStepDelegate, ExecutionContext, PlanId, RunState, SetPipelinePlan,
                StepError, StepMetadata, StepRunner};
use pipe_persistence::{InMemoryTeamFactory, TeamFactory};
use thiserror::Error;

pub const USAGE: &str = "usage: pipeflow set-pipeline --pipeline <name> --file <artifact/path> \
                         [--artifact name=dir]... [--var k=v]... [--load-vars-from artifact/path]... [--team <name>]";

pub const EXIT_OK: i32 = 0;
pub const EXIT_INVALID: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_ENGINE: i32 = 5;

/// Id del único team del runner local.
pub const LOCAL_TEAM_ID: i32 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("help requested")]
    Help,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("missing command")]
    MissingCommand,
    #[error("unknown flag '{0}'")]
    UnknownFlag(String),
    #[error("flag '{0}' requires a value")]
    MissingValue(String),
    #[error("flag '{0}' is required")]
    MissingFlag(&'static str),
    #[error("flag '{flag}' expects name=value, got '{value}'")]
    InvalidPair { flag: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetPipelineArgs {
    pub pipeline: String,
    pub file: String,
    pub team: String,
    pub artifacts: Vec<(String, PathBuf)>,
    pub vars: IndexMap<String, serde_yaml::Value>,
    pub var_files: Vec<String>,
}

fn split_pair(flag: &str, value: &str) -> Result<(String, String), UsageError> {
    match value.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(UsageError::InvalidPair { flag: flag.to_string(),
                                           value: value.to_string() }),
    }
}

/// Valor de `--var`: YAML si parsea como escalar o colección, texto si no.
fn var_value(raw: &str) -> serde_yaml::Value {
    if raw.is_empty() {
        return serde_yaml::Value::String(String::new());
    }
    serde_yaml::from_str(raw).unwrap_or_else(|_| serde_yaml::Value::String(raw.to_string()))
}

/// `args` sin el nombre del programa.
pub fn parse_args(args: &[String]) -> Result<SetPipelineArgs, UsageError> {
    let command = args.first().ok_or(UsageError::MissingCommand)?;
    match command.as_str() {
        "set-pipeline" => {}
        "-h" | "--help" | "help" => return Err(UsageError::Help),
        other => return Err(UsageError::UnknownCommand(other.to_string())),
    }

    let mut pipeline = None;
    let mut file = None;
    let mut team = None;
    let mut artifacts = Vec::new();
    let mut vars = IndexMap::new();
    let mut var_files = Vec::new();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        if flag == "-h" || flag == "--help" {
            return Err(UsageError::Help);
        }
        if !matches!(flag, "--pipeline" | "--file" | "--team" | "--artifact" | "--var" | "--load-vars-from") {
            return Err(UsageError::UnknownFlag(flag.to_string()));
        }
        i += 1;
        let value = args.get(i).ok_or_else(|| UsageError::MissingValue(flag.to_string()))?;
        match flag {
            "--pipeline" => pipeline = Some(value.clone()),
            "--file" => file = Some(value.clone()),
            "--team" => team = Some(value.clone()),
            "--artifact" => {
                let (name, dir) = split_pair(flag, value)?;
                artifacts.push((name, PathBuf::from(dir)));
            }
            "--var" => {
                let (k, v) = split_pair(flag, value)?;
                vars.insert(k, var_value(&v));
            }
            _ => var_files.push(value.clone()),
        }
        i += 1;
    }

    Ok(SetPipelineArgs { pipeline: pipeline.ok_or(UsageError::MissingFlag("--pipeline"))?,
                         file: file.unwrap_or_default(),
                         team: team.unwrap_or_else(|| "main".to_string()),
                         artifacts,
                         vars,
                         var_files })
}

/// Store en memoria con el team de `--team` ya registrado.
pub fn local_team_factory(args: &SetPipelineArgs) -> Arc<InMemoryTeamFactory> {
    let factory = Arc::new(InMemoryTeamFactory::new());
    factory.with_team(LOCAL_TEAM_ID, &args.team);
    factory
}

/// Corre el step una vez. `Ok(false)` indica una configuración inválida.
pub async fn run_set_pipeline(args: &SetPipelineArgs,
                              runner: &StepRunner,
                              ctx: &ExecutionContext,
                              delegate: Arc<dyn BuildStepDelegate>,
                              team_factory: Arc<dyn TeamFactory>)
                              -> Result<bool, StepError> {
    let repository = ArtifactRepository::new();
    for (name, dir) in &args.artifacts {
        repository.register_artifact(name.as_str(), Artifact::new(name.as_str(), dir.to_string_lossy()));
    }
    let state = RunState::with_repository(Arc::new(repository));

    let plan = SetPipelinePlan { name: args.pipeline.clone(),
                                 file: args.file.clone(),
                                 vars: args.vars.clone(),
                                 var_files: args.var_files.clone() };
    let metadata = StepMetadata { team_id: LOCAL_TEAM_ID,
                                  team_name: args.team.clone(),
                                  build_name: "local".to_string(),
                                  job_name: "set-pipeline".to_string(),
                                  ..Default::default() };

    let mut step = SetPipelineStep::new(PlanId::from("local"),
                                        plan,
                                        metadata,
                                        delegate,
                                        team_factory,
                                        Arc::new(VolumeWorkerClient::unrooted()));
    runner.run_step(&mut step, ctx, &state).await
}

pub fn exit_code(result: &Result<bool, StepError>) -> i32 {
    match result {
        Ok(true) => EXIT_OK,
        Ok(false) => EXIT_INVALID,
        Err(_) => EXIT_ENGINE,
    }
}
