//! SetPipelineStep
//!
//! Toma un archivo de configuración (y var files) de artifacts producidos
//! por steps previos y lo guarda como pipeline del team del build.
//!
//! Salida visible: warnings e errores de validación por stderr; diff,
//! `no diff found.` / `setting pipeline:` / `done` por stdout. Una
//! configuración inválida no es un error del step: `run` devuelve `Ok(())`
//! y `succeeded()` queda en `false`.
use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use pipe_core::{Attrs, BuildStepDelegate, ExecutionContext, PlanId, RunState, SetPipelinePlan, Step, StepError,
                StepKind, StepMetadata, StepStatus, WorkerClient};
use pipe_domain::{validate, Config};
use pipe_persistence::{ConfigVersion, TeamFactory};

use super::SetPipelineSource;

pub struct SetPipelineStep {
    plan_id: PlanId,
    plan: SetPipelinePlan,
    metadata: StepMetadata,
    delegate: Arc<dyn BuildStepDelegate>,
    team_factory: Arc<dyn TeamFactory>,
    client: Arc<dyn WorkerClient>,
    status: StepStatus,
}

impl SetPipelineStep {
    pub fn new(plan_id: PlanId,
               plan: SetPipelinePlan,
               metadata: StepMetadata,
               delegate: Arc<dyn BuildStepDelegate>,
               team_factory: Arc<dyn TeamFactory>,
               client: Arc<dyn WorkerClient>)
               -> Self {
        Self { plan_id,
               plan,
               metadata,
               delegate,
               team_factory,
               client,
               status: StepStatus::Pending }
    }

    async fn execute(&self, ctx: &ExecutionContext, state: &RunState) -> Result<bool, StepError> {
        let logger = ctx.logger().session("set-pipeline-step",
                                          [("step-name", self.plan.name.clone()),
                                           ("plan-id", self.plan_id.to_string()),
                                           ("job-id", self.metadata.job_id.to_string())]);

        self.delegate.initializing(&logger);
        let mut stdout = self.delegate.stdout();
        let mut stderr = self.delegate.stderr();

        let source = SetPipelineSource::new(ctx, &logger, &self.plan, state.artifact_repository(), self.client.as_ref());
        source.validate()?;
        let config = source.fetch_config().await?;

        self.delegate.starting(&logger);

        let (warnings, errors) = validate(&config);
        for warning in &warnings {
            writeln!(stderr, "WARNING: {}", warning.message)?;
        }
        if !errors.is_empty() {
            writeln!(stderr, "invalid pipeline:")?;
            for e in &errors {
                writeln!(stderr, "- {}", e.message)?;
            }
            self.delegate.finished(&logger, false);
            return Ok(false);
        }

        let team = self.team_factory.team(self.metadata.team_id);
        let existing = ctx.guard(team.pipeline(&self.plan.name))
                          .await?
                          .map_err(|e| StepError::external("load pipeline", e))?;
        let (from, existing_config) = match existing {
            None => (ConfigVersion::NONE, Config::default()),
            Some(p) => (p.config_version(), p.config().map_err(|e| StepError::external("load pipeline config", e))?),
        };

        if !existing_config.diff(&mut *stdout, &config)? {
            logger.debug("no-diff");
            writeln!(stdout, "no diff found.")?;
            self.delegate.finished(&logger, true);
            return Ok(true);
        }

        writeln!(stdout, "setting pipeline: {}", self.plan.name)?;
        let (saved, version) = ctx.guard(team.save_pipeline(&self.plan.name, &config, from, false))
                                  .await?
                                  .map_err(|e| StepError::external("save pipeline", e))?;
        writeln!(stdout, "done")?;
        logger.info("saved-pipeline",
                    &[("team", &team.name()), ("pipeline", &saved.name()), ("version", &version)]);

        self.delegate.finished(&logger, true);
        Ok(true)
    }
}

#[async_trait]
impl Step for SetPipelineStep {
    fn kind(&self) -> StepKind {
        StepKind::SetPipeline
    }

    fn name(&self) -> &str {
        &self.plan.name
    }

    fn span_attributes(&self) -> Attrs {
        let mut attrs = Attrs::new();
        attrs.insert("name".to_string(), self.plan.name.clone());
        attrs.insert("team".to_string(), self.metadata.team_name.clone());
        attrs.insert("pipeline".to_string(), self.metadata.pipeline_name.clone());
        attrs.insert("job".to_string(), self.metadata.job_name.clone());
        attrs.insert("build".to_string(), self.metadata.build_name.clone());
        attrs
    }

    async fn run(&mut self, ctx: &ExecutionContext, state: &RunState) -> Result<(), StepError> {
        self.status.begin()?;
        let outcome = self.execute(ctx, state).await;
        self.status.finish(matches!(outcome, Ok(true)));
        outcome.map(|_| ())
    }

    fn succeeded(&self) -> bool {
        self.status.succeeded()
    }
}
