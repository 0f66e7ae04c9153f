//! Obtención de la configuración de pipeline desde artifacts.
//!
//! Orden fijo: archivo principal, var files en el orden declarado,
//! resolución de variables y por último la decodificación estricta.
use pipe_core::constants::ARTIFACT_PATH_SEPARATOR;
use pipe_core::{ArtifactName, ArtifactRepository, ExecutionContext, Session, SetPipelinePlan, StepError, WorkerClient,
                WorkerError};
use pipe_domain::{unmarshal_config, Config, MultiVariables, StaticVariables, TemplateResolver};
use tokio::io::AsyncReadExt;

pub struct SetPipelineSource<'a> {
    ctx: &'a ExecutionContext,
    logger: &'a Session,
    plan: &'a SetPipelinePlan,
    repository: &'a ArtifactRepository,
    client: &'a dyn WorkerClient,
}

impl<'a> SetPipelineSource<'a> {
    pub fn new(ctx: &'a ExecutionContext,
               logger: &'a Session,
               plan: &'a SetPipelinePlan,
               repository: &'a ArtifactRepository,
               client: &'a dyn WorkerClient)
               -> Self {
        Self { ctx,
               logger,
               plan,
               repository,
               client }
    }

    pub fn validate(&self) -> Result<(), StepError> {
        if self.plan.file.is_empty() {
            return Err(StepError::MissingField("file"));
        }
        Ok(())
    }

    pub async fn fetch_config(&self) -> Result<Config, StepError> {
        let mut bytes = self.fetch_pipeline_bytes(&self.plan.file).await?;

        let mut sources = MultiVariables::default();
        if !self.plan.vars.is_empty() {
            sources.push(Box::new(StaticVariables::new(self.plan.vars.clone())));
        }
        for var_file in &self.plan.var_files {
            let raw = self.fetch_pipeline_bytes(var_file).await?;
            let vars = StaticVariables::from_yaml(&raw).map_err(|e| StepError::external("load var file", e))?;
            sources.push(Box::new(vars));
        }

        if !sources.is_empty() {
            bytes = TemplateResolver::new(bytes, sources).resolve(false, false)
                                                         .map_err(|e| StepError::external("resolve vars", e))?;
        }

        unmarshal_config(&bytes).map_err(|e| StepError::external("decode pipeline config", e))
    }

    /// `path` es `<artifact>/<ruta dentro del artifact>` con exactamente un
    /// separador.
    pub async fn fetch_pipeline_bytes(&self, path: &str) -> Result<Vec<u8>, StepError> {
        let unspecified = || StepError::UnspecifiedArtifactSource { path: path.to_string() };
        if path.matches(ARTIFACT_PATH_SEPARATOR).count() != 1 {
            return Err(unspecified());
        }
        let (artifact, file) = path.split_once(ARTIFACT_PATH_SEPARATOR).ok_or_else(unspecified)?;
        self.retrieve_in_artifact(artifact, file).await
    }

    pub async fn retrieve_in_artifact(&self, name: &str, file: &str) -> Result<Vec<u8>, StepError> {
        let artifact = self.repository
                           .artifact_for(&ArtifactName::from(name))
                           .ok_or_else(|| StepError::UnknownArtifactSource { name: name.to_string(),
                                                                             path: file.to_string() })?;

        let opened = self.ctx
                         .guard(self.client.stream_file_from_artifact(self.ctx, self.logger, &artifact, file))
                         .await?;
        let mut stream = match opened {
            Ok(s) => s,
            Err(WorkerError::FileNotFound) => {
                return Err(StepError::FileNotFound { name: name.to_string(),
                                                     path: file.to_string() })
            }
            Err(e) => return Err(e.into()),
        };

        let mut buf = Vec::new();
        self.ctx.guard(stream.read_to_end(&mut buf)).await??;
        self.logger.debug("retrieved-file");
        Ok(buf)
    }
}
