//! Runner que envuelve la ejecución de un step en un span.
use crate::config::EngineConfig;
use crate::context::ExecutionContext;
use crate::errors::StepError;
use crate::state::RunState;
use crate::step::Step;
use crate::trace::Tracer;

/// Ejecuta steps individuales aplicando tracing y deadline por step.
///
/// La composición de steps (secuencia, paralelo) vive fuera del core; los
/// combinadores llaman a `run_step` por cada hijo con el mismo `RunState`.
#[derive(Debug, Clone, Default)]
pub struct StepRunner {
    tracer: Tracer,
    config: EngineConfig,
}

impl StepRunner {
    pub fn new(config: EngineConfig) -> Self {
        Self { tracer: Tracer::from_config(&config.tracing),
               config }
    }

    /// Reemplaza el tracer elegido por configuración (p. ej. un provider
    /// propio del proceso).
    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Corre `step` y devuelve su `succeeded()`. El span se cierra en todos
    /// los caminos de salida.
    pub async fn run_step(&self, step: &mut dyn Step, ctx: &ExecutionContext, state: &RunState) -> Result<bool, StepError> {
        let ctx = match self.config.step_timeout {
            Some(t) => ctx.with_timeout(t),
            None => ctx.clone(),
        };
        let (child, span) = self.tracer.start_span(&ctx, step.kind().component(), &step.span_attributes());
        let logger = child.logger().session("run-step", [("step", step.name().to_string())]);
        logger.debug("start");

        let res = step.run(&child, state).await;
        drop(span);

        match res {
            Ok(()) => {
                let ok = step.succeeded();
                logger.info("done", &[("succeeded", &ok)]);
                Ok(ok)
            }
            Err(e) => {
                logger.error("failed", &e);
                Err(e)
            }
        }
    }
}
