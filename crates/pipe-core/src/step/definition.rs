use std::fmt;

use async_trait::async_trait;

use crate::context::ExecutionContext;
use crate::errors::StepError;
use crate::state::RunState;
use crate::trace::Attrs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    SetPipeline,
    Task,
    Get,
    Put,
    Composite,
}

impl StepKind {
    /// Nombre del componente usado para el span del step.
    pub fn component(&self) -> &'static str {
        match self {
            StepKind::SetPipeline => "set_pipeline",
            StepKind::Task => "task",
            StepKind::Get => "get",
            StepKind::Put => "put",
            StepKind::Composite => "composite",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.component())
    }
}

/// Contrato de un step del plan.
///
/// `run` se llama a lo sumo una vez por instancia y debe respetar la
/// cancelación/deadline de `ctx`. `succeeded` refleja el resultado de
/// negocio: un step puede devolver `Ok(())` y aun así no haber tenido éxito
/// (p. ej. configuración inválida reportada al usuario).
#[async_trait]
pub trait Step: Send + Sync {
    fn kind(&self) -> StepKind;

    /// Nombre amigable (por defecto el del tipo de step).
    fn name(&self) -> &str {
        self.kind().component()
    }

    /// Atributos que el runner adjunta al span del step.
    fn span_attributes(&self) -> Attrs {
        Attrs::new()
    }

    async fn run(&mut self, ctx: &ExecutionContext, state: &RunState) -> Result<(), StepError>;

    /// Sólo significativo después de `run`.
    fn succeeded(&self) -> bool;
}
