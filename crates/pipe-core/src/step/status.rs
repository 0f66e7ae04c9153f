use crate::errors::StepError;

/// Estado de un Step en tiempo de ejecución.
///
/// Las transiciones válidas son:
/// - `Pending` -> `Running`
/// - `Running` -> `FinishedOk`
/// - `Running` -> `Failed`
///
/// No se permiten reversiones; un step terminado no vuelve a correr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepStatus {
    /// El paso está pendiente de ejecución.
    #[default]
    Pending,
    /// El paso está en ejecución.
    Running,
    /// El paso finalizó correctamente.
    FinishedOk,
    /// El paso falló (error o resultado de negocio no exitoso).
    Failed,
}

impl StepStatus {
    /// Marca el inicio de la ejecución; falla si el step ya corrió.
    pub fn begin(&mut self) -> Result<(), StepError> {
        match self {
            StepStatus::Pending => {
                *self = StepStatus::Running;
                Ok(())
            }
            _ => Err(StepError::AlreadyRan),
        }
    }

    /// Cierra la ejecución. Sólo tiene efecto desde `Running`.
    pub fn finish(&mut self, succeeded: bool) {
        if *self == StepStatus::Running {
            *self = if succeeded { StepStatus::FinishedOk } else { StepStatus::Failed };
        }
    }

    pub fn succeeded(&self) -> bool {
        *self == StepStatus::FinishedOk
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::FinishedOk | StepStatus::Failed)
    }
}
