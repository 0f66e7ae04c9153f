//! Contexto de ejecución entregado a `Step::run`.
//!
//! Lleva la señal de cancelación, el deadline opcional, la sesión de log y
//! el span actual bajo el que deben anidarse los spans hijos. Es barato de
//! clonar; los clones comparten la señal de cancelación.
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::errors::StepError;
use crate::logging::Session;

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
    logger: Session,
    span: tracing::Span,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(Session::new("pipeflow"))
    }
}

impl ExecutionContext {
    pub fn new(logger: Session) -> Self {
        Self { cancel: CancellationToken::new(),
               deadline: None,
               logger,
               span: tracing::Span::none() }
    }

    pub fn logger(&self) -> &Session {
        &self.logger
    }

    pub fn with_logger(&self, logger: Session) -> Self {
        Self { logger, ..self.clone() }
    }

    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    pub fn with_span(&self, span: tracing::Span) -> Self {
        Self { span, ..self.clone() }
    }

    /// Contexto hijo cancelable por separado; cancelar el padre cancela al hijo.
    pub fn child(&self) -> Self {
        Self { cancel: self.cancel.child_token(),
               ..self.clone() }
    }

    /// Fija un deadline relativo; se conserva el más cercano si ya existía.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(current) if current <= candidate => current,
            _ => candidate,
        };
        Self { deadline: Some(deadline),
               ..self.clone() }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Error de interrupción si el contexto ya no admite trabajo.
    pub fn check(&self) -> Result<(), StepError> {
        if self.cancel.is_cancelled() {
            return Err(StepError::Cancelled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Err(StepError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Ejecuta `fut` hasta que termine, el contexto se cancele o venza el
    /// deadline; en los dos últimos casos `fut` se descarta.
    pub async fn guard<F>(&self, fut: F) -> Result<F::Output, StepError>
        where F: Future
    {
        self.check()?;
        let deadline = async {
            match self.deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(StepError::Cancelled),
            _ = deadline => Err(StepError::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}
