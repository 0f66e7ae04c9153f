//! Tracing de ejecución de steps.
//!
//! `Tracer` tiene dos variantes elegidas una sola vez al construir el motor
//! (ver `TracingConfig`): `Noop`, que devuelve el mismo contexto y un span
//! que ignora todo, y `Provider`, que delega en un `TraceProvider`
//! registrado. El span se cierra siempre vía `SpanGuard` (drop).
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::TracingConfig;
use crate::context::ExecutionContext;

mod noop;
mod subscriber;

pub use noop::NoopSpan;
pub use subscriber::SubscriberProvider;

/// Atributos de un span: claves y valores string.
pub type Attrs = BTreeMap<String, String>;

/// Intervalo trazado de ejecución.
pub trait Span: Send {
    fn set_attributes(&mut self, attrs: &Attrs);
    fn end(&mut self);
}

/// Backend capaz de abrir spans anidados bajo el span del contexto.
pub trait TraceProvider: Send + Sync {
    /// Abre el span `component` y devuelve el contexto derivado bajo el que
    /// deben anidarse los spans siguientes.
    fn start(&self, ctx: &ExecutionContext, component: &str) -> (ExecutionContext, Box<dyn Span>);
}

#[derive(Clone, Default)]
pub enum Tracer {
    #[default]
    Noop,
    Provider(Arc<dyn TraceProvider>),
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tracer::Noop => f.write_str("Tracer::Noop"),
            Tracer::Provider(_) => f.write_str("Tracer::Provider"),
        }
    }
}

impl Tracer {
    pub fn from_config(cfg: &TracingConfig) -> Self {
        if cfg.enabled {
            Tracer::Provider(Arc::new(SubscriberProvider::new(cfg.service_name.clone())))
        } else {
            Tracer::Noop
        }
    }

    pub fn with_provider(provider: Arc<dyn TraceProvider>) -> Self {
        Tracer::Provider(provider)
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Tracer::Provider(_))
    }

    pub fn start_span(&self, ctx: &ExecutionContext, component: &str, attrs: &Attrs) -> (ExecutionContext, SpanGuard) {
        match self {
            Tracer::Noop => (ctx.clone(), SpanGuard::new(Box::new(NoopSpan))),
            Tracer::Provider(provider) => {
                let (child, mut span) = provider.start(ctx, component);
                span.set_attributes(attrs);
                (child, SpanGuard::new(span))
            }
        }
    }
}

/// Dueño del span abierto: lo cierra al salir de scope si nadie llamó a
/// `end` antes.
pub struct SpanGuard {
    span: Box<dyn Span>,
    ended: bool,
}

impl SpanGuard {
    pub fn new(span: Box<dyn Span>) -> Self {
        Self { span, ended: false }
    }

    pub fn set_attributes(&mut self, attrs: &Attrs) {
        if !self.ended {
            self.span.set_attributes(attrs);
        }
    }

    pub fn end(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if !self.ended {
            self.ended = true;
            self.span.end();
        }
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        self.finish();
    }
}
