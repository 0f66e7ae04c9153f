//! Provider sobre el crate `tracing`: cada span del motor es un span
//! `tracing` anidado bajo el span del contexto, exportado por el subscriber
//! que el proceso haya instalado.
use tracing::field::Empty;

use super::{Attrs, Span};
use crate::constants::ENGINE_VERSION;
use crate::context::ExecutionContext;
use crate::trace::TraceProvider;

#[derive(Debug, Clone)]
pub struct SubscriberProvider {
    service: String,
}

impl SubscriberProvider {
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }
}

impl TraceProvider for SubscriberProvider {
    fn start(&self, ctx: &ExecutionContext, component: &str) -> (ExecutionContext, Box<dyn Span>) {
        let span = tracing::info_span!(parent: ctx.span(),
                                       "step",
                                       service = %self.service,
                                       component = %component,
                                       engine_version = ENGINE_VERSION,
                                       attributes = Empty);
        (ctx.with_span(span.clone()), Box::new(SubscriberSpan { span: Some(span) }))
    }
}

struct SubscriberSpan {
    span: Option<tracing::Span>,
}

impl Span for SubscriberSpan {
    fn set_attributes(&mut self, attrs: &Attrs) {
        if let Some(span) = &self.span {
            let rendered = attrs.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(",");
            span.record("attributes", rendered.as_str());
        }
    }

    fn end(&mut self) {
        if let Some(span) = self.span.take() {
            tracing::trace!(parent: &span, "span ended");
        }
    }
}
