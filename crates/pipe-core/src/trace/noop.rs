use super::{Attrs, Span};

/// Span usado cuando el tracing no está configurado.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

impl Span for NoopSpan {
    fn set_attributes(&mut self, _attrs: &Attrs) {}

    fn end(&mut self) {}
}
