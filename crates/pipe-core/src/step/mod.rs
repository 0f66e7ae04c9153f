//! Definiciones relacionadas a Steps.
//!
//! Un Step es la unidad que el motor planifica. Este módulo define:
//! - `Step`: contrato asíncrono que todo step concreto implementa.
//! - `StepKind`: tipo general del step (un variant por familia de steps).
//! - `StepStatus`: máquina de estados `Pending -> Running -> FinishedOk|Failed`.

pub mod definition;
mod status;

pub use definition::{Step, StepKind};
pub use status::StepStatus;
