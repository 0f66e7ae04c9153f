mod set_pipeline;
mod source;

pub use set_pipeline::SetPipelineStep;
pub use source::SetPipelineSource;
