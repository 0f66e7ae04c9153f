use serde::{Deserialize, Serialize};

/// Metadata del build que ejecuta el step (team, job, build).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepMetadata {
    pub team_id: i32,
    pub team_name: String,
    pub build_id: i64,
    pub build_name: String,
    pub pipeline_name: String,
    pub job_id: i32,
    pub job_name: String,
}
