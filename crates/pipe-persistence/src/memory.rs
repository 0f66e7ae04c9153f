//! Store en memoria con compare-and-swap por (team, pipeline).
//!
//! La entrada del `DashMap` se bloquea sólo durante la comparación y la
//! escritura; no hay locks entre la lectura del caller y su `save_pipeline`.
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, warn};
use pipe_core::hashing::hash_str;
use pipe_domain::{marshal_config, unmarshal_config, Config};

use crate::error::PersistenceError;
use crate::store::{ConfigVersion, PipelineHandle, Team, TeamFactory};

/// Snapshot de un pipeline guardado: YAML de la config y su hash blake3.
#[derive(Debug, Clone)]
pub struct InMemoryPipeline {
    name: String,
    version: ConfigVersion,
    config_yaml: String,
    config_hash: String,
    paused: bool,
    last_updated: DateTime<Utc>,
}

impl PipelineHandle for InMemoryPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn config_version(&self) -> ConfigVersion {
        self.version
    }

    fn config(&self) -> Result<Config, PersistenceError> {
        if hash_str(&self.config_yaml) != self.config_hash {
            return Err(PersistenceError::Corrupted(self.name.clone()));
        }
        Ok(unmarshal_config(self.config_yaml.as_bytes())?)
    }

    fn paused(&self) -> bool {
        self.paused
    }

    fn config_hash(&self) -> &str {
        &self.config_hash
    }

    fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }
}

#[derive(Debug)]
pub struct InMemoryTeam {
    id: i32,
    name: String,
    pipelines: DashMap<String, InMemoryPipeline>,
}

impl InMemoryTeam {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self { id,
               name: name.into(),
               pipelines: DashMap::new() }
    }

    #[cfg(test)]
    fn corrupt(&self, name: &str) {
        if let Some(mut p) = self.pipelines.get_mut(name) {
            p.config_yaml = "jobs: not-a-list\n".to_string();
        }
    }
}

#[async_trait]
impl Team for InMemoryTeam {
    fn id(&self) -> i32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn pipeline(&self, name: &str) -> Result<Option<Arc<dyn PipelineHandle>>, PersistenceError> {
        Ok(self.pipelines
               .get(name)
               .map(|p| Arc::new(p.value().clone()) as Arc<dyn PipelineHandle>))
    }

    async fn save_pipeline(&self,
                           name: &str,
                           config: &Config,
                           from: ConfigVersion,
                           apply_config_only: bool)
                           -> Result<(Arc<dyn PipelineHandle>, ConfigVersion), PersistenceError> {
        let config_yaml = marshal_config(config)?;
        let config_hash = hash_str(&config_yaml);
        let now = Utc::now();

        let saved = match self.pipelines.entry(name.to_string()) {
            Entry::Vacant(slot) => {
                if from != ConfigVersion::NONE {
                    warn!("save_pipeline conflict team={} pipeline={} expected={} actual=0", self.name, name, from);
                    return Err(PersistenceError::VersionConflict { pipeline: name.to_string(),
                                                                   expected: from,
                                                                   actual: ConfigVersion::NONE });
                }
                let pipeline = InMemoryPipeline { name: name.to_string(),
                                                  version: ConfigVersion::NONE.next(),
                                                  config_yaml,
                                                  config_hash,
                                                  paused: apply_config_only,
                                                  last_updated: now };
                slot.insert(pipeline.clone());
                pipeline
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get().version;
                if current != from {
                    warn!("save_pipeline conflict team={} pipeline={} expected={} actual={}", self.name, name, from, current);
                    return Err(PersistenceError::VersionConflict { pipeline: name.to_string(),
                                                                   expected: from,
                                                                   actual: current });
                }
                let stored = slot.get_mut();
                stored.version = current.next();
                stored.config_yaml = config_yaml;
                stored.config_hash = config_hash;
                stored.last_updated = now;
                if !apply_config_only {
                    stored.paused = false;
                }
                stored.clone()
            }
        };

        debug!("save_pipeline team={} pipeline={} version={}", self.name, name, saved.version);
        let version = saved.version;
        Ok((Arc::new(saved), version))
    }
}

/// Teams en memoria creados bajo demanda.
#[derive(Debug, Default)]
pub struct InMemoryTeamFactory {
    teams: DashMap<i32, Arc<InMemoryTeam>>,
}

impl InMemoryTeamFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra (o devuelve) el team `id` con un nombre explícito.
    pub fn with_team(&self, id: i32, name: &str) -> Arc<InMemoryTeam> {
        self.teams
            .entry(id)
            .or_insert_with(|| Arc::new(InMemoryTeam::new(id, name)))
            .value()
            .clone()
    }

    /// Acceso concreto para inspeccionar el estado en tests y herramientas.
    pub fn in_memory_team(&self, id: i32) -> Arc<InMemoryTeam> {
        self.teams
            .entry(id)
            .or_insert_with(|| Arc::new(InMemoryTeam::new(id, format!("team-{id}"))))
            .value()
            .clone()
    }
}

impl TeamFactory for InMemoryTeamFactory {
    fn team(&self, id: i32) -> Arc<dyn Team> {
        self.in_memory_team(id)
    }
}
