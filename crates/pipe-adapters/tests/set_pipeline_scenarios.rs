//! Escenarios de punta a punta de `SetPipelineStep` con worker y store
//! falsos.


use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use pipe_core::{DelegatePhase, Step, StepError, StepRunner, WorkerError};
use pipe_domain::{ConfigError, VarsError};
use pipe_persistence::{ConfigVersion, InMemoryTeamFactory, PersistenceError, PipelineHandle, Team, TeamFactory};
use test_support::*;

fn valid_worker() -> Arc<FakeWorker> {
    Arc::new(FakeWorker::default().with_file(VOLUME, "pipeline.yml", VALID_CONFIG))
}

async fn stored_version(fx: &Fixture) -> Option<ConfigVersion> {
    fx.factory
      .team(1)
      .pipeline(PIPELINE)
      .await
      .expect("read")
      .map(|p| p.config_version())
}

#[tokio::test]
async fn new_pipeline_is_diffed_and_saved() {
    let worker = valid_worker();
    let fx = Fixture::new(worker.clone());
    let mut step = fx.step(plan("some-resource/pipeline.yml"));

    step.run(&ctx(), &fx.state).await.expect("run");

    assert!(step.succeeded());
    let out = fx.delegate.stdout_contents();
    assert!(out.contains("resource repo has been added:"), "{out}");
    assert!(out.contains("job unit has been added:"), "{out}");
    assert!(out.ends_with("setting pipeline: some-pipeline\ndone\n"), "{out}");
    assert_eq!(fx.delegate.stderr_contents(), "");
    assert_eq!(fx.delegate.phases(),
               vec![DelegatePhase::Initializing,
                    DelegatePhase::Starting,
                    DelegatePhase::Finished { succeeded: true }]);
    assert_eq!(worker.calls(), vec![(VOLUME.to_string(), "pipeline.yml".to_string())]);
    assert_eq!(worker.released(), 1);
    assert_eq!(stored_version(&fx).await, Some(ConfigVersion(1)));
}

#[tokio::test]
async fn unchanged_pipeline_reports_no_diff_and_keeps_version() {
    let mut fx = Fixture::new(valid_worker());
    fx.step(plan("some-resource/pipeline.yml")).run(&ctx(), &fx.state).await.expect("first run");
    fx.fresh_delegate();

    let mut again = fx.step(plan("some-resource/pipeline.yml"));
    again.run(&ctx(), &fx.state).await.expect("second run");

    assert!(again.succeeded());
    assert_eq!(fx.delegate.stdout_contents(), "no diff found.\n");
    assert_eq!(fx.delegate.finished_with(), Some(true));
    assert_eq!(stored_version(&fx).await, Some(ConfigVersion(1)));
}

#[tokio::test]
async fn tagged_and_merged_config_is_stable_across_runs() {
    let config = "resources:\n- name: repo\n  <<: {type: git}\n  source:\n    uri: !custom x\njobs:\n- name: unit\n  plan:\n  - get: repo\n";
    let mut fx = Fixture::new(Arc::new(FakeWorker::default().with_file(VOLUME, "pipeline.yml", config)));
    fx.step(plan("some-resource/pipeline.yml")).run(&ctx(), &fx.state).await.expect("first run");
    assert_eq!(stored_version(&fx).await, Some(ConfigVersion(1)));
    fx.fresh_delegate();

    let mut again = fx.step(plan("some-resource/pipeline.yml"));
    again.run(&ctx(), &fx.state).await.expect("second run");

    assert!(again.succeeded());
    assert_eq!(fx.delegate.stdout_contents(), "no diff found.\n");
    assert_eq!(stored_version(&fx).await, Some(ConfigVersion(1)));
}

#[tokio::test]
async fn identical_config_at_a_later_version_is_not_saved() {
    let fx = Fixture::new(valid_worker());
    let team = fx.factory.in_memory_team(1);
    let same = pipe_domain::unmarshal_config(VALID_CONFIG.as_bytes()).expect("config");
    for from in 0..3 {
        team.save_pipeline(PIPELINE, &same, ConfigVersion(from), false).await.expect("seed");
    }
    assert_eq!(stored_version(&fx).await, Some(ConfigVersion(3)));

    let mut step = fx.step(plan("some-resource/pipeline.yml"));
    step.run(&ctx(), &fx.state).await.expect("run");

    assert!(step.succeeded());
    assert_eq!(fx.delegate.stdout_contents(), "no diff found.\n");
    assert_eq!(stored_version(&fx).await, Some(ConfigVersion(3)));
}

#[tokio::test]
async fn changed_pipeline_bumps_version_and_unpauses() {
    let fx = Fixture::new(valid_worker());
    let team = fx.factory.in_memory_team(1);
    let old = pipe_domain::unmarshal_config(b"resources:\n- name: repo\n  type: time\njobs:\n- name: unit\n  plan:\n  - get: repo\n").expect("old");
    team.save_pipeline(PIPELINE, &old, ConfigVersion::NONE, true).await.expect("seed");
    assert!(team.pipeline(PIPELINE).await.expect("read").expect("seeded").paused());

    let mut step = fx.step(plan("some-resource/pipeline.yml"));
    step.run(&ctx(), &fx.state).await.expect("run");

    let out = fx.delegate.stdout_contents();
    assert!(out.contains("resource repo has changed:"), "{out}");
    assert!(out.contains("- type: time"), "{out}");
    assert!(out.contains("+ type: git"), "{out}");
    let stored = team.pipeline(PIPELINE).await.expect("read").expect("exists");
    assert_eq!(stored.config_version(), ConfigVersion(2));
    assert!(!stored.paused());
}

#[tokio::test]
async fn invalid_pipeline_is_reported_without_error() {
    let worker = Arc::new(FakeWorker::default().with_file(VOLUME, "pipeline.yml", "jobs:\n- name: broken\n  plan: []\n"));
    let fx = Fixture::new(worker);
    let mut step = fx.step(plan("some-resource/pipeline.yml"));

    step.run(&ctx(), &fx.state).await.expect("validation failures are not errors");

    assert!(!step.succeeded());
    assert_eq!(fx.delegate.stderr_contents(), "invalid pipeline:\n- job 'broken' has no steps in its plan\n");
    assert_eq!(fx.delegate.stdout_contents(), "");
    assert_eq!(fx.delegate.finished_with(), Some(false));
    assert_eq!(stored_version(&fx).await, None);
}

#[tokio::test]
async fn every_validation_error_is_listed() {
    let config = "jobs:\n- name: a\n  plan: []\n- name: b\n  plan:\n  - get: nope\n";
    let worker = Arc::new(FakeWorker::default().with_file(VOLUME, "pipeline.yml", config));
    let fx = Fixture::new(worker);
    let mut step = fx.step(plan("some-resource/pipeline.yml"));

    step.run(&ctx(), &fx.state).await.expect("run");

    assert!(!step.succeeded());
    assert_eq!(fx.delegate.stderr_contents(),
               "invalid pipeline:\n- job 'a' has no steps in its plan\n- job 'b' gets unknown resource 'nope'\n");
    assert_eq!(fx.delegate.phases(),
               vec![DelegatePhase::Initializing,
                    DelegatePhase::Starting,
                    DelegatePhase::Finished { succeeded: false }]);
    assert_eq!(stored_version(&fx).await, None);
}

#[tokio::test]
async fn warnings_are_printed_and_pipeline_still_saved() {
    let config = "resources:\n- name: repo\n  type: git\n- name: idle\n  type: git\njobs:\n- name: unit\n  plan:\n  - get: repo\n";
    let worker = Arc::new(FakeWorker::default().with_file(VOLUME, "pipeline.yml", config));
    let fx = Fixture::new(worker);
    let mut step = fx.step(plan("some-resource/pipeline.yml"));

    step.run(&ctx(), &fx.state).await.expect("run");

    assert!(step.succeeded());
    assert_eq!(fx.delegate.stderr_contents(), "WARNING: resource 'idle' is not used\n");
    assert_eq!(stored_version(&fx).await, Some(ConfigVersion(1)));
}

#[tokio::test]
async fn vars_are_resolved_inline_first_then_var_files_in_order() {
    let template = "resources:\n- name: repo\n  type: git\n  source:\n    branch: ((branch))\n    uri: ((uri))\n    depth: ((depth))\njobs:\n- name: unit\n  plan:\n  - get: repo\n";
    let worker = Arc::new(FakeWorker::default().with_file(VOLUME, "pipeline.yml", template)
                                               .with_file(VOLUME, "vars-1.yml", "branch: from-file\nuri: first-file\n")
                                               .with_file(VOLUME, "vars-2.yml", "uri: second-file\ndepth: 1\n"));
    let fx = Fixture::new(worker.clone());
    let mut vars = IndexMap::new();
    vars.insert("branch".to_string(), serde_yaml::Value::from("inline"));
    let mut p = plan("some-resource/pipeline.yml");
    p.vars = vars;
    p.var_files = vec!["some-resource/vars-1.yml".into(), "some-resource/vars-2.yml".into()];

    let mut step = fx.step(p);
    step.run(&ctx(), &fx.state).await.expect("run");
    assert!(step.succeeded());

    let calls: Vec<String> = worker.calls().into_iter().map(|(_, path)| path).collect();
    assert_eq!(calls, vec!["pipeline.yml", "vars-1.yml", "vars-2.yml"]);
    assert_eq!(worker.released(), 3);

    let stored = fx.factory.team(1).pipeline(PIPELINE).await.expect("read").expect("saved");
    let config = stored.config().expect("config");
    let source = config.resource("repo").and_then(|r| r.source.clone()).expect("source");
    assert_eq!(source["branch"], serde_yaml::Value::from("inline"));
    assert_eq!(source["uri"], serde_yaml::Value::from("first-file"));
    assert_eq!(source["depth"].as_u64(), Some(1));
}

#[tokio::test]
async fn missing_file_fails_before_any_retrieval() {
    let worker = valid_worker();
    let fx = Fixture::new(worker.clone());
    let mut step = fx.step(plan(""));

    let err = step.run(&ctx(), &fx.state).await.expect_err("no file");

    assert!(matches!(err, StepError::MissingField("file")));
    assert_eq!(err.to_string(), "file is not specified");
    assert!(worker.calls().is_empty());
    assert_eq!(fx.delegate.phases(), vec![DelegatePhase::Initializing]);
    assert!(!step.succeeded());
}

#[tokio::test]
async fn paths_without_exactly_one_separator_are_rejected() {
    for path in ["pipeline.yml", "some-resource/ci/pipeline.yml", "some-resource//pipeline.yml"] {
        let worker = valid_worker();
        let fx = Fixture::new(worker.clone());
        let err = fx.step(plan(path)).run(&ctx(), &fx.state).await.expect_err("unspecified");
        assert!(matches!(&err, StepError::UnspecifiedArtifactSource { path: p } if p == path), "{path}: {err}");
        assert!(worker.calls().is_empty());
        assert_eq!(fx.delegate.phases(), vec![DelegatePhase::Initializing]);
    }
}

#[tokio::test]
async fn empty_artifact_name_is_looked_up_like_any_other() {
    let worker = valid_worker();
    let fx = Fixture::new(worker.clone());
    let err = fx.step(plan("/pipeline.yml")).run(&ctx(), &fx.state).await.expect_err("unknown");
    assert!(matches!(&err, StepError::UnknownArtifactSource { name, path } if name.is_empty() && path == "pipeline.yml"),
            "{err}");
    assert!(worker.calls().is_empty());
}

#[tokio::test]
async fn unknown_artifact_is_reported() {
    let worker = valid_worker();
    let fx = Fixture::new(worker.clone());
    let err = fx.step(plan("other-resource/pipeline.yml")).run(&ctx(), &fx.state).await.expect_err("unknown");
    assert!(matches!(&err, StepError::UnknownArtifactSource { name, path } if name == "other-resource" && path == "pipeline.yml"));
    assert!(worker.calls().is_empty());
}

#[tokio::test]
async fn missing_file_in_artifact_is_reported_with_names() {
    let fx = Fixture::new(Arc::new(FakeWorker::default()));
    let err = fx.step(plan("some-resource/nope.yml")).run(&ctx(), &fx.state).await.expect_err("not found");
    assert!(matches!(&err, StepError::FileNotFound { name, path } if name == "some-resource" && path == "nope.yml"));
    assert_eq!(err.to_string(), "file 'nope.yml' not found within artifact 'some-resource'");
}

#[tokio::test]
async fn missing_var_file_is_reported_after_primary_retrieval() {
    let worker = valid_worker();
    let fx = Fixture::new(worker.clone());
    let mut p = plan("some-resource/pipeline.yml");
    p.var_files = vec!["some-resource/missing.yml".into()];
    let err = fx.step(p).run(&ctx(), &fx.state).await.expect_err("not found");
    assert!(matches!(err, StepError::FileNotFound { .. }));
    assert_eq!(worker.calls().len(), 2);
    assert_eq!(worker.released(), 1);
}

#[tokio::test]
async fn var_file_from_unknown_artifact_stops_before_validation() {
    let worker = valid_worker();
    let fx = Fixture::new(worker.clone());
    let mut p = plan("some-resource/pipeline.yml");
    p.var_files = vec!["elsewhere/vars.yml".into()];

    let err = fx.step(p).run(&ctx(), &fx.state).await.expect_err("unknown");

    assert!(matches!(&err, StepError::UnknownArtifactSource { name, path } if name == "elsewhere" && path == "vars.yml"));
    assert_eq!(worker.calls().len(), 1);
    assert_eq!(fx.delegate.phases(), vec![DelegatePhase::Initializing]);
    assert_eq!(fx.delegate.stderr_contents(), "");
}

#[tokio::test]
async fn other_worker_errors_propagate_verbatim() {
    let worker = Arc::new(FakeWorker::default().with_transport_error(VOLUME, "pipeline.yml", "connection reset"));
    let fx = Fixture::new(worker);
    let err = fx.step(plan("some-resource/pipeline.yml")).run(&ctx(), &fx.state).await.expect_err("transport");
    assert!(matches!(&err, StepError::Worker(WorkerError::Transport(m)) if m == "connection reset"));
    assert_eq!(err.to_string(), "worker transport error: connection reset");
}

#[tokio::test]
async fn malformed_config_propagates_the_decode_error() {
    let worker = Arc::new(FakeWorker::default().with_file(VOLUME, "pipeline.yml", "jobs:\n- name: a\n  plann: []\n"));
    let fx = Fixture::new(worker);
    let err = fx.step(plan("some-resource/pipeline.yml")).run(&ctx(), &fx.state).await.expect_err("malformed");
    assert!(err.external_source::<ConfigError>().is_some(), "{err}");
    assert_eq!(fx.delegate.phases(), vec![DelegatePhase::Initializing]);
}

#[tokio::test]
async fn malformed_var_file_propagates_the_decode_error() {
    let worker = Arc::new(FakeWorker::default().with_file(VOLUME, "pipeline.yml", VALID_CONFIG)
                                               .with_file(VOLUME, "vars.yml", "- not\n- a map\n"));
    let fx = Fixture::new(worker);
    let mut p = plan("some-resource/pipeline.yml");
    p.var_files = vec!["some-resource/vars.yml".into()];
    let err = fx.step(p).run(&ctx(), &fx.state).await.expect_err("bad vars");
    assert!(matches!(err.external_source::<VarsError>(), Some(VarsError::NotAMapping)), "{err}");
}

#[tokio::test]
async fn a_step_runs_at_most_once() {
    let fx = Fixture::new(valid_worker());
    let mut step = fx.step(plan("some-resource/pipeline.yml"));
    step.run(&ctx(), &fx.state).await.expect("run");
    let err = step.run(&ctx(), &fx.state).await.expect_err("second run");
    assert!(matches!(err, StepError::AlreadyRan));
    assert!(step.succeeded());
}

#[tokio::test]
async fn cancellation_interrupts_a_blocked_worker_call() {
    let worker = Arc::new(BlockingWorker::default());
    let fx = Fixture::new(worker.clone());
    let mut step = fx.step(plan("some-resource/pipeline.yml"));
    let ctx = ctx();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let err = step.run(&ctx, &fx.state).await.expect_err("cancelled");
    assert!(matches!(err, StepError::Cancelled));
    assert_eq!(worker.calls.load(Ordering::SeqCst), 1);
    assert!(!step.succeeded());
}

#[tokio::test(start_paused = true)]
async fn deadline_interrupts_a_blocked_worker_call() {
    let fx = Fixture::new(Arc::new(BlockingWorker::default()));
    let mut step = fx.step(plan("some-resource/pipeline.yml"));
    let err = step.run(&ctx().with_timeout(Duration::from_secs(5)), &fx.state).await.expect_err("deadline");
    assert!(err.is_interruption());
    assert!(matches!(err, StepError::DeadlineExceeded));
}

/// Team que deja que otro escritor guarde entre la lectura y la escritura.
struct RacingTeamFactory(Arc<InMemoryTeamFactory>);

struct RacingTeam(Arc<dyn Team>);

impl TeamFactory for RacingTeamFactory {
    fn team(&self, id: i32) -> Arc<dyn Team> {
        Arc::new(RacingTeam(self.0.team(id)))
    }
}

#[async_trait]
impl Team for RacingTeam {
    fn id(&self) -> i32 {
        self.0.id()
    }

    fn name(&self) -> &str {
        self.0.name()
    }

    async fn pipeline(&self, name: &str) -> Result<Option<Arc<dyn PipelineHandle>>, PersistenceError> {
        let seen = self.0.pipeline(name).await?;
        self.0.save_pipeline(name, &pipe_domain::Config::default(), ConfigVersion::NONE, false).await?;
        Ok(seen)
    }

    async fn save_pipeline(&self,
                           name: &str,
                           config: &pipe_domain::Config,
                           from: ConfigVersion,
                           apply_config_only: bool)
                           -> Result<(Arc<dyn PipelineHandle>, ConfigVersion), PersistenceError> {
        self.0.save_pipeline(name, config, from, apply_config_only).await
    }
}

#[tokio::test]
async fn concurrent_writer_causes_a_version_conflict() {
    let fx = Fixture::new(valid_worker());
    let step_delegate = fx.delegate.clone();
    let mut step = pipe_adapters::SetPipelineStep::new("plan-1".into(),
                                                       plan("some-resource/pipeline.yml"),
                                                       metadata(),
                                                       Arc::new(step_delegate),
                                                       Arc::new(RacingTeamFactory(fx.factory.clone())),
                                                       fx.worker.clone());

    let err = step.run(&ctx(), &fx.state).await.expect_err("conflict");
    match err.external_source::<PersistenceError>() {
        Some(PersistenceError::VersionConflict { expected, actual, .. }) => {
            assert_eq!(*expected, ConfigVersion::NONE);
            assert_eq!(*actual, ConfigVersion(1));
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(fx.delegate.stdout_contents().contains("setting pipeline: some-pipeline\n"));
    assert!(!fx.delegate.stdout_contents().contains("done"));
    assert!(!step.succeeded());
}

/// Team cuyas llamadas al store no terminan nunca: la lectura si
/// `block_reads`, si no sólo la escritura.
struct BlockingTeam {
    block_reads: bool,
}

struct BlockingTeamFactory {
    block_reads: bool,
}

impl TeamFactory for BlockingTeamFactory {
    fn team(&self, _id: i32) -> Arc<dyn Team> {
        Arc::new(BlockingTeam { block_reads: self.block_reads })
    }
}

#[async_trait]
impl Team for BlockingTeam {
    fn id(&self) -> i32 {
        1
    }

    fn name(&self) -> &str {
        "main"
    }

    async fn pipeline(&self, _name: &str) -> Result<Option<Arc<dyn PipelineHandle>>, PersistenceError> {
        if self.block_reads {
            std::future::pending::<()>().await;
        }
        Ok(None)
    }

    async fn save_pipeline(&self,
                           _name: &str,
                           _config: &pipe_domain::Config,
                           _from: ConfigVersion,
                           _apply_config_only: bool)
                           -> Result<(Arc<dyn PipelineHandle>, ConfigVersion), PersistenceError> {
        std::future::pending().await
    }
}

fn step_with_store(fx: &Fixture, factory: BlockingTeamFactory) -> pipe_adapters::SetPipelineStep {
    pipe_adapters::SetPipelineStep::new("plan-1".into(),
                                        plan("some-resource/pipeline.yml"),
                                        metadata(),
                                        Arc::new(fx.delegate.clone()),
                                        Arc::new(factory),
                                        fx.worker.clone())
}

#[tokio::test]
async fn cancellation_interrupts_a_blocked_pipeline_read() {
    let fx = Fixture::new(valid_worker());
    let mut step = step_with_store(&fx, BlockingTeamFactory { block_reads: true });
    let ctx = ctx();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let err = step.run(&ctx, &fx.state).await.expect_err("cancelled");

    assert!(matches!(err, StepError::Cancelled));
    assert!(!step.succeeded());
    assert_eq!(fx.delegate.stdout_contents(), "");
    assert_eq!(fx.delegate.finished_with(), None);
}

#[tokio::test(start_paused = true)]
async fn deadline_interrupts_a_blocked_save() {
    let fx = Fixture::new(valid_worker());
    let mut step = step_with_store(&fx, BlockingTeamFactory { block_reads: false });

    let err = step.run(&ctx().with_timeout(Duration::from_secs(5)), &fx.state).await.expect_err("deadline");

    assert!(matches!(err, StepError::DeadlineExceeded));
    assert!(!step.succeeded());
    let out = fx.delegate.stdout_contents();
    assert!(out.ends_with("setting pipeline: some-pipeline\n"), "{out}");
    assert!(!out.contains("done"));
    assert_eq!(fx.delegate.finished_with(), None);
}

#[tokio::test]
async fn runner_wraps_the_step_and_reports_success() {
    let fx = Fixture::new(valid_worker());
    let mut step = fx.step(plan("some-resource/pipeline.yml"));

    let attrs = step.span_attributes();
    assert_eq!(attrs.get("name").map(String::as_str), Some(PIPELINE));
    assert_eq!(attrs.get("team").map(String::as_str), Some("main"));
    assert_eq!(attrs.get("job").map(String::as_str), Some("reconfigure"));

    let ok = StepRunner::default().run_step(&mut step, &ctx(), &fx.state).await.expect("run");
    assert!(ok);
}
