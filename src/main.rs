use std::process;
use std::sync::Arc;

use pipe_core::{EngineConfig, ExecutionContext, Session, StdioDelegate, StepRunner};
use pipeflow::cli::{exit_code, local_team_factory, parse_args, run_set_pipeline, UsageError, EXIT_OK, EXIT_USAGE, USAGE};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // `.env` antes de leer la configuración y el filtro de logs
    pipe_core::config::init_dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter)
                             .with_writer(std::io::stderr)
                             .with_target(false)
                             .compact()
                             .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let parsed = match parse_args(&args) {
        Ok(a) => a,
        Err(UsageError::Help) => {
            println!("{USAGE}");
            process::exit(EXIT_OK);
        }
        Err(e) => {
            eprintln!("[pipeflow] {e}");
            eprintln!("{USAGE}");
            process::exit(EXIT_USAGE);
        }
    };

    let config = EngineConfig::from_env();
    tracing::debug!(tracing_enabled = config.tracing.enabled, step_timeout = ?config.step_timeout, "engine config loaded");
    let runner = StepRunner::new(config);

    let ctx = ExecutionContext::new(Session::new("pipeflow"));
    let canceller = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    let result = run_set_pipeline(&parsed,
                                  &runner,
                                  &ctx,
                                  Arc::new(StdioDelegate),
                                  local_team_factory(&parsed)).await;
    if let Err(e) = &result {
        eprintln!("[pipeflow set-pipeline] error: {e}");
    }
    process::exit(exit_code(&result));
}
