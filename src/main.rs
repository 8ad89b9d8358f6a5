//! Interactive driver: steps an environment over the synthetic backend with
//! a no-op action until interrupted or `--steps` is reached.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use realenv::config::WorkerConfig;
use realenv::synthetic::SyntheticBackend;
use realenv::{EnvConfig, SimpleEnv};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Runs a realenv environment with a no-op policy")]
struct Args {
    /// JSON config file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    model_id: Option<String>,

    #[arg(long)]
    scale_up: Option<f64>,

    /// Skip the onscreen surface and reward display.
    #[arg(long)]
    no_debug: bool,

    #[arg(long)]
    human: bool,

    /// Depth worker executable. Defaults to `depth_worker` next to this binary.
    #[arg(long)]
    worker: Option<PathBuf>,

    /// Stop after this many steps instead of running until Ctrl-C.
    #[arg(long)]
    steps: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();
    let config = build_config(&args)?;

    let mut env = SimpleEnv::new(config, SyntheticBackend::default()).await?;
    let outcome = tokio::select! {
        result = run(&mut env, args.steps) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
            Ok(())
        }
    };

    env.teardown().await;
    info!("Program finished");
    outcome
}

fn build_config(args: &Args) -> Result<EnvConfig> {
    let mut config = match &args.config {
        Some(path) => EnvConfig::from_json_file(path)?,
        None => EnvConfig::default(),
    };

    if let Some(model_id) = &args.model_id {
        config.model_id = model_id.clone();
    }
    if let Some(scale_up) = args.scale_up {
        config.scale_up = scale_up;
    }
    if args.no_debug {
        config.debug = false;
    }
    config.human |= args.human;

    match &args.worker {
        Some(program) => config.worker.program = program.clone(),
        None if config.worker.program == WorkerConfig::default().program => {
            let sibling = std::env::current_exe()
                .context("locating the driver executable")?
                .with_file_name(format!("depth_worker{}", std::env::consts::EXE_SUFFIX));
            if sibling.exists() {
                config.worker.program = sibling;
            }
        }
        None => {}
    }

    config.validate()?;
    Ok(config)
}

async fn run(env: &mut SimpleEnv<SyntheticBackend>, steps: Option<u64>) -> Result<()> {
    let started = Instant::now();
    let mut round = 0u64;

    while steps.is_none_or(|limit| round < limit) {
        let t0 = Instant::now();
        let (_frame, reward, _done, info) = env.step(Vec::new()).await?;
        round += 1;

        let elapsed = t0.elapsed().as_secs_f64();
        info!(
            round,
            fps = 1.0 / elapsed.max(f64::EPSILON),
            total = started.elapsed().as_secs_f64(),
            reward,
            distance = info.state_new,
            "step"
        );
    }
    Ok(())
}
