// ABOUTME: Entry point for the deployline CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands, Target};
use deployline::config::{self, Config};
use deployline::error::{Error, Result};
use deployline::exec::ProcessExecutor;
use deployline::output::{Output, OutputMode};
use deployline::pipeline::{PipelineController, RunContext, ToolchainStages};
use deployline::verify::HttpClient;
use std::env;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling run");
            on_signal.cancel();
        }
    });

    if let Err(e) = run(cli, &cancel).await {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli, cancel: &CancellationToken) -> Result<()> {
    let cwd = env::current_dir()?;
    match cli.command {
        Commands::Init { workload, force } => {
            config::init_config(&cwd, workload.as_deref(), force)?;
            println!("Created {}", config::CONFIG_FILENAME);
            Ok(())
        }
        Commands::Plan { target } => plan(&target, &cwd),
        Commands::Run {
            target,
            quiet,
            json,
        } => {
            let mode = if json {
                OutputMode::Json
            } else if quiet {
                OutputMode::Quiet
            } else {
                OutputMode::Normal
            };
            deploy(&target, &cwd, Output::new(mode), cancel).await
        }
    }
}

fn load_config(target: &Target, cwd: &Path) -> Result<Config> {
    Config::resolve(target.config.as_deref(), cwd)
}

/// Print every command the pipeline would run, in order.
fn plan(target: &Target, cwd: &Path) -> Result<()> {
    let config = load_config(target, cwd)?;
    let client = HttpClient::new(config.verify.request_timeout);
    let stages = ToolchainStages::from_config(&config, ProcessExecutor, client)?;
    let ctx = RunContext {
        environment: target.environment.clone(),
        image_tag: target.image_tag.clone(),
    };

    let commands = stages
        .planned_commands(&ctx)
        .map_err(|e| Error::InvalidConfig(e.to_string()))?;
    for command in commands {
        println!("{command}");
    }
    println!("verify {}", stages.base_url(&ctx));
    Ok(())
}

async fn deploy(
    target: &Target,
    cwd: &Path,
    output: Output,
    cancel: &CancellationToken,
) -> Result<()> {
    let config = load_config(target, cwd)?;
    let client = HttpClient::new(config.verify.request_timeout);
    let stages = ToolchainStages::from_config(&config, ProcessExecutor, client)?;

    let controller = PipelineController::new(stages, &output);
    match controller
        .run(target.environment.clone(), target.image_tag.clone(), cancel)
        .await
    {
        Ok(status) => {
            output.finished(&status);
            Ok(())
        }
        Err(e) => {
            if output.mode() == OutputMode::Json {
                output.error(&e.to_string());
            }
            Err(e.into())
        }
    }
}

