// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use deployline::types::{Environment, EnvironmentError, ImageTag, ImageTagError};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deployline")]
#[command(about = "Provision, publish, deploy and verify a service in one run")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new deployline.yml configuration file
    Init {
        /// Workload name (defaults to imp-product-catalog)
        #[arg(short, long)]
        workload: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Run the full pipeline: provision, build, deploy, verify
    Run {
        #[command(flatten)]
        target: Target,

        /// Minimal output for CI (only final result)
        #[arg(short, long, conflicts_with = "json")]
        quiet: bool,

        /// JSON lines output for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print the commands a run would execute without running them
    Plan {
        #[command(flatten)]
        target: Target,
    },
}

#[derive(Args)]
pub struct Target {
    /// Target environment; also the cluster namespace
    #[arg(
        short,
        long,
        env = "ENVIRONMENT",
        default_value = "dev",
        value_parser = parse_environment
    )]
    pub environment: Environment,

    /// Tag for the published image
    #[arg(
        short = 't',
        long,
        env = "IMAGE_TAG",
        default_value = "v1.0.0",
        value_parser = parse_image_tag
    )]
    pub image_tag: ImageTag,

    /// Configuration file (defaults to deployline.yml in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

// An exported-but-empty variable counts as unset.
fn parse_environment(value: &str) -> Result<Environment, EnvironmentError> {
    match value.trim() {
        "" => Ok(Environment::default()),
        name => Environment::new(name),
    }
}

fn parse_image_tag(value: &str) -> Result<ImageTag, ImageTagError> {
    match value.trim() {
        "" => Ok(ImageTag::default()),
        tag => ImageTag::new(tag),
    }
}
