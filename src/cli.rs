// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the artifact argument and output flags.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "webapp-deploy")]
#[command(about = "Deploy a web application artifact to object storage behind a CDN")]
#[command(version)]
pub struct Cli {
    /// Artifact to deploy, e.g. s3://artifacts/app.zip or file:///tmp/app.tgz
    pub artifact: Option<String>,

    /// YAML config file; environment variables override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print only the final result
    #[arg(short, long)]
    pub quiet: bool,

    /// Print JSON events instead of text
    #[arg(long)]
    pub json: bool,
}
