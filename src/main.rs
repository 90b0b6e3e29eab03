use clap::Parser;
use scholia::build::build_site;
use scholia::config::Config;
use std::path::PathBuf;

/// Builds the papers site.
#[derive(Parser)]
#[command(name = "scholia", version, about)]
struct Args {
    /// Project file to use instead of searching for `scholia.yaml`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// The JSON data file.
    #[arg(long)]
    data: Option<PathBuf>,

    /// The directory the site is written to.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::from_project_file(path)?,
        None => Config::from_directory(&std::env::current_dir()?)?,
    };
    if let Some(data) = args.data {
        config.data_file = data;
    }
    if let Some(output) = args.output {
        config.output_directory = output;
    }

    build_site(&config)?;
    Ok(())
}
