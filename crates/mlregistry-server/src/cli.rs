use crate::config::ExecutionPolicy;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "mlregistry-server")]
#[command(author, version, about = "Classifier registry and dispatch service", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "mlregistry.yaml")]
    pub config: String,

    /// Listen address
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Directory that relative snapshot filenames resolve under
    #[arg(long, env = "MLREGISTRY_SNAPSHOT_DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// How train/save/load run: on a blocking worker or on the request task
    #[arg(long, value_enum)]
    pub execution: Option<ExecutionPolicy>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
