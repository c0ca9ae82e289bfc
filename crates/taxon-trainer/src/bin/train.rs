use std::path::PathBuf;

use clap::Parser;
use taxon_core::Config;
use taxon_trainer::ClassifierBone;

#[derive(Parser, Debug)]
#[command(name = "train", about = "Train the product-category classifier")]
struct Args {
    /// Driver configuration file.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
    /// Directory holding data.safetensors, pids.json, and meta.json.
    #[arg(long)]
    data_root: PathBuf,
    /// Directory for the weights and model artifacts.
    #[arg(long)]
    out_dir: PathBuf,
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;
    let bone = ClassifierBone::new("main", config);
    bone.train(&args.data_root, &args.out_dir)
}

fn main() {
    tracing_subscriber::fmt::init();
    if let Err(e) = run() {
        eprintln!("Training failed: {e:#}");
        std::process::exit(1);
    }
}
