use std::path::PathBuf;

use clap::Parser;
use taxon_core::{Config, MetricRegistry, Taxonomy};
use taxon_trainer::ClassifierBone;

#[derive(Parser, Debug)]
#[command(
    name = "predict",
    about = "Write ranked top-N category predictions for a test split"
)]
struct Args {
    /// Driver configuration file.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
    /// Directory holding the training-time meta.json.
    #[arg(long)]
    data_root: PathBuf,
    /// Directory holding the trained weights and model files.
    #[arg(long)]
    model_root: PathBuf,
    /// Directory holding the test dataset.
    #[arg(long)]
    test_root: PathBuf,
    /// Split name inside the test dataset.
    #[arg(long, default_value = "test")]
    test_div: String,
    /// Output file for the tab-separated predictions.
    #[arg(long)]
    out_path: PathBuf,
    /// Category taxonomy (cate1.json), required with --readable.
    #[arg(long)]
    cate1: Option<PathBuf>,
    /// Decode category codes to human-readable names where possible.
    #[arg(long)]
    readable: bool,
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    let inverted = match (&args.cate1, args.readable) {
        (Some(path), true) => Some(Taxonomy::load(path)?.inverted()),
        (None, true) => anyhow::bail!("--readable requires --cate1"),
        _ => None,
    };

    let registry = MetricRegistry::with_defaults();
    let bone = ClassifierBone::new("main", config);
    bone.predict(
        &args.data_root,
        &args.model_root,
        &args.test_root,
        &args.test_div,
        &args.out_path,
        &registry,
        inverted.as_ref(),
    )
}

fn main() {
    tracing_subscriber::fmt::init();
    if let Err(e) = run() {
        eprintln!("Prediction failed: {e:#}");
        std::process::exit(1);
    }
}
