use clap::Parser;
use log::{error, info};
use mitkseg_core::cli::{Cli, Command};
use mitkseg_core::{
    pipeline, Enrichment, LabelEnricher, MetadataExtractor, PipelineConfig, Result, TextReport,
};
use std::path::Path;
use std::process;

/// Exit code of `label` when the mask contained no labels
const EXIT_NO_LABELS: i32 = 2;

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    let config = cli.config.apply(PipelineConfig::from_env());
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    match execute(&cli.command, &config) {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

fn execute(command: &Command, config: &PipelineConfig) -> Result<i32> {
    match command {
        Command::Prepare => {
            let summary = pipeline::prepare(config)?;
            println!("{}", TextReport::prepared(&summary));
        }
        Command::Predict => {
            pipeline::predict(config)?;
            info!("Inference finished");
        }
        Command::Finalize => {
            let summary = pipeline::finalize(config)?;
            println!("{}", TextReport::finalized(&summary));
        }
        Command::Run => {
            let summary = pipeline::run(config)?;
            println!("{}", TextReport::new(&summary));
        }
        Command::Metadata {
            series_dir,
            volume,
            output,
        } => {
            let document = MetadataExtractor::extract(series_dir, volume)?;
            document.write_to_file(output)?;
            info!("Wrote {}", output.display());
        }
        Command::Label { document } => return label(config, document),
    }
    Ok(0)
}

fn label(config: &PipelineConfig, document: &Path) -> Result<i32> {
    let strategy = config.label_policy.strategy();
    let mut enricher = LabelEnricher::new(&*strategy, rand::rng());

    match enricher.enrich_file(document)? {
        Enrichment::Labeled(count) => {
            println!("{}: {} labels", document.display(), count);
            Ok(0)
        }
        Enrichment::NoLabels => {
            println!("{}: no labels", document.display());
            Ok(EXIT_NO_LABELS)
        }
    }
}
