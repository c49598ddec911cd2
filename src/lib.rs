pub mod classifier;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod logging;
pub mod managers;
pub mod replay;

use anyhow::{Context, Result};
use clap::Parser;
use cli::CliArgs;
use classifier::{ClassifierAdapter, DEFAULT_SIGNS};
use config::EngineConfig;
use engine::{threshold, SignSession};
use log::{debug, info, warn};
use replay::Replayer;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

/// Config picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "signstream.json";

fn resolve_config(args: &CliArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            EngineConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))
        }
        None => EngineConfig::default(),
    };

    if let Some(value) = args.threshold {
        threshold::validate(value).context("invalid --threshold")?;
        config.confidence_threshold = value;
    }

    Ok(config)
}

pub fn run() -> Result<()> {
    let args = CliArgs::parse();
    logging::init(args.debug);
    debug!("Parsed CLI arguments: {:?}", args);

    let config = resolve_config(&args)?;
    let coverage = config.vocabulary.coverage(&DEFAULT_SIGNS);
    if coverage.missing.is_empty() {
        info!("Vocabulary covers all {} signs", coverage.total_target_signs);
    } else {
        warn!(
            "Vocabulary covers {:.0}% of signs; missing: {}",
            coverage.coverage_percentage,
            coverage.missing.join(", ")
        );
    }
    let adapter = ClassifierAdapter::new(config.vocabulary.clone(), config.top_k);
    let mut session = SignSession::new(config).context("failed to start session")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = {
        let mut replayer = Replayer::new(&mut session, &adapter);
        match &args.input {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                replayer.run(BufReader::new(file), &mut out)?
            }
            None => replayer.run(io::stdin().lock(), &mut out)?,
        }
    };

    if args.export {
        serde_json::to_writer_pretty(&mut out, &session.export())
            .context("failed to write session export")?;
        writeln!(out)?;
    }

    info!(
        "Recognized {} symbols: \"{}\"",
        session.sequence().len(),
        session.recognized_text()
    );
    debug!("Replay summary: {:?}", summary);
    Ok(())
}
