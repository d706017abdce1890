use crate::config::harness::HarnessConfig;
use crate::config::types::{HarnessError, LimiterKind};
use crate::driver::Driver;
use crate::exec::executor::VerifierExecutor;
use crate::kernel::signal;
use crate::provenance;
use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Driver script to run; without it the provenance record is printed
    script: Option<PathBuf>,
    /// Verifier executable (default: cbmc/cbmc-binary next to this launcher)
    #[arg(long)]
    verifier: Option<PathBuf>,
    /// File receiving the verifier's combined output
    #[arg(long)]
    result_file: Option<PathBuf>,
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Do not touch the memory cgroup
    #[arg(long)]
    no_cgroup: bool,
    /// Print the provenance record as JSON
    #[arg(long)]
    json: bool,
}

/// Defaults, then the JSON file, then `DIVBENCH_*`, then flags
fn load_config(cli: &Cli) -> Result<HarnessConfig> {
    let mut config = match &cli.config {
        Some(path) => HarnessConfig::load_from_file(path)?,
        None => HarnessConfig::default(),
    };
    config.apply_env()?;

    if let Some(verifier) = &cli.verifier {
        config.verifier = verifier.clone();
    }
    if let Some(result_file) = &cli.result_file {
        config.result_file = result_file.clone();
    }
    if cli.no_cgroup {
        config.limiter = LimiterKind::Disabled;
    }
    Ok(config)
}

pub fn run() -> Result<()> {
    env_logger::init();

    if let Err(e) = signal::install_shutdown_handlers() {
        log::warn!("{}", e);
    }

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let Some(script) = cli.script else {
        let launcher = std::env::current_exe().context("locating launcher executable")?;
        let description = provenance::describe(&launcher, &config.verifier)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&description)?);
        } else {
            println!("{}", description);
        }
        return Ok(());
    };

    let executor = VerifierExecutor::new(&config);
    let mut driver = Driver::new(executor, io::stdout().lock(), io::stderr());

    match driver.run_script(&script) {
        Ok(_) => Ok(()),
        Err(HarnessError::Interrupted(sig)) => {
            eprintln!("divbench: interrupted by signal {}", sig);
            std::process::exit(128 + sig);
        }
        Err(e) => Err(e).with_context(|| format!("running {}", script.display())),
    }
}
