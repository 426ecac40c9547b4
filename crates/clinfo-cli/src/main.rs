//! `clinfo`: list every OpenCL platform and device with its capabilities.
//!
//! ```text
//! USAGE:
//!   clinfo              Print the report to stdout
//!   clinfo --help
//!   clinfo --version
//! ```
//!
//! Log output goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use anyhow::{Context, Result};
use clap::Parser;
use clinfo_driver::{OpenClDriver, ReportSession};
use std::io;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "clinfo",
    about = "Print every OpenCL platform and device with its capabilities",
    version
)]
struct Cli {}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    let Cli {} = Cli::parse();

    let driver = OpenClDriver::load().context("cannot load the OpenCL ICD loader")?;
    tracing::debug!("Using {}", driver.path().display());

    let mut session = ReportSession::new(&driver, io::stdout().lock());
    let summary = session.run()?;
    tracing::info!(
        "Reported {} platform(s) and {} device(s)",
        summary.platforms.len(),
        summary.device_reports
    );

    Ok(())
}
