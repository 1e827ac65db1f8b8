use abiscraper::{combine, logging, PipelineArgs, PipelineConfig};
use anyhow::Result;
use clap::Parser;
use tracing::warn;

fn main() -> Result<()> {
    logging::init("info");
    let config = PipelineConfig::from(PipelineArgs::parse());
    let report = combine::run(&config)?;
    if !report.warnings.is_empty() {
        warn!(count = report.warning_count(), "combined with warnings");
    }
    println!("{}", report);
    Ok(())
}
