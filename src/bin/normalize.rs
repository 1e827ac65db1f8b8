use abiscraper::{logging, normalize, PipelineArgs, PipelineConfig};
use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    logging::init("info");
    let config = PipelineConfig::from(PipelineArgs::parse());
    let report = normalize::run(&config)?;
    println!("{}", report);
    Ok(())
}
