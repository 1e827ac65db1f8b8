use abiscraper::{extract, logging, PipelineArgs, PipelineConfig};
use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    logging::init("info");
    let config = PipelineConfig::from(PipelineArgs::parse());
    let report = extract::run(&config)?;
    println!("{}", report);
    Ok(())
}
