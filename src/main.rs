use abiscraper::{combine, extract, logging, normalize, PipelineArgs, PipelineConfig, StageReport};
use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use tracing::{info, warn};

fn main() -> Result<()> {
    // ─── 1) init logging & config ────────────────────────────────────
    logging::init("info");
    let config = PipelineConfig::from(PipelineArgs::parse());
    info!(
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        "startup"
    );
    let started = Instant::now();

    // ─── 2) workbooks → per-region sub-tables ────────────────────────
    let mut reports: Vec<StageReport> = Vec::with_capacity(3);
    reports.push(extract::run(&config)?);

    // ─── 3) flatten headers, add identifier columns ──────────────────
    reports.push(normalize::run(&config)?);

    // ─── 4) region files and the national file ───────────────────────
    reports.push(combine::run(&config)?);

    for report in &reports {
        if report.is_clean() {
            info!("{}", report);
        } else {
            warn!("{}", report);
        }
    }
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        national = %config.national_path().display(),
        "pipeline finished"
    );
    Ok(())
}
