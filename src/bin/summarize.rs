use abiscraper::{
    config::{DEFAULT_OUTPUT_DIR, NATIONAL_NAME},
    dashboard::{export_csv, DatasetCache, Filter, Summary},
    logging,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::{fs::File, io::BufWriter, path::PathBuf};
use tracing::info;

/// Print the dashboard figures for a filtered view of the national table.
#[derive(Parser, Debug)]
#[command(author, version, about = "Summarize ABI admissions as JSON")]
struct Args {
    /// National table produced by the combine stage
    #[arg(long, env = "ABI_NATIONAL_FILE", default_value_t = default_data())]
    data: String,

    /// First start year to include
    #[arg(long)]
    from: Option<i32>,

    /// Last start year to include
    #[arg(long)]
    to: Option<i32>,

    /// Restrict to these regions (repeatable)
    #[arg(long)]
    region: Vec<String>,

    /// Restrict to one regime, e.g. CCG
    #[arg(long)]
    regime: Option<String>,

    /// Restrict to these organisations (repeatable)
    #[arg(long)]
    organisation: Vec<String>,

    /// Also write the filtered rows to this CSV file
    #[arg(long)]
    export: Option<PathBuf>,

    /// List the available regions, regimes and years instead
    #[arg(long)]
    options: bool,
}

fn default_data() -> String {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
        .join(format!("{}.csv", NATIONAL_NAME))
        .display()
        .to_string()
}

fn main() -> Result<()> {
    logging::init("warn");
    let args = Args::parse();

    let mut cache = DatasetCache::new(&args.data);
    let dataset = cache.get()?;

    if args.options {
        let options = serde_json::json!({
            "regions": dataset.regions(),
            "regimes": dataset.regimes(),
            "years": dataset.years(),
        });
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    let years = dataset.years();
    let bounds = match (args.from, args.to) {
        (None, None) => None,
        (from, to) => Some((
            from.or(years.first().copied()).unwrap_or(i32::MIN),
            to.or(years.last().copied()).unwrap_or(i32::MAX),
        )),
    };
    let filter = Filter {
        years: bounds,
        regions: args.region,
        regime: args.regime,
        organisations: args.organisation,
    };
    let records = filter.filter(dataset);
    info!(?filter, records = records.len(), "filtered");

    if let Some(path) = &args.export {
        let file = File::create(path)
            .with_context(|| format!("creating export file {}", path.display()))?;
        export_csv(dataset, &records, BufWriter::new(file))?;
        info!(path = %path.display(), "exported");
    }

    let summary = Summary::build(&records);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
