use abiscraper::{
    combine,
    dashboard::{key_metrics, totals_by, yearly_totals, DatasetCache, Filter, GroupBy},
    extract,
    grid::Grid,
    logging::init_test_logging,
    normalize, PipelineConfig,
};
use anyhow::Result;
use rust_xlsxwriter::{Workbook, Worksheet};
use std::{fs, path::Path};
use tempfile::TempDir;

const BLOCK: [&str; 6] = ["Female", "Rate", "Male", "Rate", "Total", "Rate"];

/// One sub-table: title row, label row, an organisation and an aggregate row.
fn write_table(sheet: &mut Worksheet, row: u32, year: &str, org: &str, k: f64) -> Result<()> {
    sheet.write_string(row, 0, year)?;
    sheet.write_string(row, 1, "All ABI ")?;
    sheet.write_string(row, 7, "Other disorders (encephalitis, etc.)")?;

    sheet.write_string(row + 1, 0, "CCG")?;
    for (c, label) in BLOCK.iter().chain(BLOCK.iter()).enumerate() {
        sheet.write_string(row + 1, 1 + c as u16, *label)?;
    }

    let all_abi = [2.0 * k, k, 3.0 * k, k, 5.0 * k, k / 2.0];
    let other = [1.0, 1.0, 1.0, 1.0, 2.0, 1.0];
    sheet.write_string(row + 2, 0, org)?;
    for (c, value) in all_abi.iter().chain(other.iter()).enumerate() {
        sheet.write_number(row + 2, 1 + c as u16, *value)?;
    }

    sheet.write_string(row + 3, 0, "Total")?;
    for c in 0..12u16 {
        sheet.write_number(row + 3, 1 + c, 99.0)?;
    }
    Ok(())
}

fn write_region(path: &Path, region: &str, org: &str, ks: [f64; 2]) -> Result<()> {
    let mut workbook = Workbook::new();
    workbook
        .add_worksheet()
        .set_name("Contents")?
        .write_string(0, 0, "See next sheet")?;
    let sheet = workbook.add_worksheet();
    sheet.set_name(region)?;
    sheet.write_string(0, 0, "Acquired brain injury admissions")?;
    sheet.write_string(2, 0, "Rates per 100,000 population")?;

    write_table(sheet, 6, "2014-2015", org, ks[0])?;
    write_table(sheet, 11, "2015-2016", org, ks[1])?;
    workbook.save(path)?;
    Ok(())
}

#[test]
fn workbooks_become_a_national_table() -> Result<()> {
    init_test_logging();
    let dir = TempDir::new()?;
    let input = dir.path().join("england_data");
    fs::create_dir_all(&input)?;
    write_region(&input.join("yorkshire.xlsx"), "Yorkshire", "NHS Leeds", [2.0, 4.0])?;
    write_region(&input.join("london.xlsx"), "London", "NHS Camden", [6.0, 8.0])?;

    let config = PipelineConfig::new(&input, dir.path().join("processed_data"));
    let extracted = extract::run(&config)?;
    assert!(extracted.is_clean(), "{}", extracted);
    let normalized = normalize::run(&config)?;
    assert!(normalized.is_clean(), "{}", normalized);
    assert_eq!(normalized.cnt_written, 4);
    let combined = combine::run(&config)?;
    assert!(combined.is_clean(), "{}", combined);

    let region = Grid::read_csv(&config.region_path("Yorkshire"))?;
    assert_eq!(region.height(), 5);

    let national = Grid::read_csv(&config.national_path())?;
    assert_eq!(national.height(), 9);
    assert_eq!(national.width(), 16);
    let header = national.header().unwrap();
    assert_eq!(
        header[..6],
        ["Region", "FinancialYear", "Regime", "Organisation", "All_ABI__Female_Count", "All_ABI__Female_Rate"]
    );
    assert_eq!(header[15], "Other_disorders_Total_Rate");
    assert_eq!(national.rows()[1][..4], ["London", "2014-15", "CCG", "NHS Camden"]);

    let aggregate = &national.rows()[2];
    assert_eq!(aggregate[3], "unknown");
    assert!(aggregate[4..].iter().all(|c| c == "0"));

    let mut cache = DatasetCache::new(config.national_path());
    let dataset = cache.get()?;
    assert_eq!(dataset.records.len(), 8);
    assert_eq!(dataset.regions(), vec!["London", "Yorkshire"]);
    assert_eq!(dataset.years(), vec![2014, 2015]);

    let everything = Filter::default().filter(dataset);
    let metrics = key_metrics(&everything);
    assert_eq!(metrics.total_admissions, 100.0);
    assert_eq!(metrics.female_admissions, 40.0);
    assert_eq!(metrics.male_admissions, 60.0);
    assert_eq!(metrics.mean_rate, Some(1.25));

    let yearly = yearly_totals(&everything);
    assert_eq!(
        yearly.iter().map(|y| y.total).collect::<Vec<_>>(),
        vec![40.0, 60.0]
    );

    let regions = totals_by(&everything, GroupBy::Region);
    assert_eq!(regions[0].name, "Yorkshire");
    assert_eq!(regions[0].value, 30.0);

    let camden_2015 = Filter {
        years: Some((2015, 2015)),
        organisations: vec!["NHS Camden".to_string()],
        ..Default::default()
    };
    assert_eq!(key_metrics(&camden_2015.filter(dataset)).total_admissions, 40.0);
    Ok(())
}
