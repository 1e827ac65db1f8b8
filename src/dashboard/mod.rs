// src/dashboard/mod.rs
//
// Data side of the admissions dashboard: load the national table, filter it,
// and compute the figures the charts are drawn from.
pub mod aggregate;
pub mod cache;
pub mod dataset;
pub mod export;
pub mod filter;

pub use aggregate::{
    injury_breakdown, key_metrics, mean_rate_by, sex_split, totals_by, yearly_totals, GroupBy,
    GroupValue, InjuryShare, KeyMetrics, SexByInjury, SexSplit, Summary, YearlyTotal,
};
pub use cache::DatasetCache;
pub use dataset::{is_metric_column, NationalDataset, Record};
pub use export::export_csv;
pub use filter::Filter;

pub const REGION: &str = "Region";
pub const YEAR_START: &str = "Year_Start";

pub const TOTAL_COUNT: &str = "All_ABI__Total_Count";
pub const TOTAL_RATE: &str = "All_ABI__Total_Rate";
pub const FEMALE_COUNT: &str = "All_ABI__Female_Count";
pub const MALE_COUNT: &str = "All_ABI__Male_Count";

/// Display label and per-year total column of each injury type.
pub const INJURY_TYPES: [(&str, &str); 8] = [
    ("Head Injuries", "Head_injuries_Total_Count"),
    ("Stroke", "Stroke_Total_Count"),
    ("Meningitis", "Meningitis_Total_Count"),
    ("Brain Tumour", "Brain_tumour_Total_Count"),
    ("Other Disorders", "Other_disorders_Total_Count"),
    ("Abscess", "Abscess_Total_Count"),
    ("Anoxia", "Anoxia_Total_Count"),
    ("CO Poisoning", "CO_poisoning_Total_Count"),
];

/// Injury types split by sex: label and column prefix
/// (`<prefix>_Female_Count`, `<prefix>_Male_Count`).
pub const SEX_SPLIT_TYPES: [(&str, &str); 4] = [
    ("Head Injuries", "Head_injuries"),
    ("Stroke", "Stroke"),
    ("Meningitis", "Meningitis"),
    ("Brain Tumour", "Brain_tumour"),
];
