use serde::Serialize;
use std::collections::BTreeMap;

use super::{
    dataset::Record, FEMALE_COUNT, INJURY_TYPES, MALE_COUNT, SEX_SPLIT_TYPES, TOTAL_COUNT,
    TOTAL_RATE,
};

/// Sum of a metric over records; unparsed cells count as nothing.
fn sum(records: &[&Record], column: &str) -> f64 {
    records.iter().filter_map(|r| r.metric(column)).sum()
}

/// Mean over the records that have a value; `None` when none do.
fn mean(records: &[&Record], column: &str) -> Option<f64> {
    let values: Vec<f64> = records.iter().filter_map(|r| r.metric(column)).collect();
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub total_admissions: f64,
    pub mean_rate: Option<f64>,
    pub female_admissions: f64,
    pub male_admissions: f64,
}

pub fn key_metrics(records: &[&Record]) -> KeyMetrics {
    KeyMetrics {
        total_admissions: sum(records, TOTAL_COUNT),
        mean_rate: mean(records, TOTAL_RATE),
        female_admissions: sum(records, FEMALE_COUNT),
        male_admissions: sum(records, MALE_COUNT),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyTotal {
    pub financial_year: String,
    pub year_start: i32,
    pub total: f64,
    pub female: f64,
    pub male: f64,
}

fn by_year<'a>(records: &[&'a Record]) -> BTreeMap<&'a str, Vec<&'a Record>> {
    let mut years: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for record in records {
        years
            .entry(record.financial_year.as_str())
            .or_default()
            .push(*record);
    }
    years
}

/// Admissions per financial year, oldest first.
pub fn yearly_totals(records: &[&Record]) -> Vec<YearlyTotal> {
    let mut totals: Vec<YearlyTotal> = by_year(records)
        .into_iter()
        .map(|(year, group)| YearlyTotal {
            financial_year: year.to_string(),
            year_start: group[0].year_start,
            total: sum(&group, TOTAL_COUNT),
            female: sum(&group, FEMALE_COUNT),
            male: sum(&group, MALE_COUNT),
        })
        .collect();
    totals.sort_by_key(|t| t.year_start);
    totals
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupBy {
    Region,
    Organisation,
}

impl GroupBy {
    fn key<'a>(&self, record: &'a Record) -> &'a str {
        match self {
            GroupBy::Region => &record.region,
            GroupBy::Organisation => &record.organisation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupValue {
    pub name: String,
    pub value: f64,
}

fn grouped<'a>(records: &[&'a Record], group: GroupBy) -> BTreeMap<&'a str, Vec<&'a Record>> {
    let mut groups: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for record in records {
        groups.entry(group.key(record)).or_default().push(*record);
    }
    groups
}

fn ascending(mut values: Vec<GroupValue>) -> Vec<GroupValue> {
    values.sort_by(|a, b| a.value.total_cmp(&b.value));
    values
}

/// Total all-ABI admissions per group, smallest first.
pub fn totals_by(records: &[&Record], group: GroupBy) -> Vec<GroupValue> {
    ascending(
        grouped(records, group)
            .into_iter()
            .map(|(name, rows)| GroupValue {
                name: name.to_string(),
                value: sum(&rows, TOTAL_COUNT),
            })
            .collect(),
    )
}

/// Mean all-ABI rate per group, smallest first. Groups without a single
/// numeric rate are left out.
pub fn mean_rate_by(records: &[&Record], group: GroupBy) -> Vec<GroupValue> {
    ascending(
        grouped(records, group)
            .into_iter()
            .filter_map(|(name, rows)| {
                Some(GroupValue {
                    name: name.to_string(),
                    value: mean(&rows, TOTAL_RATE)?,
                })
            })
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InjuryShare {
    pub financial_year: String,
    pub injury: String,
    pub count: f64,
    /// Share of the year's all-ABI total, 0 when that total is 0.
    pub percentage: f64,
}

/// Every injury type for every year, years in name order.
pub fn injury_breakdown(records: &[&Record]) -> Vec<InjuryShare> {
    let mut shares = Vec::new();
    for (year, group) in by_year(records) {
        let year_total = sum(&group, TOTAL_COUNT);
        for (injury, column) in INJURY_TYPES {
            let count = sum(&group, column);
            let percentage = if year_total > 0.0 {
                count / year_total * 100.0
            } else {
                0.0
            };
            shares.push(InjuryShare {
                financial_year: year.to_string(),
                injury: injury.to_string(),
                count,
                percentage,
            });
        }
    }
    shares
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SexByInjury {
    pub injury: String,
    pub female: f64,
    pub male: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SexSplit {
    pub female: f64,
    pub male: f64,
    pub by_injury: Vec<SexByInjury>,
}

pub fn sex_split(records: &[&Record]) -> SexSplit {
    SexSplit {
        female: sum(records, FEMALE_COUNT),
        male: sum(records, MALE_COUNT),
        by_injury: SEX_SPLIT_TYPES
            .iter()
            .map(|(injury, prefix)| SexByInjury {
                injury: injury.to_string(),
                female: sum(records, &format!("{}_Female_Count", prefix)),
                male: sum(records, &format!("{}_Male_Count", prefix)),
            })
            .collect(),
    }
}

/// Everything a dashboard page shows for one filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub records: usize,
    pub key_metrics: KeyMetrics,
    pub yearly: Vec<YearlyTotal>,
    pub by_region: Vec<GroupValue>,
    pub rate_by_region: Vec<GroupValue>,
    pub by_organisation: Vec<GroupValue>,
    pub rate_by_organisation: Vec<GroupValue>,
    pub injuries: Vec<InjuryShare>,
    pub sex: SexSplit,
}

impl Summary {
    pub fn build(records: &[&Record]) -> Self {
        Self {
            records: records.len(),
            key_metrics: key_metrics(records),
            yearly: yearly_totals(records),
            by_region: totals_by(records, GroupBy::Region),
            rate_by_region: mean_rate_by(records, GroupBy::Region),
            by_organisation: totals_by(records, GroupBy::Organisation),
            rate_by_organisation: mean_rate_by(records, GroupBy::Organisation),
            injuries: injury_breakdown(records),
            sex: sex_split(records),
        }
    }
}
