use serde::{Deserialize, Serialize};

use super::dataset::{NationalDataset, Record};

/// Row selection for a dashboard view. Empty lists and `None` select
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Inclusive range of start years.
    pub years: Option<(i32, i32)>,
    pub regions: Vec<String>,
    pub regime: Option<String>,
    pub organisations: Vec<String>,
}

impl Filter {
    pub fn matches(&self, record: &Record) -> bool {
        if let Some((from, to)) = self.years {
            if record.year_start < from || record.year_start > to {
                return false;
            }
        }
        if !self.regions.is_empty() && !self.regions.contains(&record.region) {
            return false;
        }
        if let Some(regime) = &self.regime {
            if record.regime.as_ref() != Some(regime) {
                return false;
            }
        }
        self.organisations.is_empty() || self.organisations.contains(&record.organisation)
    }

    /// Matching records, in file order.
    pub fn filter<'a>(&self, dataset: &'a NationalDataset) -> Vec<&'a Record> {
        dataset.records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    fn dataset() -> NationalDataset {
        NationalDataset::from_grid(&Grid::from_strs(&[
            &["Region", "FinancialYear", "Regime", "Organisation"],
            &["Yorkshire", "2013-14", "PCT", "Leeds PCT"],
            &["Yorkshire", "2015-16", "CCG", "NHS Leeds"],
            &["London", "2016-17", "CCG", "NHS Camden"],
            &["London", "2019-20", "ICB", "NHS North Central London"],
        ]))
        .unwrap()
    }

    #[test]
    fn default_filter_keeps_everything() {
        let dataset = dataset();
        assert_eq!(Filter::default().filter(&dataset).len(), 4);
    }

    #[test]
    fn year_range_is_inclusive() {
        let dataset = dataset();
        let filter = Filter {
            years: Some((2015, 2016)),
            ..Default::default()
        };
        let orgs: Vec<&str> = filter
            .filter(&dataset)
            .iter()
            .map(|r| r.organisation.as_str())
            .collect();
        assert_eq!(orgs, vec!["NHS Leeds", "NHS Camden"]);
    }

    #[test]
    fn criteria_combine() {
        let dataset = dataset();
        let filter = Filter {
            regions: vec!["London".to_string()],
            regime: Some("CCG".to_string()),
            ..Default::default()
        };
        let hits = filter.filter(&dataset);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].organisation, "NHS Camden");

        let by_org = Filter {
            organisations: vec!["Leeds PCT".to_string(), "NHS Leeds".to_string()],
            ..Default::default()
        };
        assert!(by_org.filter(&dataset).iter().all(|r| r.region == "Yorkshire"));
    }
}
