use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Annual geometric mean for one (waterbody, year, analyte).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualAnalyteRecord {
    pub wbid: String,
    pub year: i32,
    pub analyte: String,
    pub geometric_mean: f64,
    /// Daily composites the mean was computed from
    pub composite_count: usize,
}

/// One (waterbody, year) row of the pivoted table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualRow {
    pub wbid: String,
    pub year: i32,
    pub values: BTreeMap<String, f64>,
}

impl AnnualRow {
    pub fn value(&self, analyte: &str) -> Option<f64> {
        self.values.get(analyte).copied()
    }
}

/// Annual records pivoted to `WBID, YEAR, <analyte...>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualTable {
    pub analytes: Vec<String>,
    pub rows: Vec<AnnualRow>,
}

impl AnnualTable {
    pub fn from_records(records: &[AnnualAnalyteRecord]) -> Self {
        let mut analytes = BTreeSet::new();
        let mut rows: BTreeMap<(String, i32), BTreeMap<String, f64>> = BTreeMap::new();

        for record in records {
            analytes.insert(record.analyte.clone());
            rows.entry((record.wbid.clone(), record.year))
                .or_default()
                .insert(record.analyte.clone(), record.geometric_mean);
        }

        Self {
            analytes: analytes.into_iter().collect(),
            rows: rows
                .into_iter()
                .map(|((wbid, year), values)| AnnualRow { wbid, year, values })
                .collect(),
        }
    }

    /// Keep a column for every requested analyte even when no year qualified
    pub fn with_analytes(mut self, analytes: &[String]) -> Self {
        let mut all: BTreeSet<String> = self.analytes.into_iter().collect();
        all.extend(analytes.iter().cloned());
        self.analytes = all.into_iter().collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, wbid: &str, year: i32) -> Option<&AnnualRow> {
        self.rows.iter().find(|r| r.wbid == wbid && r.year == year)
    }

    /// Column headers in output order
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec![
            crate::utils::constants::WBID_COLUMN.to_string(),
            crate::utils::constants::YEAR_COLUMN.to_string(),
        ];
        headers.extend(self.analytes.iter().cloned());
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(wbid: &str, year: i32, analyte: &str, gm: f64) -> AnnualAnalyteRecord {
        AnnualAnalyteRecord {
            wbid: wbid.to_string(),
            year,
            analyte: analyte.to_string(),
            geometric_mean: gm,
            composite_count: 4,
        }
    }

    #[test]
    fn test_pivot_sorts_rows_and_columns() {
        let table = AnnualTable::from_records(&[
            record("2000B", 2019, "TP", 0.03),
            record("1234A", 2021, "TN", 1.1),
            record("1234A", 2020, "TP", 0.02),
            record("1234A", 2020, "CHLAC", 12.0),
        ]);

        assert_eq!(table.analytes, vec!["CHLAC", "TN", "TP"]);
        assert_eq!(table.headers(), vec!["WBID", "YEAR", "CHLAC", "TN", "TP"]);
        let keys: Vec<(&str, i32)> = table.rows.iter().map(|r| (r.wbid.as_str(), r.year)).collect();
        assert_eq!(keys, vec![("1234A", 2020), ("1234A", 2021), ("2000B", 2019)]);
    }

    #[test]
    fn test_missing_analyte_has_no_value() {
        let table = AnnualTable::from_records(&[
            record("1234A", 2020, "TP", 0.02),
            record("1234A", 2021, "TN", 1.1),
        ]);

        let row = table.row("1234A", 2020).unwrap();
        assert_eq!(row.value("TP"), Some(0.02));
        assert_eq!(row.value("TN"), None);
    }

    #[test]
    fn test_requested_analytes_keep_columns() {
        let table = AnnualTable::from_records(&[record("1234A", 2020, "TP", 0.02)])
            .with_analytes(&["TN".to_string(), "TP".to_string()]);
        assert_eq!(table.analytes, vec!["TN", "TP"]);
        assert_eq!(table.rows[0].value("TN"), None);
    }

    #[test]
    fn test_empty_records() {
        let table = AnnualTable::from_records(&[]);
        assert!(table.is_empty());
        assert!(table.analytes.is_empty());
    }
}
