use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};

/// One water-quality measurement as read from the sample source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Sample {
    #[validate(length(min = 1))]
    pub wbid: String,

    pub station: String,

    pub year: i32,

    #[validate(range(min = 1, max = 12))]
    pub month: u32,

    #[validate(range(min = 1, max = 31))]
    pub day: u32,

    #[validate(length(min = 1))]
    pub analyte: String,

    pub result: f64,

    /// Result qualifier code (`rcode`), empty when unqualified
    pub qualifier_code: Option<String>,

    /// Method detection limit
    pub mdl: Option<f64>,
}

/// How a qualifier code affects the reported result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier {
    /// `U`: analyte not detected above the MDL
    NonDetect,
    /// `T`: value between the MDL and the practical quantitation limit
    Trace,
    /// `G`
    Rejected,
    /// `V`
    Invalid,
    Other(String),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualifierAction {
    Keep,
    SubstituteMdl,
    Drop,
}

impl Qualifier {
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            None | Some("") => Qualifier::None,
            Some("U") => Qualifier::NonDetect,
            Some("T") => Qualifier::Trace,
            Some("G") => Qualifier::Rejected,
            Some("V") => Qualifier::Invalid,
            Some(other) => Qualifier::Other(other.to_string()),
        }
    }

    pub fn action(&self) -> QualifierAction {
        match self {
            Qualifier::NonDetect | Qualifier::Trace => QualifierAction::SubstituteMdl,
            Qualifier::Rejected | Qualifier::Invalid => QualifierAction::Drop,
            Qualifier::Other(_) | Qualifier::None => QualifierAction::Keep,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    Wet,
    Dry,
}

impl Season {
    /// Tag a month against an inclusive wet-season window
    pub fn from_month(month: u32, wet_first: u32, wet_last: u32) -> Self {
        if (wet_first..=wet_last).contains(&month) {
            Season::Wet
        } else {
            Season::Dry
        }
    }
}

impl Sample {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        wbid: impl Into<String>,
        station: impl Into<String>,
        year: i32,
        month: u32,
        day: u32,
        analyte: impl Into<String>,
        result: f64,
        qualifier_code: Option<String>,
        mdl: Option<f64>,
    ) -> Self {
        Self {
            wbid: wbid.into(),
            station: station.into(),
            year,
            month,
            day,
            analyte: analyte.into(),
            result,
            qualifier_code,
            mdl,
        }
    }

    pub fn qualifier(&self) -> Qualifier {
        Qualifier::from_code(self.qualifier_code.as_deref())
    }

    /// Collection date; an out-of-range field or a day that does not exist in
    /// the calendar is an integrity error
    pub fn date(&self) -> Result<NaiveDate> {
        self.validate()
            .map_err(|e| self.integrity_error(e.to_string()))?;
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            self.integrity_error(format!(
                "invalid collection date {}-{:02}-{:02}",
                self.year, self.month, self.day
            ))
        })
    }

    pub fn integrity_error(&self, message: String) -> ProcessingError {
        ProcessingError::DataIntegrity {
            wbid: self.wbid.clone(),
            station: self.station.clone(),
            date: format!("{}-{:02}-{:02}", self.year, self.month, self.day),
            analyte: self.analyte.clone(),
            message,
        }
    }
}

/// Same-day, same-analyte samples of one waterbody collapsed to their median.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyComposite {
    pub date: NaiveDate,
    pub analyte: String,
    pub result: f64,
    pub season: Season,
    pub sample_count: usize,
}

impl DailyComposite {
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}
