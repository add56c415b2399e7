use serde::{Deserialize, Serialize};
use validator::Validate;

/// Total rainfall for one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RainfallYear {
    pub year: i32,

    #[validate(range(min = 0.0))]
    pub total_inches: f64,
}

/// Level-1 (broad class) land use a level-2 land use belongs to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Level1Landuse {
    pub code: i64,
    pub description: String,
}

/// Area of one level-2 land use inside the watershed, as exported from the GIS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LanduseArea {
    pub level2_code: i64,

    pub level2_description: String,

    #[validate(range(min = 0.0))]
    pub area_sq_m: f64,

    /// Present when the export carries the level-1 columns
    pub level1: Option<Level1Landuse>,
}

/// Runoff coefficient and event mean concentrations for a level-2 land use.
///
/// Fields are optional as read; a merge with missing values is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanduseCoefficient {
    pub level2_code: i64,
    pub roc: Option<f64>,
    /// mg/L
    pub emc_tn: Option<f64>,
    /// mg/L
    pub emc_tp: Option<f64>,
}

/// A land-use area joined to complete coefficients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanduseParameters {
    pub level2_code: i64,
    pub level2_description: String,
    pub level1: Option<Level1Landuse>,
    pub area_sq_m: f64,
    pub roc: f64,
    pub emc_tn: f64,
    pub emc_tp: f64,
}

/// One land use in one rainfall year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanduseLoad {
    pub year: i32,
    pub level2_code: i64,
    pub level2_description: String,
    pub level1: Option<Level1Landuse>,
    pub area_sq_m: f64,
    pub roc: f64,
    pub emc_tn: f64,
    pub emc_tp: f64,
    pub rainfall_in: f64,
    pub rainfall_m: f64,
    pub rainfall_volume_m3: f64,
    pub rainfall_volume_l: f64,
    pub runoff_volume_l: f64,
    pub tn_load_kg: f64,
    pub tp_load_kg: f64,
}

/// All land uses for one rainfall year
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyLoads {
    pub year: i32,
    pub rainfall_m: f64,
    pub landuses: Vec<LanduseLoad>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyLoadSummary {
    pub year: i32,
    pub runoff_volume_m3: f64,
    pub tn_load_kg: f64,
    pub tp_load_kg: f64,
}

impl YearlyLoadSummary {
    pub fn runoff_volume_hm3(&self) -> f64 {
        self.runoff_volume_m3 / crate::utils::constants::CUBIC_METERS_PER_HM3
    }

    /// Flow-weighted TN concentration in parts per billion (µg/L)
    pub fn tn_ppb(&self) -> f64 {
        concentration_ppb(self.tn_load_kg, self.runoff_volume_m3)
    }

    pub fn tp_ppb(&self) -> f64 {
        concentration_ppb(self.tp_load_kg, self.runoff_volume_m3)
    }
}

fn concentration_ppb(load_kg: f64, volume_m3: f64) -> f64 {
    if volume_m3 > 0.0 {
        load_kg / volume_m3 * 1_000_000.0
    } else {
        0.0
    }
}

/// Loading per acre of a level-2 land use
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerAcreLoading {
    pub level2_code: i64,
    pub level2_description: String,
    pub tn_kg_per_acre: f64,
    pub tp_kg_per_acre: f64,
}

/// Per-acre loading for every land use in one year
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyPerAcreLoading {
    pub year: i32,
    pub loadings: Vec<PerAcreLoading>,
}

/// Long-term average annual load of a level-1 land use.
///
/// The septic row has no level-1 code and carries only nitrogen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level1Loading {
    pub level1_code: Option<i64>,
    pub level1_description: String,
    pub tn_kg: f64,
    pub tp_kg: Option<f64>,
}

/// One row of the lake model ("bathtub") input table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BathtubRow {
    pub year: i32,
    pub precipitation_m: f64,
    pub runoff_volume_hm3: f64,
    pub tn_ppb: f64,
    pub tp_ppb: f64,
}
