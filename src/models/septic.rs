use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SepticInputs {
    /// Septic tanks within the waterbody buffer
    pub tank_count: u32,

    #[validate(range(min = 0.0))]
    pub people_per_household: f64,
}

/// Per-person wastewater and nitrogen assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SepticParameters {
    #[validate(range(min = 0.0))]
    pub water_use_gal_per_day: f64,

    /// Fraction of water use reaching the drain field
    #[validate(range(min = 0.0, max = 1.0))]
    pub flow_retention: f64,

    #[validate(range(min = 0.0))]
    pub nitrogen_lbs_per_person: f64,

    #[validate(range(min = 0.0, max = 1.0))]
    pub attenuation: f64,
}

impl Default for SepticParameters {
    fn default() -> Self {
        use crate::utils::constants::*;

        Self {
            water_use_gal_per_day: SEPTIC_WATER_USE_GAL_PER_DAY,
            flow_retention: SEPTIC_FLOW_RETENTION,
            nitrogen_lbs_per_person: SEPTIC_NITROGEN_LBS_PER_PERSON,
            attenuation: SEPTIC_ATTENUATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SepticLoad {
    pub inputs: SepticInputs,
    pub parameters: SepticParameters,
    pub flow_gal_per_day_per_tank: f64,
    pub total_flow_gal_per_year: f64,
    pub total_flow_l_per_year: f64,
    pub total_flow_hm3_per_year: f64,
    pub nitrogen_load_lbs: f64,
    pub nitrogen_load_ug: f64,
    /// Truncated to whole µg/L; absent when there is no flow
    pub concentration_ug_l: Option<i64>,
    pub nitrogen_load_kg: f64,
}

impl SepticLoad {
    /// Parameter/value rows in worksheet order
    pub fn parameter_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Septic Tanks", self.inputs.tank_count.to_string()),
            ("Avg. People", self.inputs.people_per_household.to_string()),
            (
                "Water Use (gal/day)",
                self.parameters.water_use_gal_per_day.to_string(),
            ),
            ("Flow Loss (15%)", self.parameters.flow_retention.to_string()),
            (
                "Nitrogen per person (lbs)",
                self.parameters.nitrogen_lbs_per_person.to_string(),
            ),
            ("Attenuation", self.parameters.attenuation.to_string()),
            (
                "Flow Rate (gal/day/tank)",
                self.flow_gal_per_day_per_tank.to_string(),
            ),
            (
                "Total Flow Rate (gal/yr)",
                self.total_flow_gal_per_year.to_string(),
            ),
            ("Total Flow Rate (L/yr)", self.total_flow_l_per_year.to_string()),
            (
                "Total Flow Rate (hm3/yr)",
                self.total_flow_hm3_per_year.to_string(),
            ),
            ("Nitrogen load (lbs)", self.nitrogen_load_lbs.to_string()),
            ("Nitrogen load (ug)", self.nitrogen_load_ug.to_string()),
            (
                "Concentration (ug/L)",
                self.concentration_ug_l
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
            ),
            ("Septic Load (Kg)", self.nitrogen_load_kg.to_string()),
        ]
    }
}
