use crate::error::Result;
use crate::models::{SepticInputs, SepticLoad, SepticParameters};
use crate::utils::constants::*;
use validator::Validate;

/// Nitrogen load reaching a waterbody from the septic tanks in its buffer
pub struct SepticCalculator {
    parameters: SepticParameters,
}

impl SepticCalculator {
    pub fn new(parameters: SepticParameters) -> Self {
        Self { parameters }
    }

    pub fn calculate(&self, inputs: &SepticInputs) -> Result<SepticLoad> {
        inputs.validate()?;
        self.parameters.validate()?;

        let p = &self.parameters;
        let tanks = f64::from(inputs.tank_count);
        let people = inputs.people_per_household;

        let flow_gal_per_day_per_tank = people * p.water_use_gal_per_day * p.flow_retention;
        let total_flow_gal_per_year = tanks * flow_gal_per_day_per_tank * DAYS_PER_YEAR;
        let total_flow_l_per_year = total_flow_gal_per_year * LITERS_PER_GALLON;
        let total_flow_hm3_per_year = total_flow_l_per_year * HM3_PER_LITER;

        let nitrogen_load_lbs = people * p.nitrogen_lbs_per_person * tanks * p.attenuation;
        let nitrogen_load_ug = nitrogen_load_lbs * UG_PER_LB;
        let concentration_ug_l = if total_flow_l_per_year > 0.0 {
            Some((nitrogen_load_ug / total_flow_l_per_year).trunc() as i64)
        } else {
            None
        };

        tracing::debug!(
            tanks = inputs.tank_count,
            nitrogen_load_lbs,
            "Calculated septic load"
        );

        Ok(SepticLoad {
            inputs: inputs.clone(),
            parameters: p.clone(),
            flow_gal_per_day_per_tank,
            total_flow_gal_per_year,
            total_flow_l_per_year,
            total_flow_hm3_per_year,
            nitrogen_load_lbs,
            nitrogen_load_ug,
            concentration_ug_l,
            nitrogen_load_kg: nitrogen_load_lbs / LBS_PER_KG,
        })
    }
}

impl Default for SepticCalculator {
    fn default() -> Self {
        Self::new(SepticParameters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;

    fn inputs(tank_count: u32, people_per_household: f64) -> SepticInputs {
        SepticInputs {
            tank_count,
            people_per_household,
        }
    }

    #[test]
    fn test_default_parameters() -> Result<()> {
        let load = SepticCalculator::default().calculate(&inputs(100, 2.5))?;

        assert!((load.flow_gal_per_day_per_tank - 148.75).abs() < 1e-9);
        assert!((load.total_flow_gal_per_year - 5_429_375.0).abs() < 1e-6);
        assert!((load.total_flow_l_per_year - 5_429_375.0 * 3.78541).abs() < 1e-3);
        assert!((load.total_flow_hm3_per_year - 0.020_552_4).abs() < 1e-6);
        assert!((load.nitrogen_load_lbs - 1126.5).abs() < 1e-9);
        assert!((load.nitrogen_load_kg - 1126.5 / 2.205).abs() < 1e-9);
        // 1126.5 lbs * 453.6e6 ug / 20 552 410 L
        assert_eq!(load.concentration_ug_l, Some(24862));
        Ok(())
    }

    #[test]
    fn test_no_tanks_has_no_concentration() -> Result<()> {
        let load = SepticCalculator::default().calculate(&inputs(0, 2.5))?;
        assert_eq!(load.total_flow_l_per_year, 0.0);
        assert_eq!(load.nitrogen_load_kg, 0.0);
        assert_eq!(load.concentration_ug_l, None);
        Ok(())
    }

    #[test]
    fn test_custom_parameters() -> Result<()> {
        let parameters = SepticParameters {
            attenuation: 1.0,
            ..SepticParameters::default()
        };
        let load = SepticCalculator::new(parameters).calculate(&inputs(1, 1.0))?;
        assert!((load.nitrogen_load_lbs - 9.012).abs() < 1e-12);
        assert_eq!(load.parameter_rows().len(), 14);
        Ok(())
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let parameters = SepticParameters {
            flow_retention: 1.5,
            ..SepticParameters::default()
        };
        let result = SepticCalculator::new(parameters).calculate(&inputs(1, 1.0));
        assert!(matches!(result, Err(ProcessingError::Validation(_))));

        let result = SepticCalculator::default().calculate(&inputs(1, -2.0));
        assert!(matches!(result, Err(ProcessingError::Validation(_))));
    }
}
