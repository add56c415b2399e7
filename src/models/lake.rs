use serde::{Deserialize, Serialize};

use crate::utils::constants::{ALKALINITY_THRESHOLD_MG_L, HIGH_COLOR_CODE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorClass {
    /// High colour lake (> 40 PCU)
    Color,
    /// Low colour lake
    Clear,
}

impl ColorClass {
    pub fn from_code(code: i64) -> Self {
        if code == HIGH_COLOR_CODE {
            ColorClass::Color
        } else {
            ColorClass::Clear
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorClass::Color => "color",
            ColorClass::Clear => "clear",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ColorClass::Color => "high color lake",
            ColorClass::Clear => "low color lake",
        }
    }
}

impl std::fmt::Display for ColorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the lake numeric nutrient criteria table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientCriteria {
    pub lake_type: u8,
    pub color_and_alkalinity: &'static str,
    pub min_tp_mg_l: f64,
    pub min_tn_mg_l: f64,
}

static CRITERIA: [NutrientCriteria; 3] = [
    NutrientCriteria {
        lake_type: 1,
        color_and_alkalinity: "> 40 Platinum Cobalt Units",
        min_tp_mg_l: 0.05,
        min_tn_mg_l: 1.27,
    },
    NutrientCriteria {
        lake_type: 2,
        color_and_alkalinity: "≤ 40 Platinum Cobalt Units and > 20 mg/L CaCO3",
        min_tp_mg_l: 0.03,
        min_tn_mg_l: 1.05,
    },
    NutrientCriteria {
        lake_type: 3,
        color_and_alkalinity: "≤ 40 Platinum Cobalt Units and ≤ 20 mg/L CaCO3",
        min_tp_mg_l: 0.01,
        min_tn_mg_l: 0.51,
    },
];

pub fn nutrient_criteria() -> &'static [NutrientCriteria] {
    &CRITERIA
}

/// Criteria rows that apply to a lake.
///
/// A clear lake needs alkalinity to pick between types 2 and 3; without it
/// both rows are returned.
pub fn criteria_for(class: ColorClass, alkalinity_mg_l: Option<f64>) -> Vec<&'static NutrientCriteria> {
    let types: Vec<u8> = match (class, alkalinity_mg_l) {
        (ColorClass::Color, _) => vec![1],
        (ColorClass::Clear, Some(alk)) if alk > ALKALINITY_THRESHOLD_MG_L => vec![2],
        (ColorClass::Clear, Some(_)) => vec![3],
        (ColorClass::Clear, None) => vec![2, 3],
    };

    CRITERIA
        .iter()
        .filter(|c| types.contains(&c.lake_type))
        .collect()
}

pub fn format_criteria_table(rows: &[&NutrientCriteria]) -> String {
    let mut table = String::new();
    table.push_str(&format!(
        "{:<5} {:<50} {:>18} {:>18}\n",
        "Type", "Color & Alk", "Min TP NNC (mg/L)", "Min TN NNC (mg/L)"
    ));
    for row in rows {
        table.push_str(&format!(
            "{:<5} {:<50} {:>18.2} {:>18.2}\n",
            row.lake_type, row.color_and_alkalinity, row.min_tp_mg_l, row.min_tn_mg_l
        ));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_code() {
        assert_eq!(ColorClass::from_code(1), ColorClass::Color);
        assert_eq!(ColorClass::from_code(0), ColorClass::Clear);
        assert_eq!(ColorClass::from_code(2), ColorClass::Clear);
        assert_eq!(ColorClass::Color.to_string(), "color");
    }

    #[test]
    fn test_criteria_table_values() {
        let table = nutrient_criteria();
        assert_eq!(table.len(), 3);
        assert_eq!(table[0].min_tp_mg_l, 0.05);
        assert_eq!(table[1].min_tn_mg_l, 1.05);
        assert_eq!(table[2].min_tp_mg_l, 0.01);
    }

    #[test]
    fn test_criteria_selection() {
        let color = criteria_for(ColorClass::Color, Some(5.0));
        assert_eq!(color.len(), 1);
        assert_eq!(color[0].lake_type, 1);

        let hard = criteria_for(ColorClass::Clear, Some(35.0));
        assert_eq!(hard[0].lake_type, 2);

        let soft = criteria_for(ColorClass::Clear, Some(20.0));
        assert_eq!(soft[0].lake_type, 3);

        let unknown = criteria_for(ColorClass::Clear, None);
        let types: Vec<u8> = unknown.iter().map(|c| c.lake_type).collect();
        assert_eq!(types, vec![2, 3]);
    }

    #[test]
    fn test_format_criteria_table() {
        let rows: Vec<&NutrientCriteria> = nutrient_criteria().iter().collect();
        let text = format_criteria_table(&rows);
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("1.27"));
    }
}
