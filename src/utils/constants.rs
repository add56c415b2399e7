/// Default analyte codes (IWR mastercodes)
pub const ANALYTE_TN: &str = "TN";
pub const ANALYTE_TP: &str = "TP";
pub const ANALYTE_CHLAC: &str = "CHLAC";
pub const DEFAULT_ANALYTES: &str = "TN,TP,CHLAC";

/// Output column names for the annual table
pub const WBID_COLUMN: &str = "WBID";
pub const YEAR_COLUMN: &str = "YEAR";

/// Sample source table and classification defaults
pub const RAW_DATA_TABLE: &str = "RawData";
pub const CLASSIFICATION_TABLE: &str = "Lake_Classification";
pub const CLASSIFICATION_WBID_COLUMN: &str = "wbid";
pub const CLASSIFICATION_COLOR_COLUMN: &str = "color";

/// Aggregation rules
pub const EXCLUDED_STATION_PATTERN: &str = "21FLKWAT";
pub const MIN_COMPOSITES_PER_YEAR: usize = 4;
pub const WET_SEASON_FIRST_MONTH: u32 = 5;
pub const WET_SEASON_LAST_MONTH: u32 = 9;

/// Colour class code marking a high colour lake
pub const HIGH_COLOR_CODE: i64 = 1;

/// Alkalinity splitting the clear lake types
pub const ALKALINITY_THRESHOLD_MG_L: f64 = 20.0;

/// Unit conversions
pub const METERS_PER_INCH: f64 = 0.0254;
pub const LITERS_PER_CUBIC_METER: f64 = 1000.0;
pub const MG_PER_KG: f64 = 1_000_000.0;
pub const CUBIC_METERS_PER_HM3: f64 = 1_000_000.0;
pub const ACRES_PER_SQ_METER: f64 = 0.000_247_11;
pub const LITERS_PER_GALLON: f64 = 3.78541;
pub const HM3_PER_LITER: f64 = 0.000_000_001;
pub const UG_PER_LB: f64 = 453_600_000.0;
pub const LBS_PER_KG: f64 = 2.205;
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Septic defaults
pub const SEPTIC_WATER_USE_GAL_PER_DAY: f64 = 70.0;
pub const SEPTIC_FLOW_RETENTION: f64 = 0.85;
pub const SEPTIC_NITROGEN_LBS_PER_PERSON: f64 = 9.012;
pub const SEPTIC_ATTENUATION: f64 = 0.5;

/// PLSM output files
pub const PLSM_RAW_FILE: &str = "PLSM_raw.csv";
pub const PLSM_SUMMARY_FILE: &str = "PLSM_summary.csv";
pub const PLSM_LTA_FILE: &str = "LTA_LVL_2_Loading.csv";
pub const PLSM_NUTRIENT_MAP_FILE: &str = "nutrient_map.csv";
pub const PLSM_BATHTUB_FILE: &str = "PLSM_Bathtub.csv";
pub const PLSM_LEVEL1_FILE: &str = "LVL_1_Landuse.csv";

/// Label of the septic row appended to the level-1 table
pub const SEPTIC_LEVEL1_LABEL: &str = "Septic Load (Kg)";

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const BATHTUB_DECIMALS: i32 = 3;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";

/// Land-use table columns (GIS export and coefficient master list)
pub const LANDUSE_CODE_COLUMN: &str = "LEVEL2_LAN";
pub const LANDUSE_DESCRIPTION_COLUMN: &str = "LEVEL2_L_1";
pub const LANDUSE_AREA_COLUMN: &str = "Area_sq_m";
pub const LEVEL1_CODE_COLUMN: &str = "LEVEL1_LAN";
pub const LEVEL1_DESCRIPTION_COLUMN: &str = "LEVEL1_L_1";
pub const COEFFICIENT_CODE_COLUMN: &str = "LEVEL2_LANDUSE_CODE";
pub const COEFFICIENT_ROC_COLUMN: &str = "ROC";
pub const COEFFICIENT_EMC_TN_COLUMN: &str = "EMC_TN";
pub const COEFFICIENT_EMC_TP_COLUMN: &str = "EMC_TP";
