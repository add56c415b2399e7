use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::utils::constants::DEFAULT_ANALYTES;

#[derive(Parser)]
#[command(name = "wq-processor")]
#[command(about = "Lake nutrient water-quality aggregation and watershed load screening")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "TOML settings file (overridden by WQ__* variables)")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    #[arg(long, help = "SQLite database holding the RawData table")]
    pub database: Option<PathBuf>,

    #[arg(long, help = "CSV export of the RawData table")]
    pub samples: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate raw samples into annual geometric means per waterbody
    Aggregate {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(short, long = "wbid", required = true, help = "Waterbody ID (repeatable)")]
        wbids: Vec<String>,

        #[arg(
            short,
            long,
            value_delimiter = ',',
            default_value = DEFAULT_ANALYTES,
            help = "Analyte codes"
        )]
        analytes: Vec<String>,

        #[arg(long, default_value = "2000", help = "First year to include")]
        start_year: i32,

        #[arg(
            short,
            long,
            help = "Output file path [default: output/wq-annual-{YYMMDD}.{csv|parquet}]"
        )]
        output_file: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "csv")]
        format: OutputFormat,

        #[arg(short, long, default_value = "snappy", help = "Parquet compression")]
        compression: String,

        #[arg(long, help = "Write the coverage report as JSON")]
        report: Option<PathBuf>,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,

        #[arg(long, requires = "samples", help = "Memory-map the CSV export")]
        mmap: bool,
    },

    /// Check whether waterbody IDs exist in the sample source
    Check {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(short, long = "wbid", required = true)]
        wbids: Vec<String>,

        #[arg(long, requires = "samples", help = "Memory-map the CSV export")]
        mmap: bool,
    },

    /// Look up a lake's colour class and applicable nutrient criteria
    Classify {
        #[arg(long, help = "SQLite database holding the classification table")]
        database: PathBuf,

        #[arg(short, long)]
        wbid: String,

        #[arg(long, help = "Alkalinity in mg/L CaCO3, picks the clear lake type")]
        alkalinity: Option<f64>,
    },

    /// Print the lake numeric nutrient criteria table
    Criteria,

    /// Pollutant load screening: per-year land-use runoff and nutrient loads
    Plsm {
        #[arg(
            long,
            help = "Watershed land-use areas (LEVEL2_LAN, LEVEL2_L_1, Area_sq_m, optional LEVEL1_LAN, LEVEL1_L_1)"
        )]
        landuse: PathBuf,

        #[arg(long, help = "Land-use coefficients (LEVEL2_LANDUSE_CODE, ROC, EMC_TN, EMC_TP)")]
        coefficients: PathBuf,

        #[arg(long, help = "Annual rainfall (Year, Total inches)")]
        rainfall: PathBuf,

        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        #[arg(
            long,
            requires = "septic_people",
            help = "Septic tanks in the watershed, adds a septic row to the level-1 table"
        )]
        septic_tanks: Option<u32>,

        #[arg(long, requires = "septic_tanks", help = "Average number of people per household")]
        septic_people: Option<f64>,

        #[arg(long, help = "Drop zero-load rows from the level-1 table")]
        remove_waters: bool,
    },

    /// Septic tank nitrogen loading
    Septic {
        #[arg(long, help = "Number of septic tanks")]
        tanks: u32,

        #[arg(long, help = "Average number of people per household")]
        people: f64,

        #[arg(
            short,
            long,
            help = "Output CSV path [default: output/septic-calculations-{YYMMDD}.csv]"
        )]
        output_file: Option<PathBuf>,
    },

    /// Display information about an annual table Parquet file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}
