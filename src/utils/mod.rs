pub mod constants;
pub mod filename;
pub mod logging;
pub mod progress;
pub mod stats;
pub mod text;

pub use constants::*;
pub use filename::{generate_default_annual_filename, generate_default_septic_filename};
pub use logging::init_logging;
pub use progress::ProgressReporter;
pub use stats::{geometric_mean, median};
pub use text::decode_text;
