pub mod classification_reader;
pub mod csv_source;
pub mod landuse_reader;
pub mod rainfall_reader;
pub mod sample_source;
pub mod sqlite_source;
pub mod table;

pub use classification_reader::LakeClassificationReader;
pub use csv_source::CsvSampleSource;
pub use landuse_reader::LanduseReader;
pub use rainfall_reader::RainfallReader;
pub use sample_source::{fetch_waterbody_samples, SampleQuery, SampleSource, SourceSpec};
pub use sqlite_source::SqliteSampleSource;
pub use table::NamedTable;
