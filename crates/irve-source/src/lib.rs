pub mod client;
pub mod csv_stream;
pub mod error;
pub mod normalize;
pub mod normalize_records;
pub(crate) mod parse_helpers;
pub mod records;
pub mod row;

pub use client::{BodyReader, SourceClient};
pub use csv_stream::CsvRowStream;
pub use error::SourceError;
pub use normalize::map_station;
pub use normalize_records::map_record;
pub use records::{RecordPager, RecordsPage};
pub use row::RawRow;
