pub mod client;
pub mod error;
pub mod isolate;

pub use client::StationsClient;
pub use error::UploadError;
pub use isolate::{upload_with_isolation, IsolationReport, Rejected};
