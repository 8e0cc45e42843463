pub mod config;
pub mod conformance;
pub mod fixtures;
pub mod logging;

pub use config::ConformanceConfig;
pub use conformance::{run_all_checks, CheckOutcome, ConformanceError, ConformanceReport};
pub use fixtures::{load_fixtures, DocumentFixture};
