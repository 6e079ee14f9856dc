//! HTTP clients for Codecov and Geckoboard

pub mod codecov;
pub mod geckoboard;

pub use codecov::CodecovClient;
pub use geckoboard::{dataset_id, GeckoboardClient};
