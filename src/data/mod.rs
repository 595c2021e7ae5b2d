//! External data sources.

pub mod banxico;
pub mod fred;
pub mod source;

pub use source::{Credentials, Provider, RawSeries, SeriesSource, fetch_all};
