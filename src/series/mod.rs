//! Raw-series alignment and feature derivation.

pub mod align;
pub mod processor;

pub use align::{align_monthly, month_range, month_start, next_month};
pub use processor::SeriesProcessor;
