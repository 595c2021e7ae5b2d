//! Input/output helpers.
//!
//! - annual history CSV ingest (`ingest`)
//! - scenario CSV export (`export`)
//! - request/session JSON (`session`)

pub mod export;
pub mod ingest;
pub mod session;

pub use export::*;
pub use ingest::*;
pub use session::*;
