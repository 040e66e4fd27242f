// Application layer - the session that owns the ledger and orchestrates
// normalization, aggregation and persistence.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
