mod entry;
mod ledger;
mod money;
pub mod normalize;
mod totals;

pub use entry::*;
pub use ledger::*;
pub use money::*;
pub use normalize::{normalize, normalize_counted, normalize_entry};
pub use totals::*;
