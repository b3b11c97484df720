mod store;
mod types;

#[cfg(test)]
mod types_test;

pub use store::DateLedger;
pub use types::{DateLedgerEntry, DayCategory, LedgerSnapshot};
