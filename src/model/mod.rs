//! Types that represent the ledger data model, such as `TransactionRecord` and `Amount`.
mod amount;
mod category;
mod date;
mod record;

pub use amount::{Amount, AmountError};
pub use category::Category;
pub use date::{LedgerDate, MonthKey};
pub use record::{AggregateRow, LedgerData, TransactionRecord, VALID_DEBIT};
