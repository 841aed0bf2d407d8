pub mod property;
pub mod transaction;

pub use property::{Appreciation, NewProperty, Property, PropertyValuation};
pub use transaction::{
    NewTransaction, Transaction, TransactionRecord, TransactionType, UNCATEGORIZED_LABEL,
};
