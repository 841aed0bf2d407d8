use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::date_utils::TimeWindow;
use crate::error::ReportError;
use crate::ledger::Ledger;
use crate::models::{Transaction, TransactionType};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl TypeFilter {
    fn admits(&self, kind: TransactionType) -> bool {
        match self {
            Self::All => true,
            Self::Income => kind == TransactionType::Income,
            Self::Expense => kind == TransactionType::Expense,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "income" => Ok(Self::Income),
            "expense" | "expenses" => Ok(Self::Expense),
            _ => Err(ReportError::InvalidParameter {
                name: "type".into(),
                value: s.to_string(),
            }),
        }
    }
}

/// Predicates applied on top of the report window.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransactionFilter {
    pub property_id: Option<i64>,
    pub search: Option<String>,
    pub type_filter: TypeFilter,
    pub recurring_only: bool,
}

impl TransactionFilter {
    /// Lowercased search needle; blank terms count as no search.
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn admits(&self, tx: &Transaction, needle: Option<&str>, ledger: &Ledger) -> bool {
        if let Some(property_id) = self.property_id {
            if tx.property_id != Some(property_id) {
                return false;
            }
        }
        if !self.type_filter.admits(tx.kind) {
            return false;
        }
        if self.recurring_only && !tx.recurring {
            return false;
        }
        match needle {
            Some(needle) => search_matches(tx, needle, ledger),
            None => true,
        }
    }
}

fn search_matches(tx: &Transaction, needle: &str, ledger: &Ledger) -> bool {
    if tx.description.to_lowercase().contains(needle) {
        return true;
    }
    if let Some(name) = &tx.category_name {
        if name.to_lowercase().contains(needle) {
            return true;
        }
    }
    if let Some(property) = tx.property_id.and_then(|id| ledger.property(id)) {
        if property.name.to_lowercase().contains(needle) {
            return true;
        }
    }
    tx.amount.to_string().contains(needle)
}

/// Transactions inside `window` that pass every predicate of `filter`.
/// The ledger is only borrowed; result order follows the ledger.
pub fn filter_transactions<'a>(
    ledger: &'a Ledger,
    window: &TimeWindow,
    filter: &TransactionFilter,
) -> Vec<&'a Transaction> {
    let needle = filter.needle();
    let filtered: Vec<&Transaction> = ledger
        .transactions()
        .iter()
        .filter(|tx| window.contains(tx.date))
        .filter(|tx| filter.admits(tx, needle.as_deref(), ledger))
        .collect();

    debug!(
        total = ledger.transactions().len(),
        count = filtered.len(),
        "Filtered transactions"
    );
    filtered
}
