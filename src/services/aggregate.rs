//! Grouped sums over a filtered transaction subset.
//!
//! All money is summed as exact decimals. Ratios (margin, ROI, share) keep
//! full precision here; rounding belongs to presentation.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::date_utils::{month_key, month_label, month_start, TimeWindow};
use crate::error::ReportError;
use crate::ledger::Ledger;
use crate::models::{Appreciation, Transaction, UNCATEGORIZED_LABEL};

/// Label of the bucket holding transactions not tied to any property.
pub const GENERAL_LABEL: &str = "Portfolio (general)";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Property,
    Category,
    Month,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::Category => "category",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "property" | "properties" => Ok(Self::Property),
            "category" | "categories" => Ok(Self::Category),
            "month" | "monthly" => Ok(Self::Month),
            _ => Err(ReportError::InvalidParameter {
                name: "group_by".into(),
                value: s.to_string(),
            }),
        }
    }
}

/// Which side of the ledger category shares are measured against.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareBasis {
    #[default]
    Expenses,
    Income,
}

/// Identity of an aggregate row. The derived ordering is the tie-break order
/// used by the ranker: the synthetic bucket first, then numeric ids, then
/// name-only categories, then months.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityId {
    Unassigned,
    Id(i64),
    Named(String),
    Month(NaiveDate),
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unassigned => serializer.serialize_none(),
            Self::Id(id) => serializer.serialize_i64(*id),
            Self::Named(name) => serializer.serialize_str(name),
            Self::Month(date) => serializer.serialize_str(&month_key(*date)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow {
    pub entity_id: EntityId,
    pub entity_name: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
    pub profit_margin: Decimal,
    pub roi: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_percent: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appreciation: Option<Appreciation>,
    pub transaction_count: usize,
}

impl AggregateRow {
    fn new(entity_id: EntityId, entity_name: String, sums: &Sums) -> Self {
        let profit = sums.income - sums.expenses;
        Self {
            entity_id,
            entity_name,
            income: sums.income,
            expenses: sums.expenses,
            profit,
            profit_margin: margin(profit, sums.income),
            roi: None,
            share_percent: None,
            appreciation: None,
            transaction_count: sums.count,
        }
    }

    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            entity_id: self.entity_id.clone(),
            entity_name: self.entity_name.clone(),
            income: round(self.income, dp),
            expenses: round(self.expenses, dp),
            profit: round(self.profit, dp),
            profit_margin: round(self.profit_margin, dp),
            roi: self.roi.map(|v| round(v, dp)),
            share_percent: self.share_percent.map(|v| round(v, dp)),
            appreciation: self.appreciation.map(|a| a.rounded(dp)),
            transaction_count: self.transaction_count,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Sums {
    income: Decimal,
    expenses: Decimal,
    count: usize,
}

impl Sums {
    fn add(&mut self, tx: &Transaction) {
        if tx.is_income() {
            self.income += tx.amount;
        } else {
            self.expenses += tx.amount;
        }
        self.count += 1;
    }
}

/// Inputs the aggregator needs besides the transactions themselves.
#[derive(Debug, Clone, Copy)]
pub struct AggregationContext<'a> {
    pub ledger: &'a Ledger,
    pub window: &'a TimeWindow,
    pub share_basis: ShareBasis,
}

/// Groups `transactions` by `group_by`. Rows come back ordered by entity id.
pub fn aggregate(
    transactions: &[&Transaction],
    group_by: GroupBy,
    ctx: &AggregationContext<'_>,
) -> Vec<AggregateRow> {
    let rows = match group_by {
        GroupBy::Property => by_property(transactions, ctx.ledger),
        GroupBy::Category => by_category(transactions, ctx),
        GroupBy::Month => by_month(transactions, ctx.window),
    };
    debug!(group_by = %group_by, count = rows.len(), "Aggregated rows");
    rows
}

fn by_property(transactions: &[&Transaction], ledger: &Ledger) -> Vec<AggregateRow> {
    let mut groups: BTreeMap<EntityId, Sums> = BTreeMap::new();
    for tx in transactions {
        let key = tx.property_id.map_or(EntityId::Unassigned, EntityId::Id);
        groups.entry(key).or_default().add(tx);
    }

    groups
        .into_iter()
        .map(|(key, sums)| {
            let property = match &key {
                EntityId::Id(id) => ledger.property(*id),
                _ => None,
            };
            let name = match (&key, property) {
                (_, Some(p)) => p.name.clone(),
                (EntityId::Id(id), None) => format!("Property {}", id),
                _ => GENERAL_LABEL.to_string(),
            };

            let mut row = AggregateRow::new(key, name, &sums);
            if let Some(property) = property {
                row.roi = property
                    .cost_basis()
                    .and_then(|basis| percent_of(row.profit, basis));
                row.appreciation = property.appreciation();
            }
            row
        })
        .collect()
}

fn by_category(transactions: &[&Transaction], ctx: &AggregationContext<'_>) -> Vec<AggregateRow> {
    let index = CategoryIndex::new(ctx.ledger.transactions());
    let mut groups: BTreeMap<EntityId, Sums> = BTreeMap::new();
    for tx in transactions {
        groups.entry(index.key(tx)).or_default().add(tx);
    }

    let share_value = |sums: &Sums| match ctx.share_basis {
        ShareBasis::Expenses => sums.expenses,
        ShareBasis::Income => sums.income,
    };
    let total: Decimal = groups.values().map(share_value).sum();

    groups
        .into_iter()
        .map(|(key, sums)| {
            let name = index.label(&key);
            let mut row = AggregateRow::new(key, name, &sums);
            row.share_percent = Some(percent_of(share_value(&sums), total).unwrap_or(Decimal::ZERO));
            row
        })
        .collect()
}

/// Category identities learned from the whole ledger. A name without an id
/// joins the lowest id seen with that exact name, and an id takes the first
/// name any transaction gives it.
pub(crate) struct CategoryIndex {
    ids_by_name: HashMap<String, i64>,
    names_by_id: HashMap<i64, String>,
}

impl CategoryIndex {
    pub(crate) fn new(transactions: &[Transaction]) -> Self {
        let mut ids_by_name: HashMap<String, i64> = HashMap::new();
        let mut names_by_id: HashMap<i64, String> = HashMap::new();
        for tx in transactions {
            if let (Some(id), Some(name)) = (tx.category_id, &tx.category_name) {
                ids_by_name
                    .entry(name.clone())
                    .and_modify(|existing| *existing = (*existing).min(id))
                    .or_insert(id);
                names_by_id.entry(id).or_insert_with(|| name.clone());
            }
        }
        Self {
            ids_by_name,
            names_by_id,
        }
    }

    pub(crate) fn key(&self, tx: &Transaction) -> EntityId {
        match (tx.category_id, &tx.category_name) {
            (Some(id), _) => EntityId::Id(id),
            (None, Some(name)) if name != UNCATEGORIZED_LABEL => match self.ids_by_name.get(name) {
                Some(id) => EntityId::Id(*id),
                None => EntityId::Named(name.clone()),
            },
            _ => EntityId::Unassigned,
        }
    }

    fn label(&self, key: &EntityId) -> String {
        match key {
            EntityId::Id(id) => self
                .names_by_id
                .get(id)
                .cloned()
                .unwrap_or_else(|| format!("Category {}", id)),
            EntityId::Named(name) => name.clone(),
            EntityId::Unassigned | EntityId::Month(_) => UNCATEGORIZED_LABEL.to_string(),
        }
    }
}
