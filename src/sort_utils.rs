use std::cmp::Ordering;

use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::ReportError;
use crate::services::aggregate::{AggregateRow, GroupBy};

/// Sort direction for report rows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Desc,
    Asc,
}

impl SortDirection {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Natural entity order: property/category id, or chronological months.
    Id,
    Name,
    Income,
    Expenses,
    Profit,
    ProfitMargin,
    Roi,
    SharePercent,
    TransactionCount,
}

impl SortField {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "id" | "month" | "period" => Some(Self::Id),
            "name" => Some(Self::Name),
            "income" => Some(Self::Income),
            "expenses" => Some(Self::Expenses),
            "profit" => Some(Self::Profit),
            "margin" | "profit_margin" => Some(Self::ProfitMargin),
            "roi" => Some(Self::Roi),
            "share" | "share_percent" => Some(Self::SharePercent),
            "count" | "transaction_count" => Some(Self::TransactionCount),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Income => "income",
            Self::Expenses => "expenses",
            Self::Profit => "profit",
            Self::ProfitMargin => "profit_margin",
            Self::Roi => "roi",
            Self::SharePercent => "share_percent",
            Self::TransactionCount => "transaction_count",
        }
    }

    /// ROI only exists on property rows and shares only on category rows.
    pub fn supports(&self, group_by: GroupBy) -> bool {
        match self {
            Self::Roi => group_by == GroupBy::Property,
            Self::SharePercent => group_by == GroupBy::Category,
            _ => true,
        }
    }

    fn compare(&self, a: &AggregateRow, b: &AggregateRow) -> Ordering {
        match self {
            Self::Id => a.entity_id.cmp(&b.entity_id),
            Self::Name => collate(&a.entity_name, &b.entity_name),
            Self::Income => a.income.cmp(&b.income),
            Self::Expenses => a.expenses.cmp(&b.expenses),
            Self::Profit => a.profit.cmp(&b.profit),
            Self::ProfitMargin => a.profit_margin.cmp(&b.profit_margin),
            // `None < Some(_)`: an unknown ROI ranks below every known one,
            // including zero and negative values.
            Self::Roi => a.roi.cmp(&b.roi),
            Self::SharePercent => a.share_percent.cmp(&b.share_percent),
            Self::TransactionCount => a.transaction_count.cmp(&b.transaction_count),
        }
    }
}

/// Name ordering in the manner of a root-locale collator: base letters
/// first (accents and case ignored), then accents, then case, then the exact
/// text so distinct names never compare equal.
fn collate(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(&base_letters(b))
        .then_with(|| a.to_lowercase().nfc().cmp(b.to_lowercase().nfc()))
        .then_with(|| a.cmp(b))
}

fn base_letters(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Trait for request params that carry a sort choice.
pub trait Sortable {
    fn sort_by(&self) -> Option<&String>;
    fn sort_dir(&self) -> Option<&String>;

    /// Unknown or unsupported sort keys are rejected; a missing key falls
    /// back to the group's default.
    fn resolve_sort(&self, group_by: GroupBy) -> Result<RowSort, ReportError> {
        let default = RowSort::default_for(group_by);
        let field = match self.sort_by() {
            Some(s) => SortField::from_str(s).ok_or_else(|| ReportError::InvalidSortField {
                field: s.clone(),
                group_by: group_by.to_string(),
            })?,
            None => default.field,
        };
        let direction = match self.sort_dir() {
            Some(s) => SortDirection::from_str(s),
            None if self.sort_by().is_none() => default.direction,
            None => SortDirection::default(),
        };

        let sort = RowSort { field, direction };
        sort.validate(group_by)?;
        Ok(sort)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl RowSort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn default_for(group_by: GroupBy) -> Self {
        match group_by {
            GroupBy::Property => Self::new(SortField::Profit, SortDirection::Desc),
            GroupBy::Category => Self::new(SortField::SharePercent, SortDirection::Desc),
            GroupBy::Month => Self::new(SortField::Id, SortDirection::Asc),
        }
    }

    pub fn validate(&self, group_by: GroupBy) -> Result<(), ReportError> {
        if self.field.supports(group_by) {
            Ok(())
        } else {
            Err(ReportError::InvalidSortField {
                field: self.field.as_str().to_string(),
                group_by: group_by.to_string(),
            })
        }
    }
}

/// Sorts rows in place. Ties on the sort field always resolve by ascending
/// entity id, whatever the direction.
pub fn sort_rows(rows: &mut [AggregateRow], sort: RowSort) {
    rows.sort_by(|a, b| {
        sort.direction
            .apply(sort.field.compare(a, b))
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
}
