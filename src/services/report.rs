//! Report assembly: window → filter → aggregate → rank → compose.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::date_utils::{TimeWindow, WindowSelector};
use crate::error::ReportError;
use crate::ledger::Ledger;
use crate::models::Transaction;
use crate::services::aggregate::{
    aggregate, margin, percent_of, round, AggregateRow, AggregationContext,
    CategoryIndex, EntityId, GroupBy, ShareBasis,
};
use crate::services::filter::{filter_transactions, TransactionFilter, TypeFilter};
use crate::sort_utils::{sort_rows, RowSort};

/// Everything a caller chooses about a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub window: WindowSelector,
    pub group_by: GroupBy,
    pub filter: TransactionFilter,
    pub sort: RowSort,
}

impl ReportConfig {
    pub fn new(window: WindowSelector, group_by: GroupBy) -> Self {
        Self {
            window,
            group_by,
            filter: TransactionFilter::default(),
            sort: RowSort::default_for(group_by),
        }
    }

    pub fn with_filter(mut self, filter: TransactionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sort(mut self, sort: RowSort) -> Self {
        self.sort = sort;
        self
    }

    /// Income-only reports measure category shares against income;
    /// everything else against expenses.
    pub fn share_basis(&self) -> ShareBasis {
        match self.filter.type_filter {
            TypeFilter::Income => ShareBasis::Income,
            TypeFilter::Expense | TypeFilter::All => ShareBasis::Expenses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
    pub profit_margin: Decimal,
    /// Property reports only: profit of rows with a known purchase price over
    /// the sum of those prices.
    pub roi: Option<Decimal>,
}

impl PortfolioTotals {
    fn zero() -> Self {
        Self {
            income: Decimal::ZERO,
            expenses: Decimal::ZERO,
            profit: Decimal::ZERO,
            profit_margin: Decimal::ZERO,
            roi: None,
        }
    }

    fn rounded(&self, dp: u32) -> Self {
        Self {
            income: round(self.income, dp),
            expenses: round(self.expenses, dp),
            profit: round(self.profit, dp),
            profit_margin: round(self.profit_margin, dp),
            roi: self.roi.map(|v| round(v, dp)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub window: TimeWindow,
    pub window_label: String,
    pub group_by: GroupBy,
    pub sort: RowSort,
    pub rows: Vec<AggregateRow>,
    pub totals: PortfolioTotals,
    /// "Showing N of M": rows in this report versus entities in the ledger.
    pub entities_included: usize,
    pub entities_available: usize,
    pub transaction_count: usize,
    pub empty: bool,
}

impl Report {
    /// Copy with every decimal rounded for display.
    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            window: self.window,
            window_label: self.window_label.clone(),
            group_by: self.group_by,
            sort: self.sort,
            rows: self.rows.iter().map(|r| r.rounded(dp)).collect(),
            totals: self.totals.rounded(dp),
            entities_included: self.entities_included,
            entities_available: self.entities_available,
            transaction_count: self.transaction_count,
            empty: self.empty,
        }
    }
}

/// Builds a report from a ledger snapshot. Validation happens before any
/// transaction is looked at; an empty result is not an error.
pub fn build_report(
    ledger: &Ledger,
    config: &ReportConfig,
    now: NaiveDateTime,
) -> Result<Report, ReportError> {
    config.sort.validate(config.group_by)?;
    let window = TimeWindow::resolve(config.window, now)?;

    let filtered = filter_transactions(ledger, &window, &config.filter);

    let ctx = AggregationContext {
        ledger,
        window: &window,
        share_basis: config.share_basis(),
    };
    let mut rows = aggregate(&filtered, config.group_by, &ctx);
    sort_rows(&mut rows, config.sort);

    Ok(compose(rows, &filtered, ledger, &window, config))
}

/// Wraps ranked rows with portfolio totals and listing metadata.
pub fn compose(
    rows: Vec<AggregateRow>,
    filtered: &[&Transaction],
    ledger: &Ledger,
    window: &TimeWindow,
    config: &ReportConfig,
) -> Report {
    let mut totals = PortfolioTotals::zero();
    for row in &rows {
        totals.income += row.income;
        totals.expenses += row.expenses;
        totals.profit += row.profit;
    }
    totals.profit_margin = margin(totals.profit, totals.income);
    if config.group_by == GroupBy::Property {
        totals.roi = portfolio_roi(&rows, ledger);
    }

    let entities_included = rows.len();
    let entities_available = match config.group_by {
        GroupBy::Month => entities_included,
        group_by => available_entities(ledger, group_by),
    };

    debug!(
        rows = entities_included,
        available = entities_available,
        transactions = filtered.len(),
        "Composed report"
    );

    Report {
        window: *window,
        window_label: window.display_label(),
        group_by: config.group_by,
        sort: config.sort,
        empty: rows.is_empty(),
        rows,
        totals,
        entities_included,
        entities_available,
        transaction_count: filtered.len(),
    }
}

fn portfolio_roi(rows: &[AggregateRow], ledger: &Ledger) -> Option<Decimal> {
    let mut profit = Decimal::ZERO;
    let mut basis = Decimal::ZERO;
    for row in rows {
        let EntityId::Id(id) = &row.entity_id else {
            continue;
        };
        if let Some(price) = ledger.property(*id).and_then(|p| p.cost_basis()) {
            profit += row.profit;
            basis += price;
        }
    }
    percent_of(profit, basis)
}

/// Distinct entities of the given grouping across the whole ledger,
/// independent of window and filters.
fn available_entities(ledger: &Ledger, group_by: GroupBy) -> usize {
    let keys: BTreeSet<EntityId> = match group_by {
        GroupBy::Property => ledger
            .properties()
            .iter()
            .map(|p| EntityId::Id(p.id))
            .chain(
                ledger
                    .transactions()
                    .iter()
                    .map(|tx| tx.property_id.map_or(EntityId::Unassigned, EntityId::Id)),
            )
            .collect(),
        GroupBy::Category => {
            let index = CategoryIndex::new(ledger.transactions());
            ledger.transactions().iter().map(|tx| index.key(tx)).collect()
        }
        GroupBy::Month => BTreeSet::new(),
    };
    keys.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Property, TransactionType};
    use crate::sort_utils::{SortDirection, SortField};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn tx(id: i64, kind: TransactionType, amount: Decimal, property_id: Option<i64>) -> Transaction {
        Transaction {
            id,
            date: NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            kind,
            amount,
            description: String::new(),
            property_id,
            category_id: None,
            category_name: None,
            recurring: false,
        }
    }

    fn portfolio() -> Ledger {
        Ledger::new(
            vec![
                tx(1, TransactionType::Income, dec!(1000), Some(1)),
                tx(2, TransactionType::Expense, dec!(400), Some(1)),
                tx(3, TransactionType::Income, dec!(500), Some(2)),
                tx(4, TransactionType::Expense, dec!(100), None),
            ],
            vec![
                Property::new(1, "Harbour View").with_purchase_price(dec!(10000)),
                Property::new(2, "Mill Lane").with_purchase_price(dec!(20000)),
                Property::new(3, "Vacant Plot"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_totals_are_computed_from_sums() {
        let report = build_report(
            &portfolio(),
            &ReportConfig::new(WindowSelector::All, GroupBy::Property),
            now(),
        )
        .unwrap();

        assert_eq!(report.totals.income, dec!(1500));
        assert_eq!(report.totals.expenses, dec!(500));
        assert_eq!(report.totals.profit, dec!(1000));
        // 1000 / 1500, not the mean of per-row margins
        assert_eq!(report.totals.profit_margin.round_dp(2), dec!(66.67));
        // (600 + 500) / (10000 + 20000)
        assert_eq!(report.totals.roi.map(|r| r.round_dp(4)), Some(dec!(3.6667)));
        assert_eq!(report.entities_included, 3);
        // three properties plus the general bucket
        assert_eq!(report.entities_available, 4);
        assert_eq!(report.transaction_count, 4);
        assert!(!report.empty);
    }

    #[test]
    fn test_default_property_ranking_by_profit() {
        let report = build_report(
            &portfolio(),
            &ReportConfig::new(WindowSelector::All, GroupBy::Property),
            now(),
        )
        .unwrap();
        let names: Vec<&str> = report.rows.iter().map(|r| r.entity_name.as_str()).collect();
        assert_eq!(names, vec!["Harbour View", "Mill Lane", "Portfolio (general)"]);
    }

    #[test]
    fn test_empty_ledger_is_not_an_error() {
        for group_by in [GroupBy::Property, GroupBy::Category, GroupBy::Month] {
            for window in [WindowSelector::Month, WindowSelector::All, WindowSelector::CalendarYear(2020)] {
                let report =
                    build_report(&Ledger::default(), &ReportConfig::new(window, group_by), now())
                        .unwrap();
                assert!(report.empty);
                assert!(report.rows.is_empty());
                assert_eq!(report.totals, PortfolioTotals::zero());
            }
        }
    }

    #[test]
    fn test_invalid_sort_field_fails_before_aggregation() {
        let config = ReportConfig::new(WindowSelector::All, GroupBy::Month)
            .with_sort(RowSort::new(SortField::Roi, SortDirection::Desc));
        assert!(matches!(
            build_report(&portfolio(), &config, now()),
            Err(ReportError::InvalidSortField { .. })
        ));
    }

    #[test]
    fn test_income_reports_share_against_income() {
        let config = ReportConfig::new(WindowSelector::All, GroupBy::Category).with_filter(
            TransactionFilter {
                type_filter: TypeFilter::Income,
                ..Default::default()
            },
        );
        let report = build_report(&portfolio(), &config, now()).unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].share_percent, Some(dec!(100)));
        assert_eq!(report.totals.expenses, Decimal::ZERO);
    }

    #[test]
    fn test_rounded_keeps_metadata() {
        let report = build_report(
            &portfolio(),
            &ReportConfig::new(WindowSelector::All, GroupBy::Property),
            now(),
        )
        .unwrap();
        let rounded = report.rounded(2);
        assert_eq!(rounded.window_label, "All Time");
        assert_eq!(rounded.totals.profit_margin, dec!(66.67));
        assert_eq!(rounded.entities_available, report.entities_available);
        assert_eq!(rounded.rows.len(), report.rows.len());
    }
}
