pub mod aggregate;
pub mod filter;
pub mod report;

pub use aggregate::{AggregateRow, EntityId, GroupBy, ShareBasis};
pub use filter::{TransactionFilter, TypeFilter};
pub use report::{build_report, PortfolioTotals, Report, ReportConfig};
