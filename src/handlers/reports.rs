use axum::extract::{Query, State};
use axum::response::Json;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::date_utils::WindowFilterable;
use crate::error::{AppResult, ReportError};
use crate::ledger::LedgerReader;
use crate::services::{build_report, GroupBy, Report, ReportConfig, TransactionFilter, TypeFilter};
use crate::sort_utils::Sortable;
use crate::state::AppState;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ReportParams {
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_optional_string")]
    pub window: Option<String>,
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_optional")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_optional")]
    pub quarter: Option<u32>,
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_optional_string")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_optional_string")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_optional_string")]
    pub group_by: Option<String>,
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_optional")]
    pub property: Option<i64>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "crate::form_utils::deserialize_optional_string"
    )]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_flag")]
    pub recurring: bool,
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_optional_string")]
    pub sort: Option<String>,
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_optional_string")]
    pub dir: Option<String>,
    #[serde(default, deserialize_with = "crate::form_utils::deserialize_optional_string")]
    pub as_of: Option<String>,
}

impl WindowFilterable for ReportParams {
    fn window(&self) -> Option<&String> {
        self.window.as_ref()
    }

    fn year(&self) -> Option<i32> {
        self.year
    }

    fn quarter(&self) -> Option<u32> {
        self.quarter
    }

    fn from_date(&self) -> Option<&String> {
        self.from.as_ref()
    }

    fn to_date(&self) -> Option<&String> {
        self.to.as_ref()
    }
}

impl Sortable for ReportParams {
    fn sort_by(&self) -> Option<&String> {
        self.sort.as_ref()
    }

    fn sort_dir(&self) -> Option<&String> {
        self.dir.as_ref()
    }
}

impl ReportParams {
    /// Turns raw query parameters into a validated report configuration.
    pub fn to_config(&self) -> Result<ReportConfig, ReportError> {
        let group_by = match &self.group_by {
            Some(g) => g.parse()?,
            None => GroupBy::default(),
        };
        let type_filter = match &self.kind {
            Some(t) => t.parse()?,
            None => TypeFilter::default(),
        };

        let filter = TransactionFilter {
            property_id: self.property,
            search: self.search.clone(),
            type_filter,
            recurring_only: self.recurring,
        };

        Ok(ReportConfig::new(self.resolve_selector()?, group_by)
            .with_filter(filter)
            .with_sort(self.resolve_sort(group_by)?))
    }

    /// Reference instant for rolling windows: the start of the day after
    /// `as_of` so that date is fully included, otherwise the local clock.
    pub fn now(&self) -> Result<NaiveDateTime, ReportError> {
        match &self.as_of {
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.succ_opt())
                .map(|d| d.and_time(NaiveTime::MIN))
                .ok_or_else(|| ReportError::InvalidParameter {
                    name: "as_of".into(),
                    value: s.clone(),
                }),
            None => Ok(Local::now().naive_local()),
        }
    }
}

pub async fn report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<Report>> {
    let config = params.to_config()?;
    let now = params.now()?;

    let ledger = state.ledger().read_ledger()?;
    let report = build_report(&ledger, &config, now)?;

    tracing::debug!(
        group_by = %config.group_by,
        rows = report.rows.len(),
        window = %report.window_label,
        "Built report"
    );

    Ok(Json(report.rounded(state.config.display_decimals)))
}
