use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One row of the statement file, exactly as it appears on disk.
///
/// Every field is optional so a ragged row deserializes instead of aborting
/// the whole read; the loader decides what is fatal.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Type")]
    pub contribution_type: Option<String>,
    #[serde(rename = "Amount")]
    pub amount: Option<String>,
    #[serde(rename = "Actual Date")]
    pub actual_date: Option<String>,
    #[serde(rename = "Month End")]
    pub month_end: Option<String>,
}

/// A cleaned contribution with its derived fields attached.
///
/// `name` is the post-reassignment owner; `month`, `cutoff_date` and
/// `days_late` are derived once at load time from the source columns.
#[derive(Debug, Clone)]
pub struct ContributionRecord {
    pub name: String,
    pub contribution_type: String,
    pub amount: f64,
    pub actual_date: NaiveDate,
    pub month_end: NaiveDate,
    pub month: String,
    pub cutoff_date: NaiveDate,
    pub days_late: i64,
}

/// Pre-reassignment view of an Isipheko contribution, kept for the dedicated
/// listing.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct IsiphekoEntry {
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Actual Date")]
    #[tabled(rename = "Actual Date")]
    pub actual_date: NaiveDate,
}

/// Monthly contribution trend: sum of amounts per month, ascending.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthlyTrendRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
}

/// Total contributed per person, largest first.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PersonTotalRow {
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
}

/// Per-person totals within one month.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthPersonRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
}

/// Each contributor's slice of the filtered total.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ShareRow {
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: String,
}

/// Mean days late for one (name, month) cell of the lateness grid.
#[derive(Debug, Clone, PartialEq)]
pub struct LatenessAverage {
    pub name: String,
    pub month: String,
    pub avg_days_late: f64,
}

/// One row of the export file: the source columns plus the derived ones.
///
/// Dates and amounts serialize in the same shapes the loader accepts, so an
/// exported file can be re-ingested as a statement.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ExportRow {
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    #[tabled(rename = "Type")]
    pub contribution_type: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Actual Date")]
    #[tabled(rename = "Actual Date")]
    pub actual_date: NaiveDate,
    #[serde(rename = "Month End")]
    #[tabled(rename = "Month End")]
    pub month_end: NaiveDate,
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Cutoff Date")]
    #[tabled(rename = "Cutoff Date")]
    pub cutoff_date: NaiveDate,
    #[serde(rename = "Days Late")]
    #[tabled(rename = "Days Late")]
    pub days_late: i64,
}

impl From<&ContributionRecord> for ExportRow {
    fn from(r: &ContributionRecord) -> Self {
        ExportRow {
            name: r.name.clone(),
            contribution_type: r.contribution_type.clone(),
            amount: r.amount,
            actual_date: r.actual_date,
            month_end: r.month_end,
            month: r.month.clone(),
            cutoff_date: r.cutoff_date,
            days_late: r.days_late,
        }
    }
}

/// The three dashboard metrics, also written to `summary.json`.
#[derive(Debug, Serialize, PartialEq)]
pub struct KpiSummary {
    pub total_amount: f64,
    pub unique_contributors: usize,
    pub contribution_count: usize,
}
