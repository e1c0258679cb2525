use crate::config::ReportConfig;
use crate::types::{ContributionRecord, IsiphekoEntry, RawRow};
use crate::util::{month_label, parse_amount, parse_date};
use chrono::Duration;
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Contribution category whose proceeds always go to the configured
/// recipient.
pub const ISIPHEKO_TYPE: &str = "Isipheko";

const REQUIRED_COLUMNS: [&str; 5] = ["Name", "Type", "Amount", "Actual Date", "Month End"];

/// Everything that can stop a statement from loading. Row numbers count data
/// rows, starting at 1 below the header.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read statement file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("statement file has no readable header row: {0}")]
    Header(#[source] csv::Error),
    #[error("statement file is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("row {row}: malformed record: {source}")]
    Malformed {
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("row {row}: missing value in column `{column}`")]
    MissingValue { column: &'static str, row: usize },
    #[error("row {row}: cannot parse `{value}` in column `{column}` as a YYYY-MM-DD date")]
    BadDate {
        column: &'static str,
        row: usize,
        value: String,
    },
    #[error("row {row}: cannot parse `{value}` in column `Amount` as a number")]
    BadAmount { row: usize, value: String },
}

/// Counts echoed to the user after a load.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_skipped: usize,
    pub isipheko_reassigned: usize,
}

#[derive(Debug)]
pub struct LoadedData {
    pub records: Vec<ContributionRecord>,
    /// Isipheko rows as they appeared before reassignment.
    pub isipheko: Vec<IsiphekoEntry>,
    pub report: LoadReport,
}

pub fn load_statement(path: &Path, cfg: &ReportConfig) -> Result<LoadedData, LoadError> {
    let rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| LoadError::Open {
            path: path.display().to_string(),
            source: e,
        })?;
    load_from_reader(rdr, cfg)
}

/// Parse, validate, and derive from an already-open CSV reader.
///
/// Date and amount problems abort the load naming the offending column and
/// row. Rows with a blank `Name` or `Type` are skipped and counted; the
/// source workbook keeps spacer rows between months.
pub fn load_from_reader<R: Read>(
    mut rdr: csv::Reader<R>,
    cfg: &ReportConfig,
) -> Result<LoadedData, LoadError> {
    let headers = rdr.headers().map_err(LoadError::Header)?.clone();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.trim() == col) {
            return Err(LoadError::MissingColumn(col));
        }
    }

    let mut records: Vec<ContributionRecord> = Vec::new();
    let mut isipheko: Vec<IsiphekoEntry> = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_skipped = 0usize;
    let mut isipheko_reassigned = 0usize;

    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        let row = idx + 1;
        rows_read += 1;
        let raw = result.map_err(|e| LoadError::Malformed { row, source: e })?;

        let name = match raw.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => {
                log::warn!("row {row}: blank Name, skipping");
                rows_skipped += 1;
                continue;
            }
        };
        let contribution_type = match raw.contribution_type.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                log::warn!("row {row}: blank Type, skipping");
                rows_skipped += 1;
                continue;
            }
        };

        let amount = match raw.amount.as_deref() {
            None => return Err(LoadError::MissingValue { column: "Amount", row }),
            Some(v) => parse_amount(Some(v)).ok_or_else(|| LoadError::BadAmount {
                row,
                value: v.trim().to_string(),
            })?,
        };
        let actual_date = parse_date_column(raw.actual_date.as_deref(), "Actual Date", row)?;
        let month_end = parse_date_column(raw.month_end.as_deref(), "Month End", row)?;

        // The unmutated view is captured before the owner rewrite.
        let name = if contribution_type == ISIPHEKO_TYPE {
            isipheko.push(IsiphekoEntry {
                name: name.clone(),
                amount,
                actual_date,
            });
            isipheko_reassigned += 1;
            cfg.isipheko_recipient.clone()
        } else {
            name
        };

        let cutoff_date = month_end + Duration::days(cfg.grace_days);
        let days_late = (actual_date - cutoff_date).num_days().max(0);

        records.push(ContributionRecord {
            name,
            contribution_type,
            amount,
            actual_date,
            month_end,
            month: month_label(month_end),
            cutoff_date,
            days_late,
        });
    }

    log::debug!(
        "loaded {} rows ({} skipped, {} Isipheko reassigned to {})",
        records.len(),
        rows_skipped,
        isipheko_reassigned,
        cfg.isipheko_recipient
    );

    let report = LoadReport {
        rows_read,
        rows_kept: records.len(),
        rows_skipped,
        isipheko_reassigned,
    };
    Ok(LoadedData {
        records,
        isipheko,
        report,
    })
}

fn parse_date_column(
    value: Option<&str>,
    column: &'static str,
    row: usize,
) -> Result<chrono::NaiveDate, LoadError> {
    match value.map(str::trim) {
        None => Err(LoadError::MissingValue { column, row }),
        Some("") => Err(LoadError::MissingValue { column, row }),
        Some(v) => parse_date(Some(v)).ok_or_else(|| LoadError::BadDate {
            column,
            row,
            value: v.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const STATEMENT: &str = "\
Name,Type,Amount,Actual Date,Month End
Sipho,Monthly,500,2024-02-03,2024-01-31
Thandi,Monthly,750,2024-02-10,2024-01-31
Sipho,Isipheko,300,2024-02-12,2024-01-31
Thandi,Monthly,750,2024-03-04,2024-02-29
";

    fn load(csv_text: &str) -> Result<LoadedData, LoadError> {
        let rdr = ReaderBuilder::new()
            .flexible(true)
            .from_reader(csv_text.as_bytes());
        load_from_reader(rdr, &ReportConfig::default())
    }

    #[test]
    fn isipheko_rows_are_reattributed() {
        let loaded = load(STATEMENT).unwrap();
        for r in &loaded.records {
            if r.contribution_type == ISIPHEKO_TYPE {
                assert_eq!(r.name, "Mhlengi");
            }
        }
        assert_eq!(loaded.report.isipheko_reassigned, 1);
        // The listing keeps the original giver.
        assert_eq!(loaded.isipheko.len(), 1);
        assert_eq!(loaded.isipheko[0].name, "Sipho");
        assert_eq!(loaded.isipheko[0].amount, 300.0);
    }

    #[test]
    fn lateness_clamps_at_zero() {
        let loaded = load(STATEMENT).unwrap();
        assert!(loaded.records.iter().all(|r| r.days_late >= 0));

        // Month end 2024-01-31 gives a cutoff of 2024-02-05. Paying on the
        // 10th is five days late; paying on the 3rd is on time.
        let late = &loaded.records[1];
        assert_eq!(
            late.cutoff_date,
            NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
        );
        assert_eq!(late.days_late, 5);
        assert_eq!(loaded.records[0].days_late, 0);
    }

    #[test]
    fn month_is_derived_from_month_end() {
        let loaded = load(STATEMENT).unwrap();
        assert_eq!(loaded.records[0].month, "2024-01");
        assert_eq!(loaded.records[3].month, "2024-02");
    }

    #[test]
    fn missing_column_is_fatal() {
        let err = load("Name,Type,Amount,Actual Date\nSipho,Monthly,500,2024-02-03\n")
            .unwrap_err();
        match err {
            LoadError::MissingColumn(col) => assert_eq!(col, "Month End"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_date_names_column_and_row() {
        let err = load(
            "Name,Type,Amount,Actual Date,Month End\n\
             Sipho,Monthly,500,03-02-2024,2024-01-31\n",
        )
        .unwrap_err();
        match err {
            LoadError::BadDate { column, row, value } => {
                assert_eq!(column, "Actual Date");
                assert_eq!(row, 1);
                assert_eq!(value, "03-02-2024");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_amount_is_fatal() {
        let err = load(
            "Name,Type,Amount,Actual Date,Month End\n\
             Sipho,Monthly,five hundred,2024-02-03,2024-01-31\n",
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::BadAmount { row: 1, .. }));
    }

    #[test]
    fn blank_name_rows_are_skipped_not_fatal() {
        let loaded = load(
            "Name,Type,Amount,Actual Date,Month End\n\
             ,Monthly,500,2024-02-03,2024-01-31\n\
             Sipho,Monthly,500,2024-02-03,2024-01-31\n",
        )
        .unwrap();
        assert_eq!(loaded.report.rows_read, 2);
        assert_eq!(loaded.report.rows_kept, 1);
        assert_eq!(loaded.report.rows_skipped, 1);
    }

    #[test]
    fn grace_days_come_from_config() {
        let cfg = ReportConfig {
            grace_days: 10,
            ..ReportConfig::default()
        };
        let rdr = ReaderBuilder::new().from_reader(STATEMENT.as_bytes());
        let loaded = load_from_reader(rdr, &cfg).unwrap();
        // With a 10-day grace the 2024-02-10 payment is inside the window.
        assert_eq!(loaded.records[1].days_late, 0);
    }
}
