use crate::types::{ContributionRecord, ExportRow, LatenessAverage};
use crate::util::format_number;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create output file {path}"))?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).with_context(|| format!("cannot write {path}"))?;
    Ok(())
}

/// Print up to `max_rows` of a view as a markdown-style table, with a note
/// when the view was cut short.
pub fn preview_table<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    let shown = slice.len();
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}", table_str);
    if shown < rows.len() {
        println!("(showing {} of {} rows)", shown, rows.len());
    }
    println!();
}

/// Render the lateness averages as a contributor-by-month grid, one decimal
/// per cell, blank where a contributor has no rows that month.
///
/// Returns `None` for an empty filter so the caller can print its usual
/// no-rows marker.
pub fn lateness_grid(cells: &[LatenessAverage]) -> Option<String> {
    if cells.is_empty() {
        return None;
    }
    let mut months: Vec<&str> = cells.iter().map(|c| c.month.as_str()).collect();
    months.sort();
    months.dedup();
    let mut names: Vec<&str> = cells.iter().map(|c| c.name.as_str()).collect();
    names.sort();
    names.dedup();

    let lookup: HashMap<(&str, &str), f64> = cells
        .iter()
        .map(|c| ((c.name.as_str(), c.month.as_str()), c.avg_days_late))
        .collect();

    let mut builder = Builder::default();
    let mut header: Vec<String> = vec!["Name".to_string()];
    header.extend(months.iter().map(|m| m.to_string()));
    builder.push_record(header);
    for name in &names {
        let mut row: Vec<String> = vec![name.to_string()];
        for month in &months {
            row.push(match lookup.get(&(*name, *month)) {
                Some(avg) => format_number(*avg, 1),
                None => String::new(),
            });
        }
        builder.push_record(row);
    }
    Some(builder.build().with(Style::markdown()).to_string())
}

/// Write the filtered records, derived columns included, to `path`.
pub fn export_filtered(path: &str, records: &[ContributionRecord]) -> Result<()> {
    let rows: Vec<ExportRow> = records.iter().map(ExportRow::from).collect();
    write_csv(path, &rows)?;
    log::info!("exported {} rows to {}", rows.len(), path);
    Ok(())
}
