use crate::types::{
    ContributionRecord, KpiSummary, LatenessAverage, MonthPersonRow, MonthlyTrendRow,
    PersonTotalRow, ShareRow,
};
use crate::util::{format_amount, format_number, mean};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Distinct contributor names after reassignment, sorted. This is the
/// universe the name filter selects from.
pub fn distinct_names(data: &[ContributionRecord]) -> Vec<String> {
    let set: HashSet<&str> = data.iter().map(|r| r.name.as_str()).collect();
    let mut names: Vec<String> = set.into_iter().map(str::to_string).collect();
    names.sort();
    names
}

/// The subset of records whose owner is in `selected`. Everything below runs
/// on the output of this one function.
pub fn filter_by_names(data: &[ContributionRecord], selected: &[String]) -> Vec<ContributionRecord> {
    data.iter()
        .filter(|r| selected.iter().any(|n| n == &r.name))
        .cloned()
        .collect()
}

pub fn compute_kpis(data: &[ContributionRecord]) -> KpiSummary {
    let names: HashSet<&str> = data.iter().map(|r| r.name.as_str()).collect();
    KpiSummary {
        total_amount: data.iter().map(|r| r.amount).sum(),
        unique_contributors: names.len(),
        contribution_count: data.len(),
    }
}

/// sum(amount) per month, ascending by month label.
pub fn amount_by_month(data: &[ContributionRecord]) -> Vec<(String, f64)> {
    let mut map: HashMap<String, f64> = HashMap::new();
    for r in data {
        *map.entry(r.month.clone()).or_insert(0.0) += r.amount;
    }
    let mut rows: Vec<(String, f64)> = map.into_iter().collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    rows
}

/// sum(amount) per contributor, largest first; ties break on the name so the
/// order is stable.
pub fn amount_by_name(data: &[ContributionRecord]) -> Vec<(String, f64)> {
    let mut map: HashMap<String, f64> = HashMap::new();
    for r in data {
        *map.entry(r.name.clone()).or_insert(0.0) += r.amount;
    }
    let mut rows: Vec<(String, f64)> = map.into_iter().collect();
    rows.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    rows
}

/// sum(amount) per (month, name), ascending by month then name.
pub fn amount_by_month_and_name(data: &[ContributionRecord]) -> Vec<(String, String, f64)> {
    let mut map: HashMap<(String, String), f64> = HashMap::new();
    for r in data {
        *map.entry((r.month.clone(), r.name.clone())).or_insert(0.0) += r.amount;
    }
    let mut rows: Vec<(String, String, f64)> = map
        .into_iter()
        .map(|((month, name), amount)| (month, name, amount))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    rows
}

/// mean(days_late) per (name, month), ascending by name then month. Feeds the
/// lateness grid.
pub fn lateness_by_name_and_month(data: &[ContributionRecord]) -> Vec<LatenessAverage> {
    let mut map: HashMap<(String, String), Vec<f64>> = HashMap::new();
    for r in data {
        map.entry((r.name.clone(), r.month.clone()))
            .or_default()
            .push(r.days_late as f64);
    }
    let mut rows: Vec<LatenessAverage> = map
        .into_iter()
        .map(|((name, month), delays)| LatenessAverage {
            name,
            month,
            avg_days_late: mean(&delays),
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.month.cmp(&b.month)));
    rows
}

pub fn monthly_trend(data: &[ContributionRecord]) -> Vec<MonthlyTrendRow> {
    amount_by_month(data)
        .into_iter()
        .map(|(month, amount)| MonthlyTrendRow {
            month,
            amount: format_amount(amount),
        })
        .collect()
}

pub fn person_totals(data: &[ContributionRecord]) -> Vec<PersonTotalRow> {
    amount_by_name(data)
        .into_iter()
        .map(|(name, amount)| PersonTotalRow {
            name,
            amount: format_amount(amount),
        })
        .collect()
}

pub fn person_totals_by_month(data: &[ContributionRecord]) -> Vec<MonthPersonRow> {
    amount_by_month_and_name(data)
        .into_iter()
        .map(|(month, name, amount)| MonthPersonRow {
            month,
            name,
            amount: format_amount(amount),
        })
        .collect()
}

/// Per-contributor totals with each one's percentage of the filtered total.
/// An empty filter renders no rows rather than dividing by zero.
pub fn contributor_shares(data: &[ContributionRecord]) -> Vec<ShareRow> {
    let total: f64 = data.iter().map(|r| r.amount).sum();
    amount_by_name(data)
        .into_iter()
        .map(|(name, amount)| {
            let pct = if total == 0.0 {
                0.0
            } else {
                amount / total * 100.0
            };
            ShareRow {
                name,
                amount: format_amount(amount),
                share_pct: format_number(pct, 2),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn rec(name: &str, month: &str, amount: f64, days_late: i64) -> ContributionRecord {
        let month_end =
            NaiveDate::parse_from_str(&format!("{month}-28"), "%Y-%m-%d").unwrap();
        ContributionRecord {
            name: name.to_string(),
            contribution_type: "Monthly".to_string(),
            amount,
            actual_date: month_end,
            month_end,
            month: month.to_string(),
            cutoff_date: month_end + Duration::days(5),
            days_late,
        }
    }

    fn sample() -> Vec<ContributionRecord> {
        vec![
            rec("Sipho", "2024-01", 500.0, 0),
            rec("Thandi", "2024-01", 750.0, 5),
            rec("Sipho", "2024-02", 500.0, 2),
            rec("Mhlengi", "2024-02", 300.0, 0),
            rec("Thandi", "2024-02", 750.0, 3),
        ]
    }

    #[test]
    fn person_totals_sum_to_kpi_total() {
        let data = sample();
        // Holds for the full set and for any filter subset.
        for selection in [
            vec!["Sipho".to_string(), "Thandi".to_string(), "Mhlengi".to_string()],
            vec!["Thandi".to_string()],
            vec![],
        ] {
            let filtered = filter_by_names(&data, &selection);
            let kpis = compute_kpis(&filtered);
            let by_name_sum: f64 = amount_by_name(&filtered).iter().map(|(_, a)| a).sum();
            assert!((by_name_sum - kpis.total_amount).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn empty_selection_yields_zero_kpis() {
        let filtered = filter_by_names(&sample(), &[]);
        let kpis = compute_kpis(&filtered);
        assert_eq!(
            kpis,
            KpiSummary {
                total_amount: 0.0,
                unique_contributors: 0,
                contribution_count: 0
            }
        );
        assert!(monthly_trend(&filtered).is_empty());
        assert!(contributor_shares(&filtered).is_empty());
    }

    #[test]
    fn full_selection_matches_unfiltered() {
        let data = sample();
        let filtered = filter_by_names(&data, &distinct_names(&data));
        assert_eq!(compute_kpis(&filtered), compute_kpis(&data));
        assert_eq!(amount_by_month(&filtered), amount_by_month(&data));
        assert_eq!(amount_by_name(&filtered), amount_by_name(&data));
    }

    #[test]
    fn monthly_trend_is_ascending_by_month() {
        let rows = amount_by_month(&sample());
        assert_eq!(rows[0].0, "2024-01");
        assert_eq!(rows[1].0, "2024-02");
        assert_eq!(rows[0].1, 1250.0);
        assert_eq!(rows[1].1, 1550.0);
    }

    #[test]
    fn person_totals_are_largest_first() {
        let rows = amount_by_name(&sample());
        assert_eq!(rows[0], ("Thandi".to_string(), 1500.0));
        assert_eq!(rows[1], ("Sipho".to_string(), 1000.0));
        assert_eq!(rows[2], ("Mhlengi".to_string(), 300.0));
    }

    #[test]
    fn shares_cover_the_whole_total() {
        let rows = contributor_shares(&sample());
        let pct_sum: f64 = rows
            .iter()
            .map(|r| r.share_pct.replace(',', "").parse::<f64>().unwrap())
            .sum();
        assert!((pct_sum - 100.0).abs() < 0.05);
    }

    #[test]
    fn lateness_averages_per_name_and_month() {
        let mut data = sample();
        data.push(rec("Thandi", "2024-01", 100.0, 1));
        let rows = lateness_by_name_and_month(&data);
        let thandi_jan = rows
            .iter()
            .find(|c| c.name == "Thandi" && c.month == "2024-01")
            .unwrap();
        assert_eq!(thandi_jan.avg_days_late, 3.0);
        // Sorted by name then month.
        let keys: Vec<(&str, &str)> = rows
            .iter()
            .map(|c| (c.name.as_str(), c.month.as_str()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}
