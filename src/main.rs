// Entry point and interactive flow.
//
// The terminal app stands in for the original dashboard:
// - Option [1] loads and cleans the statement CSV, printing diagnostics.
// - Option [2] narrows the report to a selection of contributors.
// - Option [3] renders the KPIs and every aggregate view, and writes the
//   JSON summary.
// - Option [4] exports the filtered rows, derived columns included.
// After generating reports, the user can go back to the menu or exit.
mod config;
mod loader;
mod output;
mod reports;
mod types;
mod util;

use config::ReportConfig;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use types::{ContributionRecord, ExportRow, IsiphekoEntry};

const CONFIG_FILE: &str = "report.toml";
const EXPORT_FILE: &str = "filtered_contributions.csv";
const SUMMARY_FILE: &str = "summary.json";

// In-memory app state so the statement is loaded once but can be re-filtered
// and re-reported any number of times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        data: None,
        isipheko: Vec::new(),
        selected: None,
    })
});

struct AppState {
    data: Option<Vec<ContributionRecord>>,
    isipheko: Vec<IsiphekoEntry>,
    /// Current name selection; `None` means every contributor.
    selected: Option<Vec<String>>,
}

/// Read a single line of input after printing the common "Enter choice:"
/// prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_line(prompt: &str) -> String {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the menu after generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the statement and reset the filter.
fn handle_load(cfg: &ReportConfig) {
    match loader::load_statement(&cfg.input_path, cfg) {
        Ok(loaded) => {
            println!(
                "Processing statement... ({} rows read, {} kept, {} skipped)",
                util::format_int(loaded.report.rows_read as i64),
                util::format_int(loaded.report.rows_kept as i64),
                util::format_int(loaded.report.rows_skipped as i64)
            );
            if loaded.report.isipheko_reassigned > 0 {
                println!(
                    "Note: {} Isipheko contribution(s) attributed to {}.",
                    util::format_int(loaded.report.isipheko_reassigned as i64),
                    cfg.isipheko_recipient
                );
            }
            println!();
            let mut state = APP_STATE.lock().unwrap();
            state.data = Some(loaded.records);
            state.isipheko = loaded.isipheko;
            state.selected = None;
        }
        Err(e) => {
            eprintln!("Failed to load statement: {}\n", e);
        }
    }
}

/// Handle option [2]: the multiselect. Comma-separated names, `all` to clear,
/// an empty line for the empty selection.
fn handle_select() {
    let names = {
        let state = APP_STATE.lock().unwrap();
        match &state.data {
            Some(data) => reports::distinct_names(data),
            None => {
                println!("Error: No data loaded. Please load the statement first (option 1).\n");
                return;
            }
        }
    };
    println!("Contributors: {}", names.join(", "));
    let input = read_line("Select names (comma-separated, 'all' for everyone): ");

    let selected = if input.eq_ignore_ascii_case("all") {
        println!("Filter cleared: all contributors selected.\n");
        None
    } else if input.is_empty() {
        println!("No contributors selected; reports will be empty.\n");
        Some(Vec::new())
    } else {
        let mut picked: Vec<String> = input
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if let Some(unknown) = picked.iter().find(|n| !names.contains(n)) {
            println!("Unknown name: {unknown}. Selection unchanged.\n");
            return;
        }
        picked.sort();
        picked.dedup();
        println!("Selected: {}\n", picked.join(", "));
        Some(picked)
    };
    APP_STATE.lock().unwrap().selected = selected;
}

/// Snapshot of (filtered records, Isipheko listing) under the current
/// selection, or `None` when nothing has been loaded yet.
fn filtered_snapshot() -> Option<(Vec<ContributionRecord>, Vec<IsiphekoEntry>)> {
    let state = APP_STATE.lock().unwrap();
    let data = state.data.clone()?;
    let selected = state
        .selected
        .clone()
        .unwrap_or_else(|| reports::distinct_names(&data));
    Some((
        reports::filter_by_names(&data, &selected),
        state.isipheko.clone(),
    ))
}

/// Handle option [3]: KPIs, the six aggregate views, the raw-data preview,
/// and the JSON summary.
fn handle_dashboard(cfg: &ReportConfig) {
    let Some((filtered, isipheko)) = filtered_snapshot() else {
        println!("Error: No data loaded. Please load the statement first (option 1).\n");
        return;
    };

    let kpis = reports::compute_kpis(&filtered);
    println!("Monthly Contribution Insights\n");
    println!(
        "Total Collected: {}   Unique Contributors: {}   Total Contributions: {}\n",
        util::format_amount(kpis.total_amount),
        util::format_int(kpis.unique_contributors as i64),
        util::format_int(kpis.contribution_count as i64)
    );

    println!("Monthly Contribution Trend\n");
    output::preview_table(&reports::monthly_trend(&filtered), 24);

    println!("Contributions by Person\n");
    output::preview_table(&reports::person_totals(&filtered), 20);

    println!("Monthly Contributions by Person\n");
    output::preview_table(&reports::person_totals_by_month(&filtered), 30);

    println!("Top Contributors\n");
    output::preview_table(&reports::contributor_shares(&filtered), 20);

    println!(
        "Contributions Past the {}-Day Grace Period (avg days late)\n",
        cfg.grace_days
    );
    match output::lateness_grid(&reports::lateness_by_name_and_month(&filtered)) {
        Some(grid) => println!("{}\n", grid),
        None => println!("(no rows)\n"),
    }

    println!("Isipheko Contributions\n");
    output::preview_table(&isipheko, 20);

    println!("Raw Data\n");
    let raw: Vec<ExportRow> = filtered.iter().map(ExportRow::from).collect();
    output::preview_table(&raw, 10);
    println!("(Full table available via export, option 4)\n");

    if let Err(e) = output::write_json(SUMMARY_FILE, &kpis) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "Summary Stats ({SUMMARY_FILE}): {{\"total_amount\": {}, \"unique_contributors\": {}, \"contribution_count\": {}}}\n",
        util::format_number(kpis.total_amount, 2),
        kpis.unique_contributors,
        kpis.contribution_count
    );
}

/// Handle option [4]: write the filtered rows to the download file.
fn handle_export() {
    let Some((filtered, _)) = filtered_snapshot() else {
        println!("Error: No data loaded. Please load the statement first (option 1).\n");
        return;
    };
    match output::export_filtered(EXPORT_FILE, &filtered) {
        Ok(()) => println!(
            "Exported {} filtered row(s) to {}.\n",
            util::format_int(filtered.len() as i64),
            EXPORT_FILE
        ),
        Err(e) => eprintln!("Write error: {}\n", e),
    }
}

fn main() {
    env_logger::init();
    let cfg = match config::load_or_default(Path::new(CONFIG_FILE)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };

    println!("Ezase Qedela Wena - Contribution Dashboard\n");
    loop {
        println!("[1] Load the statement file");
        println!("[2] Select contributors");
        println!("[3] Generate dashboard reports");
        println!("[4] Export filtered data\n");
        match read_choice().as_str() {
            "1" => {
                handle_load(&cfg);
            }
            "2" => {
                handle_select();
            }
            "3" => {
                println!();
                handle_dashboard(&cfg);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "4" => {
                handle_export();
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2, 3 or 4.\n");
            }
        }
    }
}
