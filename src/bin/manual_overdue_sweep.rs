// Small ops utility: run one overdue sweep against a database and print the result.
//
// Usage:
//   cargo run --bin manual_overdue_sweep -- [db_path]
//
// Falls back to the default data directory path (or LIBRARY_DB_PATH) when no path is given.

use library_lending::app::{get_default_db_path, AppState};
use library_lending::logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let db_path = std::env::args()
        .nth(1)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(get_default_db_path);

    let state = AppState::new(db_path)?;
    let report = state.loan_api.run_overdue_sweep_at(chrono::Utc::now())?;

    println!("updated={}", report.updated_count);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
