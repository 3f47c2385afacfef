// Entry point and console menu.
//
// - Option [1] loads the cafe sales export, prints diagnostics and cleans it.
// - Option [2] aggregates the cleaned rows, previews each aggregate and
//   writes the three charts.
// After charting, the user can go back to the menu or exit.
mod charts;
mod cleaning;
mod config;
mod error;
mod loader;
mod output;
mod profile;
mod reports;
mod types;
mod util;

use charts::SvgChartSink;
use config::Settings;
use log::{error, info};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use types::CleanRecord;

// The export is cleaned once per session and charted as often as asked.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Vec<CleanRecord>>,
}

fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Print the "Enter choice:" prompt and read one trimmed line. `None` once
/// stdin is closed.
fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Returns `true` if the user chose `Y`, `false` for `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        if io::stdin().read_line(&mut buf).unwrap_or(0) == 0 {
            return false;
        }
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Option [1]: load, profile and clean the export, keeping the result in
/// `APP_STATE`.
fn handle_load(settings: &Settings) {
    let (raw, load_report) = match loader::load_raw(&settings.input_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("load failed: {}", e);
            eprintln!("Failed to load {}: {}\n", settings.input_path.display(), e);
            return;
        }
    };
    println!(
        "Processing dataset... ({} rows loaded, {} skipped as unreadable)\n",
        util::format_int(load_report.total_rows as u64),
        util::format_int(load_report.parse_errors as u64)
    );

    output::print_head(&raw, settings.preview_rows);

    let table = cleaning::normalize_types(raw.clone());
    if table.is_empty() {
        println!("Warning: the file has a header but no data rows.\n");
    }
    output::print_profile(&profile::profile(&raw, &table));

    let (data, clean_report) = cleaning::clean_table(table);
    println!("Cleaning summary:");
    output::print_clean_report(&clean_report);
    if data.is_empty() {
        println!("Warning: no rows survived cleaning; charts will be skipped.\n");
    } else {
        output::print_clean_head(&data, settings.preview_rows);
    }

    let mut state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
    state.data = Some(data);
}

/// Option [2]: preview the three aggregates and write their charts.
fn handle_generate_charts(settings: &Settings) {
    let data = {
        let state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
        state.data.clone()
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };

    println!("1. Which items sell the most?\n");
    output::preview_table_rows(&reports::items_by_quantity(&data), settings.preview_rows * 2);
    println!("2. Which locations generate the most revenue?\n");
    output::preview_table_rows(&reports::revenue_by_location(&data), settings.preview_rows * 2);
    println!("3. Are there seasonal trends in sales?\n");
    output::preview_table_rows(&reports::monthly_sales(&data), 12);

    let mut sink = SvgChartSink::new(&settings.chart_dir, settings.chart_size);
    match charts::render_charts(&data, &mut sink) {
        Ok(rendered) if rendered.is_empty() => {
            println!("No charts rendered: the cleaned table is empty.\n");
        }
        Ok(rendered) => {
            for name in rendered {
                println!("Chart saved to {}", settings.chart_dir.join(format!("{name}.svg")).display());
            }
            println!();
        }
        Err(e) => {
            error!("chart rendering failed: {}", e);
            eprintln!("Chart error: {}\n", e);
        }
    }
}

fn main() {
    setup_logging();
    let settings = Settings::default();
    info!("cafe_sales starting, input {}", settings.input_path.display());

    loop {
        println!("Cafe Sales Cleaning & Insights");
        println!("[1] Load and clean the file");
        println!("[2] Generate charts\n");
        let Some(choice) = read_choice() else {
            break;
        };
        match choice.as_str() {
            "1" => {
                handle_load(&settings);
            }
            "2" => {
                println!();
                handle_generate_charts(&settings);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
