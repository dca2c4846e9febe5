//! dashboard-runner: headless shell for the coverage dashboard.
//!
//! Usage:
//!   dashboard-runner --db coverage.db --table coverage --region North,South
//!   dashboard-runner --config dashboard.json --theme spacious --ipc-mode

use anyhow::Result;
use dashboard_core::{
    config::DashboardConfig,
    engine::{null_as_empty, FilterSelection},
    store::load_dataset,
    theme::Theme,
    view::Dashboard,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    /// A cleared control may arrive as `null` or be left out.
    Render {
        #[serde(default, deserialize_with = "null_as_empty")]
        region: Vec<String>,
        #[serde(default, deserialize_with = "null_as_empty")]
        city: Vec<String>,
        #[serde(default, deserialize_with = "null_as_empty")]
        partner: Vec<String>,
    },
    Options,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");

    let mut config = match find_arg(&args, "--config") {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(db) = find_arg(&args, "--db") {
        config.database = db.to_string();
    }
    if let Some(table) = find_arg(&args, "--table") {
        config.table = table.to_string();
    }
    if let Some(theme) = find_arg(&args, "--theme") {
        config.theme = theme.to_string();
    }
    let theme = Theme::by_name(&config.theme)?;

    // Both load failures are fatal: report the cause and exit non-zero.
    let dataset = match load_dataset(&config) {
        Ok(d) => d,
        Err(e) => {
            log::error!("could not load data from {}: {e}", config.database);
            return Err(anyhow::anyhow!("Could not load dashboard data: {e}"));
        }
    };
    let dashboard = Dashboard::new(Arc::new(dataset), theme);

    if ipc_mode {
        let stdin = io::stdin();
        run_ipc_loop(&dashboard, stdin.lock(), io::stdout())?;
    } else {
        println!("Coverage Dashboard: dashboard-runner");
        println!("  db:     {}", config.database);
        println!("  table:  {}", config.table);
        println!("  theme:  {}", dashboard.theme().name);
        println!("  rows:   {}", dashboard.dataset().len());
        println!();

        let selection = FilterSelection {
            region:  list_arg(&args, "--region"),
            city:    list_arg(&args, "--city"),
            partner: list_arg(&args, "--partner"),
        };
        print!("{}", dashboard.render(&selection).to_text());
    }

    Ok(())
}

/// One command per input line, one JSON reply per command. Malformed
/// lines get an `{"error": ...}` reply and the loop keeps reading.
fn run_ipc_loop<R: BufRead, W: Write>(
    dashboard: &Dashboard,
    mut handle: R,
    mut stdout: W,
) -> Result<()> {
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("ignoring malformed command: {e}");
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Render { region, city, partner } => {
                let selection = FilterSelection { region, city, partner };
                let view = dashboard.render(&selection);
                writeln!(stdout, "{}", serde_json::to_string(&view)?)?;
            }
            IpcCommand::Options => {
                let view = dashboard.render(&FilterSelection::default());
                writeln!(stdout, "{}", serde_json::to_string(&view.filters)?)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// `--city A,B` → `["A", "B"]`. Absent flag means no constraint.
fn list_arg(args: &[String], flag: &str) -> Vec<String> {
    find_arg(args, flag)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
