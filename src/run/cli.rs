use anyhow::Result;
use chrono::{Datelike, Local};
use std::path::Path;

use crate::backend::Backend;
use crate::models::year_month;
use crate::report::MonthlyReport;

pub(crate) fn as_cli(args: &[String], backend: &mut Backend) -> Result<()> {
    match args[1].as_str() {
        "report" => cli_report(&args[2..], backend),
        "logout" => cli_logout(backend),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("nextmove {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("NextMove · terminal client for the NextMove transaction service");
    println!();
    println!("Usage: nextmove [command]");
    println!();
    println!("Commands:");
    println!("  (none)                        Launch interactive TUI");
    println!("  report [YYYY-MM] [path]       Export a monthly PDF report");
    println!("                                (default: current month, ~/{{generated name}})");
    println!("  logout                        Clear the stored session token");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

fn cli_report(args: &[String], backend: &mut Backend) -> Result<()> {
    if !backend.state().is_authenticated() {
        anyhow::bail!("Not signed in. Launch the TUI and sign in first.");
    }

    let mut month_arg = None;
    let mut path_arg = None;
    for token in args {
        if month_arg.is_none() && token.len() == 7 && year_month(token).is_some() {
            month_arg = Some(token.as_str());
        } else {
            path_arg = Some(token.as_str());
        }
    }

    let (year, month) = match month_arg.and_then(year_month) {
        Some(ym) => ym,
        None => {
            let now = Local::now();
            (now.year(), now.month())
        }
    };

    let transactions = backend.transactions()?;
    let report = MonthlyReport::build(&transactions, year, month);
    if report.is_empty() {
        println!("No transactions for {}", report.period_label());
        return Ok(());
    }

    let path = match path_arg {
        Some(p) => shellexpand(p),
        None => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/{}", report.default_filename())
        }
    };

    report.write_pdf(Path::new(&path))?;
    println!("Exported {} transactions to {path}", report.rows.len());
    Ok(())
}

fn cli_logout(backend: &mut Backend) -> Result<()> {
    if !backend.state().is_authenticated() {
        println!("Not signed in");
        return Ok(());
    }
    backend.logout();
    println!("Signed out");
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
