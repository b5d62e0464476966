use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{Datelike, Local};

use super::app::{App, AuthView, InputMode, PendingAction, Screen};
use crate::backend::Backend;
use crate::models::{year_month, TransactionPatch, TransactionStatus, TransactionType};
use crate::report::MonthlyReport;
use crate::ui::screens::form::FormState;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Backend) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit NextMove", cmd_quit, r);
    register_command!("quit", "Quit NextMove", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("t", "Go to Transactions", cmd_transactions, r);
    register_command!("transactions", "Go to Transactions", cmd_transactions, r);
    register_command!("n", "Create a transaction", cmd_new, r);
    register_command!("new", "Create a transaction", cmd_new, r);
    register_command!("e", "Edit selected transaction", cmd_edit, r);
    register_command!("edit", "Edit selected transaction", cmd_edit, r);
    register_command!("delete", "Delete selected transaction", cmd_delete, r);
    register_command!(
        "status",
        "Set status of selected (e.g. :status completed)",
        cmd_status,
        r
    );
    register_command!(
        "type",
        "Filter by type (e.g. :type income, :type clear)",
        cmd_type_filter,
        r
    );
    register_command!(
        "filter-status",
        "Filter by status (e.g. :filter-status pending)",
        cmd_status_filter,
        r
    );
    register_command!("clear-filters", "Clear all filters", cmd_clear_filters, r);
    register_command!(
        "search",
        "Search transactions (e.g. :search rent)",
        cmd_search,
        r
    );
    register_command!("s", "Search transactions (e.g. :s rent)", cmd_search, r);
    register_command!("refresh", "Refetch transactions", cmd_refresh, r);
    register_command!("r", "Refetch transactions", cmd_refresh, r);
    register_command!(
        "report",
        "Export monthly PDF (e.g. :report 2024-03 ~/march.pdf)",
        cmd_report,
        r
    );
    register_command!("logout", "Sign out", cmd_logout, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);

    r
});

pub(crate) fn handle_command(
    input: &str,
    app: &mut App,
    backend: &mut Backend,
) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, backend)?;
    } else {
        // Try fuzzy match
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, backend: &mut Backend) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    app.refresh(backend);
    Ok(())
}

fn cmd_transactions(_args: &str, app: &mut App, backend: &mut Backend) -> anyhow::Result<()> {
    app.screen = Screen::Transactions;
    app.refresh(backend);
    Ok(())
}

fn cmd_new(_args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    let today = Local::now().format("%Y-%m-%d").to_string();
    app.form = FormState::for_create(&today);
    app.screen = Screen::Form;
    app.input_mode = InputMode::Editing;
    Ok(())
}

fn cmd_edit(_args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    if app.screen != Screen::Transactions || app.visible.is_empty() {
        app.set_status("Navigate to Transactions and select one first");
        return Ok(());
    }
    if let Some(txn) = app.selected_transaction() {
        app.form = FormState::for_edit(txn);
        app.screen = Screen::Form;
        app.input_mode = InputMode::Editing;
    }
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    if app.screen != Screen::Transactions || app.visible.is_empty() {
        app.set_status("Navigate to Transactions and select one first");
        return Ok(());
    }
    if let Some(txn) = app.selected_transaction() {
        let title = txn.display_title().to_string();
        let id = txn.id.clone();
        app.confirm_message = format!("Delete '{title}'?");
        app.pending_action = Some(PendingAction::DeleteTransaction { id, title });
        app.input_mode = InputMode::Confirm;
    }
    Ok(())
}

fn cmd_status(args: &str, app: &mut App, backend: &mut Backend) -> anyhow::Result<()> {
    if app.screen != Screen::Transactions || app.visible.is_empty() {
        app.set_status("Navigate to Transactions and select one first");
        return Ok(());
    }
    if args.is_empty() {
        app.set_status("Usage: :status <pending|completed|cancelled>");
        return Ok(());
    }

    let status = TransactionStatus::parse(args);
    if matches!(status, TransactionStatus::Other(_)) {
        app.set_status(format!("Unknown status: {args}"));
        return Ok(());
    }

    if let Some(txn) = app.selected_transaction() {
        let id = txn.id.clone();
        let patch = TransactionPatch::status_only(status.clone());
        match backend.update_transaction(&id, &patch) {
            Ok(()) => {
                app.refresh(backend);
                app.set_status(format!("Status set to {status}"));
            }
            Err(err) => app.set_status(format!("Error: {err}")),
        }
    }
    Ok(())
}

fn cmd_type_filter(args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    if args.is_empty() || args.eq_ignore_ascii_case("clear") {
        app.filter.kind = None;
        app.apply_filters();
        app.set_status("Type filter cleared");
        return Ok(());
    }
    match TransactionType::parse(args) {
        Some(kind) => {
            app.filter.kind = Some(kind);
            app.screen = Screen::Transactions;
            app.apply_filters();
            app.set_status(format!("Filtering by type: {}", kind.label().to_lowercase()));
        }
        None => app.set_status("Usage: :type <income|expense|clear>"),
    }
    Ok(())
}

fn cmd_status_filter(args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    if args.is_empty() || args.eq_ignore_ascii_case("clear") {
        app.filter.status = None;
        app.apply_filters();
        app.set_status("Status filter cleared");
        return Ok(());
    }
    let status = TransactionStatus::parse(args);
    app.set_status(format!("Filtering by status: {status}"));
    app.filter.status = Some(status);
    app.screen = Screen::Transactions;
    app.apply_filters();
    Ok(())
}

fn cmd_clear_filters(_args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    app.filter.kind = None;
    app.filter.status = None;
    app.search_input.clear();
    app.apply_filters();
    app.set_status("Filters cleared");
    Ok(())
}

fn cmd_search(args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    app.search_input = args.to_string();
    app.screen = Screen::Transactions;
    app.apply_filters();

    if args.is_empty() {
        app.set_status("Search cleared");
    } else {
        app.set_status(format!("Searching: {args}"));
    }

    Ok(())
}

fn cmd_refresh(_args: &str, app: &mut App, backend: &mut Backend) -> anyhow::Result<()> {
    app.refresh(backend);
    app.set_status(format!("Fetched {} transactions", app.transactions.len()));
    Ok(())
}

fn cmd_report(args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    let mut month_arg = None;
    let mut path_arg = None;
    for token in args.split_whitespace() {
        if month_arg.is_none() && year_month(token).is_some() && token.len() == 7 {
            month_arg = Some(token);
        } else {
            path_arg = Some(token);
        }
    }

    let (year, month) = match month_arg.and_then(year_month) {
        Some(ym) => ym,
        None => {
            let now = Local::now();
            (now.year(), now.month())
        }
    };

    let report = MonthlyReport::build(&app.transactions, year, month);
    if report.is_empty() {
        app.set_status(format!("No transactions for {}", report.period_label()));
        return Ok(());
    }

    let path = match path_arg {
        Some(p) => crate::run::shellexpand(p),
        None => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/{}", report.default_filename())
        }
    };

    match report.write_pdf(std::path::Path::new(&path)) {
        Ok(()) => app.set_status(format!(
            "Wrote {} transactions to {path}",
            report.rows.len()
        )),
        Err(err) => app.set_status(format!("Error: {err}")),
    }
    Ok(())
}

fn cmd_logout(_args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    app.confirm_message = "Sign out?".to_string();
    app.pending_action = Some(PendingAction::Logout);
    app.input_mode = InputMode::Confirm;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _backend: &mut Backend) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

/// Used by the confirm handler after a logout is approved.
pub(crate) fn perform_logout(app: &mut App, backend: &mut Backend) {
    backend.logout();
    app.transactions.clear();
    app.visible.clear();
    app.metrics = Default::default();
    app.auth_form.clear();
    app.auth_view = AuthView::Login;
    app.screen = Screen::Dashboard;
    app.set_status("Signed out");
}
