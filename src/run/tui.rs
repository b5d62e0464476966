use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

use crate::backend::Backend;
use crate::models::TransactionPatch;
use crate::session;
use crate::ui::app::{App, AuthView, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

/// How long to wait for input before redrawing. Keeps the connection
/// indicator current even when the user is idle.
const TICK_INTERVAL: Duration = Duration::from_millis(250);

pub(crate) fn as_tui(backend: &mut Backend) -> Result<()> {
    let mut app = App::new();
    if backend.validate_session() {
        app.refresh(backend);
    }
    app.sync_backend(backend);
    backend.start_health_poll();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let result = run_app(&mut terminal, &mut app, backend);

    backend.stop_health_poll();
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    backend: &mut Backend,
) -> Result<()> {
    while app.running {
        app.sync_backend(backend);
        terminal.draw(|f| {
            let content_height = f.area().height.saturating_sub(3) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if !event::poll(TICK_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if app.show_help {
                app.show_help = false;
                continue;
            }
            if !app.authenticated {
                handle_auth_input(key, app, backend)?;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, backend)?,
                InputMode::Command => handle_command_input(key, app, backend)?,
                InputMode::Search => handle_search_input(key, app),
                InputMode::Editing => handle_editing_input(key, app, backend),
                InputMode::Confirm => handle_confirm_input(key, app, backend),
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_auth_input(key: event::KeyEvent, app: &mut App, backend: &mut Backend) -> Result<()> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.auth_view = match app.auth_view {
                AuthView::Login => AuthView::Register,
                AuthView::Register => AuthView::Login,
            };
            app.auth_form.clear();
        }
        KeyCode::Tab | KeyCode::Down => {
            app.auth_form.field = (app.auth_form.field + 1) % auth_field_count(app);
        }
        KeyCode::BackTab | KeyCode::Up => {
            let count = auth_field_count(app);
            app.auth_form.field = if app.auth_form.field == 0 {
                count - 1
            } else {
                app.auth_form.field - 1
            };
        }
        KeyCode::Backspace => {
            auth_field_mut(app).pop();
        }
        KeyCode::Enter => submit_auth(app, backend),
        KeyCode::Char(c) => {
            auth_field_mut(app).push(c);
        }
        _ => {}
    }
    Ok(())
}

fn auth_field_count(app: &App) -> usize {
    match app.auth_view {
        AuthView::Login => 2,
        AuthView::Register => 3,
    }
}

fn auth_field_mut(app: &mut App) -> &mut String {
    let form = &mut app.auth_form;
    match (app.auth_view, form.field) {
        (AuthView::Login, 0) => &mut form.username,
        (AuthView::Login, _) => &mut form.password,
        (AuthView::Register, 0) => &mut form.view_name,
        (AuthView::Register, 1) => &mut form.username,
        (AuthView::Register, _) => &mut form.password,
    }
}

fn submit_auth(app: &mut App, backend: &mut Backend) {
    match app.auth_view {
        AuthView::Login => {
            if let Err(msg) =
                session::validate_login(&app.auth_form.username, &app.auth_form.password)
            {
                app.auth_form.error = Some(msg);
                return;
            }
            match backend.login(&app.auth_form.username, &app.auth_form.password) {
                Ok(user) => {
                    app.auth_form.clear();
                    app.sync_backend(backend);
                    app.screen = Screen::Dashboard;
                    app.refresh(backend);
                    app.set_status(format!("Welcome, {}", user.name));
                }
                Err(err) => app.auth_form.error = Some(err.to_string()),
            }
        }
        AuthView::Register => {
            if let Err(msg) = session::validate_registration(
                &app.auth_form.view_name,
                &app.auth_form.username,
                &app.auth_form.password,
            ) {
                app.auth_form.error = Some(msg);
                return;
            }
            match backend.register(
                &app.auth_form.view_name,
                &app.auth_form.username,
                &app.auth_form.password,
            ) {
                Ok(()) => {
                    // Registration never signs the user in; hand them back
                    // to the sign-in form with the email kept.
                    let username = app.auth_form.username.clone();
                    app.auth_form.clear();
                    app.auth_form.username = username;
                    app.auth_view = AuthView::Login;
                    app.set_status("Account created, sign in to continue");
                }
                Err(err) => app.auth_form.error = Some(err.to_string()),
            }
        }
    }
}

fn handle_normal_input(key: event::KeyEvent, app: &mut App, backend: &mut Backend) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            app.search_input.clear();
            app.screen = Screen::Transactions;
            app.apply_filters();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('1') => switch_screen(app, backend, Screen::Dashboard),
        KeyCode::Char('2') => switch_screen(app, backend, Screen::Transactions),
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = (idx + 1) % screens.len();
            switch_screen(app, backend, screens[next]);
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let prev = if idx == 0 { screens.len() - 1 } else { idx - 1 };
            switch_screen(app, backend, screens[prev]);
        }
        KeyCode::Char('g') => {
            if app.screen == Screen::Transactions {
                scroll_to_top(&mut app.transaction_index, &mut app.transaction_scroll);
            }
        }
        KeyCode::Char('G') => {
            if app.screen == Screen::Transactions {
                let page = app.transaction_page();
                scroll_to_bottom(
                    &mut app.transaction_index,
                    &mut app.transaction_scroll,
                    app.visible.len(),
                    page,
                );
            }
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half_page = app.visible_rows / 2;
            for _ in 0..half_page {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half_page = app.visible_rows / 2;
            for _ in 0..half_page {
                handle_move_up(app);
            }
        }
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Char('n') => {
            commands::handle_command("new", app, backend)?;
        }
        KeyCode::Char('e') | KeyCode::Enter if app.screen == Screen::Transactions => {
            commands::handle_command("edit", app, backend)?;
        }
        KeyCode::Char('D') if app.screen == Screen::Transactions => {
            commands::handle_command("delete", app, backend)?;
        }
        KeyCode::Char('s') if app.screen == Screen::Transactions => {
            cycle_selected_status(app, backend);
        }
        KeyCode::Esc => {
            if app.filter.is_active() || !app.search_input.is_empty() {
                commands::handle_command("clear-filters", app, backend)?;
            } else {
                app.status_message.clear();
            }
        }
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, backend: &mut Backend) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, backend)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

/// Search narrows the already-fetched list on every keystroke; nothing
/// here talks to the server.
fn handle_search_input(key: event::KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_input.clear();
            app.apply_filters();
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            app.transaction_index = 0;
            app.transaction_scroll = 0;
            app.apply_filters();
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            app.transaction_index = 0;
            app.transaction_scroll = 0;
            app.apply_filters();
        }
        _ => {}
    }
}

fn handle_editing_input(key: event::KeyEvent, app: &mut App, backend: &mut Backend) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => app.form.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.form.prev_field(),
        KeyCode::Left => app.form.cycle(-1),
        KeyCode::Right => app.form.cycle(1),
        KeyCode::Backspace => app.form.backspace(),
        KeyCode::Esc => {
            app.screen = Screen::Transactions;
            app.input_mode = InputMode::Normal;
            app.set_status("Edit cancelled");
        }
        KeyCode::Enter => submit_form(app, backend),
        KeyCode::Char(c) => app.form.push_char(c),
        _ => {}
    }
}

fn submit_form(app: &mut App, backend: &mut Backend) {
    let outcome = if let Some(id) = app.form.editing_id.clone() {
        match app.form.to_patch() {
            Ok(patch) => backend
                .update_transaction(&id, &patch)
                .map(|()| "Transaction updated"),
            Err(msg) => {
                app.set_status(msg);
                return;
            }
        }
    } else {
        match app.form.to_new_transaction() {
            Ok(txn) => backend
                .create_transaction(&txn)
                .map(|()| "Transaction created"),
            Err(msg) => {
                app.set_status(msg);
                return;
            }
        }
    };

    match outcome {
        Ok(msg) => {
            app.screen = Screen::Transactions;
            app.input_mode = InputMode::Normal;
            app.refresh(backend);
            app.set_status(msg);
        }
        Err(err) => app.set_status(format!("Error: {err}")),
    }
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, backend: &mut Backend) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.pending_action.take() {
                match action {
                    PendingAction::DeleteTransaction { id, title } => {
                        match backend.delete_transaction(&id) {
                            Ok(()) => {
                                app.refresh(backend);
                                if app.transaction_index >= app.visible.len() {
                                    app.transaction_index = app.visible.len().saturating_sub(1);
                                }
                                app.set_status(format!("Deleted: {title}"));
                            }
                            Err(err) => app.set_status(format!("Error: {err}")),
                        }
                    }
                    PendingAction::Logout => {
                        commands::perform_logout(app, backend);
                    }
                }
            }
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
        _ => {}
    }
}

/// One keypress rotates the selected row's status and pushes the change
/// as a status-only patch.
fn cycle_selected_status(app: &mut App, backend: &mut Backend) {
    if let Some(txn) = app.selected_transaction() {
        let id = txn.id.clone();
        let next = txn.status.cycled();
        let patch = TransactionPatch::status_only(next.clone());
        match backend.update_transaction(&id, &patch) {
            Ok(()) => {
                app.refresh(backend);
                app.set_status(format!("Status set to {next}"));
            }
            Err(err) => app.set_status(format!("Error: {err}")),
        }
    }
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, backend: &mut Backend, screen: Screen) {
    app.screen = screen;
    app.refresh(backend);
    app.set_status(format!("{screen}"));
}

fn handle_move_down(app: &mut App) {
    if app.screen == Screen::Transactions {
        let page = app.transaction_page();
        scroll_down(
            &mut app.transaction_index,
            &mut app.transaction_scroll,
            app.visible.len(),
            page,
        );
    }
}

fn handle_move_up(app: &mut App) {
    if app.screen == Screen::Transactions {
        scroll_up(&mut app.transaction_index, &mut app.transaction_scroll);
    }
}
