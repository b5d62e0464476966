use chrono::{Datelike, Local};

use crate::backend::{Backend, HealthStatus};
use crate::filter::{sort_by_due_date_desc, TransactionFilter};
use crate::metrics::DashboardMetrics;
use crate::models::Transaction;
use crate::ui::screens::form::FormState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Transactions,
    Form,
}

impl Screen {
    /// Screens shown in the tab bar. The form is reached through actions,
    /// not tabs.
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Dashboard, Self::Transactions]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Transactions => write!(f, "Transactions"),
            Self::Form => write!(f, "Transaction"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Editing => write!(f, "EDIT"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone)]
pub(crate) enum PendingAction {
    DeleteTransaction { id: String, title: String },
    Logout,
}

/// Which pre-auth view is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthView {
    Login,
    Register,
}

/// Input state for the login/register forms.
#[derive(Debug, Default)]
pub(crate) struct AuthForm {
    pub(crate) view_name: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) field: usize,
    pub(crate) error: Option<String>,
}

impl AuthForm {
    pub(crate) fn clear(&mut self) {
        self.view_name.clear();
        self.username.clear();
        self.password.clear();
        self.field = 0;
        self.error = None;
    }
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    // Auth
    pub(crate) auth_view: AuthView,
    pub(crate) auth_form: AuthForm,

    // Data (raw fetch + filtered/sorted display copy)
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) visible: Vec<Transaction>,
    pub(crate) filter: TransactionFilter,
    pub(crate) metrics: DashboardMetrics,

    // Transactions table
    pub(crate) transaction_index: usize,
    pub(crate) transaction_scroll: usize,

    // Create/edit form
    pub(crate) form: FormState,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Session/health snapshot (copied from the backend before each draw)
    pub(crate) authenticated: bool,
    pub(crate) user_name: String,
    pub(crate) health: HealthStatus,
    pub(crate) health_latency_ms: Option<u64>,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            status_message: String::new(),
            show_help: false,

            auth_view: AuthView::Login,
            auth_form: AuthForm::default(),

            transactions: Vec::new(),
            visible: Vec::new(),
            filter: TransactionFilter::default(),
            metrics: DashboardMetrics::default(),

            transaction_index: 0,
            transaction_scroll: 0,

            form: FormState::default(),

            pending_action: None,
            confirm_message: String::new(),

            authenticated: false,
            user_name: String::new(),
            health: HealthStatus::Checking,
            health_latency_ms: None,

            visible_rows: 20,
        }
    }

    /// Copy the bits of backend state the renderer needs. Called once per
    /// loop iteration so a health poll tick shows up without input.
    pub(crate) fn sync_backend(&mut self, backend: &Backend) {
        self.authenticated = backend.state().is_authenticated();
        self.user_name = backend
            .state()
            .user()
            .map(|u| u.name.clone())
            .unwrap_or_default();
        let (health, latency) = backend.health_status();
        self.health = health;
        self.health_latency_ms = latency;
    }

    /// Refetch the full list and recompute everything derived from it.
    /// Every mutation ends up here; nothing is patched incrementally.
    pub(crate) fn refresh(&mut self, backend: &mut Backend) {
        match backend.transactions() {
            Ok(txns) => {
                self.transactions = txns;
                self.metrics = DashboardMetrics::compute(
                    &self.transactions,
                    Local::now().date_naive(),
                );
                self.apply_filters();
            }
            Err(err) => {
                if !backend.state().is_authenticated() {
                    // Token died mid-session; land back on the login view.
                    self.transactions.clear();
                    self.visible.clear();
                    self.metrics = DashboardMetrics::default();
                    self.auth_form.clear();
                    self.auth_view = AuthView::Login;
                }
                self.set_status(format!("Error: {err}"));
            }
        }
    }

    /// Rebuild the display copy: filter, then order by due date descending.
    pub(crate) fn apply_filters(&mut self) {
        self.filter.search = if self.search_input.is_empty() {
            None
        } else {
            Some(self.search_input.clone())
        };
        self.visible = self.filter.apply(&self.transactions);
        sort_by_due_date_desc(&mut self.visible);
        if self.transaction_index >= self.visible.len() {
            self.transaction_index = self.visible.len().saturating_sub(1);
        }
        if self.transaction_scroll > self.transaction_index {
            self.transaction_scroll = self.transaction_index;
        }
    }

    pub(crate) fn selected_transaction(&self) -> Option<&Transaction> {
        self.visible.get(self.transaction_index)
    }

    pub(crate) fn transaction_page(&self) -> usize {
        self.visible_rows.saturating_sub(3).max(1)
    }

    pub(crate) fn current_year_month(&self) -> (i32, u32) {
        let now = Local::now();
        (now.year(), now.month())
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}
