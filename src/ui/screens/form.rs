use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::{NewTransaction, TransactionPatch, TransactionStatus, TransactionType};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::parse_amount;

const STATUS_CYCLE: [TransactionStatus; 3] = [
    TransactionStatus::Pending,
    TransactionStatus::Completed,
    TransactionStatus::Cancelled,
];

/// State for the create/edit form. Text fields hold raw input; nothing is
/// validated until submit.
#[derive(Debug, Default)]
pub(crate) struct FormState {
    pub(crate) editing_id: Option<String>,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) amount: String,
    pub(crate) due_date: String,
    pub(crate) kind: Option<TransactionType>,
    pub(crate) status: Option<TransactionStatus>,
    pub(crate) field: usize,
}

impl FormState {
    pub(crate) fn for_create(today: &str) -> Self {
        Self {
            due_date: today.to_string(),
            kind: Some(TransactionType::Expense),
            ..Self::default()
        }
    }

    pub(crate) fn for_edit(txn: &crate::models::Transaction) -> Self {
        Self {
            editing_id: Some(txn.id.clone()),
            title: txn.title.clone().unwrap_or_default(),
            description: txn.description.clone(),
            amount: txn.amount.to_string(),
            due_date: txn.due_date.clone().unwrap_or_default(),
            kind: Some(txn.kind),
            status: Some(txn.status.clone()),
            field: 0,
        }
    }

    pub(crate) fn is_edit(&self) -> bool {
        self.editing_id.is_some()
    }

    /// Status is only editable for an existing transaction.
    pub(crate) fn field_count(&self) -> usize {
        if self.is_edit() {
            6
        } else {
            5
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.field = (self.field + 1) % self.field_count();
    }

    pub(crate) fn prev_field(&mut self) {
        self.field = if self.field == 0 {
            self.field_count() - 1
        } else {
            self.field - 1
        };
    }

    /// Current text field, if the cursor is on one.
    fn text_field_mut(&mut self) -> Option<&mut String> {
        match self.field {
            0 => Some(&mut self.title),
            1 => Some(&mut self.description),
            2 => Some(&mut self.amount),
            3 => Some(&mut self.due_date),
            _ => None,
        }
    }

    pub(crate) fn push_char(&mut self, c: char) {
        if let Some(field) = self.text_field_mut() {
            field.push(c);
        } else {
            self.cycle(1);
        }
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(field) = self.text_field_mut() {
            field.pop();
        }
    }

    /// On the type/status fields, cycle through the options.
    pub(crate) fn cycle(&mut self, delta: i32) {
        match self.field {
            4 => {
                self.kind = Some(match self.kind {
                    Some(TransactionType::Income) => TransactionType::Expense,
                    _ => TransactionType::Income,
                });
            }
            5 => {
                let current = STATUS_CYCLE
                    .iter()
                    .position(|s| Some(s) == self.status.as_ref())
                    .unwrap_or(0);
                let next = if delta >= 0 {
                    (current + 1) % STATUS_CYCLE.len()
                } else {
                    (current + STATUS_CYCLE.len() - 1) % STATUS_CYCLE.len()
                };
                self.status = Some(STATUS_CYCLE[next].clone());
            }
            _ => {}
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.description.trim().is_empty() {
            return Err("Description is required".into());
        }
        match parse_amount(&self.amount) {
            Some(a) if a > rust_decimal::Decimal::ZERO => {}
            Some(_) => return Err("Amount must be greater than zero".into()),
            None => return Err(format!("Invalid amount: {}", self.amount)),
        }
        if chrono::NaiveDate::parse_from_str(self.due_date.trim(), "%Y-%m-%d").is_err() {
            return Err("Due date must be YYYY-MM-DD".into());
        }
        Ok(())
    }

    pub(crate) fn to_new_transaction(&self) -> Result<NewTransaction, String> {
        self.validate()?;
        Ok(NewTransaction {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            amount: parse_amount(&self.amount).ok_or("Invalid amount")?,
            due_date: self.due_date.trim().to_string(),
            kind: self.kind.unwrap_or(TransactionType::Expense),
        })
    }

    pub(crate) fn to_patch(&self) -> Result<TransactionPatch, String> {
        self.validate()?;
        Ok(TransactionPatch {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            amount: Some(parse_amount(&self.amount).ok_or("Invalid amount")?),
            due_date: Some(self.due_date.trim().to_string()),
            kind: self.kind,
            status: self.status.clone(),
        })
    }
}

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let form = &app.form;
    let title = if form.is_edit() {
        " Edit Transaction "
    } else {
        " New Transaction "
    };

    let kind_label = form.kind.map(|k| k.label()).unwrap_or("Expense");
    let status_label = form
        .status
        .as_ref()
        .map(|s| s.as_str().to_string())
        .unwrap_or_default();

    let mut rows: Vec<(&str, String)> = vec![
        ("Title", form.title.clone()),
        ("Description", form.description.clone()),
        ("Amount", form.amount.clone()),
        ("Due date", form.due_date.clone()),
        ("Type", kind_label.to_string()),
    ];
    if form.is_edit() {
        rows.push(("Status", status_label));
    }

    let mut lines = vec![Line::from("")];
    for (i, (label, value)) in rows.iter().enumerate() {
        let cursor = if i == form.field { "▸ " } else { "  " };
        let label_style = if i == form.field {
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            theme::dim_style()
        };
        let shown = if value.is_empty() && i == form.field {
            "_".to_string()
        } else {
            value.clone()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{cursor}{label:<12}"), label_style),
            Span::styled(shown, theme::normal_style()),
        ]));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "  Tab/↑↓ move · ←/→ cycle type/status · Enter save · Esc cancel",
        theme::dim_style(),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn filled() -> FormState {
        let mut form = FormState::for_create("2024-03-15");
        form.title = "Rent".into();
        form.description = "March rent".into();
        form.amount = "1200.00".into();
        form
    }

    #[test]
    fn test_valid_form_builds_payload() {
        let payload = filled().to_new_transaction().unwrap();
        assert_eq!(payload.title, "Rent");
        assert_eq!(payload.due_date, "2024-03-15");
        assert_eq!(payload.kind, TransactionType::Expense);
    }

    #[test]
    fn test_description_is_required() {
        let mut form = filled();
        form.description = "  ".into();
        assert!(form.to_new_transaction().is_err());
    }

    #[test]
    fn test_amount_must_be_positive() {
        let mut form = filled();
        form.amount = "0".into();
        assert!(form.to_new_transaction().is_err());
        form.amount = "-5".into();
        assert!(form.to_new_transaction().is_err());
        form.amount = "nope".into();
        assert!(form.to_new_transaction().is_err());
    }

    #[test]
    fn test_due_date_shape_is_checked() {
        let mut form = filled();
        form.due_date = "15/03/2024".into();
        assert!(form.to_new_transaction().is_err());
        form.due_date = "2024-02-30".into();
        assert!(form.to_new_transaction().is_err());
    }

    #[test]
    fn test_edit_form_patch_carries_status() {
        let txn = crate::models::Transaction {
            id: "t1".into(),
            title: Some("Rent".into()),
            description: "March rent".into(),
            amount: rust_decimal_macros::dec!(1200),
            kind: TransactionType::Expense,
            status: TransactionStatus::Pending,
            due_date: Some("2024-03-05".into()),
            created_at: "2024-02-01".into(),
        };
        let mut form = FormState::for_edit(&txn);
        assert_eq!(form.field_count(), 6);
        form.field = 5;
        form.cycle(1);
        let patch = form.to_patch().unwrap();
        assert_eq!(patch.status, Some(TransactionStatus::Completed));
        assert_eq!(patch.title.as_deref(), Some("Rent"));
    }

    #[test]
    fn test_type_cycles_between_income_and_expense() {
        let mut form = filled();
        form.field = 4;
        form.cycle(1);
        assert_eq!(form.kind, Some(TransactionType::Income));
        form.cycle(1);
        assert_eq!(form.kind, Some(TransactionType::Expense));
    }
}
