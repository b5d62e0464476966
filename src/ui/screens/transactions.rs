use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::models::{format_wire_date, TransactionType};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.visible.is_empty() {
        let msg = if app.filter.is_active() {
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No transactions match the current filters",
                    theme::dim_style(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press Esc or use :clear-filters to reset",
                    theme::dim_style(),
                )),
            ]
        } else {
            vec![
                Line::from(""),
                Line::from(Span::styled("No transactions yet", theme::dim_style())),
                Line::from(""),
                Line::from(Span::styled(
                    "Create one with :new",
                    theme::dim_style(),
                )),
            ]
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                " Transactions (0) ",
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            ));
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let header_cells = ["Due", "Title", "Description", "Type", "Amount", "Status"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .visible
        .iter()
        .enumerate()
        .skip(app.transaction_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, txn)| {
            let is_cursor = i == app.transaction_index;

            let due = txn
                .due_date
                .as_deref()
                .map(format_wire_date)
                .unwrap_or_else(|| "—".to_string());

            let amount_style = match txn.kind {
                TransactionType::Income => theme::income_style(),
                TransactionType::Expense => theme::expense_style(),
            };
            let sign = match txn.kind {
                TransactionType::Income => "+",
                TransactionType::Expense => "",
            };
            let amount_str = format!("{sign}{}", format_amount(txn.amount));

            let style = if is_cursor {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            Row::new(vec![
                Cell::from(format!("  {due}")),
                Cell::from(truncate(txn.display_title(), 28)),
                Cell::from(truncate(&txn.description, 32)),
                Cell::from(txn.kind.label()),
                Cell::from(Span::styled(amount_str, amount_style)),
                Cell::from(Span::styled(
                    txn.status.as_str().to_string(),
                    theme::status_style(&txn.status),
                )),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(14),
        Constraint::Min(20),
        Constraint::Min(20),
        Constraint::Length(9),
        Constraint::Length(14),
        Constraint::Length(11),
    ];

    let mut filters = Vec::new();
    if let Some(kind) = app.filter.kind {
        filters.push(format!("type: {}", kind.label().to_lowercase()));
    }
    if let Some(status) = &app.filter.status {
        filters.push(format!("status: {status}"));
    }
    if !app.search_input.is_empty() {
        filters.push(format!("search: '{}'", app.search_input));
    }
    let filter_info = if filters.is_empty() {
        String::new()
    } else {
        format!("[{}] ", filters.join(", "))
    };

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" Transactions ({}) {}", app.visible.len(), filter_info),
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );

    f.render_widget(table, area);
}
