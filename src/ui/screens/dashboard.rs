use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use rust_decimal::Decimal;

use crate::models::TransactionType;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

/// One dashboard card: icon + headline value + label + optional trend.
struct MetricCard {
    icon: &'static str,
    value: String,
    label: &'static str,
    trend: Option<String>,
    details: String,
}

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Metric cards
            Constraint::Length(7), // Financial summary
            Constraint::Min(6),    // Recent activity
        ])
        .split(area);

    render_metric_cards(f, chunks[0], app);
    render_financial_summary(f, chunks[1], app);
    render_recent_activity(f, chunks[2], app);
}

fn render_metric_cards(f: &mut Frame, area: Rect, app: &App) {
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let m = &app.metrics;
    let month_delta = m.month_pending_count as i64 - m.prev_month_pending_count as i64;
    let trend = if month_delta >= 0 {
        format!("▲ +{month_delta}")
    } else {
        format!("▼ {month_delta}")
    };

    let cards = [
        MetricCard {
            icon: "💰",
            value: format_amount(m.pending_total),
            label: "Total Pending",
            trend: None,
            details: format!("{} transactions", m.pending_count),
        },
        MetricCard {
            icon: "📅",
            value: m.month_pending_count.to_string(),
            label: "Pending This Month",
            trend: Some(trend),
            details: format!("{} last month", m.prev_month_pending_count),
        },
        MetricCard {
            icon: "📊",
            value: format!("{:.1}%", m.success_rate),
            label: "Success Rate",
            trend: None,
            details: format!("of {} total", app.transactions.len()),
        },
    ];

    for (card, slot) in cards.iter().zip(slots.iter()) {
        render_card(f, *slot, card);
    }
}

fn render_card(f: &mut Frame, area: Rect, card: &MetricCard) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" {} {} ", card.icon, card.label),
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));

    let mut value_line = vec![Span::styled(
        card.value.clone(),
        Style::default()
            .fg(theme::ACCENT)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(trend) = &card.trend {
        let trend_style = if trend.starts_with('▲') {
            theme::income_style()
        } else {
            theme::expense_style()
        };
        value_line.push(Span::raw("  "));
        value_line.push(Span::styled(trend.clone(), trend_style));
    }

    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(value_line),
        Line::from(Span::styled(card.details.clone(), theme::dim_style())),
    ])
    .centered()
    .block(block);

    f.render_widget(text, area);
}

fn render_financial_summary(f: &mut Frame, area: Rect, app: &App) {
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let m = &app.metrics;
    render_amount_card(f, slots[0], "Monthly Income", m.month_income, theme::GREEN);
    render_amount_card(f, slots[1], "Monthly Expenses", m.month_expense, theme::RED);
    let net_color = if m.net_profit >= Decimal::ZERO {
        theme::GREEN
    } else {
        theme::RED
    };
    render_amount_card(f, slots[2], "Net Profit", m.net_profit, net_color);
}

fn render_amount_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    amount: Decimal,
    color: ratatui::style::Color,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));

    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format_amount(amount),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled("completed only", theme::dim_style())),
    ])
    .centered()
    .block(block);

    f.render_widget(text, area);
}

fn render_recent_activity(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            " Recent Activity ",
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));

    if app.metrics.recent.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled(
            "No transactions yet. Create one with :new",
            theme::dim_style(),
        )))
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let lines: Vec<Line> = app
        .metrics
        .recent
        .iter()
        .take(area.height.saturating_sub(2) as usize)
        .map(|entry| {
            let amount_style = match entry.kind {
                TransactionType::Income => theme::income_style(),
                TransactionType::Expense => theme::expense_style(),
            };
            Line::from(vec![
                Span::raw(format!(" {} ", entry.icon)),
                Span::styled(
                    format!("{:<32}", truncate(&entry.title, 30)),
                    theme::normal_style(),
                ),
                Span::styled(format!("{:>14}", format_amount(entry.amount)), amount_style),
                Span::styled(format!("  {}  ", entry.date), theme::dim_style()),
                Span::styled(
                    entry.status.as_str().to_string(),
                    theme::status_style(&entry.status),
                ),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}
