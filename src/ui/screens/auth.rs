use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ui::app::{App, AuthView};
use crate::ui::theme;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let title = match app.auth_view {
        AuthView::Login => " NextMove · Sign In ",
        AuthView::Register => " NextMove · Create Account ",
    };

    let fields = field_rows(app);

    let mut lines = vec![Line::from("")];
    for (i, (label, value, masked)) in fields.iter().enumerate() {
        let cursor = if i == app.auth_form.field { "▸ " } else { "  " };
        let label_style = if i == app.auth_form.field {
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            theme::dim_style()
        };
        let shown = if *masked {
            "•".repeat(value.chars().count())
        } else {
            value.clone()
        };
        let shown = if shown.is_empty() && i == app.auth_form.field {
            "_".to_string()
        } else {
            shown
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{cursor}{label:<10}"), label_style),
            Span::styled(shown, theme::normal_style()),
        ]));
        lines.push(Line::from(""));
    }

    if let Some(error) = &app.auth_form.error {
        lines.push(Line::from(Span::styled(
            format!("  {error}"),
            theme::expense_style(),
        )));
        lines.push(Line::from(""));
    }

    let toggle_hint = match app.auth_view {
        AuthView::Login => "  Ctrl-r create account",
        AuthView::Register => "  Ctrl-r back to sign in",
    };
    lines.push(Line::from(Span::styled(
        "  Tab next field · Enter submit · Ctrl-q quit",
        theme::dim_style(),
    )));
    lines.push(Line::from(Span::styled(toggle_hint, theme::dim_style())));

    // Centered popup over an otherwise empty screen.
    let popup_width = 52.min(area.width.saturating_sub(4));
    let popup_height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup = Rect::new(x, y, popup_width, popup_height);

    f.render_widget(Clear, popup);
    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .style(Style::default().bg(theme::HEADER_BG))
            .title(Span::styled(
                title,
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(form, popup);
}

fn field_rows(app: &App) -> Vec<(&'static str, String, bool)> {
    match app.auth_view {
        AuthView::Login => vec![
            ("Email", app.auth_form.username.clone(), false),
            ("Password", app.auth_form.password.clone(), true),
        ],
        AuthView::Register => vec![
            ("Name", app.auth_form.view_name.clone(), false),
            ("Email", app.auth_form.username.clone(), false),
            ("Password", app.auth_form.password.clone(), true),
        ],
    }
}
