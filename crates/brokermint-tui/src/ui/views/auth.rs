use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, LoginFocus, RegisterFocus};
use crate::ui::render::{centered_rect_fixed, logo_lines};
use crate::ui::styles;

/// Width of the visible part of a text field
const FIELD_WIDTH: usize = 20;

fn field_line<'a>(label: &'a str, value: &str, masked: bool, focused: bool) -> Line<'a> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let shown: String = if masked {
        "*".repeat(value.chars().count().min(FIELD_WIDTH))
    } else {
        // Keep the tail visible while typing
        let skip = value.chars().count().saturating_sub(FIELD_WIDTH);
        value.chars().skip(skip).collect()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("   "),
        Span::styled(format!("{:>10}: [", label), styles::muted_style()),
        Span::styled(format!("{:<width$}{}", shown, cursor, width = FIELD_WIDTH), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    Line::from(vec![
        Span::raw("            ["),
        Span::styled(text, style),
        Span::raw("]"),
    ])
}

fn render_form(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
    let height = lines.len() as u16 + 2;
    let area = centered_rect_fixed(50, height, area);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = logo_lines();
    lines.push(Line::from(""));

    lines.push(field_line(
        "Username",
        &app.login_username,
        false,
        app.login_focus == LoginFocus::Username,
    ));
    lines.push(field_line(
        "Password",
        &app.login_password,
        true,
        app.login_focus == LoginFocus::Password,
    ));
    lines.push(Line::from(""));
    lines.push(button_line("  Login  ", app.login_focus == LoginFocus::Button));
    lines.push(button_line("Register ", app.login_focus == LoginFocus::Register));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    render_form(frame, area, "Sign in", lines);
}

pub fn render_register(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = logo_lines();
    lines.push(Line::from(""));

    for field in RegisterFocus::FIELDS {
        let value = app.register.field(field).unwrap_or_default();
        lines.push(field_line(
            field.label(),
            value,
            field == RegisterFocus::Password,
            app.register_focus == field,
        ));
    }
    lines.push(Line::from(""));
    lines.push(button_line(
        RegisterFocus::Button.label(),
        app.register_focus == RegisterFocus::Button,
    ));
    lines.push(button_line(
        RegisterFocus::BackToLogin.label(),
        app.register_focus == RegisterFocus::BackToLogin,
    ));

    if let Some(ref error) = app.register_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    render_form(frame, area, "Create account", lines);
}
