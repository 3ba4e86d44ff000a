use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use brokermint_core::View;

use crate::app::App;
use crate::ui::styles;
use crate::utils::format_timestamp;

use super::request_status;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(match app.audit_trail {
            Some(ref trail) => format!(
                " Audit Trail ({} of {}) - [r]efresh ",
                trail.entries.len(),
                trail.total.unwrap_or(trail.entries.len() as u64)
            ),
            None => " Audit Trail - [r]efresh ".to_string(),
        })
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let trail = match app.audit_trail {
        Some(ref trail) => trail,
        None => {
            let status = request_status(app, View::Audit)
                .unwrap_or_else(|| Span::styled(" No entries loaded", styles::muted_style()).into());
            frame.render_widget(Paragraph::new(status).block(block), area);
            return;
        }
    };

    let header = Row::new([
        Cell::from("Timestamp"),
        Cell::from("User"),
        Cell::from("Action"),
        Cell::from("Details"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = trail
        .entries
        .iter()
        .map(|entry| {
            Row::new(vec![
                Cell::from(format_timestamp(&entry.timestamp)),
                Cell::from(entry.actor().to_string()),
                Cell::from(Span::styled(
                    entry.action_type.clone(),
                    styles::highlight_style(),
                )),
                Cell::from(entry.details_display()),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Length(20),
        Constraint::Length(14),
        Constraint::Length(20),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !trail.entries.is_empty() {
        state.select(Some(app.audit_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
