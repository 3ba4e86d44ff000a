use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use brokermint_core::View;

use crate::app::App;
use crate::ui::styles;

use super::request_status;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(5)])
        .split(area);

    let mut lines = vec![Line::from(Span::styled(
        " Anomaly summary, risk assessment, audit overview and recommendations.",
        styles::list_item_style(),
    ))];
    lines.push(match request_status(app, View::Reports) {
        Some(status) => status,
        None => {
            let hint = if app.report.is_some() {
                " [g]enerate again, [s]ave to downloads, [↑/↓] scroll"
            } else {
                " [g]enerate report"
            };
            Line::from(Span::styled(hint, styles::muted_style()))
        }
    });

    let block = Block::default()
        .title(" Compliance Reports ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);

    render_preview(frame, app, chunks[1]);
}

fn render_preview(frame: &mut Frame, app: &App, area: Rect) {
    let (title, lines) = match app.report {
        Some(ref report) => (
            format!(" Preview - {} ", report.safe_filename()),
            report
                .report
                .lines()
                .map(|l| Line::from(l.to_string()))
                .collect::<Vec<_>>(),
        ),
        None => (
            " Preview ".to_string(),
            vec![Line::from(Span::styled(
                " No report generated",
                styles::muted_style(),
            ))],
        ),
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let scroll = u16::try_from(app.report_scroll).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}
