use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use brokermint_core::models::RiskLevel;
use brokermint_core::View;

use crate::app::{App, AppState};
use crate::ui::styles;
use crate::utils::{format_price, format_volume};

use super::request_status;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(5)])
        .split(columns[0]);

    render_ticker_input(frame, app, left[0]);
    render_results(frame, app, left[1]);
    render_legend(frame, columns[1]);
}

fn render_ticker_input(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.state == AppState::Editing;
    let cursor = if editing { "▌" } else { "" };

    let mut lines = vec![Line::from(vec![
        Span::styled(" Tickers: ", styles::muted_style()),
        Span::styled(format!("{}{}", app.ticker_input, cursor), styles::input_style(editing)),
    ])];
    lines.push(match request_status(app, View::Anomalies) {
        Some(status) => status,
        None => Line::from(Span::styled(
            " Comma-separated symbols. [e]dit, [Enter] detect",
            styles::muted_style(),
        )),
    });

    let block = Block::default()
        .title(" Detect Anomalies ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(editing));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("Ticker"),
        Cell::from("Anomaly Score"),
        Cell::from("Risk Level"),
        Cell::from("Price"),
        Cell::from("Volume"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .anomaly_results
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.ticker.clone()),
                Cell::from(r.anomaly_score.to_string()),
                Cell::from(Span::styled(
                    format!(" {} ", r.risk_level.label()),
                    styles::risk_style(&r.risk_level),
                )),
                Cell::from(format_price(r.price)),
                Cell::from(format_volume(r.volume)),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!(" Detection Results ({}) ", app.anomaly_results.len()))
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );

    frame.render_widget(table, area);
}

fn render_legend(frame: &mut Frame, area: Rect) {
    let mut lines = Vec::new();
    for level in RiskLevel::known() {
        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled(format!(" {} ", level.label()), styles::risk_style(&level)),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", level.description()),
            styles::muted_style(),
        )));
        lines.push(Line::from(""));
    }

    let block = Block::default()
        .title(" Risk Levels ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(ratatui::widgets::Wrap { trim: false }),
        area,
    );
}
