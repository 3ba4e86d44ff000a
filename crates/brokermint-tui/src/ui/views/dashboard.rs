use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use brokermint_core::View;

use crate::app::App;
use crate::ui::styles;
use crate::utils::{format_date, format_timestamp, truncate_string};

use super::request_status;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(6)])
        .split(area);

    render_stats(frame, app, chunks[0]);

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    render_alerts(frame, app, lower[0]);
    render_recent_anomalies(frame, app, lower[1]);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Compliance Overview ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let lines = match (&app.dashboard, request_status(app, View::Dashboard)) {
        (Some(dashboard), _) => {
            let stats = &dashboard.stats;
            vec![
                Line::from(""),
                Line::from(vec![
                    Span::styled("  Total checks: ", styles::muted_style()),
                    Span::styled(stats.total_checks.to_string(), styles::title_style()),
                    Span::styled("     Anomalies found: ", styles::muted_style()),
                    Span::styled(stats.anomalies_found.to_string(), styles::highlight_style()),
                    Span::styled("     High risk: ", styles::muted_style()),
                    Span::styled(stats.high_risk_count.to_string(), styles::error_style()),
                ]),
            ]
        }
        (None, Some(status)) => vec![Line::from(""), status],
        (None, None) => vec![
            Line::from(""),
            Line::from(Span::styled(" Press [r] to load", styles::muted_style())),
        ],
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_alerts(frame: &mut Frame, app: &App, area: Rect) {
    let alerts = app
        .dashboard
        .as_ref()
        .map(|d| d.alerts.as_slice())
        .unwrap_or_default();

    let mut lines = Vec::new();
    if alerts.is_empty() {
        lines.push(Line::from(Span::styled(" No active alerts", styles::muted_style())));
    }
    for alert in alerts {
        let mut title = vec![
            Span::styled(
                format!(" [{}] ", alert.severity.to_uppercase()),
                styles::severity_style(alert.is_high_severity()),
            ),
            Span::styled(alert.title.clone(), styles::list_item_style()),
        ];
        if let Some(ref deadline) = alert.deadline {
            title.push(Span::styled(
                format!("  due {}", format_date(deadline)),
                styles::muted_style(),
            ));
        }
        lines.push(Line::from(title));
        if !alert.description.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("   {}", alert.description),
                styles::muted_style(),
            )));
        }
        lines.push(Line::from(""));
    }

    let block = Block::default()
        .title(format!(" Alerts ({}) ", alerts.len()))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_recent_anomalies(frame: &mut Frame, app: &App, area: Rect) {
    let anomalies = app
        .dashboard
        .as_ref()
        .map(|d| d.anomalies.as_slice())
        .unwrap_or_default();

    let header = Row::new([
        Cell::from("Ticker"),
        Cell::from("Score"),
        Cell::from("Risk"),
        Cell::from("Detected"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = anomalies
        .iter()
        .map(|a| {
            Row::new(vec![
                Cell::from(truncate_string(&a.ticker, 8)),
                Cell::from(a.anomaly_score.to_string()),
                Cell::from(Span::styled(
                    a.risk_level.label().to_string(),
                    styles::risk_style(&a.risk_level),
                )),
                Cell::from(
                    a.timestamp
                        .as_deref()
                        .map(format_timestamp)
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!(" Recent Anomalies ({}) ", anomalies.len()))
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );

    frame.render_widget(table, area);
}
