use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use brokermint_core::models::DocumentType;
use brokermint_core::View;

use crate::app::{App, AppState};
use crate::ui::styles;

use super::request_status;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(6)])
        .split(area);

    render_form(frame, app, chunks[0]);
    render_result(frame, app, chunks[1]);
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.state == AppState::Editing;

    let mut type_spans = vec![Span::styled(" Document: ", styles::muted_style())];
    for doc in DocumentType::ALL {
        let style = styles::tab_style(doc == app.document_type);
        type_spans.push(Span::styled(format!(" {} ", doc.display_name()), style));
    }

    let cursor = if editing { "▌" } else { "" };
    let mut lines = vec![
        Line::from(""),
        Line::from(type_spans),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Number:   ", styles::muted_style()),
            Span::styled(
                format!("{}{}", app.document_number, cursor),
                styles::input_style(editing),
            ),
            Span::styled(
                format!("   ({})", app.document_type.format_hint()),
                styles::muted_style(),
            ),
        ]),
        Line::from(""),
    ];
    lines.push(match request_status(app, View::Ekyc) {
        Some(status) => status,
        None => Line::from(Span::styled(
            " [←/→] document type, [e]dit number, [Enter] verify",
            styles::muted_style(),
        )),
    });

    let block = Block::default()
        .title(" eKYC Verification ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(editing));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_result(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.verification {
        None => vec![Line::from(Span::styled(
            " No verification run yet",
            styles::muted_style(),
        ))],
        Some(ref result) => {
            let status_style = if result.success {
                styles::success_style()
            } else {
                styles::error_style()
            };
            let mut lines = vec![
                Line::from(""),
                Line::from(vec![
                    Span::styled(" Status:  ", styles::muted_style()),
                    Span::styled(result.status_label().to_uppercase(), status_style),
                ]),
            ];
            if let Some(score) = result.score_percent() {
                lines.push(Line::from(vec![
                    Span::styled(" Score:   ", styles::muted_style()),
                    Span::raw(score),
                ]));
            }
            if let Some(id) = result.verification_id {
                lines.push(Line::from(vec![
                    Span::styled(" ID:      ", styles::muted_style()),
                    Span::raw(id.to_string()),
                ]));
            }
            if let Some(ref error) = result.error {
                lines.push(Line::from(vec![
                    Span::styled(" Reason:  ", styles::muted_style()),
                    Span::styled(error.clone(), styles::error_style()),
                ]));
            }
            lines
        }
    };

    let block = Block::default()
        .title(" Result ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
