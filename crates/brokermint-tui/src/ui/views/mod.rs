//! One renderer per console view.

pub mod anomalies;
pub mod audit;
pub mod auth;
pub mod dashboard;
pub mod ekyc;
pub mod reports;

use ratatui::text::{Line, Span};

use brokermint_core::View;

use crate::app::App;
use crate::ui::styles;

/// "Loading..." or the last error for `view`, if either applies
fn request_status(app: &App, view: View) -> Option<Line<'static>> {
    if app.loading.contains(&view) {
        Some(Line::from(Span::styled(" Loading...", styles::muted_style())))
    } else {
        app.view_errors
            .get(&view)
            .map(|e| Line::from(Span::styled(format!(" {}", e), styles::error_style())))
    }
}
