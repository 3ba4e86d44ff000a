//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. View switches always go through the session
//! controller's route guard.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use brokermint_core::View;

use crate::app::{can_add_field_char, App, AppState, LoginFocus, RegisterFocus, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::F(1)) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    if matches!(app.state, AppState::Editing) {
        handle_editing_input(app, key);
        return Ok(false);
    }

    if key.code == KeyCode::F(1) {
        app.state = AppState::ShowingHelp;
        return Ok(false);
    }

    match app.active_view() {
        View::Login => return handle_login_input(app, key).await,
        View::Register => {
            handle_register_input(app, key).await;
            return Ok(false);
        }
        _ => {}
    }

    // Global keys for the authenticated views
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('L') => {
            app.logout();
            return Ok(false);
        }
        KeyCode::Char(c @ '1'..='9') => {
            let n = c.to_digit(10).unwrap_or_default() as usize;
            if let Some(view) = app.view_for_key(n) {
                app.status_message = None;
                app.navigate(view);
            }
            return Ok(false);
        }
        _ => {}
    }

    match app.active_view() {
        View::Dashboard => handle_dashboard_input(app, key),
        View::Anomalies => handle_anomalies_input(app, key),
        View::Ekyc => handle_ekyc_input(app, key),
        View::Reports => handle_reports_input(app, key),
        View::Audit => handle_audit_input(app, key),
        View::Login | View::Register => {}
    }
    Ok(false)
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = app.login_focus.prev();
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password | LoginFocus::Button => {
                // On failure login_error is set; on success the view changes
                let _ = app.attempt_login().await;
            }
            LoginFocus::Register => {
                app.navigate(View::Register);
            }
        },
        KeyCode::Backspace => app.pop_form_char(),
        KeyCode::Char(c) => app.push_form_char(c),
        _ => {}
    }
    Ok(false)
}

async fn handle_register_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.navigate(View::Login);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.register_focus = app.register_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.register_focus = app.register_focus.prev();
        }
        KeyCode::Enter => match app.register_focus {
            RegisterFocus::Button => {
                let _ = app.attempt_register().await;
            }
            RegisterFocus::BackToLogin => {
                app.navigate(View::Login);
            }
            field => {
                app.register_focus = field.next();
            }
        },
        KeyCode::Backspace => app.pop_form_char(),
        KeyCode::Char(c) => app.push_form_char(c),
        _ => {}
    }
}

fn handle_editing_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
            submit_active_view(app);
        }
        KeyCode::Backspace => {
            if let Some(field) = app.editing_field_mut() {
                field.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(field) = app.editing_field_mut() {
                if can_add_field_char(field.chars().count(), c) {
                    field.push(c);
                }
            }
        }
        _ => {}
    }
}

fn submit_active_view(app: &mut App) {
    match app.active_view() {
        View::Anomalies => app.detect_anomalies(),
        View::Ekyc => app.verify_document(),
        _ => {}
    }
}

fn handle_dashboard_input(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('r') {
        app.refresh_dashboard();
    }
}

fn handle_anomalies_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('e') | KeyCode::Char('/') => {
            app.state = AppState::Editing;
        }
        KeyCode::Enter => submit_active_view(app),
        _ => {}
    }
}

fn handle_ekyc_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left => {
            app.document_type = app.document_type.prev();
            app.verification = None;
        }
        KeyCode::Right => {
            app.document_type = app.document_type.next();
            app.verification = None;
        }
        KeyCode::Char('e') | KeyCode::Char('/') => {
            app.state = AppState::Editing;
        }
        KeyCode::Enter => submit_active_view(app),
        _ => {}
    }
}

fn handle_reports_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('g') => app.generate_report(),
        KeyCode::Char('s') => app.save_report(),
        KeyCode::Up | KeyCode::Char('k') => {
            app.report_scroll = app.report_scroll.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.report_scroll = app.report_scroll.saturating_add(1);
        }
        KeyCode::PageUp => {
            app.report_scroll = app.report_scroll.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::PageDown => {
            app.report_scroll = app.report_scroll.saturating_add(PAGE_SCROLL_SIZE);
        }
        KeyCode::Home => app.report_scroll = 0,
        _ => {}
    }
}

fn handle_audit_input(app: &mut App, key: KeyEvent) {
    let max_index = app.audit_len().saturating_sub(1);
    match key.code {
        KeyCode::Char('r') => app.refresh_audit_trail(),
        KeyCode::Up | KeyCode::Char('k') => {
            app.audit_selection = app.audit_selection.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.audit_selection = (app.audit_selection + 1).min(max_index);
        }
        KeyCode::PageUp => {
            app.audit_selection = app.audit_selection.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::PageDown => {
            app.audit_selection = (app.audit_selection + PAGE_SCROLL_SIZE).min(max_index);
        }
        KeyCode::Home => app.audit_selection = 0,
        KeyCode::End => app.audit_selection = max_index,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokermint_core::auth::{MemoryStore, TOKEN_KEY, USER_KEY};
    use brokermint_core::Config;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(store: MemoryStore) -> App {
        let mut config = Config::default();
        config.api_base_url = "http://127.0.0.1:9/api".to_string();
        config.request_timeout_secs = 1;
        let mut app = App::with_store(config, Box::new(store)).unwrap();
        app.restore_session();
        app
    }

    fn signed_in() -> App {
        app_with(MemoryStore::with_entries([
            (TOKEN_KEY, "t1"),
            (USER_KEY, r#"{"username":"admin","role":"admin"}"#),
        ]))
    }

    #[tokio::test]
    async fn test_number_keys_switch_views() {
        let mut app = signed_in();
        handle_input(&mut app, key(KeyCode::Char('3'))).await.unwrap();
        assert_eq!(app.active_view(), View::Ekyc);
        handle_input(&mut app, key(KeyCode::Char('9'))).await.unwrap();
        assert_eq!(app.active_view(), View::Ekyc);
    }

    #[tokio::test]
    async fn test_logout_key_returns_to_login() {
        let mut app = signed_in();
        handle_input(&mut app, key(KeyCode::Char('L'))).await.unwrap();
        assert!(!app.is_authenticated());
        assert_eq!(app.active_view(), View::Login);

        // On the login form the same key is just text
        app.login_focus = LoginFocus::Username;
        app.login_username.clear();
        handle_input(&mut app, key(KeyCode::Char('L'))).await.unwrap();
        assert_eq!(app.login_username, "L");
    }

    #[tokio::test]
    async fn test_quit_needs_confirmation() {
        let mut app = signed_in();
        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap());
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!handle_input(&mut app, key(KeyCode::Char('n'))).await.unwrap());
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap();
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))).await.unwrap());
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test]
    async fn test_editing_tickers() {
        let mut app = signed_in();
        handle_input(&mut app, key(KeyCode::Char('2'))).await.unwrap();
        app.ticker_input.clear();

        handle_input(&mut app, key(KeyCode::Char('e'))).await.unwrap();
        assert_eq!(app.state, AppState::Editing);
        for c in "IBM,q".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).await.unwrap();
        }
        handle_input(&mut app, key(KeyCode::Backspace)).await.unwrap();
        handle_input(&mut app, key(KeyCode::Esc)).await.unwrap();

        assert_eq!(app.ticker_input, "IBM,");
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_login_form_reaches_register_view() {
        let mut app = app_with(MemoryStore::default());
        app.login_focus = LoginFocus::Button;
        handle_input(&mut app, key(KeyCode::Tab)).await.unwrap();
        assert_eq!(app.login_focus, LoginFocus::Register);
        handle_input(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.active_view(), View::Register);

        handle_input(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.active_view(), View::Login);
    }

    #[tokio::test]
    async fn test_ekyc_document_type_cycles() {
        let mut app = signed_in();
        app.navigate(View::Ekyc);
        handle_input(&mut app, key(KeyCode::Left)).await.unwrap();
        assert_eq!(app.document_type, brokermint_core::models::DocumentType::Passport);
    }
}
