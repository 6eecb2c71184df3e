use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    if let (Char('c'), KeyModifiers::CONTROL) = (key_event.code, key_event.modifiers) {
        crate::cleanup_terminal();
        std::process::exit(0);
    }

    let request = if guard.state.search.composing {
        match key_event.code {
            KeyCode::Enter => guard.submit_search(),
            KeyCode::Esc => {
                guard.cancel_search_input();
                None
            }
            KeyCode::Backspace => {
                guard.state.search.input.pop();
                None
            }
            Char(c) => {
                guard.state.search.input.push(c);
                None
            }
            _ => None,
        }
    } else {
        match (guard.state.active_tab, key_event.code, key_event.modifiers) {
            // Quit
            (_, Char('q'), _) => {
                crate::cleanup_terminal();
                std::process::exit(0);
            }

            // Tab switching
            (_, Char(c @ '1'..='9'), _) => match MenuItem::from_digit(c) {
                Some(tab) => guard.update_tab(tab),
                None => None,
            },
            (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
            (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

            // Reload the current tab
            (_, Char('r'), _) => guard.refresh(),

            // Search input
            (MenuItem::Search, Char('/') | Char('i') | KeyCode::Enter, _) => {
                guard.start_search_input();
                None
            }

            // Ranking metric
            (MenuItem::Players | MenuItem::Analytics, Char('m') | KeyCode::Tab, _) => {
                guard.next_metric();
                None
            }
            (MenuItem::Players | MenuItem::Analytics, Char('M') | KeyCode::BackTab, _) => {
                guard.prev_metric();
                None
            }

            // Table navigation
            (_, Char('j') | KeyCode::Down, _) => {
                guard.scroll_down();
                None
            }
            (_, Char('k') | KeyCode::Up, _) => {
                guard.scroll_up();
                None
            }

            // Global
            (_, Char('f'), _) => {
                guard.toggle_full_screen();
                None
            }
            (_, Char('"'), _) => {
                guard.toggle_show_logs();
                None
            }

            _ => None,
        }
    };

    drop(guard);
    if let Some(request) = request {
        let _ = network_requests.send(request).await;
    }
}
