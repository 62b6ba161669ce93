use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;

/// Handle key event and update app state
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    // Ctrl-C quits even when every binding is disabled
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    let dashboard = app.dashboard();
    // Row keys first: they only exist while the selected row has output
    let command = dashboard
        .row_key_map()
        .resolve(&key)
        .or_else(|| dashboard.key_map().resolve(&key));

    if let Some(command) = command {
        app.dashboard_mut().apply(command);
    }
}
