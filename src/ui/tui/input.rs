use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use sniffle::list_interfaces;

use super::state::{FilterEditor, Focus, UiMode};
use super::App;

/// Rows moved by PageUp/PageDown.
const PAGE: isize = 10;

pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit = true;
        return;
    }

    match app.ui.mode {
        UiMode::Capture => handle_capture_key(app, key),
        UiMode::HelpOverlay => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.ui.mode = UiMode::Capture;
            }
        }
        UiMode::DeviceMenu { .. } => handle_device_menu(app, key),
        UiMode::FilterMenu(_) => handle_filter_menu(app, key),
    }
}

fn handle_capture_key(app: &mut App, key: KeyEvent) {
    app.ui.clear_error();

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.quit = true,
        KeyCode::Char('?') => app.ui.mode = UiMode::HelpOverlay,
        KeyCode::Char('/') | KeyCode::Char('f') => open_filter_menu(app),
        KeyCode::Char('i') => open_device_menu(app),
        KeyCode::Char('s') | KeyCode::Char(' ') => app.toggle_capture(),
        KeyCode::Char('x') => {
            app.buffer.clear();
            app.stats.clear();
            app.ui.follow_latest();
        }
        KeyCode::Tab => app.ui.toggle_focus(),
        KeyCode::Left => move_layer(app, -1),
        KeyCode::Right => move_layer(app, 1),
        KeyCode::Up | KeyCode::Char('k') => move_in_focus(app, -1),
        KeyCode::Down | KeyCode::Char('j') => move_in_focus(app, 1),
        KeyCode::PageUp => app.ui.move_selection(&app.buffer, -PAGE),
        KeyCode::PageDown => app.ui.move_selection(&app.buffer, PAGE),
        KeyCode::Home | KeyCode::Char('g') => app.ui.select_first(&app.buffer),
        KeyCode::End | KeyCode::Char('G') => app.ui.follow_latest(),
        KeyCode::Esc => app.ui.info_msg = None,
        _ => {}
    }
}

fn move_in_focus(app: &mut App, delta: isize) {
    match app.ui.focus {
        Focus::Packets => app.ui.move_selection(&app.buffer, delta),
        Focus::Layers => move_layer(app, delta),
    }
}

fn move_layer(app: &mut App, delta: isize) {
    let count = app.selected_layer_count();
    app.ui.move_layer(count, delta);
}

fn open_filter_menu(app: &mut App) {
    app.ui.mode = UiMode::FilterMenu(FilterEditor::new(&app.filter, app.loopback));
}

fn open_device_menu(app: &mut App) {
    match list_interfaces() {
        Ok(options) if options.is_empty() => app.ui.set_error("No capture interfaces found"),
        Ok(options) => {
            let selected = app
                .interface
                .as_deref()
                .and_then(|current| options.iter().position(|dev| dev.name == current))
                .unwrap_or(0);
            app.ui.mode = UiMode::DeviceMenu { options, selected };
        }
        Err(e) => app.ui.set_error(format!("Failed to list interfaces: {}", e)),
    }
}

fn handle_device_menu(app: &mut App, key: KeyEvent) {
    let UiMode::DeviceMenu { options, selected } = &mut app.ui.mode else {
        return;
    };

    match key.code {
        KeyCode::Up => *selected = selected.saturating_sub(1),
        KeyCode::Down => {
            if *selected < options.len().saturating_sub(1) {
                *selected += 1;
            }
        }
        KeyCode::Enter => {
            let device = options.get(*selected).cloned();
            app.ui.mode = UiMode::Capture;

            if let Some(device) = device {
                app.interface = Some(device.name);
                app.loopback = device.loopback;
                app.start_capture();
            }
        }
        KeyCode::Esc => app.ui.mode = UiMode::Capture,
        _ => {}
    }
}

fn handle_filter_menu(app: &mut App, key: KeyEvent) {
    let UiMode::FilterMenu(editor) = &mut app.ui.mode else {
        return;
    };

    match key.code {
        KeyCode::Char(c) => editor.insert(c),
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Delete => editor.delete(),
        KeyCode::Left => editor.move_cursor(-1),
        KeyCode::Right => editor.move_cursor(1),
        KeyCode::Home => editor.cursor_home(),
        KeyCode::End => editor.cursor_end(),
        KeyCode::Up => editor.cycle_suggestion(-1),
        KeyCode::Down => editor.cycle_suggestion(1),
        KeyCode::Enter => {
            // an invalid filter keeps the editor open; the status line says why
            if !editor.status.is_valid() {
                return;
            }
            app.filter = editor.input.trim().to_string();
            app.ui.mode = UiMode::Capture;

            if app.is_capturing() || app.interface.is_some() {
                app.start_capture();
            } else {
                app.ui.set_info(format!("Filter set: '{}'", app.filter));
            }
        }
        KeyCode::Esc => app.ui.mode = UiMode::Capture,
        _ => {}
    }
}
