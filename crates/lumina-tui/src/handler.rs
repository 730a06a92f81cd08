use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use lumina_core::AiAction;

use crate::app::{App, Field, InputMode, Screen};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(Instant::now()),
        AppEvent::FrameAction(completion) => app.finish_action(completion),
        AppEvent::Generated(completion) => app.finish_generate(completion),
        AppEvent::Exported(result) => app.finish_export(result),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Blocking alert swallows keys until dismissed
    if app.playground.alert().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.playground.dismiss_alert();
        }
        return;
    }

    if app.show_api_key_input {
        handle_api_key_input(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_api_key_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.show_api_key_input = false;
            app.api_key_input.clear();
        }
        KeyCode::Enter => app.save_api_key(),
        KeyCode::Backspace => app.api_key_input.backspace(),
        KeyCode::Delete => app.api_key_input.delete(),
        KeyCode::Left => app.api_key_input.left(),
        KeyCode::Right => app.api_key_input.right(),
        KeyCode::Char(c) => app.api_key_input.insert(c),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('1') => {
            app.screen = Screen::Home;
            return;
        }
        KeyCode::Char('2') => {
            app.screen = Screen::Playground;
            return;
        }
        KeyCode::Char('3') => {
            app.screen = Screen::Docs;
            return;
        }
        _ => {}
    }

    match app.screen {
        Screen::Home => handle_home(app, key),
        Screen::Playground => handle_playground_normal(app, key),
        Screen::Docs => handle_docs(app, key),
    }
}

fn handle_home(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('p') => app.screen = Screen::Playground,
        KeyCode::Char('d') => app.screen = Screen::Docs,
        _ => {}
    }
}

fn handle_docs(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.docs_scroll = app.docs_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => app.docs_scroll = app.docs_scroll.saturating_sub(1),
        KeyCode::Char('g') => app.docs_scroll = 0,
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.docs_scroll = app.docs_scroll.saturating_add(10);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.docs_scroll = app.docs_scroll.saturating_sub(10);
        }
        _ => {}
    }
}

fn handle_playground_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::Enter | KeyCode::Char('i') if app.focus.is_text() => {
            app.sync_inputs();
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('/') => {
            app.focus = Field::Prompt;
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Esc => {
            if !app.cancel_requests() {
                app.playground.frame_mut().dismiss();
            }
        }

        // AI actions
        KeyCode::Char('r') => app.trigger_action(AiAction::Refactor),
        KeyCode::Char('t') => app.trigger_action(AiAction::AddTypes),
        KeyCode::Char('f') => app.trigger_action(AiAction::FixBugs),
        KeyCode::Char('e') => app.trigger_action(AiAction::Explain),
        KeyCode::Char('g') => app.start_generate(),

        // Frame side effects
        KeyCode::Char('c') => app.copy_code(),
        KeyCode::Char('x') => app.start_export(),
        KeyCode::Char('d') => app.playground.frame_mut().dismiss(),
        KeyCode::Char('j') | KeyCode::Down => app.scroll_frame(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_frame(-1),
        KeyCode::PageDown => app.scroll_frame(10),
        KeyCode::PageUp => app.scroll_frame(-10),

        // Appearance
        KeyCode::Char('T') => app.playground.cycle_theme(),
        KeyCode::Char('p') => app.playground.cycle_padding(),
        KeyCode::Char('n') => app.playground.toggle_line_numbers(),
        KeyCode::Char('w') => app.playground.toggle_wrap(),

        KeyCode::Char('M') => app.cycle_model(),
        KeyCode::Char('K') => {
            app.show_api_key_input = true;
            app.api_key_input.clear();
        }
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    let focus = app.focus;
    if key.code == KeyCode::Esc {
        app.commit_field();
        app.input_mode = InputMode::Normal;
        return;
    }

    if key.code == KeyCode::Enter {
        match focus {
            Field::Code => {
                if let Some(input) = app.focused_input() {
                    input.insert('\n');
                }
                app.commit_field();
            }
            Field::Prompt => {
                app.commit_field();
                app.start_generate();
                app.input_mode = InputMode::Normal;
            }
            _ => {
                app.commit_field();
                app.input_mode = InputMode::Normal;
            }
        }
        return;
    }

    let Some(input) = app.focused_input() else {
        app.input_mode = InputMode::Normal;
        return;
    };
    match key.code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        KeyCode::Tab if focus == Field::Code => {
            for _ in 0..2 {
                input.insert(' ');
            }
        }
        KeyCode::Char(c) => input.insert(c),
        _ => return,
    }

    // The code editor drives the frame live; the other fields commit on exit.
    if focus == Field::Code {
        app.commit_field();
    }
}
