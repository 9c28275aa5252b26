use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::warn;
use validator_core::ToneLevel;

use crate::app::{App, FormField, Screen, TextInput};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Reveal(event) => app.apply_reveal(event),
        AppEvent::Completed(outcome) => app.complete_submission(outcome),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work on every screen
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('s') => {
                app.submit();
                return;
            }
            KeyCode::Char('n') => {
                app.start_new();
                return;
            }
            _ => {}
        }
    }

    match app.screen {
        Screen::Form => handle_form(app, key),
        Screen::Result => handle_result(app, key),
    }
}

fn handle_form(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::BackTab => app.focus = app.focus.prev(),
        KeyCode::Esc => {
            if !app.session.history().is_empty() || app.is_loading() {
                app.screen = Screen::Result;
            }
        }
        _ => match app.focus {
            FormField::Title => match key.code {
                KeyCode::Enter | KeyCode::Down => app.focus = FormField::Description,
                _ => edit_text(&mut app.title, key),
            },
            FormField::Description => match key.code {
                KeyCode::Enter => app.description.insert('\n'),
                _ => edit_text(&mut app.description, key),
            },
            FormField::Tone => match key.code {
                KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') => app.tone = app.tone.lower(),
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') => app.tone = app.tone.raise(),
                KeyCode::Char(c @ '1'..='9') => app.tone = ToneLevel::new(c as u8 - b'0'),
                KeyCode::Char('0') => app.tone = ToneLevel::new(10),
                KeyCode::Enter | KeyCode::Down => app.focus = FormField::Submit,
                KeyCode::Up => app.focus = FormField::Description,
                _ => {}
            },
            FormField::Submit => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => app.submit(),
                KeyCode::Up => app.focus = FormField::Tone,
                _ => {}
            },
        },
    }
}

fn edit_text(input: &mut TextInput, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.insert(c),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        _ => {}
    }
}

fn handle_result(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('n') => app.start_new(),
        KeyCode::Char('e') | KeyCode::Esc => app.edit_form(),
        KeyCode::Char('c') => {
            if let Some(entry) = app.selected_entry() {
                let text = entry.reply_text.clone();
                app.status = Some(match copy_to_clipboard(&text) {
                    Ok(()) => "Copiado!".to_string(),
                    Err(e) => {
                        warn!(error = %e, "clipboard copy failed");
                        "Erro ao copiar".to_string()
                    }
                });
            }
        }
        KeyCode::Char('j') | KeyCode::Down => app.history_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.history_nav_up(),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => app.scroll_down(10),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.scroll_up(10),
        KeyCode::Char('g') => app.transcript_scroll = 0,
        // Skip the typewriter and show every reply in full
        KeyCode::Char(' ') | KeyCode::Enter => app.skip_reveal(),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_transcript = app.transcript_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_history = app.history_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_transcript {
                app.scroll_down(3);
            } else if in_history {
                app.history_nav_down();
            }
        }
        MouseEventKind::ScrollUp => {
            if in_transcript {
                app.scroll_up(3);
            } else if in_history {
                app.history_nav_up();
            }
        }
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

/// Pipes `text` into the first clipboard tool that is installed.
fn copy_to_clipboard(text: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let candidates: [(&str, &[&str]); 3] = [
        ("pbcopy", &[]),
        ("wl-copy", &[]),
        ("xclip", &["-selection", "clipboard"]),
    ];

    let mut last_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no clipboard tool found");
    for (program, args) in candidates {
        match Command::new(program).args(args).stdin(Stdio::piped()).spawn() {
            Ok(mut child) => {
                if let Some(mut stdin) = child.stdin.take() {
                    stdin.write_all(text.as_bytes())?;
                }
                child.wait()?;
                return Ok(());
            }
            Err(e) => last_err = e,
        }
    }
    Err(last_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use validator_core::{Config, ProxyTransport};
    use std::sync::Arc;

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        // Nothing listens here; these tests never submit a valid idea.
        let transport = Arc::new(ProxyTransport::new("http://127.0.0.1:9/api/openai"));
        App::with_transport(&Config::default(), transport, tx)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut app = app();
        type_str(&mut app, "ZapShip");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.focus, FormField::Description);

        type_str(&mut app, "linha 1");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "linha 2");

        assert_eq!(app.title.value(), "ZapShip");
        assert_eq!(app.description.value(), "linha 1\nlinha 2");
    }

    #[test]
    fn test_tone_keys_clamp() {
        let mut app = app();
        app.focus = FormField::Tone;
        for _ in 0..20 {
            press(&mut app, KeyCode::Right);
        }
        assert_eq!(app.tone, ToneLevel::new(10));

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.tone, ToneLevel::new(3));
        for _ in 0..5 {
            press(&mut app, KeyCode::Left);
        }
        assert_eq!(app.tone, ToneLevel::new(1));
    }

    #[test]
    fn test_focus_wraps_with_tab() {
        let mut app = app();
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focus, FormField::Submit);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, FormField::Title);
    }

    #[tokio::test]
    async fn test_submit_empty_form_shows_error() {
        let mut app = app();
        app.focus = FormField::Submit;
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Form);
        assert!(app.in_flight.is_none());
        assert!(app.session.error().is_some());
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = app();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_esc_without_history_stays_on_form() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Form);
    }

    #[test]
    fn test_point_in_rect() {
        let rect = Rect::new(2, 2, 4, 3);
        assert!(point_in_rect(2, 2, rect));
        assert!(point_in_rect(5, 4, rect));
        assert!(!point_in_rect(6, 4, rect));
        assert!(!point_in_rect(1, 3, rect));
    }
}
