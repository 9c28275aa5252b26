use chrono::Local;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use validator_core::idea::UNTITLED;
use validator_core::{ChatRole, JudgementEntry, ToneLevel};

use crate::app::{App, FormField, Screen, TextInput};

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(bold_text, Style::default().add_modifier(Modifier::BOLD)));
            } else {
                // Unclosed, keep it literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Form => render_form_screen(app, frame, body_area),
        Screen::Result => render_result_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let judged = app.session.history().len();
    let judged_indicator = if judged > 0 {
        format!(" [{} julgada{}]", judged, if judged == 1 { "" } else { "s" })
    } else {
        String::new()
    };

    let title = Line::from(vec![
        Span::styled(" SaaS Validator ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("Honestity as a Service", Style::default().fg(Color::DarkGray).italic()),
        Span::styled(judged_indicator, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(title), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.screen {
        Screen::Form => (" IDEIA ", Style::default().bg(Color::Yellow).fg(Color::Black)),
        Screen::Result => (" VEREDITO ", Style::default().bg(Color::Blue).fg(Color::White)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];

    let hints: Vec<(&str, &str)> = match app.screen {
        Screen::Form => {
            let mut hints = vec![(" Tab ", " campo "), (" Ctrl-S ", " analisar ")];
            if app.focus == FormField::Tone {
                hints.push((" ←/→ ", " sarcasmo "));
            }
            if !app.session.history().is_empty() {
                hints.push((" Esc ", " resultado "));
            }
            hints.push((" Ctrl-Q ", " sair "));
            hints
        }
        Screen::Result => vec![
            (" j/k ", " histórico "),
            (" PgUp/PgDn ", " rolar "),
            (" c ", " copiar "),
            (" e ", " outra ideia "),
            (" n ", " nova consulta "),
            (" q ", " sair "),
        ],
    };

    for (key, label) in hints {
        spans.push(Span::styled(key, key_style));
        spans.push(Span::styled(label, label_style));
    }

    if let Some(status) = &app.status {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Green)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn field_block(title: &str, focused: bool) -> Block<'_> {
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title)
}

fn render_form_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [title_area, description_area, tone_area, submit_area, error_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(2),
    ])
    .areas(area);

    // Title: single line with horizontal scrolling
    let title_focused = app.focus == FormField::Title;
    let inner_width = title_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.title.cursor();
    let scroll_offset = if inner_width > 0 && cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };
    let visible_title: String = app
        .title
        .value()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();
    let title = Paragraph::new(visible_title)
        .style(Style::default().fg(Color::Cyan))
        .block(field_block(" Título ", title_focused));
    frame.render_widget(title, title_area);

    if title_focused {
        frame.set_cursor_position((
            title_area.x + 1 + (cursor_pos - scroll_offset) as u16,
            title_area.y + 1,
        ));
    }

    // Description: multi-line, scrolled to keep the cursor line visible
    let description_focused = app.focus == FormField::Description;
    let inner_height = description_area.height.saturating_sub(2) as usize;
    let (line, col) = app.description.cursor_line_col();
    let v_scroll = if inner_height > 0 && line >= inner_height {
        line - inner_height + 1
    } else {
        0
    };
    let description = Paragraph::new(description_text(&app.description))
        .style(Style::default().fg(Color::Cyan))
        .block(field_block(" Descrição ", description_focused))
        .scroll((v_scroll as u16, 0));
    frame.render_widget(description, description_area);

    if description_focused {
        let max_col = description_area.width.saturating_sub(3) as usize;
        frame.set_cursor_position((
            description_area.x + 1 + col.min(max_col) as u16,
            description_area.y + 1 + (line - v_scroll) as u16,
        ));
    }

    let tone = Paragraph::new(tone_slider(app.tone, tone_area.width.saturating_sub(2)))
        .block(field_block(" Nível de sarcasmo ", app.focus == FormField::Tone));
    frame.render_widget(tone, tone_area);

    let (label, style) = if app.is_loading() {
        ("[ Analisando... ]", Style::default().fg(Color::DarkGray))
    } else if app.focus == FormField::Submit {
        ("[ Analisar ideia ]", Style::default().bg(Color::Yellow).fg(Color::Black).bold())
    } else {
        ("[ Analisar ideia ]", Style::default().fg(Color::Yellow))
    };
    frame.render_widget(Paragraph::new(Line::from(Span::styled(label, style))).centered(), submit_area);

    if let Some(error) = app.session.error() {
        let error_line = Paragraph::new(Line::from(vec![
            Span::styled("Erro: ", Style::default().fg(Color::Red).bold()),
            Span::styled(error.to_string(), Style::default().fg(Color::Red)),
        ]))
        .wrap(Wrap { trim: true });
        frame.render_widget(error_line, error_area);
    }
}

fn description_text(input: &TextInput) -> Text<'static> {
    if input.value().is_empty() {
        return Text::from(Span::styled(
            "Explique o que o seu SaaS faz...",
            Style::default().fg(Color::DarkGray),
        ));
    }
    Text::from(
        input
            .value()
            .split('\n')
            .map(|line| Line::from(line.to_string()))
            .collect::<Vec<_>>(),
    )
}

/// Renders the tone as `1 ━━━━●──── 10  5/10`.
fn tone_slider(tone: ToneLevel, width: u16) -> Line<'static> {
    let label = format!("  {}/{}", tone.get(), ToneLevel::MAX);
    let track = (width as usize).saturating_sub(label.len() + 5).max(ToneLevel::MAX as usize);
    let filled = track * (tone.get() - ToneLevel::MIN) as usize / (ToneLevel::MAX - ToneLevel::MIN) as usize;
    let rest = track.saturating_sub(filled + 1);

    let color = match tone.get() {
        1..=3 => Color::Green,
        4..=7 => Color::Yellow,
        _ => Color::Red,
    };

    Line::from(vec![
        Span::styled("1 ", Style::default().fg(Color::DarkGray)),
        Span::styled("━".repeat(filled), Style::default().fg(color)),
        Span::styled("●", Style::default().fg(color).bold()),
        Span::styled("─".repeat(rest), Style::default().fg(Color::DarkGray)),
        Span::styled(" 10", Style::default().fg(Color::DarkGray)),
        Span::styled(label, Style::default().fg(color).bold()),
    ])
}

fn render_result_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [transcript_area, side_area] = Layout::horizontal([
        Constraint::Percentage(65),
        Constraint::Percentage(35),
    ])
    .areas(area);

    let [history_area, detail_area] = Layout::vertical([
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ])
    .areas(side_area);

    // Store areas for mouse hit-testing
    app.transcript_area = Some(transcript_area);
    app.history_area = Some(history_area);

    render_transcript(app, frame, transcript_area);
    render_history(app, frame, history_area);
    render_detail(app, frame, detail_area);
}

fn render_transcript(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", app.session.settings().model));

    let active_reveal = app.reveal.as_ref().map(|r| r.id());
    let mut lines: Vec<Line> = Vec::new();

    for msg in app.session.transcript() {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "Você:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in msg.text.lines() {
                    lines.push(Line::from(line.to_string()));
                }
                lines.push(Line::default());
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    "IA:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                if msg.revealing && active_reveal == Some(msg.id) {
                    let mut typed: Vec<Line> = app.typing_text.lines().map(parse_markdown_line).collect();
                    match typed.last_mut() {
                        Some(last) => last.push_span(Span::styled("▌", Style::default().fg(Color::Yellow))),
                        None => typed.push(Line::from(Span::styled("▌", Style::default().fg(Color::Yellow)))),
                    }
                    lines.extend(typed);
                } else {
                    lines.extend(msg.text.lines().map(parse_markdown_line));
                }
                lines.push(Line::default());
            }
        }
    }

    if app.is_loading() {
        lines.push(Line::from(Span::styled(
            "IA:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Analisando{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let transcript = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.transcript_scroll, 0));

    frame.render_widget(transcript, area);
}

fn entry_title(entry: &JudgementEntry) -> &str {
    if entry.title.is_empty() {
        UNTITLED
    } else {
        &entry.title
    }
}

fn render_history(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Histórico ");

    let items: Vec<ListItem> = app
        .session
        .history()
        .iter()
        .map(|entry| {
            let time = entry
                .created_at()
                .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
                .unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", time), Style::default().fg(Color::DarkGray)),
                Span::raw(entry_title(entry).to_string()),
                Span::styled(format!(" {}/10", entry.tone_level), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.history_state);
}

fn render_detail(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Veredito ");

    let Some(entry) = app.selected_entry() else {
        let empty = Paragraph::new(Span::styled(
            "Nenhuma ideia julgada ainda.",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(entry_title(entry).to_string(), Style::default().fg(Color::Cyan).bold())),
        Line::from(Span::styled(
            format!("Sarcasmo {}/10", entry.tone_level),
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
    ];
    lines.extend(entry.reply_text.lines().map(parse_markdown_line));

    let detail = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(detail, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_bold_markdown() {
        let line = parse_markdown_line("Nota: **2/10**, desista");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "2/10");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(line_text(&line), "Nota: 2/10, desista");
    }

    #[test]
    fn test_unclosed_bold_is_literal() {
        let line = parse_markdown_line("**sem fim");
        assert_eq!(line_text(&line), "**sem fim");
    }

    #[test]
    fn test_tone_slider_shows_level() {
        let line = tone_slider(ToneLevel::new(8), 40);
        assert!(line_text(&line).ends_with("8/10"));

        let min = tone_slider(ToneLevel::new(1), 40);
        assert!(line_text(&min).starts_with("1 ●"));
    }
}
