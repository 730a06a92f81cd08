use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use lumina_core::{AssistantSettings, CodeDocument, CodeFrame, Credential, Padding, Theme};

use crate::app::{App, Field, InputMode, Screen};
use crate::widget::{theme_color, CodeFrameView};

const ACCENT: Color = Color::Rgb(0x22, 0xd3, 0xee);
const MUTED: Color = Color::Rgb(0x6b, 0x72, 0x80);

const SHOWCASE_CODE: &str = "const greet = (name: string) => {\n  return `Hello, ${name}!`;\n};";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: navbar, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_navbar(app, frame, header_area);

    match app.screen {
        Screen::Home => render_home(frame, body_area),
        Screen::Playground => render_playground(app, frame, body_area),
        Screen::Docs => render_docs(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    // Popups (alert has priority)
    if let Some(alert) = app.playground.alert() {
        render_alert(alert, frame, area);
    } else if app.show_api_key_input {
        render_api_key_input(app, frame, area);
    }
}

fn render_navbar(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(" ◆ Lumina", Style::default().fg(ACCENT).bold()),
        Span::styled("Frame ", Style::default().fg(Color::White).bold()),
        Span::raw("  "),
    ];

    for (i, screen) in Screen::all().iter().enumerate() {
        let style = if *screen == app.screen {
            Style::default().fg(Color::Black).bg(ACCENT).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} {} ", i + 1, screen.label()), style));
        spans.push(Span::raw(" "));
    }

    spans.push(Span::styled(
        format!("v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(MUTED),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Rgb(0x0f, 0x17, 0x2a)));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    let hints = match (app.screen, app.input_mode) {
        (Screen::Home, _) => "Enter: playground  d: docs  q: quit",
        (Screen::Docs, _) => "j/k: scroll  1-3: switch view  q: quit",
        (Screen::Playground, InputMode::Editing) => "Esc: done  Enter: submit/newline",
        (Screen::Playground, InputMode::Normal) => {
            "Tab: focus  Enter: edit  g: generate  r/t/f/e: AI  c: copy  x: export  j/k: scroll  T/p/n/w: style  M: model  K: key  Esc: cancel"
        }
    };

    let mut spans = vec![
        Span::styled(mode_text, mode_style),
        Span::raw(" "),
        Span::styled(hints, Style::default().fg(MUTED)),
    ];
    if let Some(status) = &app.status {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Green)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_home(frame: &mut Frame, area: Rect) {
    let [hero_area, showcase_area] =
        Layout::vertical([Constraint::Length(11), Constraint::Min(0)]).areas(area);

    let hero = Text::from(vec![
        Line::default(),
        Line::from(Span::styled("Beautiful code frames,", Style::default().fg(Color::White).bold())),
        Line::from(Span::styled("supercharged with AI.", Style::default().fg(ACCENT).bold())),
        Line::default(),
        Line::from(Span::styled(
            "Present snippets in a stylish window with gradient backdrops,",
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            "then refactor, type, fix or explain them with Gemini.",
            Style::default().fg(Color::Gray),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(Color::Black).bg(ACCENT).bold()),
            Span::raw(" Open the playground   "),
            Span::styled(" d ", Style::default().fg(Color::Black).bg(Color::Gray).bold()),
            Span::raw(" Read the docs"),
        ]),
    ]);
    frame.render_widget(Paragraph::new(hero).alignment(Alignment::Center), hero_area);

    let mut document = CodeDocument::new(SHOWCASE_CODE);
    document.title = "greet.ts".to_string();
    document.padding = Padding::Sm;
    let showcase = CodeFrame::new(document, &Credential::default(), AssistantSettings::default());
    let view = CodeFrameView::new(&showcase).without_toolbar();
    let (width, height) = view.natural_size(showcase_area.width);
    let centered = Rect::new(
        showcase_area.x + showcase_area.width.saturating_sub(width) / 2,
        showcase_area.y,
        width.min(showcase_area.width),
        height.min(showcase_area.height),
    );
    frame.render_widget(view, centered);
}

fn render_docs(app: &App, frame: &mut Frame, area: Rect) {
    let [text_area, themes_area] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area);

    let heading = |s: &'static str| Line::from(Span::styled(s, Style::default().fg(ACCENT).bold()));
    let body = |s: &'static str| Line::from(Span::styled(s, Style::default().fg(Color::Gray)));
    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), Style::default().fg(Color::Yellow)),
            Span::styled(what, Style::default().fg(Color::Gray)),
        ])
    };

    let lines = vec![
        heading("Getting started"),
        body("A code frame shows a snippet inside a window with a gradient"),
        body("backdrop. Frames take a title, language, theme, padding, and"),
        body("toggles for line numbers and long-line wrapping."),
        Line::default(),
        heading("Props"),
        key("code", "source text, replaced whenever the owner changes it"),
        key("language", "syntax used for highlighting"),
        key("title", "label in the window chrome, also names exports"),
        key("theme", "neon | sunset | ocean | forest"),
        key("padding", "sm | md | lg | xl"),
        key("lines", "show line numbers"),
        key("wrap", "wrap long lines"),
        Line::default(),
        heading("AI integration"),
        body("With a Gemini API key the frame unlocks Refactor, Add Types,"),
        body("Fix Bugs and Explain. The key lives in memory for the session"),
        body("only; set GEMINI_API_KEY or press K in the playground."),
        body("Rewrites replace the frame's code. Explanations appear below"),
        body("the code until dismissed. Editing the code while a request is"),
        body("running discards the late result."),
        Line::default(),
        heading("Export"),
        body("x renders the frame at 2x, adds a footer band with the"),
        body("LuminaFrame watermark and saves <title>-lumina-frame.png."),
    ];

    let docs = Paragraph::new(lines)
        .block(Block::default().borders(Borders::RIGHT).border_style(Style::default().fg(MUTED)))
        .wrap(Wrap { trim: false })
        .scroll((app.docs_scroll, 0));
    frame.render_widget(docs, text_area);

    // One small frame per theme
    let mut y = themes_area.y;
    for theme in Theme::all() {
        let mut document = CodeDocument::new("const x = 10;");
        document.title = format!("{}.ts", theme.as_str());
        document.theme = theme;
        document.padding = Padding::Sm;
        document.show_line_numbers = false;
        let showcase = CodeFrame::new(document, &Credential::default(), AssistantSettings::default());
        let view = CodeFrameView::new(&showcase).without_toolbar();
        let (width, height) = view.natural_size(themes_area.width.saturating_sub(2));
        if y + height > themes_area.bottom() {
            break;
        }
        frame.render_widget(view, Rect::new(themes_area.x + 1, y, width.min(themes_area.width.saturating_sub(1)), height));
        y += height;
    }
}

fn render_playground(app: &mut App, frame: &mut Frame, area: Rect) {
    let [controls_area, preview_area] =
        Layout::horizontal([Constraint::Length(46), Constraint::Min(0)]).areas(area);

    render_controls(app, frame, controls_area);

    let view = CodeFrameView::new(app.playground.frame())
        .animation_frame(app.animation_frame)
        .scroll(app.frame_scroll);
    let (width, height) = view.natural_size(preview_area.width.saturating_sub(2));
    let frame_area = Rect::new(
        preview_area.x + preview_area.width.saturating_sub(width) / 2,
        preview_area.y + 1,
        width.min(preview_area.width),
        height.min(preview_area.height.saturating_sub(1)),
    );
    let focused = app.focus == Field::Frame;
    frame.render_widget(view, frame_area);
    if focused {
        let marker = Paragraph::new(Span::styled("▸ frame", Style::default().fg(ACCENT)));
        frame.render_widget(marker, Rect::new(preview_area.x + 1, preview_area.y, 10.min(preview_area.width), 1));
    }
}

fn field_block(app: &App, field: Field, title: &str) -> Block<'static> {
    let border = if app.focus == field {
        if app.input_mode == InputMode::Editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(ACCENT)
        }
    } else {
        Style::default().fg(MUTED)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {} ", title))
}

fn render_controls(app: &App, frame: &mut Frame, area: Rect) {
    let [key_area, prompt_area, settings_area, code_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Min(4),
    ])
    .areas(area);

    // API key status
    let credential = app.playground.credential();
    let key_line = if credential.is_present() {
        Line::from(vec![
            Span::styled("● ", Style::default().fg(Color::Green)),
            Span::styled(credential.masked(), Style::default().fg(Color::Gray)),
        ])
    } else {
        Line::from(vec![
            Span::styled("○ ", Style::default().fg(Color::Red)),
            Span::styled("No key. Press K to add one.", Style::default().fg(MUTED)),
        ])
    };
    let key_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED))
        .title(" Gemini API Key ")
        .title_bottom(Line::from(format!(" {} ", app.playground.settings().model)).right_aligned());
    frame.render_widget(Paragraph::new(key_line).block(key_block), key_area);

    // Prompt
    let prompt_title = if app.playground.is_generating() {
        format!("Generate with AI {}", ".".repeat(app.animation_frame as usize + 1))
    } else {
        "Generate with AI".to_string()
    };
    let prompt_text = if app.prompt_input.value.is_empty() && app.input_mode == InputMode::Normal {
        Span::styled("Describe a component, e.g. a login form", Style::default().fg(MUTED))
    } else {
        Span::raw(app.prompt_input.value.clone())
    };
    let prompt = Paragraph::new(Line::from(prompt_text))
        .block(field_block(app, Field::Prompt, &prompt_title))
        .wrap(Wrap { trim: false });
    frame.render_widget(prompt, prompt_area);

    // Settings
    let document = app.playground.document();
    let toggle = |on: bool| if on { "on" } else { "off" };
    let settings = vec![
        Line::from(vec![
            Span::styled("Theme    ", Style::default().fg(MUTED)),
            Span::styled(document.theme.as_str(), Style::default().fg(theme_color(document.theme, 0.5)).bold()),
            Span::styled("  [T]", Style::default().fg(MUTED)),
        ]),
        Line::from(vec![
            Span::styled("Padding  ", Style::default().fg(MUTED)),
            Span::raw(format!("{} ({}px)", document.padding.as_str(), document.padding.pixels())),
            Span::styled("  [p]", Style::default().fg(MUTED)),
        ]),
        Line::from(vec![
            Span::styled("Lines    ", Style::default().fg(MUTED)),
            Span::raw(toggle(document.show_line_numbers)),
            Span::styled("  [n]   ", Style::default().fg(MUTED)),
            Span::styled("Wrap ", Style::default().fg(MUTED)),
            Span::raw(toggle(document.wrap_long_lines)),
            Span::styled("  [w]", Style::default().fg(MUTED)),
        ]),
        Line::from(vec![
            Span::styled(
                "Title    ",
                Style::default().fg(if app.focus == Field::Title { ACCENT } else { MUTED }),
            ),
            Span::raw(app.title_input.value.clone()),
        ]),
    ];
    let settings_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if matches!(app.focus, Field::Title | Field::Language) {
            ACCENT
        } else {
            MUTED
        }))
        .title(format!(" Settings · {} ", app.language_input.value));
    frame.render_widget(Paragraph::new(settings).block(settings_block), settings_area);

    // Code editor
    let editor = Paragraph::new(app.code_input.value.clone())
        .block(field_block(app, Field::Code, "Code"))
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(editor, code_area);

    // Cursor for the field being edited
    if app.input_mode == InputMode::Editing {
        let cursor = match app.focus {
            Field::Prompt => {
                let (_, col) = app.prompt_input.cursor_position();
                let inner_width = prompt_area.width.saturating_sub(2).max(1) as usize;
                Some((
                    prompt_area.x + 1 + (col % inner_width) as u16,
                    prompt_area.y + 1 + (col / inner_width) as u16,
                ))
            }
            Field::Code => {
                let (row, col) = app.code_input.cursor_position();
                Some((code_area.x + 1 + col as u16, code_area.y + 1 + row as u16))
            }
            Field::Title => {
                let (_, col) = app.title_input.cursor_position();
                Some((settings_area.x + 10 + col as u16, settings_area.y + 4))
            }
            Field::Language => {
                let (_, col) = app.language_input.cursor_position();
                Some((settings_area.x + 13 + col as u16, settings_area.y))
            }
            Field::Frame => None,
        };
        if let Some((x, y)) = cursor {
            if x < area.right() && y < area.bottom() {
                frame.set_cursor_position((x, y));
            }
        }
    }
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height);
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

fn render_alert(message: &str, frame: &mut Frame, area: Rect) {
    let popup = popup_area(area, 44, 5);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Error ");
    let text = Text::from(vec![
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD))),
        Line::default(),
        Line::from(Span::styled("Press Enter to dismiss", Style::default().fg(MUTED))),
    ]);
    frame.render_widget(Paragraph::new(text).block(block).alignment(Alignment::Center), popup);
}

fn render_api_key_input(app: &App, frame: &mut Frame, area: Rect) {
    let popup = popup_area(area, 60, 7);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Enter Gemini API Key ");

    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    // Instructions
    let instructions = Paragraph::new("Paste your API key. Enter to use it, Esc to cancel.")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));

    // Input field, masked
    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);
    let display_text = Credential::new(app.api_key_input.value.clone()).masked();
    frame.render_widget(Paragraph::new(display_text).style(Style::default().fg(Color::Cyan)), input_area);

    let cursor_x = app.api_key_input.cursor.min(input_area.width as usize) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));

    // Status line
    let status = Paragraph::new("Kept in memory for this session only")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, Rect::new(inner.x, inner.y + 4, inner.width, 1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_core::Config;
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    fn draw(app: &mut App) -> String {
        let backend = TestBackend::new(140, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(app, f)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    fn test_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(&Config::new(), Credential::default(), tx)
    }

    #[test]
    fn test_navbar_lists_views() {
        let mut app = test_app();
        let text = draw(&mut app);
        assert!(text.contains("1 Home"));
        assert!(text.contains("2 Playground"));
        assert!(text.contains("3 Docs"));
    }

    #[test]
    fn test_playground_shows_frame_and_key_hint() {
        let mut app = test_app();
        app.screen = Screen::Playground;
        let text = draw(&mut app);
        assert!(text.contains("Component.tsx"));
        assert!(text.contains("No key. Press K to add one."));
    }

    #[test]
    fn test_alert_popup_rendered() {
        let mut app = test_app();
        app.screen = Screen::Playground;
        app.playground.begin_export();
        app.playground.finish_export(Err(lumina_core::CaptureError::EmptyRegion.into()));
        let text = draw(&mut app);
        assert!(text.contains("Failed to download image."));
    }
}
