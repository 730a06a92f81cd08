//! The code frame widget: gradient backdrop, window chrome, highlighted code,
//! and the AI toolbar.

use lumina_core::{AiAction, CodeDocument, CodeFrame, FrameState, Theme};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

use crate::highlight::highlight_code;

const WINDOW_BG: Color = Color::Rgb(0x11, 0x18, 0x27);
const CHROME_FG: Color = Color::Rgb(0x9c, 0xa3, 0xaf);
const GUTTER_FG: Color = Color::Rgb(0x4b, 0x55, 0x63);
const MIN_WIDTH: u16 = 44;
/// Code column width used when long lines wrap.
const WRAP_COLUMNS: usize = 80;
/// Tallest code area; longer documents scroll inside the window.
pub const MAX_CODE_ROWS: usize = 30;
/// Lines highlighted above the visible window so multi-line constructs
/// keep their colour after scrolling.
const HIGHLIGHT_CONTEXT: usize = 200;

pub fn theme_color(theme: Theme, t: f32) -> Color {
    let (r, g, b) = theme.gradient_at(t);
    Color::Rgb(r, g, b)
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Largest useful scroll offset for `document`, in source lines.
pub fn max_scroll(document: &CodeDocument) -> usize {
    document.line_count().saturating_sub(MAX_CODE_ROWS)
}

pub struct CodeFrameView<'a> {
    frame: &'a CodeFrame,
    show_toolbar: bool,
    animation_frame: u8,
    scroll: usize,
}

impl<'a> CodeFrameView<'a> {
    pub fn new(frame: &'a CodeFrame) -> Self {
        Self {
            frame,
            show_toolbar: true,
            animation_frame: 0,
            scroll: 0,
        }
    }

    /// Hide the AI toolbar, for read-only showcase frames.
    pub fn without_toolbar(mut self) -> Self {
        self.show_toolbar = false;
        self
    }

    pub fn animation_frame(mut self, frame: u8) -> Self {
        self.animation_frame = frame;
        self
    }

    /// First source line shown in the code area.
    pub fn scroll(mut self, line: usize) -> Self {
        self.scroll = line;
        self
    }

    fn first_line(&self) -> usize {
        self.scroll.min(max_scroll(self.frame.document()))
    }

    fn gutter_width(&self) -> u16 {
        if self.frame.document().show_line_numbers {
            to_u16(self.frame.document().line_count().to_string().len() + 2)
        } else {
            0
        }
    }

    fn horizontal_padding(&self) -> u16 {
        self.frame.document().padding.cells() * 2
    }

    fn vertical_padding(&self) -> u16 {
        self.frame.document().padding.cells()
    }

    /// Text shown under the code: explanation or advisory.
    fn message(&self) -> Option<(String, Color)> {
        if let Some(text) = self.frame.explanation() {
            return Some((text.to_string(), Color::Rgb(0xc4, 0xb5, 0xfd)));
        }
        self.frame
            .advisory()
            .map(|a| (a.text.clone(), Color::Rgb(0xfc, 0xd3, 0x4d)))
    }

    fn wrapped_rows(text: &str, width: usize) -> usize {
        let width = width.max(1);
        text.lines()
            .map(|l| l.chars().count().max(1).div_ceil(width))
            .sum::<usize>()
            .max(1)
    }

    fn code_columns(&self) -> usize {
        let longest = self
            .frame
            .code()
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);
        if self.frame.document().wrap_long_lines {
            longest.clamp(1, WRAP_COLUMNS)
        } else {
            longest.max(1)
        }
    }

    /// Rows the code needs, capped at [`MAX_CODE_ROWS`].
    fn code_rows(&self, code_width: usize) -> usize {
        let rows = if self.frame.document().wrap_long_lines {
            self.frame
                .code()
                .lines()
                .skip(self.first_line())
                .take(MAX_CODE_ROWS)
                .map(|l| Self::wrapped_rows(l, code_width))
                .sum::<usize>()
        } else {
            self.frame.document().line_count()
        };
        rows.clamp(1, MAX_CODE_ROWS)
    }

    /// Size the frame wants, with the width capped at `max_width`.
    pub fn natural_size(&self, max_width: u16) -> (u16, u16) {
        let chrome = self.horizontal_padding() as usize * 2 + 2 + 2;
        let gutter = self.gutter_width() as usize;
        let width = (self.code_columns() + gutter + chrome)
            .clamp(MIN_WIDTH as usize, max_width.max(MIN_WIDTH) as usize);

        let inner_width = width.saturating_sub(chrome);
        let code_rows = self.code_rows(inner_width.saturating_sub(gutter));

        let mut height = self.vertical_padding() as usize * 2 + 2 + 2 + code_rows;
        if self.show_toolbar {
            height += 1;
            if let Some((text, _)) = self.message() {
                height += Self::wrapped_rows(&text, inner_width) + 1;
            }
        }
        (to_u16(width), to_u16(height))
    }

    fn render_backdrop(&self, area: Rect, buf: &mut Buffer) {
        let theme = self.frame.document().theme;
        let span = (area.width as u32 + area.height as u32).max(1) as f32;
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                let t = ((x - area.x) as u32 + (y - area.y) as u32) as f32 / span;
                buf.set_style(Rect::new(x, y, 1, 1), Style::default().bg(theme_color(theme, t)));
            }
        }
    }

    fn header_line(&self, width: u16) -> Line<'static> {
        let title = self.frame.document().title.clone();
        let copy_label = if self.frame.copied() { "✓ copied" } else { "⧉ copy" };
        let copy_style = if self.frame.copied() {
            Style::default().fg(Color::Rgb(0x4a, 0xde, 0x80))
        } else {
            Style::default().fg(CHROME_FG)
        };

        let dots = 5u16; // "● ● ●"
        let title_width = title.chars().count() as u16 + 2;
        let copy_width = copy_label.chars().count() as u16;
        let left_gap = (width.saturating_sub(title_width) / 2).saturating_sub(dots);
        let right_gap = width.saturating_sub(dots + left_gap + title_width + copy_width);

        Line::from(vec![
            Span::styled("●", Style::default().fg(Color::Rgb(0xef, 0x44, 0x44))),
            Span::raw(" "),
            Span::styled("●", Style::default().fg(Color::Rgb(0xea, 0xb3, 0x08))),
            Span::raw(" "),
            Span::styled("●", Style::default().fg(Color::Rgb(0x22, 0xc5, 0x5e))),
            Span::raw(" ".repeat(left_gap as usize)),
            Span::styled(format!(" {} ", title), Style::default().fg(CHROME_FG)),
            Span::raw(" ".repeat(right_gap as usize)),
            Span::styled(copy_label, copy_style),
        ])
    }

    fn code_lines(&self) -> Vec<Line<'static>> {
        let document = self.frame.document();
        let first = self.first_line();
        let start = first.saturating_sub(HIGHLIGHT_CONTEXT);
        let window: String = document
            .code
            .split_inclusive('\n')
            .skip(start)
            .take(first - start + MAX_CODE_ROWS)
            .collect();
        let highlighted = highlight_code(&window, &document.language)
            .into_iter()
            .enumerate()
            .skip(first - start);
        if !document.show_line_numbers {
            return highlighted.map(|(_, line)| line).collect();
        }

        let digits = document.line_count().to_string().len();
        highlighted
            .map(|(i, line)| {
                let mut spans = vec![Span::styled(
                    format!("{:>width$}  ", start + i + 1, width = digits),
                    Style::default().fg(GUTTER_FG),
                )];
                spans.extend(line.spans);
                Line::from(spans)
            })
            .collect()
    }

    fn toolbar_line(&self) -> Line<'static> {
        if let FrameState::Pending { action, .. } = self.frame.state() {
            let dots = ".".repeat(self.animation_frame as usize % 3 + 1);
            return Line::from(Span::styled(
                format!("✦ {}{}", action.display_name(), dots),
                Style::default().fg(Color::Rgb(0xa7, 0x8b, 0xfa)).add_modifier(Modifier::ITALIC),
            ));
        }

        let key = |action: AiAction| match action {
            AiAction::Refactor => "r",
            AiAction::AddTypes => "t",
            AiAction::FixBugs => "f",
            AiAction::Explain => "e",
        };
        let mut spans = Vec::new();
        for action in AiAction::all() {
            spans.push(Span::styled(
                format!("[{}]", key(action)),
                Style::default().fg(Color::Rgb(0x67, 0xe8, 0xf9)),
            ));
            spans.push(Span::styled(
                format!(" {}  ", action.display_name()),
                Style::default().fg(CHROME_FG),
            ));
        }
        Line::from(spans)
    }
}

impl Widget for CodeFrameView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.render_backdrop(area, buf);

        let pad_x = self.horizontal_padding();
        let pad_y = self.vertical_padding();
        let window = Rect::new(
            area.x + pad_x.min(area.width / 2),
            area.y + pad_y.min(area.height / 2),
            area.width.saturating_sub(pad_x * 2),
            area.height.saturating_sub(pad_y * 2),
        );
        if window.width < 4 || window.height < 3 {
            return;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(0x33, 0x3b, 0x4d)))
            .style(Style::default().bg(WINDOW_BG));
        let inner = block.inner(window);
        block.render(window, buf);

        let inner = Rect::new(
            inner.x + 1,
            inner.y,
            inner.width.saturating_sub(2),
            inner.height,
        );
        if inner.height == 0 {
            return;
        }

        Paragraph::new(self.header_line(inner.width)).render(Rect::new(inner.x, inner.y, inner.width, 1), buf);

        let footer_rows = if self.show_toolbar {
            let message_rows = self
                .message()
                .map(|(text, _)| Self::wrapped_rows(&text, inner.width as usize) + 1)
                .unwrap_or(0);
            to_u16(1 + message_rows)
        } else {
            0
        };

        let code_area = Rect::new(
            inner.x,
            inner.y.saturating_add(2),
            inner.width,
            inner.height.saturating_sub(footer_rows.saturating_add(2)),
        );
        let mut code = Paragraph::new(self.code_lines());
        if self.frame.document().wrap_long_lines {
            code = code.wrap(Wrap { trim: false });
        }
        code.render(code_area, buf);

        if !self.show_toolbar {
            return;
        }

        let mut y = code_area.bottom();
        if let Some((text, color)) = self.message() {
            y = y.saturating_add(1);
            let rows = to_u16(Self::wrapped_rows(&text, inner.width as usize));
            Paragraph::new(text)
                .style(Style::default().fg(color))
                .wrap(Wrap { trim: true })
                .render(Rect::new(inner.x, y, inner.width, rows.min(inner.bottom().saturating_sub(y))), buf);
            y = y.saturating_add(rows);
        }
        if y < inner.bottom() {
            Paragraph::new(self.toolbar_line()).render(Rect::new(inner.x, y, inner.width, 1), buf);
        }
    }
}

/// Render the frame at its natural size into a fresh buffer.
pub fn render_offscreen(view: CodeFrameView<'_>, max_width: u16, max_height: u16) -> Buffer {
    let (width, height) = view.natural_size(max_width);
    let area = Rect::new(0, 0, width, height.min(max_height));
    let mut buf = Buffer::empty(area);
    view.render(area, &mut buf);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_core::{AssistantSettings, CodeDocument, Credential, Padding};

    fn frame(code: &str) -> CodeFrame {
        let mut doc = CodeDocument::new(code);
        doc.title = "Demo.ts".into();
        CodeFrame::new(doc, &Credential::default(), AssistantSettings::default())
    }

    fn buffer_text(buf: &Buffer) -> String {
        let width = buf.area.width as usize;
        buf.content
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_natural_size_grows_with_code() {
        let small = frame("a");
        let tall = frame("a\nb\nc\nd");
        let (_, small_h) = CodeFrameView::new(&small).natural_size(200);
        let (_, tall_h) = CodeFrameView::new(&tall).natural_size(200);
        assert_eq!(tall_h, small_h + 3);
    }

    #[test]
    fn test_padding_changes_size() {
        let mut doc = CodeDocument::new("let x = 1;");
        doc.padding = Padding::Sm;
        let sm = CodeFrame::new(doc.clone(), &Credential::default(), AssistantSettings::default());
        doc.padding = Padding::Xl;
        let xl = CodeFrame::new(doc, &Credential::default(), AssistantSettings::default());

        let (_, sm_h) = CodeFrameView::new(&sm).natural_size(200);
        let (_, xl_h) = CodeFrameView::new(&xl).natural_size(200);
        assert_eq!(xl_h - sm_h, (Padding::Xl.cells() - Padding::Sm.cells()) * 2);
    }

    #[test]
    fn test_offscreen_render_shows_title_and_code() {
        let frame = frame("const answer = 42;");
        let buf = render_offscreen(CodeFrameView::new(&frame), 120, u16::MAX);
        let text = buffer_text(&buf);

        assert!(text.contains("Demo.ts"));
        assert!(text.contains("const answer = 42;"));
        assert!(text.contains("1  const"));
        assert!(text.contains("Refactor"));
    }

    #[test]
    fn test_backdrop_uses_theme_gradient() {
        let frame = frame("x");
        let buf = render_offscreen(CodeFrameView::new(&frame).without_toolbar(), 120, u16::MAX);
        assert_eq!(buf.content[0].bg, theme_color(Theme::Neon, 0.0));
    }

    #[test]
    fn test_huge_document_height_is_capped() {
        let frame = frame(&"let value = 1;\n".repeat(70_000));
        let view = CodeFrameView::new(&frame);
        let (_, height) = view.natural_size(140);

        let chrome_rows = Padding::Md.cells() * 2 + 2 + 2 + 1;
        assert_eq!(height, chrome_rows + MAX_CODE_ROWS as u16);
    }

    #[test]
    fn test_huge_document_scrolls_to_last_line() {
        let frame = frame(&"let value = 1;\n".repeat(70_000));
        assert_eq!(max_scroll(frame.document()), 70_000 - MAX_CODE_ROWS);

        let buf = render_offscreen(CodeFrameView::new(&frame).scroll(usize::MAX), 140, u16::MAX);
        let text = buffer_text(&buf);
        assert!(text.contains("70000  let value = 1;"));
        assert!(!text.contains("    1  let"));
    }

    #[test]
    fn test_long_wrapped_lines_do_not_overflow() {
        let mut doc = CodeDocument::new("x".repeat(200_000));
        doc.wrap_long_lines = true;
        let frame = CodeFrame::new(doc, &Credential::default(), AssistantSettings::default());
        let (_, height) = CodeFrameView::new(&frame).natural_size(140);
        assert!(height <= Padding::Md.cells() * 2 + 5 + MAX_CODE_ROWS as u16);
    }

    #[test]
    fn test_offscreen_height_limit() {
        let frame = frame(&"x\n".repeat(3000));
        let buf = render_offscreen(CodeFrameView::new(&frame), 140, 20);
        assert_eq!(buf.area.height, 20);
    }

    #[test]
    fn test_wrapping_caps_width() {
        let mut doc = CodeDocument::new("x".repeat(300));
        doc.wrap_long_lines = true;
        let frame = CodeFrame::new(doc, &Credential::default(), AssistantSettings::default());
        let (width, _) = CodeFrameView::new(&frame).natural_size(400);
        assert!(width < 120);
    }
}
