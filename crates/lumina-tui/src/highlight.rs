//! Syntax highlighting for frame contents via syntect.

use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const THEME_NAME: &str = "base16-ocean.dark";

/// Map a free-form language name to a token syntect knows.
///
/// The bundled syntaxes have no TypeScript grammar, so TS/TSX fall back to
/// JavaScript, which highlights them well enough.
fn syntax_token(language: &str) -> String {
    let language = language.trim().to_lowercase();
    match language.as_str() {
        "typescript" | "ts" | "tsx" | "javascript" | "jsx" | "mjs" => "js".to_string(),
        "python" => "py".to_string(),
        "shell" | "bash" | "zsh" => "sh".to_string(),
        "c++" | "cpp" => "cpp".to_string(),
        "csharp" | "c#" => "cs".to_string(),
        _ => language,
    }
}

fn find_syntax(language: &str) -> &'static SyntaxReference {
    SYNTAX_SET
        .find_syntax_by_token(&syntax_token(language))
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text())
}

/// Highlight `code` into one styled line per source line.
pub fn highlight_code(code: &str, language: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let Some(theme) = THEME_SET.themes.get(THEME_NAME) else {
        return plain_lines(code);
    };
    let mut highlighter = HighlightLines::new(find_syntax(language), theme);

    for line in LinesWithEndings::from(code) {
        match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => {
                let spans: Vec<Span<'static>> = ranges
                    .into_iter()
                    .map(|(style, text)| {
                        let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                        let mut span_style = Style::default().fg(fg);
                        if style.font_style.contains(FontStyle::BOLD) {
                            span_style = span_style.add_modifier(Modifier::BOLD);
                        }
                        if style.font_style.contains(FontStyle::ITALIC) {
                            span_style = span_style.add_modifier(Modifier::ITALIC);
                        }
                        Span::styled(text.trim_end_matches(['\n', '\r']).to_owned(), span_style)
                    })
                    .collect();
                lines.push(Line::from(spans));
            }
            Err(e) => {
                tracing::debug!(error = %e, "highlighting failed, using plain text");
                lines.push(Line::from(line.trim_end_matches(['\n', '\r']).to_owned()));
            }
        }
    }

    if lines.is_empty() {
        lines.push(Line::default());
    }
    lines
}

fn plain_lines(code: &str) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = code.lines().map(|l| Line::from(l.to_owned())).collect();
    if lines.is_empty() {
        lines.push(Line::default());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_one_line_per_source_line() {
        let lines = highlight_code("const a = 1;\nconst b = 2;\n", "typescript");
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[0]), "const a = 1;");
        assert_eq!(line_text(&lines[1]), "const b = 2;");
    }

    #[test]
    fn test_known_language_gets_colours() {
        let lines = highlight_code("fn main() {}", "rust");
        assert!(lines[0].spans.iter().any(|s| s.style.fg.is_some()));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let lines = highlight_code("some words", "klingon");
        assert_eq!(line_text(&lines[0]), "some words");
    }

    #[test]
    fn test_empty_code_has_one_line() {
        assert_eq!(highlight_code("", "rust").len(), 1);
    }

    #[test]
    fn test_typescript_maps_to_javascript() {
        assert_eq!(find_syntax("tsx").name, "JavaScript");
    }
}
