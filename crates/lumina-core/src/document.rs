//! Code document model shared by frames and the playground.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PLAYGROUND_CODE: &str = r#"import React from 'react';

const Greeting = ({ name }: { name: string }) => {
  return (
    <div className="p-4 bg-blue-500 text-white rounded-lg">
      <h1>Hello, {name}!</h1>
      <p>Welcome to the Lumina Playground.</p>
    </div>
  );
};"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Neon,
    Sunset,
    Ocean,
    Forest,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Neon => "neon",
            Theme::Sunset => "sunset",
            Theme::Ocean => "ocean",
            Theme::Forest => "forest",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "neon" => Some(Theme::Neon),
            "sunset" => Some(Theme::Sunset),
            "ocean" => Some(Theme::Ocean),
            "forest" => Some(Theme::Forest),
            _ => None,
        }
    }

    pub fn all() -> Vec<Theme> {
        vec![Theme::Neon, Theme::Sunset, Theme::Ocean, Theme::Forest]
    }

    pub fn next(&self) -> Self {
        match self {
            Theme::Neon => Theme::Sunset,
            Theme::Sunset => Theme::Ocean,
            Theme::Ocean => Theme::Forest,
            Theme::Forest => Theme::Neon,
        }
    }

    /// Start, middle and end colours of the backdrop gradient.
    pub fn gradient(&self) -> [(u8, u8, u8); 3] {
        match self {
            Theme::Neon => [(0xec, 0x48, 0x99), (0xa8, 0x55, 0xf7), (0x06, 0xb6, 0xd4)],
            Theme::Sunset => [(0xf9, 0x73, 0x16), (0xef, 0x44, 0x44), (0xea, 0xb3, 0x08)],
            Theme::Ocean => [(0x25, 0x63, 0xeb), (0x2d, 0xd4, 0xbf), (0x34, 0xd3, 0x99)],
            Theme::Forest => [(0x16, 0xa3, 0x4a), (0x10, 0xb9, 0x81), (0x84, 0xcc, 0x16)],
        }
    }

    /// Gradient colour at `t` in `0.0..=1.0`.
    pub fn gradient_at(&self, t: f32) -> (u8, u8, u8) {
        let [a, b, c] = self.gradient();
        let t = t.clamp(0.0, 1.0);
        let (from, to, local) = if t < 0.5 { (a, b, t * 2.0) } else { (b, c, (t - 0.5) * 2.0) };
        let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * local).round() as u8;
        (mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    Sm,
    #[default]
    Md,
    Lg,
    Xl,
}

impl Padding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Padding::Sm => "sm",
            Padding::Md => "md",
            Padding::Lg => "lg",
            Padding::Xl => "xl",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sm" => Some(Padding::Sm),
            "md" => Some(Padding::Md),
            "lg" => Some(Padding::Lg),
            "xl" => Some(Padding::Xl),
            _ => None,
        }
    }

    pub fn all() -> Vec<Padding> {
        vec![Padding::Sm, Padding::Md, Padding::Lg, Padding::Xl]
    }

    pub fn next(&self) -> Self {
        match self {
            Padding::Sm => Padding::Md,
            Padding::Md => Padding::Lg,
            Padding::Lg => Padding::Xl,
            Padding::Xl => Padding::Sm,
        }
    }

    pub fn pixels(&self) -> u32 {
        match self {
            Padding::Sm => 16,
            Padding::Md => 32,
            Padding::Lg => 48,
            Padding::Xl => 64,
        }
    }

    /// Terminal cells of backdrop around the window, vertically.
    /// Horizontal padding is doubled to account for cell aspect ratio.
    pub fn cells(&self) -> u16 {
        match self {
            Padding::Sm => 1,
            Padding::Md => 2,
            Padding::Lg => 3,
            Padding::Xl => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeDocument {
    pub code: String,
    pub language: String,
    pub title: String,
    pub theme: Theme,
    pub padding: Padding,
    pub show_line_numbers: bool,
    pub wrap_long_lines: bool,
}

impl CodeDocument {
    /// A document with the standalone frame defaults.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: "typescript".to_string(),
            title: "Untitled-1".to_string(),
            theme: Theme::default(),
            padding: Padding::default(),
            show_line_numbers: true,
            wrap_long_lines: false,
        }
    }

    /// The sample the playground opens with.
    pub fn playground_default() -> Self {
        Self {
            title: "Component.tsx".to_string(),
            ..Self::new(DEFAULT_PLAYGROUND_CODE)
        }
    }

    pub fn line_count(&self) -> usize {
        self.code.lines().count().max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_round_trip_names() {
        for theme in Theme::all() {
            assert_eq!(Theme::from_str(theme.as_str()), Some(theme));
        }
        assert_eq!(Theme::from_str("OCEAN"), Some(Theme::Ocean));
        assert_eq!(Theme::from_str("mauve"), None);
    }

    #[test]
    fn test_next_cycles_through_all() {
        let mut theme = Theme::Neon;
        for _ in 0..Theme::all().len() {
            theme = theme.next();
        }
        assert_eq!(theme, Theme::Neon);
        assert_eq!(Padding::Xl.next(), Padding::Sm);
    }

    #[test]
    fn test_gradient_endpoints() {
        let [start, _, end] = Theme::Ocean.gradient();
        assert_eq!(Theme::Ocean.gradient_at(0.0), start);
        assert_eq!(Theme::Ocean.gradient_at(1.0), end);
    }

    #[test]
    fn test_playground_defaults() {
        let doc = CodeDocument::playground_default();
        assert_eq!(doc.title, "Component.tsx");
        assert_eq!(doc.language, "typescript");
        assert_eq!(doc.theme, Theme::Neon);
        assert_eq!(doc.padding, Padding::Md);
        assert!(doc.show_line_numbers);
        assert!(!doc.wrap_long_lines);
    }
}
