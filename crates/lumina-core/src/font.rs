use std::path::Path;

use ab_glyph::FontArc;

/// Bold sans faces tried for the export watermark.
pub const LABEL_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Monospace faces tried when rasterizing code.
pub const MONO_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "/System/Library/Fonts/Monaco.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
];

/// Load `explicit` if given, otherwise the first candidate that parses.
pub fn load_font(explicit: Option<&Path>, candidates: &[&str]) -> Option<FontArc> {
    if let Some(path) = explicit {
        match read_font(path) {
            Some(font) => return Some(font),
            None => tracing::warn!(path = %path.display(), "configured font could not be loaded"),
        }
    }

    candidates.iter().map(Path::new).find_map(read_font)
}

fn read_font(path: &Path) -> Option<FontArc> {
    let bytes = std::fs::read(path).ok()?;
    match FontArc::try_from_vec(bytes) {
        Ok(font) => {
            tracing::debug!(path = %path.display(), "loaded font");
            Some(font)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid font file");
            None
        }
    }
}
