//! PNG export of a captured frame with the Lumina watermark footer.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{imageops, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use regex::Regex;

/// Scale factor captures are rendered at.
pub const CAPTURE_SCALE: u32 = 2;
pub const FOOTER_HEIGHT: u32 = 60;
/// slate-950
pub const FOOTER_COLOR: Rgba<u8> = Rgba([0x0f, 0x17, 0x2a, 0xff]);
pub const WATERMARK_TEXT: &str = "LuminaFrame";
pub const FILE_SUFFIX: &str = "-lumina-frame.png";

const WATERMARK_SIZE: f32 = 28.0;
const WATERMARK_OPACITY: f32 = 0.3;
const WATERMARK_RIGHT_INSET: i32 = 40;
const WATERMARK_BASELINE_INSET: i32 = 20;

static EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[^/.]+$").expect("valid extension pattern"));

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("nothing to capture: the frame has no visible area")]
    EmptyRegion,

    #[error("capture failed: {0}")]
    Render(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("writing image failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces a raster of the frame as currently displayed.
pub trait FrameCapture {
    fn capture(&self) -> Result<RgbaImage, CaptureError>;
}

/// File name for an export of a frame titled `title`.
pub fn export_file_name(title: &str) -> String {
    let stem = EXTENSION.replace(title.trim(), "");
    let stem: String = stem
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    let stem = stem.trim();

    if stem.is_empty() {
        format!("untitled{}", FILE_SUFFIX)
    } else {
        format!("{}{}", stem, FILE_SUFFIX)
    }
}

/// `fg` at `alpha` over an opaque `bg`.
pub fn blend_over(fg: [u8; 3], alpha: f32, bg: Rgba<u8>) -> Rgba<u8> {
    let mix = |f: u8, b: u8| (f as f32 * alpha + b as f32 * (1.0 - alpha)).round() as u8;
    Rgba([mix(fg[0], bg[0]), mix(fg[1], bg[1]), mix(fg[2], bg[2]), 0xff])
}

/// Place `raster` on a canvas with a footer band and the watermark label.
///
/// Without a font the footer is still added but the label is skipped.
pub fn compose_with_watermark(raster: &RgbaImage, font: Option<&FontArc>) -> RgbaImage {
    let (width, height) = raster.dimensions();
    let mut canvas = RgbaImage::from_pixel(width, height + FOOTER_HEIGHT, FOOTER_COLOR);
    imageops::overlay(&mut canvas, raster, 0, 0);

    match font {
        Some(font) => draw_watermark(&mut canvas, font),
        None => tracing::warn!("no label font available, exporting without watermark text"),
    }

    canvas
}

fn draw_watermark(canvas: &mut RgbaImage, font: &FontArc) {
    let scale = PxScale::from(WATERMARK_SIZE);
    let (text_width, _) = text_size(scale, font, WATERMARK_TEXT);
    let ascent = font.as_scaled(scale).ascent();

    // Right-aligned, baseline above the bottom edge.
    let x = canvas.width() as i32 - WATERMARK_RIGHT_INSET - text_width as i32;
    let y = canvas.height() as i32 - WATERMARK_BASELINE_INSET - ascent.round() as i32;
    let color = blend_over([0xff, 0xff, 0xff], WATERMARK_OPACITY, FOOTER_COLOR);

    draw_text_mut(canvas, color, x, y, scale, font, WATERMARK_TEXT);
}

/// Sibling file the PNG is written to before it replaces `path`.
pub fn staging_path(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Capture, compose and write the PNG into `dir`.
///
/// The image is fully encoded before anything touches the disk. It is written
/// to a staging file and renamed into place, so a failed write leaves any
/// earlier export of the same name untouched.
pub fn export_image(
    capture: &impl FrameCapture,
    title: &str,
    dir: &Path,
    font: Option<&FontArc>,
) -> Result<PathBuf, ExportError> {
    let raster = capture.capture()?;
    let canvas = compose_with_watermark(&raster, font);

    let mut bytes = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(title));
    let staging = staging_path(&path);
    if let Err(e) = fs::write(&staging, &bytes).and_then(|()| fs::rename(&staging, &path)) {
        let _ = fs::remove_file(&staging);
        return Err(e.into());
    }

    tracing::info!(
        path = %path.display(),
        width = canvas.width(),
        height = canvas.height(),
        "exported frame image"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SolidCapture {
        width: u32,
        height: u32,
        color: Rgba<u8>,
    }

    impl FrameCapture for SolidCapture {
        fn capture(&self) -> Result<RgbaImage, CaptureError> {
            Ok(RgbaImage::from_pixel(self.width, self.height, self.color))
        }
    }

    struct FailingCapture;

    impl FrameCapture for FailingCapture {
        fn capture(&self) -> Result<RgbaImage, CaptureError> {
            Err(CaptureError::Render("renderer went away".into()))
        }
    }

    #[test]
    fn test_file_name_strips_extension() {
        assert_eq!(export_file_name("Demo.ts"), "Demo-lumina-frame.png");
        assert_eq!(export_file_name("archive.tar.gz"), "archive.tar-lumina-frame.png");
        assert_eq!(export_file_name("README"), "README-lumina-frame.png");
    }

    #[test]
    fn test_file_name_sanitizes() {
        assert_eq!(export_file_name("src/app:main.rs"), "src-app-main-lumina-frame.png");
        assert_eq!(export_file_name("   "), "untitled-lumina-frame.png");
        assert_eq!(export_file_name(".env"), "untitled-lumina-frame.png");
    }

    #[test]
    fn test_compose_adds_footer_band() {
        let raster = RgbaImage::from_pixel(120, 80, Rgba([255, 0, 0, 255]));
        let canvas = compose_with_watermark(&raster, None);

        assert_eq!(canvas.dimensions(), (120, 80 + FOOTER_HEIGHT));
        assert_eq!(*canvas.get_pixel(10, 10), Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(10, 80 + FOOTER_HEIGHT - 1), FOOTER_COLOR);
    }

    #[test]
    fn test_transparent_capture_shows_background() {
        let raster = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0]));
        let canvas = compose_with_watermark(&raster, None);
        assert_eq!(*canvas.get_pixel(5, 5), FOOTER_COLOR);
    }

    #[test]
    fn test_watermark_color_is_pre_blended() {
        let color = blend_over([0xff, 0xff, 0xff], 0.3, FOOTER_COLOR);
        assert_eq!(color, Rgba([87, 93, 106, 255]));
    }

    #[test]
    fn test_export_writes_png_named_after_title() {
        let dir = tempfile::tempdir().unwrap();
        let capture = SolidCapture {
            width: 200,
            height: 90,
            color: Rgba([30, 40, 50, 255]),
        };

        let path = export_image(&capture, "Demo.ts", dir.path(), None).unwrap();
        assert_eq!(path.file_name().unwrap(), "Demo-lumina-frame.png");

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), 200);
        assert_eq!(decoded.height(), 90 + FOOTER_HEIGHT);
    }

    #[test]
    fn test_failed_write_keeps_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        let previous = dir.path().join("Demo-lumina-frame.png");
        std::fs::write(&previous, b"earlier export").unwrap();
        // A directory in the staging slot makes the write fail.
        std::fs::create_dir(staging_path(&previous)).unwrap();

        let capture = SolidCapture {
            width: 20,
            height: 10,
            color: Rgba([1, 2, 3, 255]),
        };
        let err = export_image(&capture, "Demo.ts", dir.path(), None).unwrap_err();

        assert!(matches!(err, ExportError::Io(_)));
        assert_eq!(std::fs::read(&previous).unwrap(), b"earlier export");
    }

    #[test]
    fn test_export_replaces_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let previous = dir.path().join("Demo-lumina-frame.png");
        std::fs::write(&previous, b"earlier export").unwrap();

        let capture = SolidCapture {
            width: 20,
            height: 10,
            color: Rgba([1, 2, 3, 255]),
        };
        let path = export_image(&capture, "Demo.ts", dir.path(), None).unwrap();

        assert_eq!(path, previous);
        assert_eq!(image::open(&path).unwrap().height(), 10 + FOOTER_HEIGHT);
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_failed_capture_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_image(&FailingCapture, "Demo.ts", dir.path(), None).unwrap_err();

        assert!(matches!(err, ExportError::Capture(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
