//! Rasterizes a rendered frame buffer into an image for export.

use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect as PixelRect;
use lumina_core::{CaptureError, FrameCapture};
use ratatui::buffer::Buffer;
use ratatui::style::Color;

/// Cell size in pixels before scaling.
const CELL_WIDTH: u32 = 10;
const CELL_HEIGHT: u32 = 20;
const DEFAULT_FG: Rgba<u8> = Rgba([0xd4, 0xd4, 0xd8, 0xff]);
/// Largest raster a capture may allocate (128 MiB of RGBA).
pub const MAX_CAPTURE_PIXELS: u64 = 32 * 1024 * 1024;

/// A frame rendered off-screen, ready to be rasterized.
pub struct BufferCapture {
    buffer: Buffer,
    font: Option<FontArc>,
    scale: u32,
}

impl BufferCapture {
    pub fn new(buffer: Buffer, font: Option<FontArc>, scale: u32) -> Self {
        if font.is_none() {
            tracing::warn!("no monospace font found, frame text will be missing from exports");
        }
        Self {
            buffer,
            font,
            scale: scale.max(1),
        }
    }
}

/// Colour of a terminal cell in the exported image. `None` stays transparent.
pub fn cell_color(color: Color) -> Option<Rgba<u8>> {
    let rgb = match color {
        Color::Reset => return None,
        Color::Rgb(r, g, b) => [r, g, b],
        Color::Black => [0x00, 0x00, 0x00],
        Color::Red => [0xcd, 0x31, 0x31],
        Color::Green => [0x0d, 0xbc, 0x79],
        Color::Yellow => [0xe5, 0xe5, 0x10],
        Color::Blue => [0x24, 0x72, 0xc8],
        Color::Magenta => [0xbc, 0x3f, 0xbc],
        Color::Cyan => [0x11, 0xa8, 0xcd],
        Color::Gray => [0xe5, 0xe5, 0xe5],
        Color::DarkGray => [0x66, 0x66, 0x66],
        Color::LightRed => [0xf1, 0x4c, 0x4c],
        Color::LightGreen => [0x23, 0xd1, 0x8b],
        Color::LightYellow => [0xf5, 0xf5, 0x43],
        Color::LightBlue => [0x3b, 0x8e, 0xea],
        Color::LightMagenta => [0xd6, 0x70, 0xd6],
        Color::LightCyan => [0x29, 0xb8, 0xdb],
        Color::White => [0xff, 0xff, 0xff],
        Color::Indexed(i) => {
            let level = 0x30u8.saturating_add(i / 2);
            [level, level, level]
        }
    };
    Some(Rgba([rgb[0], rgb[1], rgb[2], 0xff]))
}

impl FrameCapture for BufferCapture {
    fn capture(&self) -> Result<RgbaImage, CaptureError> {
        let area = self.buffer.area;
        if area.width == 0 || area.height == 0 {
            return Err(CaptureError::EmptyRegion);
        }

        let cell_w = CELL_WIDTH * self.scale;
        let cell_h = CELL_HEIGHT * self.scale;
        let width = area.width as u64 * cell_w as u64;
        let height = area.height as u64 * cell_h as u64;
        if width * height > MAX_CAPTURE_PIXELS {
            return Err(CaptureError::Render(format!(
                "frame raster {width}x{height} exceeds the capture limit"
            )));
        }
        let mut image = RgbaImage::new(width as u32, height as u32);

        let glyph_scale = PxScale::from(cell_h as f32 * 0.8);
        let columns = area.width as usize;

        for (i, cell) in self.buffer.content.iter().enumerate() {
            let x = (i % columns) as u32 * cell_w;
            let y = (i / columns) as u32 * cell_h;

            if let Some(bg) = cell_color(cell.bg) {
                draw_filled_rect_mut(
                    &mut image,
                    PixelRect::at(x as i32, y as i32).of_size(cell_w, cell_h),
                    bg,
                );
            }

            let symbol = cell.symbol();
            if symbol.trim().is_empty() {
                continue;
            }
            if let Some(font) = &self.font {
                let fg = cell_color(cell.fg).unwrap_or(DEFAULT_FG);
                let baseline_offset = (cell_h as f32 * 0.1) as i32;
                draw_text_mut(&mut image, fg, x as i32, y as i32 + baseline_offset, glyph_scale, font, symbol);
            }
        }

        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;
    use ratatui::style::Style;

    #[test]
    fn test_capture_is_cell_grid_times_scale() {
        let buffer = Buffer::empty(Rect::new(0, 0, 12, 5));
        let image = BufferCapture::new(buffer, None, 2).capture().unwrap();
        assert_eq!(image.dimensions(), (12 * CELL_WIDTH * 2, 5 * CELL_HEIGHT * 2));
    }

    #[test]
    fn test_cell_background_is_painted() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 2, 1));
        buffer.set_style(Rect::new(1, 0, 1, 1), Style::default().bg(Color::Rgb(10, 20, 30)));

        let image = BufferCapture::new(buffer, None, 1).capture().unwrap();
        assert_eq!(image.get_pixel(0, 0)[3], 0);
        assert_eq!(*image.get_pixel(CELL_WIDTH + 1, 1), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_empty_buffer_is_an_error() {
        let buffer = Buffer::empty(Rect::new(0, 0, 0, 0));
        let err = BufferCapture::new(buffer, None, 2).capture().unwrap_err();
        assert!(matches!(err, CaptureError::EmptyRegion));
    }

    #[test]
    fn test_oversized_buffer_is_rejected() {
        let buffer = Buffer::empty(Rect::new(0, 0, 600, 400));
        let err = BufferCapture::new(buffer, None, 2).capture().unwrap_err();
        assert!(matches!(err, CaptureError::Render(_)));
    }

    #[test]
    fn test_reset_colour_is_transparent() {
        assert_eq!(cell_color(Color::Reset), None);
        assert_eq!(cell_color(Color::Rgb(1, 2, 3)), Some(Rgba([1, 2, 3, 255])));
    }
}
