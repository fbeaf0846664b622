//! Visible text watermark overlay: renders a text string onto a copy of
//! the image at a named corner/center position, alpha-blended by opacity.

use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

use crate::error::{Result, WatermarkError};

const MARGIN: u32 = 10;

/// Where the overlay is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl Position {
    pub fn parse(s: &str) -> Option<Position> {
        match s {
            "top-left" => Some(Position::TopLeft),
            "top-right" => Some(Position::TopRight),
            "bottom-left" => Some(Position::BottomLeft),
            "bottom-right" => Some(Position::BottomRight),
            "center" => Some(Position::Center),
            _ => None,
        }
    }
}

/// Common installed font paths, searched in order; the first that exists
/// and parses as a valid font is used. There is no bundled font asset.
const FONT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn load_font() -> Result<FontVec> {
    for path in FONT_SEARCH_PATHS {
        if let Ok(bytes) = std::fs::read(path) {
            if let Ok(font) = FontVec::try_from_vec(bytes) {
                return Ok(font);
            }
        }
    }
    Err(WatermarkError::DependencyUnavailable(
        "no system font found for visible text overlay",
    ))
}

fn anchor(position: Position, canvas_w: u32, canvas_h: u32, text_w: u32, text_h: u32) -> (i32, i32) {
    match position {
        Position::TopLeft => (MARGIN as i32, MARGIN as i32),
        Position::TopRight => ((canvas_w.saturating_sub(text_w + MARGIN)) as i32, MARGIN as i32),
        Position::BottomLeft => (MARGIN as i32, (canvas_h.saturating_sub(text_h + MARGIN)) as i32),
        Position::BottomRight => (
            (canvas_w.saturating_sub(text_w + MARGIN)) as i32,
            (canvas_h.saturating_sub(text_h + MARGIN)) as i32,
        ),
        Position::Center => (
            ((canvas_w.saturating_sub(text_w)) / 2) as i32,
            ((canvas_h.saturating_sub(text_h)) / 2) as i32,
        ),
    }
}

/// Renders `text` onto `bytes` (any format the `image` crate can decode),
/// at the given `position`, `opacity` in `[0.0, 1.0]`, and point size.
/// Returns re-encoded PNG bytes.
pub fn embed_visible(
    bytes: &[u8],
    text: &str,
    position: Position,
    opacity: f32,
    point_size: f32,
) -> Result<Vec<u8>> {
    let font = load_font()?;
    let mut canvas = image::load_from_memory(bytes)?.to_rgba8();
    let (w, h) = canvas.dimensions();

    // Text is drawn onto a transparent layer first, then alpha-composited
    // onto the base with `imageops::overlay`. `draw_text_mut` blends by
    // glyph coverage only, treating the fill color's own alpha channel as
    // just another value to write rather than a blend weight against the
    // background — drawing straight onto the opaque base would render
    // every fully-covered glyph pixel as solid white regardless of
    // `opacity`.
    let mut layer: RgbaImage = RgbaImage::new(w, h);

    let scale = PxScale::from(point_size);
    let (text_w, text_h) = text_size(scale, &font, text);
    let (x, y) = anchor(position, w, h, text_w, text_h);

    let alpha = (opacity.clamp(0.0, 1.0) * 255.0) as u8;
    let color = Rgba([255u8, 255, 255, alpha]);
    draw_text_mut(&mut layer, color, x, y, scale, &font, text);

    image::imageops::overlay(&mut canvas, &layer, 0, 0);

    let flattened = image::DynamicImage::ImageRgba8(canvas).to_rgb8();
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(flattened).write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}
