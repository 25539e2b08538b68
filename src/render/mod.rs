mod background;
mod color;
mod fit;
mod font;
mod overlay;

use image::RgbImage;
use std::io::Cursor;
use tracing::debug;

use crate::error::{Result, TranslateImageError};
use crate::ocr::{Quad, TextRegion};

pub use background::{DEFAULT_BORDER_WIDTH, estimate_background};
pub use color::{ink_color, luminance};
pub use fit::{TextLayout, fit_text, wrap_text};
pub use font::FontBook;
pub use overlay::Tile;

const ACCEPTED_MIME: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

/// Decodes PNG, JPEG, GIF or WebP bytes into an RGB canvas. Other recognized
/// formats are refused before decoding.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage> {
    if let Some(kind) = infer::get(bytes) {
        let mime = kind.mime_type();
        if !ACCEPTED_MIME.contains(&mime) {
            return Err(TranslateImageError::UnsupportedImage(mime.to_string()));
        }
    }
    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgb8())
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(TranslateImageError::rendering)?;
    Ok(bytes)
}

/// Erases text regions and draws their replacements.
#[derive(Debug, Clone)]
pub struct Renderer {
    fonts: FontBook,
    border_width: u32,
}

impl Renderer {
    pub fn new(fonts: FontBook, border_width: u32) -> Self {
        Self {
            fonts,
            border_width,
        }
    }

    /// Fills the polygon with the estimated background, then fits `text` into
    /// its bounding rectangle in a contrasting ink. Degenerate rectangles are
    /// erased but get no text.
    pub fn render_region(&self, image: &mut RgbImage, polygon: &Quad, text: &str) -> Result<()> {
        let (width, height) = image.dimensions();
        let background = estimate_background(image, polygon, self.border_width);
        let ink = ink_color(background);
        let layout = fit_text(text, &polygon.bounds(), &self.fonts);
        if let Some(layout) = &layout {
            if !layout.fits {
                debug!(
                    "text does not fit its region, drawing at {}px: {:?}",
                    layout.font_size, text
                );
            }
        }
        let Some(tile) = Tile::covering(polygon, layout.as_ref(), width, height) else {
            return Ok(());
        };
        let svg = overlay::region_svg(
            &tile,
            polygon,
            background,
            layout.as_ref().map(|layout| (layout, ink)),
            &self.fonts,
        );
        overlay::composite_svg(image, &tile, &svg, &self.fonts)
            .map_err(|err| TranslateImageError::rendering(format!("{:#}", err)))
    }

    /// Decodes once, renders every region in order onto the same canvas and
    /// returns the result as PNG. Any failing region fails the whole image.
    pub fn render_translated_image(
        &self,
        image_bytes: &[u8],
        regions: &[TextRegion],
        texts: &[String],
    ) -> Result<Vec<u8>> {
        if regions.len() != texts.len() {
            return Err(TranslateImageError::Rendering(format!(
                "{} regions but {} translations",
                regions.len(),
                texts.len()
            )));
        }
        let mut image = decode_rgb(image_bytes)?;
        for (region, text) in regions.iter().zip(texts) {
            self.render_region(&mut image, &region.polygon, text)?;
        }
        encode_png(&image)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(FontBook::empty(), DEFAULT_BORDER_WIDTH)
    }
}
