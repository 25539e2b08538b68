use image::{Rgb, RgbImage};

use super::color::WHITE;
use crate::ocr::Quad;

pub const DEFAULT_BORDER_WIDTH: u32 = 4;

/// Estimates the color under a text region from the bands of pixels just
/// outside its bounding rectangle.
///
/// The rectangle is grown by `border_width` on every side and clamped to the
/// image; the top, bottom, left and right bands between the two rectangles are
/// sampled and the per-channel median returned. White when nothing can be
/// sampled.
pub fn estimate_background(image: &RgbImage, polygon: &Quad, border_width: u32) -> Rgb<u8> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || border_width == 0 {
        return WHITE;
    }
    let border = border_width as i64;
    let rect = polygon.bounds();
    let (x_min, x_max) = (rect.x_min as i64, rect.x_max as i64);
    let (y_min, y_max) = (rect.y_min as i64, rect.y_max as i64);
    let last_x = width as i64 - 1;
    let last_y = height as i64 - 1;

    let outer_x_min = (x_min - border).max(0);
    let outer_x_max = (x_max + border).min(last_x);
    let outer_y_min = (y_min - border).max(0);
    let outer_y_max = (y_max + border).min(last_y);

    let mut samples: Vec<Rgb<u8>> = Vec::new();
    let mut take = |xs: (i64, i64), ys: (i64, i64)| {
        let (x0, x1) = (xs.0.max(0), xs.1.min(last_x));
        let (y0, y1) = (ys.0.max(0), ys.1.min(last_y));
        for y in y0..=y1 {
            for x in x0..=x1 {
                samples.push(*image.get_pixel(x as u32, y as u32));
            }
        }
    };

    // Top and bottom bands span the full grown width; the side bands only
    // the original height so corners are not counted twice.
    take((outer_x_min, outer_x_max), (outer_y_min, y_min - 1));
    take((outer_x_min, outer_x_max), (y_max + 1, outer_y_max));
    take((outer_x_min, x_min - 1), (y_min, y_max));
    take((x_max + 1, outer_x_max), (y_min, y_max));

    median_color(&samples).unwrap_or(WHITE)
}

fn median_color(samples: &[Rgb<u8>]) -> Option<Rgb<u8>> {
    if samples.is_empty() {
        return None;
    }
    let mut out = [0u8; 3];
    for (channel, slot) in out.iter_mut().enumerate() {
        let mut values: Vec<u8> = samples.iter().map(|pixel| pixel.0[channel]).collect();
        values.sort_unstable();
        let mid = values.len() / 2;
        *slot = if values.len() % 2 == 0 {
            ((values[mid - 1] as u16 + values[mid] as u16) / 2) as u8
        } else {
            values[mid]
        };
    }
    Some(Rgb(out))
}
