use anyhow::{Context, Result, anyhow};
use image::{Rgb, RgbImage};
use resvg::render;
use tiny_skia::Pixmap;
use usvg::{Options, Tree};

use super::color::to_hex;
use super::fit::{PADDING, TextLayout};
use super::font::FontBook;
use crate::ocr::{Quad, Rect};

/// Pixel area of the image an overlay covers, in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Tile {
    /// Union of the polygon bounds and the text block, padded and clamped to
    /// the image. `None` when nothing of it lies on the image.
    pub fn covering(polygon: &Quad, layout: Option<&TextLayout>, image_w: u32, image_h: u32) -> Option<Tile> {
        let mut rect = polygon.bounds();
        if let Some(layout) = layout {
            let block = Rect {
                x_min: layout.x.floor() as i32,
                y_min: layout.y.floor() as i32,
                x_max: (layout.x + layout.block_w).ceil() as i32,
                y_max: (layout.y + layout.block_h).ceil() as i32,
            };
            rect = rect.union(&block);
        }
        let pad = PADDING as i64;
        let x0 = (rect.x_min as i64 - pad).max(0);
        let y0 = (rect.y_min as i64 - pad).max(0);
        let x1 = (rect.x_max as i64 + pad + 1).min(image_w as i64);
        let y1 = (rect.y_max as i64 + pad + 1).min(image_h as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Tile {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

/// SVG for one region: the polygon filled with `background`, then the laid
/// out lines centered in `ink`. Coordinates stay in image space; the group
/// transform moves them into the tile.
pub fn region_svg(
    tile: &Tile,
    polygon: &Quad,
    background: Rgb<u8>,
    text: Option<(&TextLayout, Rgb<u8>)>,
    fonts: &FontBook,
) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = tile.width,
        h = tile.height
    ));
    svg.push_str(&format!(
        r#"<g transform="translate({x} {y})">"#,
        x = -(tile.x as i64),
        y = -(tile.y as i64)
    ));
    let points = polygon
        .points()
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ");
    svg.push_str(&format!(
        r#"<polygon points="{points}" fill="{fill}" shape-rendering="crispEdges"/>"#,
        points = points,
        fill = to_hex(background)
    ));

    if let Some((layout, ink)) = text {
        let center_x = layout.x + layout.block_w / 2.0;
        let family = escape_xml(fonts.family());
        for (idx, line) in layout.lines.iter().enumerate() {
            let baseline = layout.y + idx as f32 * layout.line_step() + layout.ascent;
            svg.push_str(&format!(
                r#"<text x="{x}" y="{y}" font-size="{size}" fill="{color}" font-family="{family}" text-anchor="middle">{text}</text>"#,
                x = center_x,
                y = baseline,
                size = layout.font_size,
                color = to_hex(ink),
                family = family,
                text = escape_xml(line)
            ));
        }
    }

    svg.push_str("</g></svg>");
    svg
}

/// Rasterizes `svg` and alpha-composites it onto `image` at the tile origin.
pub fn composite_svg(image: &mut RgbImage, tile: &Tile, svg: &str, fonts: &FontBook) -> Result<()> {
    let options = Options {
        fontdb: fonts.database(),
        ..Options::default()
    };
    let tree = Tree::from_str(svg, &options).with_context(|| "failed to parse overlay SVG")?;
    let mut pixmap =
        Pixmap::new(tile.width, tile.height).ok_or_else(|| anyhow!("empty overlay tile"))?;
    render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    let (image_w, image_h) = image.dimensions();
    for (idx, px) in pixmap.pixels().iter().enumerate() {
        let alpha = px.alpha() as u32;
        if alpha == 0 {
            continue;
        }
        let x = tile.x + idx as u32 % tile.width;
        let y = tile.y + idx as u32 / tile.width;
        if x >= image_w || y >= image_h {
            continue;
        }
        // Source is premultiplied.
        let src = [px.red() as u32, px.green() as u32, px.blue() as u32];
        let dst = image.get_pixel_mut(x, y);
        for (channel, value) in dst.0.iter_mut().enumerate() {
            let blended = src[channel] + (*value as u32 * (255 - alpha) + 127) / 255;
            *value = blended.min(255) as u8;
        }
    }
    Ok(())
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::color::{BLACK, WHITE};

    fn layout(lines: &[&str]) -> TextLayout {
        TextLayout {
            font_size: 20.0,
            line_height: 22.0,
            ascent: 16.0,
            lines: lines.iter().map(|line| line.to_string()).collect(),
            block_w: 60.0,
            block_h: 22.0 * lines.len() as f32 + 4.0 * (lines.len() as f32 - 1.0),
            x: 10.0,
            y: 10.0,
            fits: true,
        }
    }

    #[test]
    fn tile_is_clamped_to_image() {
        let polygon = Quad::from_rect(-5, 90, 20, 30);
        let tile = Tile::covering(&polygon, None, 100, 100).expect("tile");
        assert_eq!(tile, Tile { x: 0, y: 88, width: 18, height: 12 });
        let outside = Quad::from_rect(200, 200, 10, 10);
        assert!(Tile::covering(&outside, None, 100, 100).is_none());
    }

    #[test]
    fn svg_escapes_text_and_centers_lines() {
        let polygon = Quad::from_rect(10, 10, 60, 44);
        let layout = layout(&["a < b", "& c"]);
        let fonts = FontBook::empty();
        let tile = Tile::covering(&polygon, Some(&layout), 200, 200).expect("tile");
        let svg = region_svg(&tile, &polygon, WHITE, Some((&layout, BLACK)), &fonts);
        assert!(svg.contains(r##"fill="#ffffff" shape-rendering="crispEdges""##));
        assert!(svg.contains("a &lt; b"));
        assert!(svg.contains("&amp; c"));
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.contains(r#"x="40""#));
        assert!(svg.contains(r#"y="26""#));
        assert!(svg.contains(r#"y="52""#));
    }

    #[test]
    fn composite_fills_polygon_only() {
        let mut image = RgbImage::from_pixel(40, 30, Rgb([0, 0, 255]));
        let polygon = Quad::from_rect(10, 10, 10, 5);
        let fonts = FontBook::empty();
        let tile = Tile::covering(&polygon, None, 40, 30).expect("tile");
        let svg = region_svg(&tile, &polygon, Rgb([250, 10, 10]), None, &fonts);
        composite_svg(&mut image, &tile, &svg, &fonts).expect("composite");
        assert_eq!(*image.get_pixel(12, 12), Rgb([250, 10, 10]));
        assert_eq!(*image.get_pixel(9, 12), Rgb([0, 0, 255]));
        assert_eq!(*image.get_pixel(12, 16), Rgb([0, 0, 255]));
    }
}
