use super::font::FontBook;
use crate::ocr::Rect;

pub const PADDING: f32 = 2.0;
pub const LINE_SPACING: f32 = 4.0;
const AVG_CHAR_WIDTH: f32 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub font_size: f32,
    /// Ascender to descender height of one line.
    pub line_height: f32,
    /// Distance from the top of a line box to its baseline.
    pub ascent: f32,
    pub lines: Vec<String>,
    pub block_w: f32,
    pub block_h: f32,
    /// Top-left corner of the text block.
    pub x: f32,
    pub y: f32,
    /// False when the floor size was used without fitting.
    pub fits: bool,
}

impl TextLayout {
    /// Distance between the tops of consecutive lines.
    pub fn line_step(&self) -> f32 {
        self.line_height + LINE_SPACING
    }
}

pub fn start_font_size(box_h: i32) -> i32 {
    8.max((box_h as f32 * 0.85).round() as i32)
}

pub fn floor_font_size(box_h: i32) -> i32 {
    6.max((box_h as f32 * 0.2).round() as i32)
}

/// Searches font sizes downward from the starting size until the wrapped
/// block fits inside the padded box. `None` for degenerate boxes.
pub fn fit_text(text: &str, rect: &Rect, fonts: &FontBook) -> Option<TextLayout> {
    let box_w = rect.width();
    let box_h = rect.height();
    if box_w <= 0 || box_h <= 0 {
        return None;
    }
    let inner_w = box_w as f32 - 2.0 * PADDING;
    let inner_h = box_h as f32 - 2.0 * PADDING;
    let start = start_font_size(box_h);
    let floor = floor_font_size(box_h);

    let mut size = start;
    while size >= floor {
        let layout = layout_at(text, size as f32, box_w, fonts);
        if layout.block_w <= inner_w && layout.block_h <= inner_h {
            return Some(place(rect, layout, true));
        }
        size -= 1;
    }

    let layout = layout_at(text, floor as f32, box_w, fonts);
    Some(place(rect, layout, false))
}

fn layout_at(text: &str, font_size: f32, box_w: i32, fonts: &FontBook) -> TextLayout {
    let avg_char_w = AVG_CHAR_WIDTH * font_size;
    let chars = ((box_w as f32 - 2.0 * PADDING) / avg_char_w).floor().max(1.0) as usize;
    let lines = wrap_text(text, chars);
    let block_w = lines
        .iter()
        .map(|line| fonts.measure(line, font_size))
        .fold(0.0, f32::max);
    let line_height = fonts.line_height_ratio() * font_size;
    let count = lines.len().max(1) as f32;
    let block_h = count * line_height + (count - 1.0) * LINE_SPACING;
    TextLayout {
        font_size,
        line_height,
        ascent: fonts.ascent_ratio() * font_size,
        lines,
        block_w,
        block_h,
        x: 0.0,
        y: 0.0,
        fits: false,
    }
}

fn place(rect: &Rect, layout: TextLayout, fits: bool) -> TextLayout {
    let x = rect.x_min as f32 + ((rect.width() as f32 - layout.block_w) / 2.0).floor();
    let y = rect.y_min as f32 + ((rect.height() as f32 - layout.block_h) / 2.0).floor();
    TextLayout { x, y, fits, ..layout }
}

/// Greedy word wrap to at most `width` characters per line. Words longer than
/// a line are broken across lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        loop {
            let word_len = chars.len();
            let needed = if current_len == 0 { word_len } else { current_len + 1 + word_len };
            if needed <= width {
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.extend(chars.iter());
                current_len += word_len;
                break;
            }
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            let rest = chars.split_off(width);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::Quad;

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_text("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
        assert_eq!(wrap_text("  spaced   out  ", 40), vec!["spaced out"]);
        assert!(wrap_text("", 5).is_empty());
    }

    #[test]
    fn breaks_words_longer_than_a_line() {
        assert_eq!(wrap_text("abcdefgh ij", 3), vec!["abc", "def", "gh", "ij"]);
        assert_eq!(wrap_text("xy", 0), vec!["x", "y"]);
    }

    #[test]
    fn size_bounds_follow_box_height() {
        assert_eq!(start_font_size(40), 34);
        assert_eq!(floor_font_size(40), 8);
        assert_eq!(start_font_size(5), 8);
        assert_eq!(floor_font_size(5), 6);
    }

    #[test]
    fn degenerate_box_has_no_layout() {
        let fonts = FontBook::empty();
        let flat = Quad::from_rect(10, 10, 40, 0).bounds();
        assert!(fit_text("hola", &flat, &fonts).is_none());
    }

    #[test]
    fn roomy_box_fits_within_padding() {
        let fonts = FontBook::empty();
        let rect = Quad::from_rect(0, 0, 400, 40).bounds();
        let layout = fit_text("HOLA", &rect, &fonts).expect("layout");
        assert!(layout.fits);
        // 34 and 33 leave no room for the 1.1 line box.
        assert_eq!(layout.font_size, 32.0);
        assert_eq!(layout.lines, vec!["HOLA"]);
        assert!(layout.block_w <= 400.0 - 2.0 * PADDING);
        assert!(layout.block_h <= 40.0 - 2.0 * PADDING);
        assert!(layout.block_h > layout.font_size);
        // Centered.
        assert_eq!(layout.y, 2.0);
        assert_eq!(layout.x, ((400.0 - layout.block_w) / 2.0).floor());
    }

    #[test]
    fn descenders_of_last_line_stay_inside_box() {
        let fonts = FontBook::empty();
        let rect = Quad::from_rect(20, 30, 250, 40).bounds();
        for text in ["gypsy jig", "a quite long line of jumpy glyphs that must wrap"] {
            let layout = fit_text(text, &rect, &fonts).expect("layout");
            assert!(layout.fits);
            let last = (layout.lines.len() - 1) as f32;
            let bottom = layout.y
                + last * layout.line_step()
                + layout.ascent
                + fonts.descent_ratio() * layout.font_size;
            assert!(bottom <= rect.y_max as f32 - PADDING, "{}: {}", text, bottom);
            assert!(layout.y >= rect.y_min as f32 + PADDING);
        }
    }

    #[test]
    fn shrinks_and_wraps_long_text() {
        let fonts = FontBook::empty();
        let rect = Quad::from_rect(0, 0, 120, 60).bounds();
        let layout = fit_text("a much longer translated sentence", &rect, &fonts).expect("layout");
        assert!(layout.fits);
        assert!(layout.font_size < start_font_size(60) as f32);
        assert!(layout.lines.len() > 1);
        assert!(layout.block_w <= 116.0);
        assert!(layout.block_h <= 56.0);
    }

    #[test]
    fn tiny_box_falls_back_to_floor_size() {
        let fonts = FontBook::empty();
        let rect = Quad::from_rect(5, 5, 3, 3).bounds();
        let layout = fit_text("overflowing text", &rect, &fonts).expect("layout");
        assert!(!layout.fits);
        assert_eq!(layout.font_size, 6.0);
        assert!(!layout.lines.is_empty());
    }
}
