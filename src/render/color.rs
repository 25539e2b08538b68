use image::Rgb;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

const INK_THRESHOLD: u32 = 128;

pub fn luminance(color: Rgb<u8>) -> f32 {
    luminance_milli(color) as f32 / 1000.0
}

/// Luminance scaled by 1000 so the threshold comparison is exact.
fn luminance_milli(color: Rgb<u8>) -> u32 {
    let [r, g, b] = color.0;
    299 * r as u32 + 587 * g as u32 + 114 * b as u32
}

/// Black ink on backgrounds brighter than the fixed threshold, white otherwise.
pub fn ink_color(background: Rgb<u8>) -> Rgb<u8> {
    if luminance_milli(background) > INK_THRESHOLD * 1000 {
        BLACK
    } else {
        WHITE
    }
}

pub fn to_hex(color: Rgb<u8>) -> String {
    let [r, g, b] = color.0;
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_pick_opposite_ink() {
        assert_eq!(ink_color(BLACK), WHITE);
        assert_eq!(ink_color(WHITE), BLACK);
    }

    #[test]
    fn threshold_itself_selects_white() {
        let gray = Rgb([128, 128, 128]);
        assert!((luminance(gray) - 128.0).abs() < 1e-3);
        assert_eq!(ink_color(gray), WHITE);
        assert_eq!(ink_color(Rgb([129, 129, 129])), BLACK);
    }

    #[test]
    fn pure_red_is_dark() {
        assert!((luminance(Rgb([255, 0, 0])) - 76.245).abs() < 1e-3);
        assert_eq!(ink_color(Rgb([255, 0, 0])), WHITE);
    }

    #[test]
    fn hex_is_lowercase_rrggbb() {
        assert_eq!(to_hex(Rgb([255, 0, 16])), "#ff0010");
    }
}
