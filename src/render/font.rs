use anyhow::{Context, Result, anyhow};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};
use ttf_parser::Face;
use ttf_parser::name_id;
use usvg::fontdb;

/// Families tried when none is configured, broad script coverage first.
const FALLBACK_FAMILIES: &[&str] = &[
    "Noto Sans",
    "Noto Sans CJK SC",
    "DejaVu Sans",
    "Arial",
    "Helvetica",
    "sans-serif",
];

const DEFAULT_ASCENT: f32 = 0.8;
/// Together with the ascent this gives a 1.1 line box when no face is loaded.
const DEFAULT_DESCENT: f32 = 0.3;

#[derive(Clone)]
pub struct FontMetrics {
    data: Arc<Vec<u8>>,
    units_per_em: u16,
    space_advance: u16,
    ascender: i16,
    descender: i16,
    family: Option<String>,
    face_index: u32,
}

impl FontMetrics {
    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    /// Ascender height as a fraction of the font size.
    pub fn ascent_ratio(&self) -> f32 {
        let ratio = self.ascender as f32 / self.units_per_em.max(1) as f32;
        if ratio > 0.0 { ratio } else { DEFAULT_ASCENT }
    }

    /// Depth below the baseline as a positive fraction of the font size.
    pub fn descent_ratio(&self) -> f32 {
        let ratio = -(self.descender as f32) / self.units_per_em.max(1) as f32;
        if ratio > 0.0 { ratio } else { DEFAULT_DESCENT }
    }
}

impl std::fmt::Debug for FontMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontMetrics")
            .field("family", &self.family)
            .field("units_per_em", &self.units_per_em)
            .field("face_index", &self.face_index)
            .finish()
    }
}

/// Font database handed to the SVG rasterizer plus the metrics of the face
/// used for layout, when one could be found.
#[derive(Clone)]
pub struct FontBook {
    db: Arc<fontdb::Database>,
    metrics: Option<FontMetrics>,
}

impl FontBook {
    /// System fonts plus an optional font file or family, falling back to a
    /// list of common families. Missing fonts are not fatal: layout then uses
    /// width estimates.
    pub fn load(font_path: Option<&Path>, font_family: Option<&str>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let metrics = match resolve_metrics(&mut db, font_path, font_family) {
            Ok(metrics) => {
                debug!("using font family {:?}", metrics.family());
                Some(metrics)
            }
            Err(err) => {
                warn!("no usable font found, text layout will be estimated: {:#}", err);
                None
            }
        };
        Self {
            db: Arc::new(db),
            metrics,
        }
    }

    /// No fonts at all; glyphs are not drawn. Used where output must not
    /// depend on the host's installed fonts.
    pub fn empty() -> Self {
        Self {
            db: Arc::new(fontdb::Database::new()),
            metrics: None,
        }
    }

    pub fn database(&self) -> Arc<fontdb::Database> {
        self.db.clone()
    }

    pub fn metrics(&self) -> Option<&FontMetrics> {
        self.metrics.as_ref()
    }

    pub fn family(&self) -> &str {
        self.metrics
            .as_ref()
            .and_then(|m| m.family())
            .unwrap_or("sans-serif")
    }

    pub fn ascent_ratio(&self) -> f32 {
        self.metrics
            .as_ref()
            .map(FontMetrics::ascent_ratio)
            .unwrap_or(DEFAULT_ASCENT)
    }

    pub fn descent_ratio(&self) -> f32 {
        self.metrics
            .as_ref()
            .map(FontMetrics::descent_ratio)
            .unwrap_or(DEFAULT_DESCENT)
    }

    /// Height of one line box (ascender to descender) per unit of font size.
    pub fn line_height_ratio(&self) -> f32 {
        self.ascent_ratio() + self.descent_ratio()
    }

    pub fn measure(&self, text: &str, font_size: f32) -> f32 {
        measure_text_width_px(text, font_size, self.metrics.as_ref())
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.db.len())
            .field("metrics", &self.metrics)
            .finish()
    }
}

fn resolve_metrics(
    db: &mut fontdb::Database,
    font_path: Option<&Path>,
    font_family: Option<&str>,
) -> Result<FontMetrics> {
    if let Some(path) = font_path {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read font: {}", path.display()))?;
        let metrics = load_font_metrics_from_data(&data, None)
            .with_context(|| format!("failed to parse font: {}", path.display()))?;
        db.load_font_data(data);
        return Ok(metrics);
    }

    if let Some(family) = font_family {
        return load_font_metrics_from_family(db, family);
    }

    for candidate in FALLBACK_FAMILIES {
        if let Ok(metrics) = load_font_metrics_from_family(db, candidate) {
            return Ok(metrics);
        }
    }

    Err(anyhow!("no fallback fonts found"))
}

pub(crate) fn measure_text_width_px(text: &str, font_size: f32, font: Option<&FontMetrics>) -> f32 {
    if let Some(font) = font {
        if let Ok(face) = Face::parse(&font.data, font.face_index) {
            let mut advance = 0u32;
            for ch in text.chars() {
                if ch == '\n' {
                    continue;
                }
                if ch == ' ' {
                    advance = advance.saturating_add(font.space_advance as u32);
                    continue;
                }
                let glyph_advance = face
                    .glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .unwrap_or(font.space_advance);
                advance = advance.saturating_add(glyph_advance as u32);
            }
            let units = font.units_per_em.max(1) as f32;
            return advance as f32 * (font_size / units);
        }
    }
    estimate_text_width_units(text) * font_size
}

fn estimate_char_units_for_width(ch: char) -> f32 {
    if ch.is_whitespace() {
        0.25
    } else if ch.is_ascii_alphanumeric() {
        0.55
    } else if ch.is_ascii() {
        0.35
    } else if matches!(
        ch as u32,
        0x4E00..=0x9FFF | 0x3040..=0x30FF | 0x31F0..=0x31FF | 0xAC00..=0xD7AF
    ) {
        1.0
    } else {
        0.9
    }
}

fn estimate_text_width_units(text: &str) -> f32 {
    text.chars().map(estimate_char_units_for_width).sum()
}

fn load_font_metrics_from_data(data: &[u8], preferred_family: Option<&str>) -> Result<FontMetrics> {
    let mut fallback = None;
    let count = ttf_parser::fonts_in_collection(data).unwrap_or(1);
    for index in 0..count {
        if let Ok(face) = Face::parse(data, index) {
            let family = extract_family_name(&face);
            let units_per_em = face.units_per_em().max(1);
            let space_advance = face
                .glyph_index(' ')
                .and_then(|id| face.glyph_hor_advance(id))
                .unwrap_or(units_per_em / 2);
            let metrics = FontMetrics {
                data: Arc::new(data.to_vec()),
                units_per_em,
                space_advance,
                ascender: face.ascender(),
                descender: face.descender(),
                family: family.clone(),
                face_index: index,
            };
            if let (Some(preferred), Some(found)) = (preferred_family, &family) {
                if found.eq_ignore_ascii_case(preferred) {
                    return Ok(metrics);
                }
            }
            if fallback.is_none() {
                fallback = Some(metrics);
            }
        }
    }
    fallback.ok_or_else(|| anyhow!("failed to parse font data"))
}

fn load_font_metrics_from_family(db: &fontdb::Database, family: &str) -> Result<FontMetrics> {
    let families = if family.eq_ignore_ascii_case("sans-serif") {
        vec![fontdb::Family::SansSerif]
    } else {
        vec![fontdb::Family::Name(family)]
    };
    let query = fontdb::Query {
        families: &families,
        ..Default::default()
    };
    let id = db
        .query(&query)
        .ok_or_else(|| anyhow!("font not found: {}", family))?;
    let data = db
        .with_face_data(id, |data, _index| data.to_vec())
        .ok_or_else(|| anyhow!("failed to load font data: {}", family))?;
    load_font_metrics_from_data(&data, Some(family))
}

fn extract_family_name(face: &Face<'_>) -> Option<String> {
    let mut fallback = None;
    for name in face.names() {
        if name.name_id == name_id::TYPOGRAPHIC_FAMILY {
            if let Some(value) = name.to_string() {
                return Some(value);
            }
        } else if name.name_id == name_id::FAMILY && fallback.is_none() {
            fallback = name.to_string();
        }
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimates_without_font_metrics() {
        let book = FontBook::empty();
        assert_eq!(book.family(), "sans-serif");
        assert!((book.measure("ab", 10.0) - 11.0).abs() < 1e-4);
        assert!((book.measure("日本", 10.0) - 20.0).abs() < 1e-4);
        assert!((book.ascent_ratio() - DEFAULT_ASCENT).abs() < 1e-6);
        assert!((book.line_height_ratio() - 1.1).abs() < 1e-6);
    }

    #[test]
    fn line_box_spans_ascender_to_descender() {
        let Some(path) = crate::test_util::system_font() else {
            return;
        };
        let book = FontBook::load(Some(path.as_path()), None);
        let Some(metrics) = book.metrics() else {
            return;
        };
        assert!(metrics.descent_ratio() > 0.0);
        assert!(book.line_height_ratio() > 1.0);
        assert!(
            (book.line_height_ratio() - metrics.ascent_ratio() - metrics.descent_ratio()).abs()
                < 1e-6
        );
    }

    #[test]
    fn missing_font_file_is_reported() {
        let mut db = fontdb::Database::new();
        let err = resolve_metrics(&mut db, Some(Path::new("/nonexistent/font.ttf")), None)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("failed to read font"));
    }
}
