use std::collections::BTreeMap;

use super::RawDetection;
use crate::ocr::{Quad, Rect};

#[derive(Clone)]
struct WordToken {
    text: String,
    rect: Rect,
    conf: f32,
    len: usize,
}

/// Groups tesseract TSV word rows (level 5) into line detections, keeping
/// tesseract's page/block/paragraph/line order.
pub(super) fn parse_tsv_lines(tsv: &str) -> Vec<RawDetection> {
    let mut word_map: BTreeMap<(i32, i32, i32, i32), Vec<WordToken>> = BTreeMap::new();

    for row in tsv.lines().skip(1) {
        let cols = row.split('\t').collect::<Vec<_>>();
        if cols.len() < 12 {
            continue;
        }
        let level: i32 = cols[0].parse().unwrap_or(0);
        if level != 5 {
            continue;
        }
        let page_num: i32 = cols[1].parse().unwrap_or(0);
        let block_num: i32 = cols[2].parse().unwrap_or(0);
        let par_num: i32 = cols[3].parse().unwrap_or(0);
        let line_num: i32 = cols[4].parse().unwrap_or(0);
        let left: i32 = cols[6].parse().unwrap_or(0);
        let top: i32 = cols[7].parse().unwrap_or(0);
        let width: i32 = cols[8].parse().unwrap_or(0);
        let height: i32 = cols[9].parse().unwrap_or(0);
        let conf: f32 = cols[10].trim().parse().unwrap_or(-1.0);
        let text = cols[11].trim();
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let key = (page_num, block_num, par_num, line_num);
        word_map.entry(key).or_default().push(WordToken {
            text: text.to_string(),
            rect: Rect {
                x_min: left,
                y_min: top,
                x_max: left + width,
                y_max: top + height,
            },
            conf,
            len: text.chars().count().max(1),
        });
    }

    let mut lines = Vec::new();
    for (_, mut words) in word_map {
        words.sort_by_key(|word| word.rect.x_min);
        for segment in split_word_segments(words) {
            if let Some(line) = build_line(&segment) {
                lines.push(line);
            }
        }
    }
    lines
}

/// Splits a tesseract line where words are far apart horizontally or
/// drift vertically; sparse mode often joins unrelated labels.
fn split_word_segments(words: Vec<WordToken>) -> Vec<Vec<WordToken>> {
    if words.len() <= 1 {
        return if words.is_empty() { Vec::new() } else { vec![words] };
    }

    let mut heights = words.iter().map(|word| word.rect.height()).collect::<Vec<_>>();
    heights.sort_unstable();
    let median_h = heights[heights.len() / 2].max(1) as f32;
    let gap_threshold = (median_h * 2.5).clamp(12.0, 120.0);
    let vertical_threshold = (median_h * 0.9).clamp(6.0, 80.0);

    let mut segments: Vec<Vec<WordToken>> = Vec::new();
    let mut current: Vec<WordToken> = Vec::new();
    let mut last_right = 0i32;
    let mut last_center_y = 0f32;
    for word in words {
        let center_y = (word.rect.y_min + word.rect.y_max) as f32 * 0.5;
        if current.is_empty() {
            last_right = word.rect.x_max;
            last_center_y = center_y;
            current.push(word);
            continue;
        }
        let gap = (word.rect.x_min - last_right).max(0);
        let vertical_gap = (center_y - last_center_y).abs();
        if (gap as f32) > gap_threshold || vertical_gap > vertical_threshold {
            segments.push(std::mem::take(&mut current));
            last_right = word.rect.x_max;
            last_center_y = center_y;
        } else {
            last_right = last_right.max(word.rect.x_max);
            last_center_y = (last_center_y + center_y) * 0.5;
        }
        current.push(word);
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn build_line(words: &[WordToken]) -> Option<RawDetection> {
    let first = words.first()?;

    let mut text = String::new();
    let mut last_token: &str = "";
    for word in words {
        if !text.is_empty() && needs_space(last_token, &word.text) {
            text.push(' ');
        }
        text.push_str(&word.text);
        last_token = &word.text;
    }

    let mut rect = first.rect;
    let mut conf_sum = 0.0;
    let mut len_sum = 0.0;
    for word in words {
        rect = rect.union(&word.rect);
        let weight = word.len as f32;
        conf_sum += word.conf * weight;
        len_sum += weight;
    }
    let avg_conf = if len_sum > 0.0 { conf_sum / len_sum } else { 0.0 };

    Some(RawDetection {
        polygon: Quad::from_rect(rect.x_min, rect.y_min, rect.width(), rect.height()),
        text: text.trim().to_string(),
        confidence: (avg_conf / 100.0).clamp(0.0, 1.0),
    })
}

/// CJK runs are written without spaces, alphabetic words with one.
fn needs_space(left: &str, right: &str) -> bool {
    let last = left.chars().rev().find(|ch| !ch.is_whitespace());
    let first = right.chars().find(|ch| !ch.is_whitespace());
    match (last, first) {
        (Some(a), Some(b)) => !(is_cjk_or_kana(a) && is_cjk_or_kana(b)),
        _ => false,
    }
}

fn is_cjk_or_kana(ch: char) -> bool {
    matches!(
        ch as u32,
        0x4E00..=0x9FFF | 0x3040..=0x30FF | 0x31F0..=0x31FF | 0xAC00..=0xD7AF
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::Point;

    const HEADER: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn word(block: i32, line: i32, left: i32, top: i32, w: i32, h: i32, conf: f32, text: &str) -> String {
        format!("5\t1\t{block}\t1\t{line}\t1\t{left}\t{top}\t{w}\t{h}\t{conf}\t{text}")
    }

    #[test]
    fn groups_words_into_lines_in_reading_order() {
        let tsv = [
            HEADER.to_string(),
            "1\t1\t0\t0\t0\t0\t0\t0\t200\t100\t-1\t".to_string(),
            word(2, 1, 10, 60, 30, 12, 80.0, "second"),
            word(1, 1, 50, 10, 40, 12, 90.0, "World"),
            word(1, 1, 10, 10, 36, 12, 90.0, "Hello"),
        ]
        .join("\n");
        let lines = parse_tsv_lines(&tsv);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Hello World");
        assert_eq!(
            lines[0].polygon,
            Quad([
                Point::new(10, 10),
                Point::new(90, 10),
                Point::new(90, 22),
                Point::new(10, 22),
            ])
        );
        assert!((lines[0].confidence - 0.9).abs() < 1e-6);
        assert_eq!(lines[1].text, "second");
    }

    #[test]
    fn skips_rejected_words_and_joins_cjk_without_spaces() {
        let tsv = [
            HEADER.to_string(),
            word(1, 1, 10, 10, 12, 12, -1.0, "noise"),
            word(1, 1, 22, 10, 12, 12, 70.0, "日本"),
            word(1, 1, 34, 10, 12, 12, 70.0, "語"),
        ]
        .join("\n");
        let lines = parse_tsv_lines(&tsv);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "日本語");
    }

    #[test]
    fn far_apart_words_become_separate_detections() {
        let tsv = [
            HEADER.to_string(),
            word(1, 1, 10, 10, 30, 12, 90.0, "LEFT"),
            word(1, 1, 300, 10, 30, 12, 90.0, "RIGHT"),
        ]
        .join("\n");
        let lines = parse_tsv_lines(&tsv);
        let texts: Vec<&str> = lines.iter().map(|line| line.text.as_str()).collect();
        assert_eq!(texts, vec!["LEFT", "RIGHT"]);
    }
}
