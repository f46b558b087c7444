//! Positioned text fragments produced by the page extractor.

/// Ascender share of the font size above the baseline.
const ASCENT: f32 = 0.8;
/// Descender share of the font size below the baseline.
const DESCENT: f32 = 0.2;
/// Advance of a narrow glyph as a share of the font size.
const NARROW_GLYPH_EM: f32 = 0.5;
/// Gap (share of font size) above which two runs are separate words.
const WORD_GAP_EM: f32 = 0.15;

/// A run of text with its page-relative bounding box.
///
/// Coordinates are in points with the origin at the top-left corner of
/// the page: `y0` is the top edge and grows downwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// The text content
    pub text: String,
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
    /// 0-based index of the page the fragment was taken from
    pub page_index: u32,
    /// Font size in points
    pub font_size: f32,
}

impl Fragment {
    /// Create a fragment from an explicit bounding box.
    pub fn new(text: impl Into<String>, x0: f32, y0: f32, x1: f32, y1: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            x0,
            y0,
            x1,
            y1,
            page_index: 0,
            font_size,
        }
    }

    /// Create a fragment from a top-left corner, estimating its extent
    /// from the text and font size.
    pub fn at(text: impl Into<String>, x: f32, top: f32, font_size: f32) -> Self {
        let text = text.into();
        let width = estimate_text_width(&text, font_size);
        let height = font_size * (ASCENT + DESCENT);
        Self::new(text, x, top, x + width, top + height, font_size)
    }

    /// Create a fragment from a PDF baseline position (origin bottom-left).
    pub fn from_baseline(
        text: impl Into<String>,
        x: f32,
        baseline: f32,
        font_size: f32,
        page_height: f32,
    ) -> Self {
        let top = page_height - (baseline + font_size * ASCENT);
        Self::at(text, x, top, font_size)
    }

    /// Set the page index.
    pub fn on_page(mut self, page_index: u32) -> Self {
        self.page_index = page_index;
        self
    }

    /// Width of the bounding box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Vertical center of the bounding box.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Whether the fragment carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Estimate the advance width of `text` set at `font_size`.
///
/// Ideographs, kana and Hangul are full width; everything else is counted
/// as half an em.
pub fn estimate_text_width(text: &str, font_size: f32) -> f32 {
    text.chars()
        .map(|c| {
            if is_wide_char(c) {
                font_size
            } else {
                font_size * NARROW_GLYPH_EM
            }
        })
        .sum()
}

/// Join fragments of one line (or one table cell) left to right.
///
/// A space goes between two fragments when they are visibly apart, unless
/// both sides of the gap belong to a script written without spaces.
pub fn join_fragments(fragments: &[&Fragment]) -> String {
    let mut sorted: Vec<&Fragment> = fragments.to_vec();
    sorted.sort_by(|a, b| a.x0.total_cmp(&b.x0));

    let mut result = String::new();
    let mut prev: Option<&Fragment> = None;
    for fragment in sorted {
        let text = fragment.text.trim();
        if text.is_empty() {
            continue;
        }
        if let Some(prev) = prev {
            let gap = fragment.x0 - prev.x1;
            let threshold = prev.font_size.min(fragment.font_size) * WORD_GAP_EM;
            if gap > threshold && needs_space(&result, text) {
                result.push(' ');
            }
        }
        result.push_str(text);
        prev = Some(fragment);
    }
    result
}

/// Join line texts into running text.
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut result = String::new();
    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        if !result.is_empty() && needs_space(&result, line) {
            result.push(' ');
        }
        result.push_str(line);
    }
    result
}

fn needs_space(left: &str, right: &str) -> bool {
    match (left.chars().last(), right.chars().next()) {
        (Some(l), Some(r)) => {
            !(l.is_whitespace()
                || r.is_whitespace()
                || (is_spaceless_script_char(l) && is_spaceless_script_char(r)))
        }
        _ => false,
    }
}

fn is_wide_char(c: char) -> bool {
    let code = c as u32;
    is_spaceless_script_char(c)
        // Hangul syllables and jamo
        || (0xAC00..=0xD7AF).contains(&code)
        || (0x1100..=0x11FF).contains(&code)
        || (0x3130..=0x318F).contains(&code)
        // Fullwidth forms
        || (0xFF00..=0xFFEF).contains(&code)
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_baseline_flips_y() {
        let f = Fragment::from_baseline("Hi", 72.0, 700.0, 10.0, 792.0);
        assert!((f.y0 - 84.0).abs() < 0.01);
        assert!((f.y1 - 94.0).abs() < 0.01);
        assert!((f.width() - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_estimate_width_wide_chars() {
        assert_eq!(estimate_text_width("ab", 10.0), 10.0);
        assert_eq!(estimate_text_width("항목", 10.0), 20.0);
        assert_eq!(estimate_text_width("漢字", 10.0), 20.0);
    }

    #[test]
    fn test_join_fragments_spacing() {
        let a = Fragment::at("Hello", 10.0, 0.0, 10.0); // ends at 35
        let b = Fragment::at("world", 40.0, 0.0, 10.0);
        let c = Fragment::at("!", 65.0, 0.0, 10.0); // touching
        assert_eq!(join_fragments(&[&b, &a, &c]), "Hello world!");
    }

    #[test]
    fn test_join_fragments_cjk() {
        let a = Fragment::at("日本", 10.0, 0.0, 10.0); // ends at 30
        let b = Fragment::at("語", 35.0, 0.0, 10.0);
        assert_eq!(join_fragments(&[&a, &b]), "日本語");

        let a = Fragment::at("온도", 10.0, 0.0, 10.0);
        let b = Fragment::at("측정", 35.0, 0.0, 10.0);
        assert_eq!(join_fragments(&[&a, &b]), "온도 측정");
    }

    #[test]
    fn test_join_lines() {
        assert_eq!(join_lines(&["first line", " second line "]), "first line second line");
        assert_eq!(join_lines(&["中文", "文本"]), "中文文本");
        assert_eq!(join_lines::<&str>(&[]), "");
    }
}
