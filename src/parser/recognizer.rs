//! Structure recognition: turns positioned fragments of one page into
//! headings, paragraphs and tables.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use super::fragment::{join_fragments, join_lines, Fragment};
use super::options::{LayoutConfig, RecognizerConfig};
use super::table_detector::{DetectedTable, TableDetector};
use crate::model::Block;

/// Body size assumed when a page has no measurable text.
const DEFAULT_BODY_SIZE: f32 = 12.0;

/// Font size statistics for one page.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Fragment count per size, keyed in tenths of a point
    histogram: BTreeMap<i32, usize>,
}

impl FontStatistics {
    /// Collect statistics over all fragments.
    pub fn from_fragments(fragments: &[Fragment]) -> Self {
        let mut stats = Self::default();
        for fragment in fragments.iter().filter(|f| !f.is_blank()) {
            stats.add_size(fragment.font_size);
        }
        stats
    }

    /// Add a font size observation.
    pub fn add_size(&mut self, size: f32) {
        if size.is_finite() && size > 0.0 {
            let key = (size * 10.0).round() as i32;
            *self.histogram.entry(key).or_insert(0) += 1;
        }
    }

    /// The most frequent size. Ties go to the smaller size.
    pub fn body_size(&self) -> f32 {
        let mut best: Option<(i32, usize)> = None;
        for (&key, &count) in &self.histogram {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((key, count));
            }
        }
        best.map_or(DEFAULT_BODY_SIZE, |(key, _)| key as f32 / 10.0)
    }
}

/// A line of text assembled from fragments.
#[derive(Debug, Clone)]
struct TextLine {
    text: String,
    top: f32,
    bottom: f32,
    x0: f32,
    font_size: f32,
}

/// A line or a table, positioned for reading order.
enum Item<'a> {
    Line(TextLine),
    Table(&'a DetectedTable),
}

impl Item<'_> {
    fn top(&self) -> f32 {
        match self {
            Item::Line(line) => line.top,
            Item::Table(table) => table.top,
        }
    }

    fn left(&self) -> f32 {
        match self {
            Item::Line(line) => line.x0,
            Item::Table(table) => table.left,
        }
    }
}

/// Recognizes document structure on a single page.
#[derive(Debug, Clone, Default)]
pub struct StructureRecognizer {
    config: RecognizerConfig,
    tables: TableDetector,
}

impl StructureRecognizer {
    /// Create a recognizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recognizer with the given layout options.
    pub fn with_config(config: &LayoutConfig) -> Self {
        Self {
            config: config.recognizer.clone().normalized(),
            tables: TableDetector::with_config(config.tables.clone()),
        }
    }

    /// Recognize the blocks of one page, in reading order.
    pub fn recognize(&self, fragments: &[Fragment]) -> Vec<Block> {
        if fragments.iter().all(Fragment::is_blank) {
            return Vec::new();
        }

        let body_size = FontStatistics::from_fragments(fragments).body_size();
        let detection = self.tables.detect(fragments);

        let remaining: Vec<&Fragment> = fragments
            .iter()
            .enumerate()
            .filter(|(i, f)| !detection.is_consumed(*i) && !f.is_blank())
            .map(|(_, f)| f)
            .collect();

        let mut items: Vec<Item> = self
            .group_into_lines(remaining)
            .into_iter()
            .map(Item::Line)
            .chain(detection.tables.iter().map(Item::Table))
            .collect();
        items.sort_by(|a, b| a.top().total_cmp(&b.top()).then(a.left().total_cmp(&b.left())));

        log::debug!(
            "Recognizer: body size {:.1}, {} items, {} tables",
            body_size,
            items.len(),
            detection.tables.len()
        );

        let mut blocks = Vec::new();
        let mut paragraph: Vec<TextLine> = Vec::new();
        for item in items {
            match item {
                Item::Table(detected) => {
                    flush_paragraph(&mut paragraph, &mut blocks);
                    blocks.push(Block::Table(detected.table.clone()));
                }
                Item::Line(line) => match self.heading_level(&line, body_size) {
                    Some(level) => {
                        flush_paragraph(&mut paragraph, &mut blocks);
                        blocks.push(Block::heading(level, line.text));
                    }
                    None => {
                        let gap_limit = body_size * self.config.paragraph_gap_factor;
                        if paragraph.last().map_or(false, |prev| line.top - prev.bottom > gap_limit) {
                            flush_paragraph(&mut paragraph, &mut blocks);
                        }
                        paragraph.push(line);
                    }
                },
            }
        }
        flush_paragraph(&mut paragraph, &mut blocks);

        blocks
    }

    /// Group fragments into lines by vertical position.
    fn group_into_lines(&self, mut fragments: Vec<&Fragment>) -> Vec<TextLine> {
        fragments.sort_by(|a, b| a.center_y().total_cmp(&b.center_y()).then(a.x0.total_cmp(&b.x0)));

        let mut groups: Vec<Vec<&Fragment>> = Vec::new();
        for fragment in fragments {
            let same_line = groups.last().and_then(|g| g.first()).map_or(false, |first| {
                let tolerance = first.font_size.min(fragment.font_size) * self.config.line_merge_tolerance;
                (fragment.center_y() - first.center_y()).abs() <= tolerance
            });
            match groups.last_mut() {
                Some(group) if same_line => group.push(fragment),
                _ => groups.push(vec![fragment]),
            }
        }

        groups
            .into_iter()
            .filter_map(|group| {
                let text = join_fragments(&group);
                if text.is_empty() {
                    return None;
                }
                // Character-weighted size, so a stray symbol does not skew it.
                let (weighted, chars) = group.iter().fold((0.0f32, 0usize), |(w, n), f| {
                    let count = f.text.chars().count();
                    (w + f.font_size * count as f32, n + count)
                });
                Some(TextLine {
                    text,
                    top: group.iter().map(|f| f.y0).fold(f32::INFINITY, f32::min),
                    bottom: group.iter().map(|f| f.y1).fold(f32::NEG_INFINITY, f32::max),
                    x0: group.iter().map(|f| f.x0).fold(f32::INFINITY, f32::min),
                    font_size: weighted / chars.max(1) as f32,
                })
            })
            .collect()
    }

    /// Heading level for a line, or `None` for body text.
    ///
    /// Size buckets give levels 1..=n, largest first; a numbering cue on a
    /// body-sized line gives level n + 1.
    fn heading_level(&self, line: &TextLine, body_size: f32) -> Option<u8> {
        let ratio = line.font_size / body_size;
        if let Some(index) = self.config.heading_size_ratios.iter().position(|&r| ratio >= r) {
            return Some((index + 1).min(6) as u8);
        }

        let cue = self.config.detect_heading_cues
            && line.font_size >= body_size - 0.5
            && is_heading_cue(&line.text, self.config.heading_cue_max_chars);
        cue.then(|| self.config.cue_heading_level())
    }
}

fn flush_paragraph(lines: &mut Vec<TextLine>, blocks: &mut Vec<Block>) {
    if lines.is_empty() {
        return;
    }
    let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
    let text = join_lines(&texts);
    if !text.is_empty() {
        blocks.push(Block::paragraph(text));
    }
    lines.clear();
}

fn heading_cue_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // "1. Introduction", "2.3 Scope", "2.3. Scope"
            r"^\d{1,2}(\.\d{1,2})*\.\s+\S",
            r"^\d{1,2}(\.\d{1,2})+\s+\S",
            // "제1장", "제 2 절"
            r"^제\s*\d+\s*[장절편부조항]",
            // "Chapter 4", "Section II", "Part 1"
            r"(?i)^(chapter|section|part)\s+(\d+|[ivxlc]+)\b",
            // "IV. Results"
            r"^[IVX]{1,5}\.\s+\S",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("heading cue pattern is valid"))
        .collect()
    })
}

/// Whether a body-sized line reads as a numbered heading.
fn is_heading_cue(text: &str, max_chars: usize) -> bool {
    let text = text.trim();
    if text.is_empty() || text.chars().count() > max_chars {
        return false;
    }
    if text.ends_with(['.', ',', ';', ':', '!', '?', '。']) {
        return false;
    }
    heading_cue_patterns().iter().any(|re| re.is_match(text))
}
