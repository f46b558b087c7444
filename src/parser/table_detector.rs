//! Table detection from positioned text fragments.
//!
//! Fragments are grouped into rows by vertical position and split into
//! cells by horizontal gaps. Runs of consecutive multi-cell rows whose
//! cells fall into the same column bands become tables. Inside a run, a row
//! with fewer cells is kept when each cell sits in one of the run's bands;
//! its missing cells are left empty.

use std::collections::BTreeSet;

use super::fragment::{join_fragments, Fragment};
use super::options::TableDetectorConfig;
use crate::model::Table;

/// A table found on a page.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Top edge of the first row
    pub top: f32,
    /// Left edge of the first column band
    pub left: f32,
    /// The assembled cell grid
    pub table: Table,
}

/// Result of running the detector over one page.
#[derive(Debug, Clone, Default)]
pub struct TableDetection {
    /// Tables in top-to-bottom order
    pub tables: Vec<DetectedTable>,
    /// Indices of fragments absorbed into a table
    pub consumed: BTreeSet<usize>,
}

impl TableDetection {
    /// Whether the fragment at `index` belongs to a table.
    pub fn is_consumed(&self, index: usize) -> bool {
        self.consumed.contains(&index)
    }
}

/// A horizontal run of fragments that reads as one cell.
#[derive(Debug, Clone)]
struct Segment {
    x0: f32,
    x1: f32,
    members: Vec<usize>,
}

/// A row of fragments sharing a vertical position.
#[derive(Debug, Clone)]
struct Row {
    top: f32,
    bottom: f32,
    center: f32,
    font_size: f32,
    segments: Vec<Segment>,
}

/// Table detector.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a new table detector with default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables among `fragments`.
    pub fn detect(&self, fragments: &[Fragment]) -> TableDetection {
        let mut detection = TableDetection::default();
        if !self.config.enabled || fragments.is_empty() {
            return detection;
        }

        let rows = self.group_into_rows(fragments);
        log::debug!("TableDetector: {} rows from {} fragments", rows.len(), fragments.len());

        for run in self.candidate_runs(&rows) {
            if let Some((table, members)) = self.build_table(&rows[run.clone()], fragments) {
                for index in members {
                    detection.consumed.insert(index);
                }
                detection.tables.push(table);
            }
        }

        log::debug!("TableDetector: {} tables detected", detection.tables.len());
        detection
    }

    /// Group fragments into rows by vertical center.
    fn group_into_rows(&self, fragments: &[Fragment]) -> Vec<Row> {
        let mut order: Vec<usize> = (0..fragments.len())
            .filter(|&i| !fragments[i].is_blank())
            .collect();
        order.sort_by(|&a, &b| {
            fragments[a]
                .center_y()
                .total_cmp(&fragments[b].center_y())
                .then(fragments[a].x0.total_cmp(&fragments[b].x0))
        });

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut current_center = f32::NAN;
        let mut current_size = 0.0f32;
        for index in order {
            let fragment = &fragments[index];
            let tolerance = current_size.min(fragment.font_size) * self.config.row_tolerance;
            match groups.last_mut() {
                Some(group) if (fragment.center_y() - current_center).abs() <= tolerance => {
                    group.push(index);
                }
                _ => {
                    groups.push(vec![index]);
                    current_center = fragment.center_y();
                    current_size = fragment.font_size;
                }
            }
        }

        groups
            .into_iter()
            .map(|members| self.build_row(members, fragments))
            .collect()
    }

    fn build_row(&self, mut members: Vec<usize>, fragments: &[Fragment]) -> Row {
        members.sort_by(|&a, &b| fragments[a].x0.total_cmp(&fragments[b].x0));

        let mut segments: Vec<Segment> = Vec::new();
        for index in members.iter().copied() {
            let fragment = &fragments[index];
            match segments.last_mut() {
                Some(segment) if fragment.x0 - segment.x1 < self.config.column_gap => {
                    segment.x1 = segment.x1.max(fragment.x1);
                    segment.members.push(index);
                }
                _ => segments.push(Segment {
                    x0: fragment.x0,
                    x1: fragment.x1,
                    members: vec![index],
                }),
            }
        }

        let top = members.iter().map(|&i| fragments[i].y0).fold(f32::INFINITY, f32::min);
        let bottom = members.iter().map(|&i| fragments[i].y1).fold(f32::NEG_INFINITY, f32::max);
        let font_size = members.iter().map(|&i| fragments[i].font_size).fold(0.0, f32::max);

        Row {
            top,
            bottom,
            center: (top + bottom) / 2.0,
            font_size,
            segments,
        }
    }

    /// Find runs of consecutive, closely spaced rows. A run starts and ends
    /// on rows with at least `min_columns` cells; sparser rows in between
    /// must fit the run's column bands.
    fn candidate_runs(&self, rows: &[Row]) -> Vec<std::ops::Range<usize>> {
        let mut runs = Vec::new();
        let mut start: Option<usize> = None;
        let mut last_full = 0;

        for (i, row) in rows.iter().enumerate() {
            let is_full = row.segments.len() >= self.config.min_columns;
            let continues = match start {
                Some(s) => {
                    let prev = &rows[i - 1];
                    let close =
                        row.top - prev.bottom <= prev.font_size.max(row.font_size) * self.config.max_row_gap;
                    close && (is_full || fits_bands(row, &column_bands(&rows[s..i])))
                }
                None => false,
            };

            if continues {
                if is_full {
                    last_full = i;
                }
                continue;
            }
            if let Some(s) = start.take() {
                self.close_run(&mut runs, s, last_full);
            }
            if is_full {
                start = Some(i);
                last_full = i;
            }
        }
        if let Some(s) = start {
            self.close_run(&mut runs, s, last_full);
        }
        runs
    }

    /// Record `start..=last_full` if it has enough rows. Sparse rows after
    /// the last full row are left out of the table.
    fn close_run(&self, runs: &mut Vec<std::ops::Range<usize>>, start: usize, last_full: usize) {
        let end = last_full + 1;
        if end - start >= self.config.min_rows {
            runs.push(start..end);
        }
    }

    /// Validate a run of rows and assemble it into a table.
    fn build_table(&self, rows: &[Row], fragments: &[Fragment]) -> Option<(DetectedTable, Vec<usize>)> {
        let bands = column_bands(rows);
        if bands.len() < self.config.min_columns || bands.len() > self.config.max_columns {
            log::debug!("TableDetector: rejected region with {} column bands", bands.len());
            return None;
        }

        // Every cell must land in its own band.
        let mut grid: Vec<Vec<String>> = Vec::with_capacity(rows.len());
        let mut members = Vec::new();
        for row in rows {
            let mut cells = vec![String::new(); bands.len()];
            let mut used = vec![false; bands.len()];
            for segment in &row.segments {
                let band = bands.iter().position(|&(x0, x1)| segment.x0 >= x0 && segment.x0 <= x1)?;
                if used[band] {
                    log::debug!("TableDetector: rejected region, two cells share a column");
                    return None;
                }
                used[band] = true;
                let parts: Vec<&Fragment> = segment.members.iter().map(|&i| &fragments[i]).collect();
                cells[band] = join_fragments(&parts);
                members.extend(segment.members.iter().copied());
            }
            grid.push(cells);
        }

        if self.config.reject_lists && is_list_pattern(&grid) {
            log::debug!("TableDetector: rejected region that looks like a list");
            return None;
        }

        let filled: Vec<usize> = grid
            .iter()
            .flatten()
            .filter(|c| !c.is_empty())
            .map(|c| c.chars().count())
            .collect();
        let mean = filled.iter().sum::<usize>() as f32 / filled.len().max(1) as f32;
        if mean > self.config.max_mean_cell_chars {
            log::debug!("TableDetector: rejected region with mean cell length {:.1}", mean);
            return None;
        }

        let top = rows.first().map(|r| r.top).unwrap_or_default();
        let left = bands.first().map(|b| b.0).unwrap_or_default();
        log::debug!(
            "TableDetector: table {}x{} at y={:.1}",
            grid.len(),
            bands.len(),
            rows.first().map(|r| r.center).unwrap_or_default()
        );

        Some((
            DetectedTable {
                top,
                left,
                table: Table::new(grid),
            },
            members,
        ))
    }
}

/// Merge the x-intervals of all cells into non-overlapping column bands.
fn column_bands(rows: &[Row]) -> Vec<(f32, f32)> {
    let mut intervals: Vec<(f32, f32)> = rows
        .iter()
        .flat_map(|r| r.segments.iter().map(|s| (s.x0, s.x1)))
        .collect();
    intervals.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut bands: Vec<(f32, f32)> = Vec::new();
    for (x0, x1) in intervals {
        match bands.last_mut() {
            Some(band) if x0 <= band.1 => band.1 = band.1.max(x1),
            _ => bands.push((x0, x1)),
        }
    }
    bands
}

/// Whether every cell of `row` starts inside a distinct band and ends
/// before the next band begins.
fn fits_bands(row: &Row, bands: &[(f32, f32)]) -> bool {
    let mut used = vec![false; bands.len()];
    row.segments.iter().all(|segment| {
        let Some(band) = bands.iter().position(|&(x0, x1)| segment.x0 >= x0 && segment.x0 <= x1) else {
            return false;
        };
        let next_start = bands.get(band + 1).map_or(f32::INFINITY, |b| b.0);
        let fits = !used[band] && segment.x1 < next_start;
        used[band] = true;
        fits
    })
}

/// Check if the first column is mostly list markers.
///
/// A numbered or bulleted list often extracts as a marker fragment followed
/// by the item text, which looks like a two-column grid.
fn is_list_pattern(grid: &[Vec<String>]) -> bool {
    if grid.is_empty() {
        return false;
    }
    let columns = grid.iter().map(|r| r.len()).max().unwrap_or(0);

    let mut bullet_count = 0;
    let mut number_count = 0;
    for row in grid {
        let Some(first) = row.iter().find(|c| !c.is_empty()) else {
            continue;
        };
        if is_bullet_marker(first) {
            bullet_count += 1;
        } else if is_number_marker(first) {
            number_count += 1;
        }
    }

    let bullet_ratio = bullet_count as f32 / grid.len() as f32;
    let total_ratio = (bullet_count + number_count) as f32 / grid.len() as f32;

    // Bullets are almost never table data; numbered first columns are,
    // except in two-column layouts.
    bullet_ratio >= 0.5 || (columns == 2 && total_ratio >= 0.5)
}

/// Check if text is a bullet marker (•, -, etc.).
fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "►" | "■" | "●" | "※" | "□" | "◆" | "◇" | "▶" | "➤"
    )
}

/// Check if text is a number-style list marker (1., 2), a., etc.).
fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }

    if let Some(pos) = cleaned.find(|c: char| !c.is_ascii_digit()) {
        let (digits, suffix) = cleaned.split_at(pos);
        if !digits.is_empty() && (suffix == "." || suffix == ")") {
            return true;
        }
    }

    let mut chars = cleaned.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(letter), Some('.' | ')'), None) if letter.is_alphabetic()
    )
}
