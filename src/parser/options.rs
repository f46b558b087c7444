//! Layout analysis configuration.
//!
//! Heading and table recognition is heuristic. Every tolerance it uses is a
//! named field here so it can be tuned and tested on its own.

/// Options for structure recognition and table detection.
#[derive(Debug, Clone, Default)]
pub struct LayoutConfig {
    /// Line grouping and heading classification
    pub recognizer: RecognizerConfig,

    /// Table detection
    pub tables: TableDetectorConfig,
}

impl LayoutConfig {
    /// Create new layout options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set recognizer options.
    pub fn with_recognizer(mut self, recognizer: RecognizerConfig) -> Self {
        self.recognizer = recognizer;
        self
    }

    /// Set table detector options.
    pub fn with_tables(mut self, tables: TableDetectorConfig) -> Self {
        self.tables = tables;
        self
    }

    /// Disable table detection; aligned text becomes paragraphs.
    pub fn without_tables(mut self) -> Self {
        self.tables.enabled = false;
        self
    }
}

/// Options for grouping fragments into lines and classifying them.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// Two fragments share a line when their vertical centers differ by at
    /// most this fraction of the smaller font size.
    pub line_merge_tolerance: f32,

    /// Size ratios (line size / body size) for heading levels 1, 2, ...
    /// See [`RecognizerConfig::normalized`] for the accepted shape.
    pub heading_size_ratios: Vec<f32>,

    /// Treat numbering patterns ("1.", "2.3", "제1장", "Chapter 4") as
    /// heading cues.
    pub detect_heading_cues: bool,

    /// Longest line (in characters) that may become a heading through a cue.
    pub heading_cue_max_chars: usize,

    /// A vertical gap larger than this multiple of the body size ends a
    /// paragraph.
    pub paragraph_gap_factor: f32,
}

impl RecognizerConfig {
    /// Set the heading size ratios; they are sorted largest first.
    pub fn with_heading_size_ratios(mut self, ratios: Vec<f32>) -> Self {
        self.heading_size_ratios = ratios;
        self.normalized()
    }

    /// Drop heading ratios that are not above 1, sort the rest in
    /// descending order and keep at most six.
    pub fn normalized(mut self) -> Self {
        let ratios = &mut self.heading_size_ratios;
        ratios.retain(|r| r.is_finite() && *r > 1.0);
        ratios.sort_by(|a, b| b.total_cmp(a));
        ratios.truncate(6);
        self
    }

    /// Enable or disable heading cues.
    pub fn with_heading_cues(mut self, enabled: bool) -> Self {
        self.detect_heading_cues = enabled;
        self
    }

    /// Set the line merge tolerance.
    pub fn with_line_merge_tolerance(mut self, tolerance: f32) -> Self {
        self.line_merge_tolerance = tolerance;
        self
    }

    /// Set the paragraph gap factor.
    pub fn with_paragraph_gap_factor(mut self, factor: f32) -> Self {
        self.paragraph_gap_factor = factor;
        self
    }

    /// Level given to cue-only headings: one below the smallest size bucket.
    pub fn cue_heading_level(&self) -> u8 {
        (self.heading_size_ratios.len() + 1).min(6) as u8
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            line_merge_tolerance: 0.5,
            heading_size_ratios: vec![2.0, 1.6, 1.35, 1.2],
            detect_heading_cues: true,
            heading_cue_max_chars: 60,
            paragraph_gap_factor: 1.0,
        }
    }
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Run table detection at all
    pub enabled: bool,
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping fragments into rows (fraction of font size)
    pub row_tolerance: f32,
    /// Horizontal gap (points) that separates two cells in a row
    pub column_gap: f32,
    /// Largest vertical gap between table rows (multiple of font size)
    pub max_row_gap: f32,
    /// Regions whose cells average more characters than this are prose
    /// columns, not tables
    pub max_mean_cell_chars: f32,
    /// Reject regions whose first column is mostly list markers
    pub reject_lists: bool,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_rows: 2,
            min_columns: 2,
            max_columns: 8,
            row_tolerance: 0.4,
            column_gap: 15.0,
            max_row_gap: 2.5,
            max_mean_cell_chars: 40.0,
            reject_lists: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_fixes_field_edits() {
        let mut config = RecognizerConfig::default();
        config.heading_size_ratios = vec![1.1, 3.0, f32::NAN, 1.5];
        assert_eq!(config.normalized().heading_size_ratios, vec![3.0, 1.5, 1.1]);
    }

    #[test]
    fn test_heading_ratios_sorted() {
        let config = RecognizerConfig::default().with_heading_size_ratios(vec![1.3, 2.5, 0.8, 1.7]);
        assert_eq!(config.heading_size_ratios, vec![2.5, 1.7, 1.3]);
        assert_eq!(config.cue_heading_level(), 4);
    }

    #[test]
    fn test_cue_level_capped() {
        let config = RecognizerConfig::default()
            .with_heading_size_ratios(vec![3.0, 2.5, 2.0, 1.8, 1.5, 1.2, 1.1]);
        assert_eq!(config.heading_size_ratios.len(), 6);
        assert_eq!(config.cue_heading_level(), 6);
    }

    #[test]
    fn test_layout_builder() {
        let config = LayoutConfig::new().without_tables();
        assert!(!config.tables.enabled);
        assert_eq!(config.tables.min_rows, 2);
        assert!(config.recognizer.detect_heading_cues);
    }
}
