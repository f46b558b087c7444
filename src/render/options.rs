//! Rendering options and configuration.

/// Options shared by the Markdown and text renderers.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Levels added to a detected heading level in Markdown. With the
    /// default of 2, a level-1 heading renders as `###` below the `##`
    /// page header.
    pub heading_offset: u8,

    /// Insert a `---` line between pages in Markdown
    pub page_separators: bool,

    /// Width of the `=` rule framing the text header
    pub rule_width: usize,

    /// Emit the source file name in both headers
    pub include_source: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heading offset.
    pub fn with_heading_offset(mut self, offset: u8) -> Self {
        self.heading_offset = offset.min(5);
        self
    }

    /// Enable or disable page separators.
    pub fn with_page_separators(mut self, enabled: bool) -> Self {
        self.page_separators = enabled;
        self
    }

    /// Set the rule width.
    pub fn with_rule_width(mut self, width: usize) -> Self {
        self.rule_width = width;
        self
    }

    /// Enable or disable the source file line.
    pub fn with_source(mut self, enabled: bool) -> Self {
        self.include_source = enabled;
        self
    }

    /// Number of `#` characters for a detected heading level.
    pub fn markdown_heading_depth(&self, level: u8) -> usize {
        (level.saturating_add(self.heading_offset)).clamp(1, 6) as usize
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            heading_offset: 2,
            page_separators: true,
            rule_width: 60,
            include_source: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_depth() {
        let options = RenderOptions::default();
        assert_eq!(options.markdown_heading_depth(1), 3);
        assert_eq!(options.markdown_heading_depth(4), 6);
        assert_eq!(options.markdown_heading_depth(6), 6);

        let options = RenderOptions::new().with_heading_offset(0);
        assert_eq!(options.markdown_heading_depth(1), 1);
    }
}
