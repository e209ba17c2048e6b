//! File name matching for event image directories.

use regex::Regex;

/// Matches `image-<N>.<ext>` names
pub struct ImageFilter {
    pattern: Regex,
}

impl ImageFilter {
    /// Create a filter for the `png`/`jpg`/`jpeg`/`webp` convention
    pub fn new() -> Self {
        Self::with_extensions(&["png", "jpg", "jpeg", "webp"])
    }

    /// Override the list of extensions to accept
    pub fn with_extensions(extensions: &[&str]) -> Self {
        let alternatives = extensions
            .iter()
            .map(|ext| regex::escape(ext))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)^image-(\d+)\.({})$", alternatives))
            .expect("escaped extension alternatives form a valid pattern");
        Self { pattern }
    }

    /// Split a file name into its index and extension
    ///
    /// Returns `None` for names outside the convention, including indices
    /// too large for a `u32`.
    pub fn parse(&self, file_name: &str) -> Option<(u32, String)> {
        let captures = self.pattern.captures(file_name)?;
        let index = captures.get(1)?.as_str().parse::<u32>().ok()?;
        let extension = captures.get(2)?.as_str().to_string();
        Some((index, extension))
    }

    /// Check if a file name should be included
    pub fn matches(&self, file_name: &str) -> bool {
        self.parse(file_name).is_some()
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_parses_index_and_extension() {
        let filter = ImageFilter::new();
        assert_eq!(filter.parse("image-0.png"), Some((0, "png".to_string())));
        assert_eq!(filter.parse("image-17.jpeg"), Some((17, "jpeg".to_string())));
        assert_eq!(filter.parse("image-3.WEBP"), Some((3, "WEBP".to_string())));
    }

    #[test]
    fn filter_rejects_other_names() {
        let filter = ImageFilter::new();
        assert!(!filter.matches("logo.png"));
        assert!(!filter.matches("image-.png"));
        assert!(!filter.matches("image-1.gif"));
        assert!(!filter.matches("temp-1700000000.png"));
        assert!(!filter.matches("image-1.png.bak"));
        assert!(!filter.matches(".image-1.png"));
    }

    #[test]
    fn filter_rejects_overflowing_index() {
        let filter = ImageFilter::new();
        assert!(!filter.matches("image-99999999999.png"));
    }

    #[test]
    fn filter_with_custom_extensions() {
        let filter = ImageFilter::with_extensions(&["png"]);
        assert!(filter.matches("image-1.png"));
        assert!(!filter.matches("image-1.jpg"));
    }
}
