//! Context for a single extraction run.

/// Per-page context handed to the extractor.
#[derive(Debug, Clone)]
pub struct ExtractContext {
    /// URL of the page being scraped; stored on the resulting record.
    pub url: String,

    /// Image URL already chosen by the user (context-menu path). When set,
    /// the image waterfall is skipped and the method is `manual-selection`.
    pub known_image_url: Option<String>,
}

impl ExtractContext {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            known_image_url: None,
        }
    }

    /// Manual-selection path: the image is already known.
    pub fn with_known_image(mut self, image_url: impl Into<String>) -> Self {
        self.known_image_url = Some(image_url.into());
        self
    }
}
