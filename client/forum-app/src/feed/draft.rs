//! Post drafts

use error_types::validation::rules::require_non_blank;
use error_types::ValidationError;
use forum_api::ImageUpload;

/// A post being composed, optionally with an image to upload first
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub image: Option<ImageUpload>,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }

    /// Title and content must both contain non-whitespace text
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("title", &self.title)?;
        require_non_blank("content", &self.content)?;
        Ok(())
    }
}
