use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Image {
    /// Local file path or remote url.
    pub uri: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// `<guid>::<imageId>` once the image is known to the service.
    pub service_image_id: Option<String>,
}

impl Image {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_remote(&self) -> bool {
        self.uri.starts_with("http://") || self.uri.starts_with("https://")
    }

    /// Path of a local image, accepting plain paths and `file://` uris.
    pub fn local_path(&self) -> Option<PathBuf> {
        if self.is_remote() {
            return None;
        }
        let path = self.uri.strip_prefix("file://").unwrap_or(&self.uri);
        Some(PathBuf::from(path))
    }

    pub fn file_name(&self) -> String {
        self.local_path()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "image.jpg".to_string())
    }
}
