use serde::{Deserialize, Serialize};

use crate::image_store::UploadedImage;

/// Domain representation of a product category.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Category {
    /// Unique identifier of the category.
    pub id: i32,
    /// Globally unique, human-readable name.
    pub name: String,
    /// Relative `media/...` path of the category image.
    pub image: Option<String>,
}

/// Payload required to insert a new category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    /// Path returned by the image store for an already saved image.
    pub image: Option<String>,
}

impl NewCategory {
    /// Build a new category payload without an image.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: None,
        }
    }

    /// Attach an already stored image path.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Patch data applied when updating an existing category.
///
/// `None` leaves a field untouched. For `image`, `Some(None)` removes the
/// current image and `Some(Some(upload))` replaces it with a new upload.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub image: Option<Option<UploadedImage>>,
}

impl UpdateCategory {
    /// Create a new patch object with no changes applied yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename the category.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace the image with `image`, or remove it when `None`.
    pub fn image(mut self, image: Option<UploadedImage>) -> Self {
        self.image = Some(image);
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.image.is_none()
    }
}
