use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::category::{NewCategory, UpdateCategory};
use crate::forms::{read_upload, sanitize_inline_text};
use crate::image_store::UploadedImage;

/// Maximum length allowed for a category name.
const NAME_MAX_LEN: usize = 255;
const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Result type returned by the category form helpers.
pub type CategoryFormResult<T> = Result<T, CategoryFormError>;

/// Errors that can occur while processing category forms.
#[derive(Debug, Error)]
pub enum CategoryFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after sanitization.
    #[error("category name cannot be empty")]
    EmptyName,
    #[error("failed to read uploaded file: {0}")]
    Upload(#[from] std::io::Error),
}

/// Multipart body accepted when creating or replacing a category.
#[derive(Debug, MultipartForm)]
pub struct CategoryMultipartForm {
    pub name: Text<String>,
    /// Optional image file.
    pub file: Option<TempFile>,
}

impl CategoryMultipartForm {
    /// Load the uploaded file into memory.
    pub fn into_form(self) -> CategoryFormResult<CategoryForm> {
        let image = match self.file {
            Some(file) => read_upload(file)?,
            None => None,
        };

        Ok(CategoryForm {
            name: self.name.into_inner(),
            image,
        })
    }
}

/// Category fields decoded from a request.
#[derive(Debug, Validate)]
pub struct CategoryForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: String,
    pub image: Option<UploadedImage>,
}

impl CategoryForm {
    /// Validates and sanitizes the form.
    pub fn into_payload(self) -> CategoryFormResult<CategoryPayload> {
        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(CategoryFormError::EmptyName);
        }

        Ok(CategoryPayload {
            name,
            image: self.image,
        })
    }
}

/// Validated category payload.
#[derive(Debug, Clone)]
pub struct CategoryPayload {
    pub name: String,
    pub image: Option<UploadedImage>,
}

impl CategoryPayload {
    /// Build the insert payload once the image, if any, has been stored at `image_path`.
    pub fn new_category(&self, image_path: Option<String>) -> NewCategory {
        let category = NewCategory::new(self.name.clone());
        match image_path {
            Some(path) => category.with_image(path),
            None => category,
        }
    }

    /// Replace both the name and the image; a missing image removes the current one.
    pub fn into_update_category(self) -> UpdateCategory {
        UpdateCategory::new().name(self.name).image(self.image)
    }
}
