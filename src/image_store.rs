//! Filesystem persistence for uploaded images.
//!
//! Stored images are referenced by relative paths of the form
//! `media/<folder>/<file>`. The leading `media` segment maps to the configured
//! media root, which is also served publicly under `/media`.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::thread;

use thiserror::Error;
use uuid::Uuid;

/// First segment of every path handed out by [`ImageStore::save`].
pub const MEDIA_PREFIX: &str = "media";

/// Result type returned by the image store.
pub type ImageStoreResult<T> = Result<T, ImageStoreError>;

/// Errors that can occur while persisting an upload.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    /// The upload did not declare an `image/*` content type.
    #[error("Invalid image type `{content_type}`")]
    InvalidMediaType { content_type: String },
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
    #[error("image writer thread panicked")]
    WorkerPanicked,
}

/// An uploaded file held in memory until it is written to the media root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// File name declared by the client.
    pub file_name: Option<String>,
    /// Content type declared by the client.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedImage {
    pub fn new(
        file_name: Option<String>,
        content_type: Option<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name,
            content_type,
            data: data.into(),
        }
    }

    fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|value| value.trim().to_ascii_lowercase().starts_with("image/"))
            .unwrap_or(false)
    }

    /// Extension of the declared file name including the leading dot, if any.
    fn extension(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|ch| ch.is_ascii_alphanumeric()))
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default()
    }
}

/// Saves and deletes image files below a media root directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    media_root: PathBuf,
}

impl ImageStore {
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
        }
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// Write `upload` below `folder` and return its public relative path.
    pub fn save(&self, folder: &str, upload: &UploadedImage) -> ImageStoreResult<String> {
        if !upload.is_image() {
            return Err(ImageStoreError::InvalidMediaType {
                content_type: upload.content_type.clone().unwrap_or_default(),
            });
        }

        let folder = folder.trim_matches('/');
        let folder_path = self.media_root.join(folder);
        fs::create_dir_all(&folder_path)?;

        let file_name = format!("{}{}", Uuid::new_v4(), upload.extension());
        fs::write(folder_path.join(&file_name), &upload.data)?;

        Ok(format!("{MEDIA_PREFIX}/{folder}/{file_name}"))
    }

    /// Save every upload concurrently.
    ///
    /// Either all files are stored or none: when one save fails the files
    /// already written are removed again before the error is returned.
    pub fn save_all(
        &self,
        folder: &str,
        uploads: &[UploadedImage],
    ) -> ImageStoreResult<Vec<String>> {
        let results: Vec<ImageStoreResult<String>> = thread::scope(|scope| {
            let handles: Vec<_> = uploads
                .iter()
                .map(|upload| scope.spawn(move || self.save(folder, upload)))
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or(Err(ImageStoreError::WorkerPanicked))
                })
                .collect()
        });

        let mut saved = Vec::with_capacity(results.len());
        let mut failure = None;
        for result in results {
            match result {
                Ok(path) => saved.push(path),
                Err(err) => {
                    failure.get_or_insert(err);
                }
            }
        }

        if let Some(err) = failure {
            self.delete_all(&saved);
            return Err(err);
        }

        Ok(saved)
    }

    /// Remove the file behind `path`.
    ///
    /// Paths outside the media root are ignored. Removal failures are logged
    /// and never returned.
    pub fn delete(&self, path: &str) {
        let Some(full_path) = self.resolve(path) else {
            log::debug!("Skipping deletion of `{path}`: not a media path");
            return;
        };

        if let Err(err) = fs::remove_file(&full_path) {
            log::warn!("Image {path} could not be deleted: {err}");
        }
    }

    pub fn delete_all<S: AsRef<str>>(&self, paths: &[S]) {
        for path in paths {
            self.delete(path.as_ref());
        }
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let mut components = Path::new(path).components();
        match components.next() {
            Some(Component::Normal(first)) if first == MEDIA_PREFIX => {}
            _ => return None,
        }

        let relative = components.as_path();
        if relative.as_os_str().is_empty()
            || relative
                .components()
                .any(|component| !matches!(component, Component::Normal(_)))
        {
            return None;
        }

        Some(self.media_root.join(relative))
    }
}
