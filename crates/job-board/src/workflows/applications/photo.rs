use std::future::Future;

pub const DEFAULT_MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Photo chosen by the applicant, held in memory until submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn mime(&self) -> Option<mime::Mime> {
        self.content_type.parse().ok()
    }

    pub fn extension(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
            .unwrap_or("bin")
    }
}

/// Size and type limits checked before anything is sent to a photo store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoPolicy {
    max_bytes: usize,
}

impl PhotoPolicy {
    pub fn new(max_bytes: usize) -> Self {
        let max_bytes = if max_bytes == 0 {
            DEFAULT_MAX_PHOTO_BYTES
        } else {
            max_bytes
        };
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn check(&self, photo: &PhotoUpload) -> Result<(), PhotoError> {
        let is_image = photo
            .mime()
            .map(|mime| mime.type_() == mime::IMAGE)
            .unwrap_or(false);
        if !is_image {
            return Err(PhotoError::UnsupportedType(photo.content_type.clone()));
        }

        if photo.bytes.len() > self.max_bytes {
            return Err(PhotoError::TooLarge {
                max_bytes: self.max_bytes,
                found: photo.bytes.len(),
            });
        }

        Ok(())
    }

    /// Message shown next to the photo input when `check` fails.
    pub fn message_for(&self, error: &PhotoError) -> String {
        match error {
            PhotoError::TooLarge { max_bytes, .. } => {
                format!("File size must be less than {}MB", max_bytes / (1024 * 1024))
            }
            PhotoError::UnsupportedType(_) => "Photo must be an image".to_string(),
            other => other.to_string(),
        }
    }
}

impl Default for PhotoPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PHOTO_BYTES)
    }
}

/// Blob storage for candidate photos.
pub trait PhotoStore: Send + Sync {
    /// Store the photo and return its public URL.
    fn upload(
        &self,
        photo: &PhotoUpload,
        candidate_ref: &str,
    ) -> impl Future<Output = Result<String, PhotoError>> + Send;

    /// Remove a previously uploaded photo. `Ok(false)` when nothing was stored at `url`.
    fn delete(&self, url: &str) -> impl Future<Output = Result<bool, PhotoError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("photo exceeds {max_bytes} bytes (found {found})")]
    TooLarge { max_bytes: usize, found: usize },
    #[error("unsupported photo type '{0}'")]
    UnsupportedType(String),
    #[error("photo store rejected the upload: {0}")]
    Backend(String),
    #[error("photo url not recognised: {0}")]
    UnknownUrl(String),
}
