use std::io::Cursor;

use chrono::Utc;
use google_drive3::{api::File, api::Scope, DriveHub};

use super::photo::{PhotoError, PhotoStore, PhotoUpload};

const PUBLIC_URL_PREFIX: &str = "https://drive.google.com/uc?id=";

/// Photo store backed by a Google Drive folder.
pub struct GoogleDrivePhotoStore<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    hub: DriveHub<C>,
    folder_id: Option<String>,
}

impl<C> GoogleDrivePhotoStore<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    pub fn new(hub: DriveHub<C>, folder_id: Option<String>) -> Self {
        Self { hub, folder_id }
    }

    fn map_error<E: std::fmt::Display>(err: E) -> PhotoError {
        PhotoError::Backend(err.to_string())
    }
}

impl<C> std::fmt::Debug for GoogleDrivePhotoStore<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleDrivePhotoStore")
            .field("folder_id", &self.folder_id)
            .finish_non_exhaustive()
    }
}

impl<C> PhotoStore for GoogleDrivePhotoStore<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    async fn upload(&self, photo: &PhotoUpload, candidate_ref: &str) -> Result<String, PhotoError> {
        let mime_type = photo
            .mime()
            .ok_or_else(|| PhotoError::UnsupportedType(photo.content_type.clone()))?;

        let metadata = File {
            name: Some(format!(
                "{candidate_ref}-{}.{}",
                Utc::now().timestamp_millis(),
                photo.extension()
            )),
            mime_type: Some(photo.content_type.clone()),
            parents: self.folder_id.clone().map(|parent| vec![parent]),
            ..File::default()
        };

        let cursor = Cursor::new(photo.bytes.clone());
        let (_, file) = self
            .hub
            .files()
            .create(metadata)
            .param("fields", "id")
            .supports_all_drives(true)
            .add_scope(Scope::File)
            .upload(cursor, mime_type)
            .await
            .map_err(Self::map_error)?;

        let file_id = file
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PhotoError::Backend("drive returned no file id".to_string()))?;

        Ok(public_url(&file_id))
    }

    async fn delete(&self, url: &str) -> Result<bool, PhotoError> {
        let file_id = file_id_from_url(url).ok_or_else(|| PhotoError::UnknownUrl(url.to_string()))?;

        self.hub
            .files()
            .delete(file_id)
            .supports_all_drives(true)
            .add_scope(Scope::File)
            .doit()
            .await
            .map_err(Self::map_error)?;

        Ok(true)
    }
}

fn public_url(file_id: &str) -> String {
    format!("{PUBLIC_URL_PREFIX}{file_id}")
}

fn file_id_from_url(url: &str) -> Option<&str> {
    url.strip_prefix(PUBLIC_URL_PREFIX)
        .filter(|id| !id.is_empty() && !id.contains('&'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_urls_round_trip_to_file_ids() {
        let url = public_url("1AbC");
        assert_eq!(file_id_from_url(&url), Some("1AbC"));
    }

    #[test]
    fn foreign_urls_are_not_drive_files() {
        assert_eq!(file_id_from_url("https://example.com/photo.png"), None);
        assert_eq!(file_id_from_url(PUBLIC_URL_PREFIX), None);
    }
}
