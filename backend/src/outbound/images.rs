//! Local-directory image store.
//!
//! Uploads land in a capability-scoped directory as `{uuid}.{ext}`; the
//! public URL is the configured base URL joined with that file name, so the
//! directory can be served by any static file host.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::{ImageRef, ImageUpload};

/// Image store writing into a directory on local disk.
#[derive(Clone)]
pub struct LocalImageStore {
    dir: Arc<Dir>,
    base_url: String,
}

impl LocalImageStore {
    /// Open (creating if needed) `root` and publish files under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageStoreError::Io`] when the directory cannot be created or
    /// opened.
    pub fn open(root: &Path, base_url: impl Into<String>) -> Result<Self, ImageStoreError> {
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(|err| io_error(root.display(), &err))?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|err| io_error(root.display(), &err))?;
        Ok(Self {
            dir: Arc::new(dir),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn public_url(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.base_url)
    }
}

fn io_error(subject: impl std::fmt::Display, err: &io::Error) -> ImageStoreError {
    ImageStoreError::io(format!("{subject}: {err}"))
}

/// Image ids are bare file names produced by [`LocalImageStore::upload`].
fn is_plain_file_name(image_id: &str) -> bool {
    !image_id.is_empty()
        && !image_id.starts_with('.')
        && image_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

async fn run_blocking<T, F>(task: F) -> Result<T, ImageStoreError>
where
    F: FnOnce() -> Result<T, ImageStoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| ImageStoreError::io(format!("image task failed: {err}")))?
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn upload(&self, image: &ImageUpload) -> Result<ImageRef, ImageStoreError> {
        let file_name = format!("{}.{}", Uuid::new_v4().simple(), image.extension());
        let dir = Arc::clone(&self.dir);
        let bytes = image.bytes().to_vec();
        let target = file_name.clone();
        run_blocking(move || {
            dir.write(&target, bytes)
                .map_err(|err| io_error(&target, &err))
        })
        .await?;
        debug!(file = %file_name, original = image.file_name(), "image stored");
        Ok(ImageRef {
            url: self.public_url(&file_name),
            id: file_name,
        })
    }

    async fn delete(&self, image_id: &str) -> Result<(), ImageStoreError> {
        if !is_plain_file_name(image_id) {
            return Err(ImageStoreError::rejected(format!(
                "{image_id} is not an image id issued by this store"
            )));
        }
        let dir = Arc::clone(&self.dir);
        let target = image_id.to_owned();
        run_blocking(move || match dir.remove_file(&target) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&target, &err)),
        })
        .await
    }
}
