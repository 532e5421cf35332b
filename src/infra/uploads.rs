//! Filesystem storage for post media.

use std::error::Error as StdError;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use futures::{Stream, StreamExt, pin_mut, stream};
use metrics::{counter, histogram};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::domain::entities::CoverRecord;

#[derive(Debug, Error)]
pub enum MediaStorageError {
    #[error("invalid stored path")]
    InvalidPath,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("uploaded file exceeds configured body limit")]
    PayloadTooLarge {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("uploaded file stream failed")]
    PayloadStream {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("uploaded file is empty")]
    EmptyPayload,
    #[error("uploaded file size exceeds supported range")]
    SizeOverflow,
}

/// Media files live under `<root>/<collection>/<yyyy>/<mm>/<dd>/<uuid>-<name>`.
#[derive(Debug)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Stream an uploaded file to disk, hashing as it goes.
    pub async fn store_stream<S>(
        &self,
        collection: &str,
        original_name: &str,
        content_type: &str,
        stream: S,
    ) -> Result<CoverRecord, MediaStorageError>
    where
        S: Stream<Item = Result<Bytes, MediaStorageError>>,
    {
        let stored_path = build_stored_path(collection, original_name);
        let absolute = self.resolve(&stored_path)?;

        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&absolute).await?;
        let mut hasher = Sha256::new();
        let mut total_bytes: u64 = 0;

        pin_mut!(stream);
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    drop(file);
                    let _ = fs::remove_file(&absolute).await;
                    return Err(err);
                }
            };

            total_bytes = total_bytes
                .checked_add(chunk.len() as u64)
                .ok_or(MediaStorageError::SizeOverflow)?;
            file.write_all(&chunk).await?;
            hasher.update(&chunk);
        }

        file.flush().await?;

        if total_bytes == 0 {
            drop(file);
            let _ = fs::remove_file(&absolute).await;
            return Err(MediaStorageError::EmptyPayload);
        }

        counter!("postdesk_media_uploads_total").increment(1);
        histogram!("postdesk_media_upload_bytes").record(total_bytes as f64);

        Ok(CoverRecord {
            stored_path,
            filename: display_filename(original_name),
            content_type: content_type.to_string(),
            size_bytes: i64::try_from(total_bytes).map_err(|_| MediaStorageError::SizeOverflow)?,
            checksum: hex::encode(hasher.finalize()),
        })
    }

    pub async fn store(
        &self,
        collection: &str,
        original_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<CoverRecord, MediaStorageError> {
        let stream = stream::once(async move { Ok::<_, MediaStorageError>(data) });
        self.store_stream(collection, original_name, content_type, stream)
            .await
    }

    pub async fn read(&self, stored_path: &str) -> Result<Bytes, MediaStorageError> {
        let absolute = self.resolve(stored_path)?;
        let data = fs::read(absolute).await?;
        Ok(Bytes::from(data))
    }

    /// Missing files count as already deleted.
    pub async fn delete(&self, stored_path: &str) -> Result<(), MediaStorageError> {
        let absolute = self.resolve(stored_path)?;
        match fs::remove_file(&absolute).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(MediaStorageError::Io(err)),
        }
    }

    /// Reject absolute paths and any `..` component before touching the filesystem.
    fn resolve(&self, stored_path: &str) -> Result<PathBuf, MediaStorageError> {
        let relative = Path::new(stored_path);
        let escapes = relative.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if stored_path.is_empty() || escapes {
            return Err(MediaStorageError::InvalidPath);
        }

        Ok(self.root.join(relative))
    }
}

fn build_stored_path(collection: &str, original_name: &str) -> String {
    let (year, month, day) = time::OffsetDateTime::now_utc().to_calendar_date();
    let collection = slug::slugify(collection);
    let identifier = Uuid::new_v4();
    let filename = sanitize_filename(original_name);
    format!(
        "{collection}/{year}/{:02}/{day:02}/{identifier}-{filename}",
        month as u8
    )
}

/// Name offered back to the browser on download.
fn display_filename(original: &str) -> String {
    let name = Path::new(original)
        .file_name()
        .and_then(|value| value.to_str())
        .map(str::trim)
        .unwrap_or("");
    if name.is_empty() {
        "upload".to_string()
    } else {
        name.replace(['"', '\\', '\r', '\n'], "_")
    }
}

fn sanitize_filename(original: &str) -> String {
    let path = Path::new(original);
    let stem = path
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("upload");
    let mut base = crate::domain::slug::slugify(stem);
    if base.is_empty() {
        base = "upload".to_string();
    }

    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.trim_matches('.').to_ascii_lowercase())
        .filter(|value| !value.is_empty());

    match extension {
        Some(ext) => format!("{base}.{ext}"),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_reads_back_with_checksum() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = MediaStorage::new(dir.path().to_path_buf()).expect("storage");

        let cover = storage
            .store("covers", "My Photo.PNG", "image/png", Bytes::from_static(b"abc"))
            .await
            .expect("stored");

        assert!(cover.stored_path.starts_with("covers/"));
        assert!(cover.stored_path.ends_with("-my-photo.png"));
        assert_eq!(cover.filename, "My Photo.PNG");
        assert_eq!(cover.size_bytes, 3);
        assert_eq!(
            cover.checksum,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );

        let data = storage.read(&cover.stored_path).await.expect("read");
        assert_eq!(&data[..], b"abc");

        storage.delete(&cover.stored_path).await.expect("delete");
        storage.delete(&cover.stored_path).await.expect("idempotent delete");
    }

    #[tokio::test]
    async fn empty_payload_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = MediaStorage::new(dir.path().to_path_buf()).expect("storage");

        let err = storage
            .store("covers", "empty.png", "image/png", Bytes::new())
            .await
            .expect_err("empty");
        assert!(matches!(err, MediaStorageError::EmptyPayload));
    }

    #[tokio::test]
    async fn traversal_paths_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = MediaStorage::new(dir.path().to_path_buf()).expect("storage");

        for path in ["../etc/passwd", "/etc/passwd", "covers/../../x", ""] {
            let err = storage.read(path).await.expect_err("rejected");
            assert!(matches!(err, MediaStorageError::InvalidPath), "{path}");
        }
    }
}
