//! Filesystem-backed object storage for media files.

use std::error::Error as StdError;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use futures::{StreamExt, pin_mut, stream};
use sha2::{Digest, Sha256};
use slug::slugify;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use url::Url;
use uuid::Uuid;

const TRAILER_PREFIX: &str = "trailers";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid object key")]
    InvalidKey,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("object payload stream failed")]
    PayloadStream {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("object payload is empty")]
    EmptyPayload,
    #[error("object size exceeds supported range")]
    SizeOverflow,
}

/// Result of writing an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub checksum: String,
    pub size_bytes: u64,
}

/// Payload written to disk but not yet visible under its key.
#[derive(Debug)]
pub struct StagedObject {
    object: StoredObject,
    staging: PathBuf,
    target: PathBuf,
}

impl StagedObject {
    pub fn key(&self) -> &str {
        &self.object.key
    }

    pub fn object(&self) -> &StoredObject {
        &self.object
    }
}

/// Object store rooted at a local directory and published under a base URL.
#[derive(Debug)]
pub struct ObjectStorage {
    root: PathBuf,
    public_base_url: Url,
}

impl ObjectStorage {
    /// Open storage rooted at `root`, creating the directory if necessary.
    pub fn new(root: PathBuf, public_base_url: Url) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            public_base_url,
        })
    }

    /// Stream a payload to `key`, replacing any existing object.
    ///
    /// The payload is written beside the target and renamed into place, so a
    /// failed or empty upload leaves nothing behind and never clobbers the
    /// previous object.
    pub async fn put_stream<S>(&self, key: &str, stream: S) -> Result<StoredObject, StorageError>
    where
        S: futures::Stream<Item = Result<Bytes, StorageError>>,
    {
        let staged = self.stage_stream(key, stream).await?;
        self.commit(staged).await
    }

    /// Store a fully buffered payload.
    pub async fn put(&self, key: &str, data: Bytes) -> Result<StoredObject, StorageError> {
        self.put_stream(key, single_chunk(data)).await
    }

    /// Write a buffered payload for `key` without publishing it.
    pub async fn stage(&self, key: &str, data: Bytes) -> Result<StagedObject, StorageError> {
        self.stage_stream(key, single_chunk(data)).await
    }

    /// Write a payload to a private staging file next to `key`.
    ///
    /// Readers keep seeing the current object until [`ObjectStorage::commit`].
    pub async fn stage_stream<S>(&self, key: &str, stream: S) -> Result<StagedObject, StorageError>
    where
        S: futures::Stream<Item = Result<Bytes, StorageError>>,
    {
        let target = self.resolve(key)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        let staging = staging_path(&target);

        match write_payload(&staging, stream).await {
            Ok((checksum, size_bytes)) => Ok(StagedObject {
                object: StoredObject {
                    key: key.to_string(),
                    checksum,
                    size_bytes,
                },
                staging,
                target,
            }),
            Err(err) => {
                let _ = fs::remove_file(&staging).await;
                Err(err)
            }
        }
    }

    /// Publish a staged payload under its key, replacing any existing object.
    pub async fn commit(&self, staged: StagedObject) -> Result<StoredObject, StorageError> {
        if let Err(err) = fs::rename(&staged.staging, &staged.target).await {
            let _ = fs::remove_file(&staged.staging).await;
            return Err(StorageError::Io(err));
        }
        Ok(staged.object)
    }

    /// Drop a staged payload; the object under its key is left untouched.
    pub async fn discard(&self, staged: StagedObject) -> Result<(), StorageError> {
        match fs::remove_file(&staged.staging).await {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    pub async fn read(&self, key: &str) -> Result<Bytes, StorageError> {
        let absolute = self.resolve(key)?;
        let data = fs::read(absolute).await?;
        Ok(Bytes::from(data))
    }

    /// Remove an object. Missing objects are treated as success.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let absolute = self.resolve(key)?;
        match fs::remove_file(&absolute).await {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    /// Public URL under which `key` is served.
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url.as_str().trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        if key.is_empty()
            || relative.is_absolute()
            || relative.components().any(|component| {
                matches!(
                    component,
                    Component::ParentDir | Component::RootDir | Component::Prefix(_)
                )
            })
        {
            return Err(StorageError::InvalidKey);
        }

        Ok(self.root.join(relative))
    }
}

fn single_chunk(data: Bytes) -> impl futures::Stream<Item = Result<Bytes, StorageError>> {
    stream::once(async move { Ok::<_, StorageError>(data) })
}

fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("object");
    target.with_file_name(format!(".{name}.{}.part", Uuid::new_v4().simple()))
}

/// Write every chunk to `path`, returning the hex SHA-256 and byte count.
async fn write_payload<S>(path: &Path, stream: S) -> Result<(String, u64), StorageError>
where
    S: futures::Stream<Item = Result<Bytes, StorageError>>,
{
    let mut file = fs::File::create(path).await?;
    let mut hasher = Sha256::new();
    let mut total_bytes: u64 = 0;

    pin_mut!(stream);
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if chunk.is_empty() {
            continue;
        }

        total_bytes = total_bytes
            .checked_add(chunk.len() as u64)
            .ok_or(StorageError::SizeOverflow)?;
        file.write_all(&chunk).await?;
        hasher.update(&chunk);
    }

    file.flush().await?;

    if total_bytes == 0 {
        return Err(StorageError::EmptyPayload);
    }

    Ok((hex::encode(&hasher.finalize()[..]), total_bytes))
}

/// Object key for a movie trailer: `trailers/{movie_id}_{sanitized filename}`.
pub fn trailer_key(movie_id: i64, original_name: &str) -> String {
    format!(
        "{TRAILER_PREFIX}/{movie_id}_{}",
        sanitize_filename(original_name)
    )
}

fn sanitize_filename(original: &str) -> String {
    // Client file names may carry directories; only the last segment is kept.
    let last_segment = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let path = Path::new(last_segment);
    let stem = path
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("trailer");
    let mut base = slugify(stem);
    if base.is_empty() {
        base = "trailer".to_string();
    }

    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.trim_matches('.').to_ascii_lowercase())
        .filter(|value| !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{base}.{ext}"),
        None => base,
    }
}
