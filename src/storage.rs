//! Best-effort persistence of original and generated image bytes.
//!
//! `PersistenceSink::persist` returns `()` on purpose: the generation
//! response has already been computed by the time writes start, so the sink
//! spawns one detached task and every failure inside it is logged and
//! swallowed. Nothing here can change the caller-visible outcome.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::fs;

pub fn extension_for_mime_type(mime_type: &str) -> &str {
    match mime_type.to_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        "image/svg+xml" => "svg",
        "image/avif" => "avif",
        _ => "bin",
    }
}

#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.resolve_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, data).await?;
        Ok(())
    }

    pub fn resolve_path(&self, key: &str) -> PathBuf {
        let normalized = key.trim_start_matches('/');
        self.base_dir.join(Path::new(normalized))
    }
}

#[derive(Clone)]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    async fn put(&self, key: &str, data: Vec<u8>, mime_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(data.into())
            .content_type(mime_type)
            .send()
            .await?;
        Ok(())
    }
}

/// User-requested extra copy of the generated image.
#[derive(Debug, Clone)]
pub struct UserDestination {
    pub folder_path: PathBuf,
    pub file_name: String,
}

#[derive(Clone)]
pub struct PersistenceSink {
    local: LocalFileStorage,
    s3: Option<S3Storage>,
}

impl PersistenceSink {
    pub fn new(local: LocalFileStorage, s3: Option<S3Storage>) -> Self {
        Self { local, s3 }
    }

    pub fn local(&self) -> &LocalFileStorage {
        &self.local
    }

    /// Kick off all writes on a detached task. Never awaited by the caller.
    pub fn persist(
        &self,
        request_id: &str,
        original: Vec<u8>,
        generated: Vec<u8>,
        mime_type: &str,
        user_destination: Option<UserDestination>,
    ) {
        let sink = self.clone();
        let request_id = request_id.to_string();
        let mime_type = mime_type.to_string();
        tokio::spawn(async move {
            sink.write_all(&request_id, original, generated, &mime_type, user_destination)
                .await;
        });
    }

    async fn write_all(
        &self,
        request_id: &str,
        original: Vec<u8>,
        generated: Vec<u8>,
        mime_type: &str,
        user_destination: Option<UserDestination>,
    ) {
        // Inbound images are transported as JPEG; the generated extension
        // follows whatever MIME type the model declared.
        let og_key = format!("images/OG_{request_id}.jpg");
        let ai_key = format!("images/AI_{request_id}.{}", extension_for_mime_type(mime_type));

        let og_write = self.write_blob(&og_key, &original, "image/jpeg");
        let ai_write = self.write_blob(&ai_key, &generated, mime_type);
        let user_write = async {
            let Some(dest) = user_destination else {
                return;
            };
            let output_path = dest.folder_path.join(format!("render_{}", dest.file_name));
            if let Err(err) = write_user_copy(&output_path, &generated).await {
                tracing::warn!(path = %output_path.display(), error = %err, "failed to save image to user folder");
            } else {
                tracing::info!(path = %output_path.display(), "saved generated image");
            }
        };

        tokio::join!(og_write, ai_write, user_write);
    }

    async fn write_blob(&self, key: &str, data: &[u8], mime_type: &str) {
        if let Err(err) = self.local.put(key, data).await {
            tracing::warn!(key, error = %err, "local image write failed");
        }
        if let Some(s3) = &self.s3 {
            if let Err(err) = s3.put(key, data.to_vec(), mime_type).await {
                tracing::warn!(key, bucket = %s3.bucket, error = %err, "S3 image upload failed");
            }
        }
    }
}

async fn write_user_copy(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, data).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_original_and_generated_blobs() {
        let dir = tempfile::tempdir().unwrap();
        let sink = PersistenceSink::new(LocalFileStorage::new(dir.path().to_path_buf()), None);

        sink.write_all("req-1", b"orig".to_vec(), b"gen".to_vec(), "image/png", None)
            .await;

        let og = std::fs::read(dir.path().join("images/OG_req-1.jpg")).unwrap();
        let ai = std::fs::read(dir.path().join("images/AI_req-1.png")).unwrap();
        assert_eq!(og, b"orig");
        assert_eq!(ai, b"gen");
    }

    #[tokio::test]
    async fn writes_user_copy_with_render_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let sink = PersistenceSink::new(LocalFileStorage::new(dir.path().to_path_buf()), None);

        sink.write_all(
            "req-2",
            b"orig".to_vec(),
            b"gen".to_vec(),
            "image/jpeg",
            Some(UserDestination {
                folder_path: out.path().to_path_buf(),
                file_name: "kitchen.jpg".to_string(),
            }),
        )
        .await;

        let copy = std::fs::read(out.path().join("render_kitchen.jpg")).unwrap();
        assert_eq!(copy, b"gen");
    }

    #[tokio::test]
    async fn write_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file in the way").unwrap();
        // base_dir is a regular file, so every write must fail
        let sink = PersistenceSink::new(LocalFileStorage::new(blocker), None);

        sink.write_all("req-3", b"orig".to_vec(), b"gen".to_vec(), "image/png", None)
            .await;
    }

    #[test]
    fn unknown_mime_type_maps_to_bin() {
        assert_eq!(extension_for_mime_type("image/png"), "png");
        assert_eq!(extension_for_mime_type("application/pdf"), "bin");
    }
}
