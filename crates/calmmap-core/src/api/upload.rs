//! File payloads for multipart uploads.

use std::path::Path;

use anyhow::{Context, Result};

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(&file_name).map(str::to_string);
        Self {
            file_name,
            bytes,
            mime,
        }
    }

    /// Reads a file from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().to_string());
        Ok(Self::new(file_name, bytes))
    }

    /// Lowercased extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }
}

fn mime_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_infers_mime_from_extension() {
        let file = UploadFile::new("Floor.PNG", vec![1, 2]);
        assert_eq!(file.extension().as_deref(), Some("png"));
        assert_eq!(file.mime.as_deref(), Some("image/png"));

        let other = UploadFile::new("notes", vec![]);
        assert!(other.extension().is_none());
        assert!(other.mime.is_none());
    }

    #[tokio::test]
    async fn test_read_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("front.jpg");
        std::fs::write(&path, b"jpeg-bytes").unwrap();

        let file = UploadFile::read(&path).await.unwrap();
        assert_eq!(file.file_name, "front.jpg");
        assert_eq!(file.bytes, b"jpeg-bytes");
        assert_eq!(file.mime.as_deref(), Some("image/jpeg"));
    }
}
