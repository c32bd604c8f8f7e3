use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::settings::Settings;

/// An uploaded file parked on disk for extraction. Removed on drop, so every
/// exit path of the request cleans it up.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    original_name: String,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        delete_temp(&self.path);
    }
}

/// Reject uploads by extension or size before anything touches the disk.
pub fn validate_upload(settings: &Settings, filename: &str, size: usize) -> Result<()> {
    if !settings.is_allowed_file(filename) {
        return Err(Error::FileTypeNotAllowed(filename.to_string()));
    }
    if size > settings.max_file_size {
        return Err(Error::FileTooLarge {
            size,
            limit: settings.max_file_size,
        });
    }
    Ok(())
}

/// Only the last path component of the client-supplied name is kept.
fn base_name(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "upload".to_string())
}

/// Write the upload to `temp_<8 hex>_<name>` under `upload_dir`.
pub async fn save_upload(upload_dir: &Path, filename: &str, data: &[u8]) -> Result<TempUpload> {
    tokio::fs::create_dir_all(upload_dir).await?;

    let name = base_name(filename);
    let nonce = Uuid::new_v4().simple().to_string();
    let path = upload_dir.join(format!("temp_{}_{}", &nonce[..8], name));

    tokio::fs::write(&path, data).await?;
    tracing::debug!("Saved upload {} ({} bytes) to {}", name, data.len(), path.display());

    Ok(TempUpload {
        path,
        original_name: name,
    })
}

/// Remove a temp file if it is still there.
pub fn delete_temp(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed temp file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove temp file {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_file_echoes_name_and_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let upload = save_upload(dir.path(), "lecture.pdf", b"%PDF-1.4").await.unwrap();
        let path = upload.path().to_path_buf();

        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("temp_"));
        assert!(file_name.ends_with("_lecture.pdf"));
        assert_eq!(upload.original_name(), "lecture.pdf");
        assert!(path.exists());

        drop(upload);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_traversal_components_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let upload = save_upload(dir.path(), "../../etc/notes.txt", b"hello").await.unwrap();
        assert_eq!(upload.path().parent().unwrap(), dir.path());
        assert_eq!(upload.original_name(), "notes.txt");
    }

    #[test]
    fn test_delete_temp_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("temp_x.txt");
        std::fs::write(&path, "x").unwrap();
        delete_temp(&path);
        delete_temp(&path);
        assert!(!path.exists());
    }

    #[test]
    fn test_validation() {
        let settings = Settings {
            max_file_size: 10,
            ..Settings::default()
        };
        assert!(validate_upload(&settings, "a.pdf", 10).is_ok());
        assert!(matches!(
            validate_upload(&settings, "a.pdf", 11),
            Err(Error::FileTooLarge { size: 11, limit: 10 })
        ));
        assert!(matches!(
            validate_upload(&settings, "a.exe", 1),
            Err(Error::FileTypeNotAllowed(_))
        ));
    }
}
