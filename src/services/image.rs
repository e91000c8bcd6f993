use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// File storage for uploaded profile pictures.
pub struct ProfilePictureStore {
    root: PathBuf,
}

impl ProfilePictureStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the bare filename of an upload, or `None` when nothing usable is
    /// left after stripping directory components.
    #[must_use]
    pub fn sanitize_filename(filename: &str) -> Option<String> {
        let name = Path::new(filename.trim()).file_name()?.to_str()?;
        if name.is_empty() || name.starts_with('.') {
            return None;
        }
        Some(name.to_string())
    }

    /// Whether the filename maps to an `image/*` MIME type.
    #[must_use]
    pub fn is_image(filename: &str) -> bool {
        mime_guess::from_path(filename)
            .first()
            .is_some_and(|mime| mime.type_() == mime_guess::mime::IMAGE)
    }

    #[must_use]
    pub fn content_type(filename: &str) -> String {
        mime_guess::from_path(filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }

    /// Writes `bytes` under an already sanitized filename, replacing any file
    /// of the same name.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)
                .await
                .with_context(|| format!("Failed to create {}", self.root.display()))?;
        }

        let file_path = self.root.join(filename);
        info!(path = %file_path.display(), size = bytes.len(), "Storing profile picture");

        fs::write(&file_path, bytes)
            .await
            .with_context(|| format!("Failed to write image to {}", file_path.display()))?;

        Ok(())
    }

    pub async fn read(&self, filename: &str) -> Result<Vec<u8>> {
        let file_path = self.root.join(filename);
        fs::read(&file_path)
            .await
            .with_context(|| format!("Failed to read image from {}", file_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(
            ProfilePictureStore::sanitize_filename("../../etc/avatar.png").as_deref(),
            Some("avatar.png")
        );
        assert_eq!(
            ProfilePictureStore::sanitize_filename("me.jpg").as_deref(),
            Some("me.jpg")
        );
        assert_eq!(ProfilePictureStore::sanitize_filename(""), None);
        assert_eq!(ProfilePictureStore::sanitize_filename(".."), None);
        assert_eq!(ProfilePictureStore::sanitize_filename(".hidden.png"), None);
    }

    #[test]
    fn image_detection_uses_extension() {
        assert!(ProfilePictureStore::is_image("a.png"));
        assert!(ProfilePictureStore::is_image("a.JPG"));
        assert!(ProfilePictureStore::is_image("a.gif"));
        assert!(!ProfilePictureStore::is_image("a.txt"));
        assert!(!ProfilePictureStore::is_image("a.exe"));
        assert!(!ProfilePictureStore::is_image("noextension"));
    }

    #[test]
    fn content_type_falls_back_to_octet_stream() {
        assert_eq!(ProfilePictureStore::content_type("a.png"), "image/png");
        assert_eq!(
            ProfilePictureStore::content_type("blob"),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn save_then_read() {
        let root = std::env::temp_dir().join(format!("warden-images-{}", uuid::Uuid::new_v4()));
        let store = ProfilePictureStore::new(&root);

        store.save("avatar.png", b"\x89PNG").await.unwrap();
        assert_eq!(store.read("avatar.png").await.unwrap(), b"\x89PNG");
        assert!(store.read("missing.png").await.is_err());

        let _ = std::fs::remove_dir_all(root);
    }
}
