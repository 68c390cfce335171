//! Item image uploads.
//!
//! Images are written under `<static_dir>/images/` with a random prefix and
//! served back from `/static/images/`.

use std::path::Path;

use thiserror::Error;
use uuid::Uuid;

/// Extensions accepted for item images (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// URL prefix under which stored images are served.
const IMAGES_URL_PREFIX: &str = "/static/images";

#[derive(Debug, Error)]
pub enum UploadError {
    /// Missing or disallowed file extension.
    #[error("Image must be a .png, .jpg, .jpeg or .gif file")]
    UnsupportedType,

    /// Writing the file failed.
    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// Reduce a client-supplied file name to a safe, ASCII-only base name.
///
/// Directory components are dropped, whitespace becomes `_`, and anything
/// outside `[A-Za-z0-9._-]` is removed. Returns `None` when nothing is left.
#[must_use]
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    let trimmed = cleaned.trim_start_matches(['.', '_']);
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Whether a file name carries an accepted image extension.
#[must_use]
pub fn allowed_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Store an uploaded image and return the URL it is served from.
///
/// # Errors
///
/// Returns `UploadError::UnsupportedType` if the name has no accepted
/// extension, `UploadError::Io` if the file cannot be written.
pub async fn save_image(
    images_dir: &Path,
    original_name: &str,
    bytes: &[u8],
) -> Result<String, UploadError> {
    let name = sanitize_filename(original_name)
        .filter(|name| allowed_file(name))
        .ok_or(UploadError::UnsupportedType)?;

    let file_name = format!("{}-{name}", Uuid::new_v4());

    tokio::fs::create_dir_all(images_dir).await?;
    tokio::fs::write(images_dir.join(&file_name), bytes).await?;

    tracing::info!(file = %file_name, size = bytes.len(), "Stored item image");

    Ok(format!("{IMAGES_URL_PREFIX}/{file_name}"))
}

/// Delete an image previously stored by [`save_image`], given its URL.
///
/// URLs that were not produced by `save_image` are left alone. Returns
/// whether a file was removed.
///
/// # Errors
///
/// Returns `UploadError::Io` if the file exists but cannot be removed.
pub async fn remove_image(images_dir: &Path, url: &str) -> Result<bool, UploadError> {
    let Some(file_name) = url
        .strip_prefix(IMAGES_URL_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
    else {
        return Ok(false);
    };
    if sanitize_filename(file_name).as_deref() != Some(file_name) {
        return Ok(false);
    }

    match tokio::fs::remove_file(images_dir.join(file_name)).await {
        Ok(()) => {
            tracing::info!(file = %file_name, "Removed item image");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("ring.png").as_deref(), Some("ring.png"));
        assert_eq!(
            sanitize_filename("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_filename(r"C:\photos\my ring.JPG").as_deref(),
            Some("my_ring.JPG")
        );
        assert_eq!(sanitize_filename(".hidden.gif").as_deref(), Some("hidden.gif"));
        assert_eq!(sanitize_filename("üñí.png").as_deref(), Some("png"));
        assert_eq!(sanitize_filename("///"), None);
        assert_eq!(sanitize_filename(""), None);
    }

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("ring.png"));
        assert!(allowed_file("ring.JPEG"));
        assert!(allowed_file("ring.gif"));
        assert!(!allowed_file("ring.svg"));
        assert!(!allowed_file("ring"));
        assert!(!allowed_file("png"));
    }

    #[tokio::test]
    async fn test_save_image_writes_file() {
        let dir = std::env::temp_dir().join(format!("lustre-upload-{}", Uuid::new_v4()));

        let url = save_image(&dir, "Pearl Drop.png", b"\x89PNG").await.unwrap();
        assert!(url.starts_with("/static/images/"));
        assert!(url.ends_with("-Pearl_Drop.png"));

        let file_name = url.rsplit('/').next().unwrap();
        let stored = tokio::fs::read(dir.join(file_name)).await.unwrap();
        assert_eq!(stored, b"\x89PNG");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_image_rejects_other_types() {
        let dir = std::env::temp_dir().join(format!("lustre-upload-{}", Uuid::new_v4()));

        let err = save_image(&dir, "shell.php", b"<?php").await.unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType));
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_remove_image_only_touches_stored_uploads() {
        let dir = std::env::temp_dir().join(format!("lustre-upload-{}", Uuid::new_v4()));
        let url = save_image(&dir, "band.gif", b"GIF89a").await.unwrap();
        let outside = dir.join("keep.png");
        tokio::fs::write(&outside, b"\x89PNG").await.unwrap();

        assert!(!remove_image(&dir, "https://cdn.example.com/keep.png").await.unwrap());
        assert!(!remove_image(&dir, "/static/images/../images/keep.png").await.unwrap());
        assert!(outside.exists());

        assert!(remove_image(&dir, &url).await.unwrap());
        assert!(!remove_image(&dir, &url).await.unwrap());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
