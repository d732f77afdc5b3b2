//! Image attachments sent alongside a question.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

use crate::error::{Result, TutorError};

/// Largest image accepted for inline upload.
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Raw image bytes with their declared MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub mime_type: String,
    pub data: Vec<u8>,
    /// Original file name, for display.
    pub name: Option<String>,
}

impl std::fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .field("name", &self.name)
            .finish()
    }
}

impl ImageAttachment {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
            name: None,
        }
    }

    /// Load an image file, inferring its MIME type from the extension.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown extensions, empty or oversized files, and
    /// read failures.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mime_type = mime_for_path(path).ok_or_else(|| {
            TutorError::Image(format!("unsupported image type: {}", path.display()))
        })?;
        let data = std::fs::read(path)?;
        if data.is_empty() {
            return Err(TutorError::Image(format!("{} is empty", path.display())));
        }
        if data.len() > MAX_IMAGE_BYTES {
            return Err(TutorError::Image(format!(
                "{} is {} bytes (limit {MAX_IMAGE_BYTES})",
                path.display(),
                data.len()
            )));
        }
        Ok(Self {
            mime_type: mime_type.to_owned(),
            data,
            name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
        })
    }

    /// Standard base64 encoding of the image bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn mime_is_inferred_from_extension() {
        assert_eq!(mime_for_path(Path::new("a/b.PNG")), Some("image/png"));
        assert_eq!(mime_for_path(Path::new("photo.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("notes.txt")), None);
        assert_eq!(mime_for_path(Path::new("no_extension")), None);
    }

    #[test]
    fn loads_file_and_keeps_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagram.webp");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let image = ImageAttachment::from_path(&path).unwrap();
        assert_eq!(image.mime_type, "image/webp");
        assert_eq!(image.data, vec![1, 2, 3]);
        assert_eq!(image.name.as_deref(), Some("diagram.webp"));
        assert_eq!(image.to_base64(), "AQID");
    }

    #[test]
    fn rejects_empty_and_unknown_files() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.png");
        std::fs::write(&empty, []).unwrap();
        assert!(matches!(
            ImageAttachment::from_path(&empty),
            Err(TutorError::Image(_))
        ));

        let text = dir.path().join("notes.txt");
        std::fs::write(&text, "hi").unwrap();
        assert!(matches!(
            ImageAttachment::from_path(&text),
            Err(TutorError::Image(_))
        ));
    }

    #[test]
    fn debug_hides_raw_bytes() {
        let image = ImageAttachment::new("image/png", vec![0; 64]);
        let debug = format!("{image:?}");
        assert!(debug.contains("bytes: 64"));
    }
}
