use std::fs;
use std::path::Path;

use eyre::{Result, eyre};

use super::conversation_state::ImageAttachment;

/// Largest image accepted for inline upload.
pub const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

/// Read an image from disk for staging.
///
/// The media type is inferred from the file extension; anything that is not an
/// `image/*` type is refused.
pub fn load_image(path: &Path) -> Result<ImageAttachment> {
    if !path.is_file() {
        return Err(eyre!("Image not found: {}", path.display()));
    }

    let mime_type = mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .ok_or_else(|| eyre!("Not a supported image file: {}", path.display()))?;

    let size = fs::metadata(path)?.len();
    if size > MAX_IMAGE_BYTES {
        return Err(eyre!(
            "Image is too large ({} bytes, limit is {} bytes): {}",
            size,
            MAX_IMAGE_BYTES,
            path.display()
        ));
    }

    let data = fs::read(path)?;
    tracing::debug!("Loaded {} ({}, {} bytes)", path.display(), mime_type, data.len());

    Ok(ImageAttachment {
        mime_type: mime_type.essence_str().to_string(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_image_with_inferred_media_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.jpg");
        fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn rejects_non_image_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "R1 is 10k").unwrap();

        let err = load_image(&path).unwrap_err();
        assert!(err.to_string().contains("Not a supported image file"));
    }

    #[test]
    fn rejects_images_over_the_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.png");
        let file = fs::File::create(&path).unwrap();
        file.set_len(MAX_IMAGE_BYTES + 1).unwrap();

        let err = load_image(&path).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn accepts_images_at_the_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exact.png");
        let file = fs::File::create(&path).unwrap();
        file.set_len(MAX_IMAGE_BYTES).unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!(image.data.len() as u64, MAX_IMAGE_BYTES);
    }

    #[test]
    fn rejects_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_image(&dir.path().join("missing.png")).unwrap_err();
        assert!(err.to_string().contains("Image not found"));
    }
}
