// HTTP helpers for thumbnails and full-resolution selections

use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36";
pub const THUMBNAIL_TIMEOUT: Duration = Duration::from_secs(10);
pub const FULL_IMAGE_TIMEOUT: Duration = Duration::from_secs(20);

pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FULL_IMAGE_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Accepts a `content-type` header value only when it names an image type.
pub fn check_image_content_type(header: Option<&str>) -> Result<String> {
    match header {
        Some(content_type) if content_type.starts_with("image") => Ok(content_type.to_string()),
        Some(other) => bail!("Non-image content type: {}", other),
        None => bail!("Non-image content type: none"),
    }
}

fn image_content_type(response: &Response) -> Result<String> {
    check_image_content_type(
        response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
    )
}

/// Downloads a thumbnail and returns its bytes if the server says it is an
/// image.
pub fn fetch_thumbnail(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .timeout(THUMBNAIL_TIMEOUT)
        .send()?
        .error_for_status()?;
    image_content_type(&response)?;
    Ok(response.bytes()?.to_vec())
}

/// File extension for a `content-type` header value. Unknown image types are
/// saved as `.jpg`.
pub fn extension_for_mime(content_type: &str) -> &'static str {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "image/png" => ".png",
        "image/gif" => ".gif",
        _ => ".jpg",
    }
}

pub fn unique_file_name(extension: &str) -> String {
    format!("selected_{}{}", Uuid::new_v4(), extension)
}

/// Fails unless `path` decodes as an image.
pub fn verify_image(path: &Path) -> Result<()> {
    image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .with_context(|| format!("{} is not a valid image", path.display()))?;
    Ok(())
}

/// Streams the full-resolution image at `url` into `dir` under a fresh
/// name and verifies it. Nothing is left on disk on failure.
pub fn download_full_image(client: &Client, url: &str, dir: &Path) -> Result<PathBuf> {
    let mut response = client
        .get(url)
        .timeout(FULL_IMAGE_TIMEOUT)
        .send()?
        .error_for_status()?;
    let content_type = image_content_type(&response)?;

    let path = dir.join(unique_file_name(extension_for_mime(&content_type)));
    let written = (|| -> Result<()> {
        let mut writer = BufWriter::new(
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?,
        );
        response.copy_to(&mut writer)?;
        writer.flush()?;
        drop(writer);
        verify_image(&path)
    })();

    if let Err(e) = written {
        warn!(url, "discarding download: {:#}", e);
        if path.exists() {
            let _ = fs::remove_file(&path);
        }
        return Err(e);
    }

    info!(url, path = %path.display(), "saved full image");
    Ok(path)
}

/// Removes a deselected or orphaned file, returning its display name.
pub fn remove_download(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| anyhow!("Not a file path: {}", path.display()))?;
    fs::remove_file(path).with_context(|| format!("Error removing file {}", path.display()))?;
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime("image/jpeg"), ".jpg");
        assert_eq!(extension_for_mime("image/PNG; charset=binary"), ".png");
        assert_eq!(extension_for_mime("image/gif"), ".gif");
        assert_eq!(extension_for_mime("image/webp"), ".jpg");
    }

    #[test]
    fn test_only_image_content_types_accepted() {
        assert_eq!(
            check_image_content_type(Some("image/png; charset=binary")).unwrap(),
            "image/png; charset=binary"
        );
        let err = check_image_content_type(Some("text/html")).unwrap_err();
        assert_eq!(err.to_string(), "Non-image content type: text/html");
        let err = check_image_content_type(None).unwrap_err();
        assert_eq!(err.to_string(), "Non-image content type: none");
    }

    #[test]
    fn test_unique_file_names_differ() {
        let a = unique_file_name(".png");
        let b = unique_file_name(".png");
        assert!(a.starts_with("selected_") && a.ends_with(".png"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_image_accepts_png_and_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        RgbImage::from_pixel(4, 4, Rgb([10, 20, 30])).save(&good).unwrap();
        assert!(verify_image(&good).is_ok());

        let bad = dir.path().join("bad.jpg");
        fs::write(&bad, b"<html>not an image</html>").unwrap();
        assert!(verify_image(&bad).is_err());
    }

    #[test]
    fn test_remove_download() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selected_x.jpg");
        fs::write(&path, b"x").unwrap();
        assert_eq!(remove_download(&path).unwrap(), "selected_x.jpg");
        assert!(!path.exists());
        assert!(remove_download(&path).is_err());
    }
}
