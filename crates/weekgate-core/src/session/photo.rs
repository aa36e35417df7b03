//! Photo uploads, stored in the session as `data:` URLs.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::SessionError;

/// `data:{mime};base64,{payload}`.
pub fn photo_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime)
}

/// An image picked on the login form.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub path: PathBuf,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    /// # Errors
    /// Fails if the extension is not a known image type or the file cannot be
    /// read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let mime = mime_for(&path).ok_or_else(|| SessionError::UnsupportedPhoto {
            path: path.clone(),
            message: "expected a png, jpeg, gif, webp, bmp or svg image".into(),
        })?;
        let bytes = std::fs::read(&path).map_err(|source| SessionError::PhotoRead {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, mime, bytes })
    }

    pub fn to_data_url(&self) -> String {
        photo_data_url(self.mime, &self.bytes)
    }
}
