//! Session-scoped identity.
//!
//! The identity (name plus optional photo) lives only as long as the backing
//! store does. A stored name is what "logged in" means.

mod backend;
mod photo;

pub use backend::{MemoryBackend, SessionBackend, SqliteBackend};
pub use photo::{photo_data_url, PhotoUpload};

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Session key holding the visitor's name.
pub const NAME_KEY: &str = "val_user_name";
/// Session key holding the visitor's photo as a `data:` URL.
pub const PHOTO_KEY: &str = "val_user_photo";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: Option<String>,
    pub photo: Option<String>,
}

impl Identity {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.photo.is_none()
    }
}

pub struct SessionStore<B> {
    backend: B,
}

impl SessionStore<MemoryBackend> {
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl<B: SessionBackend> SessionStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Store the name and/or photo. Empty or absent values leave the existing
    /// field untouched.
    ///
    /// # Errors
    /// Returns an error if the backend write fails; nothing is stored then.
    pub fn save(&mut self, name: &str, photo: Option<&str>) -> Result<(), SessionError> {
        let photo = photo.filter(|p| !p.is_empty());
        let mut entries = Vec::with_capacity(2);
        if !name.is_empty() {
            entries.push((NAME_KEY, name));
        }
        if let Some(photo) = photo {
            entries.push((PHOTO_KEY, photo));
        }
        if entries.is_empty() {
            return Ok(());
        }
        self.backend.set_many(&entries)?;
        tracing::debug!(
            name_set = !name.is_empty(),
            photo_set = photo.is_some(),
            "session identity saved"
        );
        Ok(())
    }

    /// Current identity. Backend read failures are logged and read as unset.
    pub fn get(&self) -> Identity {
        Identity {
            name: self.read(NAME_KEY),
            photo: self.read(PHOTO_KEY),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.read(NAME_KEY).is_some()
    }

    /// Remove every identity field. Calling it again is a no-op.
    ///
    /// # Errors
    /// Returns an error if the backend delete fails.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.backend.remove_many(&[NAME_KEY, PHOTO_KEY])?;
        tracing::debug!("session identity cleared");
        Ok(())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(key, error = %e, "session read failed");
                None
            }
        }
    }
}
