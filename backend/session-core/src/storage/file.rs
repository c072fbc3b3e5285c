use crate::AUTH_TOKEN_STORAGE_KEY;
use crate::error::StorageError;
use crate::storage::TokenStorage;

use common::BearerToken;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;

/// Token slot backed by a single file named after the storage key.
///
/// Writes go through a temp file and a rename so a crash never leaves a
/// half-written token behind.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    dir: PathBuf,
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let path = dir.join(AUTH_TOKEN_STORAGE_KEY);
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.dir.join(format!("{AUTH_TOKEN_STORAGE_KEY}.tmp"))
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<BearerToken>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No persisted token at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(StorageError::read(&self.path, e)),
        };

        let token = contents.trim();
        if token.is_empty() {
            return Ok(None);
        }

        Ok(Some(BearerToken::new(token)))
    }

    fn save(&self, token: &BearerToken) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::write(&self.dir, e))?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, token.as_str()).map_err(|e| StorageError::write(&temp_path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))
                .map_err(|e| StorageError::write(&temp_path, e))?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| StorageError::write(&self.path, e))?;

        debug!("Persisted token ({} chars) to {}", token.len(), self.path.display());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed persisted token at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::remove(&self.path, e)),
        }
    }
}
