//! Durable credential storage.
//!
//! One small JSON file under a fixed name. The credential is the only
//! client-side state that survives a restart; everything else is rebuilt
//! from the push stream and the snapshot poll.

use crate::error::{AuthError, AuthResult};
use pmdash_core::Credential;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Fixed storage key within the state directory.
const TOKEN_FILE: &str = "credential.json";

/// File-backed token store.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store rooted at `dir`; the file itself is always `credential.json`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted credential, if any. An unreadable or corrupt
    /// file reads as "no credential" rather than an error.
    pub fn load(&self) -> Option<Credential> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return None,
        };

        match serde_json::from_str(&raw) {
            Ok(cred) => {
                debug!(path = %self.path.display(), "Loaded persisted credential");
                Some(cred)
            }
            Err(e) => {
                warn!(path = %self.path.display(), %e, "Ignoring corrupt credential file");
                None
            }
        }
    }

    /// Persist the credential, replacing any previous one.
    pub fn save(&self, credential: &Credential) -> AuthResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AuthError::Store(format!("Failed to create state dir: {e}")))?;
        }

        let raw = serde_json::to_string(credential)
            .map_err(|e| AuthError::Store(format!("Failed to encode credential: {e}")))?;
        fs::write(&self.path, raw)
            .map_err(|e| AuthError::Store(format!("Failed to write credential: {e}")))?;

        // Token grants command access; keep it owner-readable only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600));
        }

        debug!(path = %self.path.display(), "Persisted credential");
        Ok(())
    }

    /// Discard the persisted credential. Missing file is a no-op.
    pub fn clear(&self) -> AuthResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Store(format!(
                "Failed to remove credential: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn temp_store() -> TokenStore {
        let dir = std::env::temp_dir().join(format!(
            "pmdash-auth-store-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        TokenStore::new(dir)
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let store = temp_store();
        store.save(&Credential::new("t1")).unwrap();

        let loaded = store.load().expect("credential should load");
        assert_eq!(loaded.header_value(), "Bearer t1");

        store.clear().unwrap();
    }

    #[test]
    fn test_load_without_file_is_none() {
        let store = temp_store();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = temp_store();
        store.save(&Credential::new("t1")).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_corrupt_file_reads_as_none() {
        let store = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not valid json").unwrap();
        assert!(store.load().is_none());
        store.clear().unwrap();
    }
}
