//! File-backed credential store.
//!
//! Each identity maps to exactly one JSON record named
//! `ms-translator-at-<identity key>` inside the store directory. Records are
//! written to a unique temporary file first and renamed into place, so a
//! concurrent reader sees either the previous record or the new one, never a
//! partial write. Concurrent writers are last-write-wins.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use super::{expiry, Credential, CredentialIdentity, CredentialStore};
use crate::error::{Result, TranslatorError};
use crate::utils::clock::Clock;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// File name prefix of every cached credential record.
pub const FILE_PREFIX: &str = "ms-translator-at-";

const TEMP_SUFFIX: &str = ".tmp";

pub struct FileStore {
    dir: PathBuf,
    identity: CredentialIdentity,
    clock: Arc<dyn Clock>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>, identity: CredentialIdentity, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            identity,
            clock,
        }
    }

    /// Path of this identity's record.
    pub fn file_path(&self) -> PathBuf {
        self.dir.join(format!("{}{}", FILE_PREFIX, self.identity.key()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reads a record, treating missing or corrupt files as absent.
    fn load(path: &Path) -> Option<Credential> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Unable to read access token file {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(credential) => Some(credential),
            Err(e) => {
                warn!("Ignoring malformed access token file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn persistence_error(path: &Path, message: impl std::fmt::Display) -> TranslatorError {
        TranslatorError::Persistence {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Writes the whole record next to its destination, then renames it.
    fn save(&self, credential: &Credential) -> Result<()> {
        let path = self.file_path();

        fs::create_dir_all(&self.dir).map_err(|e| Self::persistence_error(&self.dir, e))?;

        let json = serde_json::to_string(credential).map_err(|e| Self::persistence_error(&path, e))?;

        let tmp = self.dir.join(format!(
            ".{}{}.{}{}",
            FILE_PREFIX,
            self.identity.key(),
            uuid::Uuid::new_v4().simple(),
            TEMP_SUFFIX
        ));

        if let Err(e) = Self::write_private(&tmp, json.as_bytes()) {
            let _ = fs::remove_file(&tmp);
            return Err(Self::persistence_error(&path, e));
        }

        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(Self::persistence_error(&path, e));
        }

        debug!("Access token stored in {}", path.display());
        Ok(())
    }

    fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
        fs::write(path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Every record in the directory, whatever identity it belongs to.
    fn stored_files(&self) -> Result<Vec<PathBuf>> {
        self.scan(|name| name.starts_with(FILE_PREFIX) && !name.ends_with(TEMP_SUFFIX))
    }

    /// Temporary files left behind by writers that never renamed them.
    fn temp_files(&self) -> Result<Vec<PathBuf>> {
        let prefix = format!(".{}", FILE_PREFIX);
        self.scan(|name| name.starts_with(&prefix) && name.ends_with(TEMP_SUFFIX))
    }

    fn scan(&self, wanted: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::persistence_error(&self.dir, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Self::persistence_error(&self.dir, e))?;
            let name = entry.file_name();
            if wanted(name.to_string_lossy().as_ref()) {
                files.push(entry.path());
            }
        }
        Ok(files)
    }

    fn remove(path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::persistence_error(path, e)),
        }
    }
}

impl CredentialStore for FileStore {
    fn get(&self) -> Option<Credential> {
        let path = self.file_path();
        match Self::load(&path) {
            Some(credential) if credential.is_usable(self.clock.now()) => {
                debug!("Access token retrieved from file");
                Some(credential)
            }
            Some(_) => {
                debug!("No valid access token found in {}", path.display());
                None
            }
            None => {
                debug!("No access token found in {}", path.display());
                None
            }
        }
    }

    fn store(&self, token: &str, ttl_seconds: u64) -> Result<()> {
        let credential = Credential::new(token, expiry(self.clock.now(), ttl_seconds));
        self.save(&credential)?;
        info!("Access token stored for {}s", ttl_seconds);
        Ok(())
    }

    fn delete(&self) -> Result<bool> {
        Self::remove(&self.file_path())
    }

    fn sweep_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let mut count = 0;

        for file in self.stored_files()? {
            // Unreadable records carry no expiry and are left alone.
            let Some(credential) = Self::load(&file) else {
                continue;
            };
            if credential.expires_at <= now && Self::remove(&file)? {
                count += 1;
            }
        }

        if count > 0 {
            info!("Removed {} expired access tokens from {}", count, self.dir.display());
        }
        Ok(count)
    }

    fn delete_all(&self) -> Result<usize> {
        let mut count = 0;
        for file in self.stored_files()? {
            if Self::remove(&file)? {
                count += 1;
            }
        }

        // Leftovers of interrupted writes are not records and are not counted.
        for file in self.temp_files()? {
            Self::remove(&file)?;
        }
        Ok(count)
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::ManualClock;

    fn store_in(dir: &Path, client: &str, clock: Arc<ManualClock>) -> FileStore {
        FileStore::new(dir, CredentialIdentity::new("http://api.example.com", client), clock)
    }

    #[test]
    fn test_record_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), "dumb", ManualClock::new(1_000));

        store.store("12345", 600).unwrap();

        let raw = fs::read_to_string(store.file_path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["token"], "12345");
        assert_eq!(json["expiresAt"], 1_600);
    }

    #[cfg(unix)]
    #[test]
    fn test_record_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), "dumb", ManualClock::new(0));
        store.store("12345", 600).unwrap();

        let mode = fs::metadata(store.file_path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn test_corrupt_record_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), "dumb", ManualClock::new(0));
        fs::write(store.file_path(), "{ not json").unwrap();

        assert!(!store.has());
        assert_eq!(store.sweep_expired().unwrap(), 0);
        assert_eq!(store.delete_all().unwrap(), 1);
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), "dumb", ManualClock::new(0));
        store.store("a", 10).unwrap();
        store.store("b", 10).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with(FILE_PREFIX));
        assert_eq!(store.get().unwrap().token, "b");
    }

    #[test]
    fn test_delete_all_clears_interrupted_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), "dumb", ManualClock::new(0));
        store.store("a", 10).unwrap();

        let leftover = dir
            .path()
            .join(format!(".{}{}.abc123{}", FILE_PREFIX, "deadbeef", TEMP_SUFFIX));
        fs::write(&leftover, r#"{"token":"half"#).unwrap();
        let unrelated = dir.path().join("notes.txt");
        fs::write(&unrelated, "keep").unwrap();

        assert_eq!(store.delete_all().unwrap(), 1);
        assert!(!leftover.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();

        let store = store_in(&blocker, "dumb", ManualClock::new(0));
        let result = store.store("12345", 600);
        assert!(matches!(result, Err(TranslatorError::Persistence { .. })));
    }

    #[test]
    fn test_missing_directory_sweeps_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir.path().join("absent"), "dumb", ManualClock::new(0));
        assert_eq!(store.sweep_expired().unwrap(), 0);
        assert_eq!(store.delete_all().unwrap(), 0);
        assert!(!store.delete().unwrap());
    }
}
