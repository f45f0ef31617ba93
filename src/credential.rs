//! Slack token storage: the token given on the command line is remembered in
//! the base directory and reused by later runs.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::record;

pub const TOKEN_FILE_NAME: &str = "slack-token";

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            path: base_dir.join(TOKEN_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the token to use for this run.
    ///
    /// A non-empty `supplied` token wins and replaces the stored one; a failed
    /// save is only logged.
    pub fn resolve(&self, supplied: Option<&str>) -> Result<String> {
        if let Some(token) = supplied.map(str::trim).filter(|t| !t.is_empty()) {
            debug!("slack token specified, saving it for the next time");
            if let Err(err) = record::write(&self.path, token.as_bytes(), true) {
                warn!("failed to save slack token to {}: {err}", self.path.display());
            }
            return Ok(token.to_string());
        }

        debug!("loading cached token from: {}", self.path.display());
        match record::read(&self.path) {
            Ok(content) => {
                let token = content.trim();
                if token.is_empty() {
                    debug!("stored token is blank");
                    return Err(Error::MissingCredential);
                }
                Ok(token.to_string())
            }
            Err(err) if err.is_not_found() => Err(Error::MissingCredential),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn supplied_token_is_returned_and_stored() {
        let tmp = TempDir::new().unwrap();
        let store = CredentialStore::new(tmp.path());

        let token = store.resolve(Some("xoxp-1")).unwrap();
        assert_eq!(token, "xoxp-1");
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "xoxp-1");
    }

    #[test]
    fn renewal_overwrites_previous_token() {
        let tmp = TempDir::new().unwrap();
        let store = CredentialStore::new(tmp.path());

        store.resolve(Some("xoxp-old")).unwrap();
        store.resolve(Some("xoxp-new")).unwrap();

        assert_eq!(store.resolve(None).unwrap(), "xoxp-new");
    }

    #[test]
    fn stored_token_is_loaded_when_none_supplied() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(TOKEN_FILE_NAME), "xoxp-saved\n").unwrap();
        let store = CredentialStore::new(tmp.path());

        assert_eq!(store.resolve(None).unwrap(), "xoxp-saved");
        assert_eq!(store.resolve(Some("")).unwrap(), "xoxp-saved");
    }

    #[test]
    fn missing_token_everywhere_fails() {
        let tmp = TempDir::new().unwrap();
        let store = CredentialStore::new(tmp.path());

        let err = store.resolve(None).unwrap_err();
        assert!(matches!(err, Error::MissingCredential));
    }

    #[test]
    fn blank_stored_token_counts_as_missing() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(TOKEN_FILE_NAME), "  \n").unwrap();
        let store = CredentialStore::new(tmp.path());

        assert!(matches!(
            store.resolve(None).unwrap_err(),
            Error::MissingCredential
        ));
    }

    #[test]
    fn unreadable_token_record_is_read_failure() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(TOKEN_FILE_NAME)).unwrap();
        let store = CredentialStore::new(tmp.path());

        assert!(matches!(
            store.resolve(None).unwrap_err(),
            Error::CacheReadFailure { .. }
        ));
    }

    #[test]
    fn save_failure_does_not_fail_resolution() {
        let tmp = TempDir::new().unwrap();
        // base "directory" is a regular file, so the token cannot be written
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let store = CredentialStore::new(&blocker);

        assert_eq!(store.resolve(Some("xoxp-1")).unwrap(), "xoxp-1");
    }
}
