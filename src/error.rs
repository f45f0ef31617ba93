//! Error kinds surfaced by the credential store, the directory cache and the
//! Slack adapter.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No token was supplied and none was stored by a previous run.
    #[error(
        "no Slack token available: create one at https://api.slack.com/custom-integrations/legacy-tokens \
         and pass it once with --slack-token, it is remembered afterwards"
    )]
    MissingCredential,

    /// Transport, HTTP or authorization failure of a Slack API call.
    #[error("slack api {method} failed: {reason}")]
    RemoteUnavailable { method: &'static str, reason: String },

    /// A local record exists but could not be read or decoded.
    #[error("failed to read {}", .path.display())]
    CacheReadFailure {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No local record exists yet. Callers turn this into the "absent" path.
    #[error("no local record at {}", .path.display())]
    NotFoundLocally { path: PathBuf },
}

impl Error {
    pub(crate) fn remote(method: &'static str, reason: impl std::fmt::Display) -> Self {
        Error::RemoteUnavailable {
            method,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn read_failure(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::CacheReadFailure {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFoundLocally { .. })
    }
}
