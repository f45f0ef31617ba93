//! Share local files to Slack channels and direct messages.
//!
//! The interesting state lives on disk under a base directory: the Slack token
//! ([`credential`]) and a day-long cache of every channel and user a file can
//! be sent to ([`directory`]).

pub mod config;
pub mod credential;
pub mod directory;
pub mod error;
mod record;
pub mod remote;
pub mod slack;
pub mod upload;

pub use config::{Config, Settings};
pub use credential::CredentialStore;
pub use directory::{
    DirectoryCache, DirectoryEntry, DirectorySnapshot, looks_like_id, members_only,
};
pub use error::{Error, Result};
pub use remote::{DirectoryClient, FileUploader, RemoteChannel, RemoteUser};
pub use slack::SlackClient;
