//! Capabilities the rest of the crate needs from Slack.

use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteChannel {
    pub name: String,
    pub id: String,
    pub is_member: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUser {
    pub name: String,
    pub id: String,
    pub is_bot: bool,
    pub is_deleted: bool,
}

/// Listing of the workspace directory. Both calls fail with
/// `RemoteUnavailable` on transport or authorization errors.
pub trait DirectoryClient {
    fn list_channels(&self) -> Result<Vec<RemoteChannel>>;
    fn list_users(&self) -> Result<Vec<RemoteUser>>;
}

/// Sharing a local file into a channel or direct message.
pub trait FileUploader {
    fn upload_file(&self, path: &Path, destination_id: &str, message: &str) -> anyhow::Result<()>;
}
