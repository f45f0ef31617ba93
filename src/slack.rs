//! Slack Web API adapter.

use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::remote::{DirectoryClient, FileUploader, RemoteChannel, RemoteUser};

pub const API_BASE_URL: &str = "https://slack.com/api";

const PAGE_LIMIT: &str = "200";

pub struct SlackClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

#[derive(Deserialize)]
struct ChannelsPage {
    #[serde(default)]
    channels: Vec<Channel>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct Channel {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    is_member: bool,
}

#[derive(Deserialize)]
struct UsersPage {
    #[serde(default)]
    members: Vec<User>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct User {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    is_bot: bool,
    #[serde(default)]
    deleted: bool,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Deserialize)]
struct UploadTicket {
    upload_url: String,
    file_id: String,
}

fn next_cursor(metadata: Option<ResponseMetadata>) -> Option<String> {
    metadata
        .map(|m| m.next_cursor)
        .filter(|cursor| !cursor.is_empty())
}

/// Unwrap Slack's `{"ok": bool, "error": ...}` envelope.
fn check_ok<T: DeserializeOwned>(method: &'static str, value: Value) -> Result<T> {
    if value.get("ok").and_then(Value::as_bool) != Some(true) {
        let reason = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(Error::remote(method, reason));
    }
    serde_json::from_value(value).map_err(|err| Error::remote(method, err))
}

impl SlackClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, API_BASE_URL)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn get<T: DeserializeOwned>(&self, method: &'static str, query: &[(&str, &str)]) -> Result<T> {
        let mut request = self
            .agent
            .get(&self.endpoint(method))
            .set("Authorization", &self.bearer());
        for (key, value) in query {
            request = request.query(key, value);
        }
        let value: Value = request
            .call()
            .map_err(|err| Error::remote(method, err))?
            .into_json()
            .map_err(|err| Error::remote(method, err))?;
        check_ok(method, value)
    }

    fn post_form<T: DeserializeOwned>(
        &self,
        method: &'static str,
        form: &[(&str, &str)],
    ) -> Result<T> {
        let value: Value = self
            .agent
            .post(&self.endpoint(method))
            .set("Authorization", &self.bearer())
            .send_form(form)
            .map_err(|err| Error::remote(method, err))?
            .into_json()
            .map_err(|err| Error::remote(method, err))?;
        check_ok(method, value)
    }

    fn post_json<T: DeserializeOwned>(&self, method: &'static str, body: Value) -> Result<T> {
        let value: Value = self
            .agent
            .post(&self.endpoint(method))
            .set("Authorization", &self.bearer())
            .send_json(body)
            .map_err(|err| Error::remote(method, err))?
            .into_json()
            .map_err(|err| Error::remote(method, err))?;
        check_ok(method, value)
    }
}

impl DirectoryClient for SlackClient {
    fn list_channels(&self) -> Result<Vec<RemoteChannel>> {
        let mut channels = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut query = vec![
                ("exclude_archived", "true"),
                ("types", "public_channel,private_channel"),
                ("limit", PAGE_LIMIT),
            ];
            if let Some(cursor) = cursor.as_deref() {
                query.push(("cursor", cursor));
            }
            let page: ChannelsPage = self.get("conversations.list", &query)?;
            channels.extend(page.channels.into_iter().map(|c| RemoteChannel {
                name: c.name,
                id: c.id,
                is_member: c.is_member,
            }));
            match next_cursor(page.response_metadata) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        debug!("listed {} slack channels", channels.len());
        Ok(channels)
    }

    fn list_users(&self) -> Result<Vec<RemoteUser>> {
        let mut users = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut query = vec![("limit", PAGE_LIMIT)];
            if let Some(cursor) = cursor.as_deref() {
                query.push(("cursor", cursor));
            }
            let page: UsersPage = self.get("users.list", &query)?;
            users.extend(page.members.into_iter().map(|u| RemoteUser {
                name: u.name,
                id: u.id,
                is_bot: u.is_bot,
                is_deleted: u.deleted,
            }));
            match next_cursor(page.response_metadata) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        debug!("listed {} slack users", users.len());
        Ok(users)
    }
}

impl FileUploader for SlackClient {
    fn upload_file(&self, path: &Path, destination_id: &str, message: &str) -> anyhow::Result<()> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("not a file: {}", path.display()))?;
        let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let length = bytes.len().to_string();

        let ticket: UploadTicket = self.post_form(
            "files.getUploadURLExternal",
            &[("filename", filename.as_str()), ("length", length.as_str())],
        )?;

        debug!("uploading {} bytes for {}", bytes.len(), ticket.file_id);
        let response = self
            .agent
            .post(&ticket.upload_url)
            .set("Content-Type", "application/octet-stream")
            .send_bytes(&bytes)
            .context("Failed to upload file content")?;
        if response.status() >= 400 {
            let status = response.status();
            let body = response.into_string().unwrap_or_default();
            bail!("Upload failed: {} - {}", status, body);
        }

        let body = json!({
            "files": [{ "id": ticket.file_id, "title": filename }],
            "channel_id": destination_id,
            "initial_comment": message,
        });
        let _: Value = self.post_json("files.completeUploadExternal", body)?;
        Ok(())
    }
}
