//! Local cache of the channels and users a file can be shared with.
//!
//! The whole snapshot is stored as one JSON record and is only ever replaced
//! wholesale: a refresh fetches every channel and user again and overwrites
//! the record. A snapshot is valid for [`VALIDITY`] after it was fetched.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::record;
use crate::remote::DirectoryClient;

pub const DIRECTORY_FILE_NAME: &str = "slack-channels.json";

/// How long a fetched snapshot stays fresh.
pub const VALIDITY: Duration = Duration::hours(24);

/// Slack's built-in bot user, never a sensible destination.
pub const SLACKBOT_ID: &str = "USLACKBOT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    pub id: String,
    pub is_member: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySnapshot {
    pub entries: Vec<DirectoryEntry>,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl DirectorySnapshot {
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    /// Entry whose id or name is `target`. A leading `#` or `@` is ignored.
    pub fn find(&self, target: &str) -> Option<&DirectoryEntry> {
        let target = target.trim();
        if let Some(entry) = self.entries.iter().find(|e| e.id == target) {
            return Some(entry);
        }
        let name = target.trim_start_matches(['#', '@']);
        self.entries.iter().find(|e| e.name == name)
    }

    /// Entries for which `predicate` holds, in snapshot order. `None` keeps all.
    pub fn filter(
        &self,
        predicate: Option<&dyn Fn(&DirectoryEntry) -> bool>,
    ) -> Vec<&DirectoryEntry> {
        match predicate {
            None => self.entries.iter().collect(),
            Some(keep) => self.entries.iter().filter(|entry| keep(entry)).collect(),
        }
    }
}

/// Predicate for the "members only" selection mode.
pub fn members_only(entry: &DirectoryEntry) -> bool {
    entry.is_member
}

/// Whether `value` has the shape of a Slack conversation or user id
/// (`C…`, `G…`, `D…`, `U…`, `W…` followed by upper-case alphanumerics).
/// Slack names are lower-case, so these never collide with a name.
pub fn looks_like_id(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some('C' | 'G' | 'D' | 'U' | 'W'))
        && value.len() >= 9
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

pub struct DirectoryCache<'a, C: ?Sized> {
    client: &'a C,
    path: PathBuf,
}

impl<'a, C: DirectoryClient + ?Sized> DirectoryCache<'a, C> {
    pub fn new(client: &'a C, base_dir: &Path) -> Self {
        Self {
            client,
            path: base_dir.join(DIRECTORY_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current snapshot: the stored one while it is fresh, otherwise a new
    /// fetch. `force_refresh` skips the stored record entirely.
    ///
    /// An unreadable or undecodable record is an error rather than a reason to
    /// refetch, and a failed fetch never falls back to a stale record.
    pub fn load(&self, force_refresh: bool) -> Result<DirectorySnapshot> {
        if force_refresh {
            debug!("forced refresh, ignoring cached slack channels");
            return self.refresh();
        }

        let cached = match self.read_local() {
            Ok(snapshot) => snapshot,
            Err(err) if err.is_not_found() => None,
            Err(err) => return Err(err),
        };

        match cached {
            Some(snapshot) if !snapshot.is_expired() => Ok(snapshot),
            Some(_) => {
                debug!("cache is out of date");
                self.refresh()
            }
            None => {
                debug!("no cached slack channels yet");
                self.refresh()
            }
        }
    }

    /// Fetch a new snapshot and overwrite the stored record with it.
    pub fn refresh(&self) -> Result<DirectorySnapshot> {
        let snapshot = fetch_snapshot(self.client, OffsetDateTime::now_utc())?;
        if let Err(err) = self.save(&snapshot) {
            warn!(
                "failed to save slack channels to {}: {err:#}",
                self.path.display()
            );
        }
        Ok(snapshot)
    }

    /// A record holding `null` decodes to `None` and is treated like no record.
    fn read_local(&self) -> Result<Option<DirectorySnapshot>> {
        debug!("loading cached slack channels from: {}", self.path.display());
        let content = record::read(&self.path)?;
        serde_json::from_str(&content).map_err(|err| Error::read_failure(&self.path, err))
    }

    fn save(&self, snapshot: &DirectorySnapshot) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(snapshot)?;
        record::write(&self.path, format!("{content}\n").as_bytes(), false)?;
        Ok(())
    }
}

/// Build a snapshot from the remote listings: channels first, then every
/// user that is a real person, all in listing order.
pub fn fetch_snapshot<C: DirectoryClient + ?Sized>(
    client: &C,
    now: OffsetDateTime,
) -> Result<DirectorySnapshot> {
    debug!("fetching slack channels");
    let channels = client.list_channels()?;
    let users = client.list_users()?;

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(channels.len() + users.len());

    for channel in channels {
        if !seen.insert(channel.id.clone()) {
            debug!("skipping duplicate channel {}", channel.id);
            continue;
        }
        entries.push(DirectoryEntry {
            name: channel.name,
            id: channel.id,
            is_member: channel.is_member,
        });
    }

    for user in users {
        if user.is_bot || user.is_deleted || user.id == SLACKBOT_ID {
            continue;
        }
        if !seen.insert(user.id.clone()) {
            debug!("skipping duplicate user {}", user.id);
            continue;
        }
        entries.push(DirectoryEntry {
            name: user.name,
            id: user.id,
            is_member: true,
        });
    }

    Ok(DirectorySnapshot {
        entries,
        expires_at: now + VALIDITY,
    })
}
