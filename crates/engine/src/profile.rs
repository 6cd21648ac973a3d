//! Versioned user configuration
//!
//! Every change to a user's interests creates a new immutable version that
//! copies the active one and then applies the edit. Exactly one version per
//! user is active; older versions stay readable so that past rankings can be
//! explained.

use crate::snapshot::{read_snapshot, write_snapshot};
use chrono::{DateTime, Utc};
use litrank_core::{Error, FollowedTopic, Result, TopicId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Account data of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique login name
    pub name: String,
    /// Name shown in listings
    pub display_name: String,
    /// Optional contact address
    pub email: Option<String>,
}

/// One immutable configuration snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileVersion {
    /// Version number, starting at 1
    pub version: u32,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Free-text description of the user's research interest
    pub area_of_interest: Option<String>,
    /// Followed topics with per-topic relevance
    pub followed_topics: Vec<FollowedTopic>,
}

impl ProfileVersion {
    fn initial() -> Self {
        ProfileVersion {
            version: 1,
            created_at: Utc::now(),
            area_of_interest: None,
            followed_topics: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserHistory {
    profile: UserProfile,
    versions: Vec<ProfileVersion>,
    active: u32,
}

impl UserHistory {
    fn active_version(&self) -> Result<&ProfileVersion> {
        self.versions
            .iter()
            .find(|v| v.version == self.active)
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "user '{}' has no active version {}",
                    self.profile.name, self.active
                ))
            })
    }
}

/// Append-only log of user configuration versions
#[derive(Debug, Default)]
pub struct ProfileLog {
    users: RwLock<BTreeMap<String, UserHistory>>,
}

fn unknown_user(name: &str) -> Error {
    Error::invalid_input(format!("user '{}' does not exist", name))
}

fn check_followed(topics: &[FollowedTopic]) -> Result<()> {
    let mut seen = HashSet::new();
    for t in topics {
        if !seen.insert(t.topic_id) {
            return Err(Error::invalid_input(format!(
                "topic {} is followed more than once",
                t.topic_id
            )));
        }
        if !t.relevance.is_finite() {
            return Err(Error::invalid_input(format!(
                "relevance for topic {} is not finite",
                t.topic_id
            )));
        }
    }
    Ok(())
}

impl ProfileLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user with an empty, active version 1
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if the name is taken.
    pub fn create_user(
        &self,
        name: &str,
        display_name: &str,
        email: Option<&str>,
    ) -> Result<UserProfile> {
        let mut users = self.users.write();
        if users.contains_key(name) {
            return Err(Error::invalid_input(format!("user '{}' already exists", name)));
        }
        let profile = UserProfile {
            name: name.to_string(),
            display_name: display_name.to_string(),
            email: email.map(str::to_string),
        };
        users.insert(
            name.to_string(),
            UserHistory {
                profile: profile.clone(),
                versions: vec![ProfileVersion::initial()],
                active: 1,
            },
        );
        Ok(profile)
    }

    /// Remove a user and all versions
    pub fn delete_user(&self, name: &str) -> Result<()> {
        self.users
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| unknown_user(name))
    }

    /// Account data of a user
    pub fn user(&self, name: &str) -> Result<UserProfile> {
        self.users
            .read()
            .get(name)
            .map(|h| h.profile.clone())
            .ok_or_else(|| unknown_user(name))
    }

    /// Append a copy of the active version with `edit` applied
    ///
    /// The new version is not activated. Returns its number.
    pub fn new_version<F>(&self, name: &str, edit: F) -> Result<u32>
    where
        F: FnOnce(&mut ProfileVersion),
    {
        let mut users = self.users.write();
        let history = users.get_mut(name).ok_or_else(|| unknown_user(name))?;

        let mut next = history.active_version()?.clone();
        next.version = history
            .versions
            .iter()
            .map(|v| v.version)
            .max()
            .unwrap_or(0)
            + 1;
        next.created_at = Utc::now();
        edit(&mut next);
        check_followed(&next.followed_topics)?;

        let number = next.version;
        history.versions.push(next);
        Ok(number)
    }

    /// Make `version` the active one
    pub fn activate(&self, name: &str, version: u32) -> Result<()> {
        let mut users = self.users.write();
        let history = users.get_mut(name).ok_or_else(|| unknown_user(name))?;
        if !history.versions.iter().any(|v| v.version == version) {
            return Err(Error::invalid_input(format!(
                "user '{}' has no version {}",
                name, version
            )));
        }
        history.active = version;
        tracing::debug!(target: "litrank::profile", user = name, version, "Activated profile version");
        Ok(())
    }

    /// The active version
    pub fn active(&self, name: &str) -> Result<ProfileVersion> {
        let users = self.users.read();
        let history = users.get(name).ok_or_else(|| unknown_user(name))?;
        history.active_version().cloned()
    }

    /// All versions, newest first
    pub fn history(&self, name: &str) -> Result<Vec<ProfileVersion>> {
        let users = self.users.read();
        let history = users.get(name).ok_or_else(|| unknown_user(name))?;
        let mut versions = history.versions.clone();
        versions.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(versions)
    }

    /// Replace the followed topics in a new, activated version
    pub fn set_followed_topics(&self, name: &str, topics: Vec<FollowedTopic>) -> Result<u32> {
        let version = self.new_version(name, |v| v.followed_topics = topics)?;
        self.activate(name, version)?;
        Ok(version)
    }

    /// Drop one followed topic in a new, activated version
    pub fn remove_followed_topic(&self, name: &str, topic_id: TopicId) -> Result<u32> {
        let version = self.new_version(name, |v| {
            v.followed_topics.retain(|t| t.topic_id != topic_id)
        })?;
        self.activate(name, version)?;
        Ok(version)
    }

    /// Set the area-of-interest text and its matched topics in a new,
    /// activated version
    pub fn set_area_of_interest(
        &self,
        name: &str,
        description: &str,
        topics: Vec<FollowedTopic>,
    ) -> Result<u32> {
        let version = self.new_version(name, |v| {
            v.area_of_interest = Some(description.to_string());
            v.followed_topics = topics;
        })?;
        self.activate(name, version)?;
        Ok(version)
    }

    /// Followed topics of the active version
    pub fn followed_topics(&self, name: &str) -> Result<Vec<FollowedTopic>> {
        Ok(self.active(name)?.followed_topics)
    }

    /// Write every user with all versions to `path`
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        let users = self.users.read().clone();
        write_snapshot(path, &users)?;
        tracing::debug!(target: "litrank::profile", path = %path.display(), users = users.len(), "Saved profiles");
        Ok(())
    }

    /// Rebuild a log written by `save_snapshot`
    pub fn load_snapshot(path: &Path) -> Result<Self> {
        let users: BTreeMap<String, UserHistory> = read_snapshot(path)?;
        Ok(ProfileLog {
            users: RwLock::new(users),
        })
    }
}
