//! Payloads exchanged with the console backend.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::mode::{FileStatus, Mode};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSummary {
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub config_dir_suffix: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub name: String,
    #[serde(default)]
    pub hosts: Vec<HostSummary>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GroupsListing {
    #[serde(default)]
    pub groups: Vec<GroupSummary>,
}

impl GroupsListing {
    pub fn find_host(&self, group: &str, host: &str) -> Option<&HostSummary> {
        self.groups
            .iter()
            .find(|g| g.name == group)
            .and_then(|g| g.hosts.iter().find(|h| h.host == host))
    }

    /// First (group, host) pair in listing order.
    pub fn first_host(&self) -> Option<(&GroupSummary, &HostSummary)> {
        self.groups
            .iter()
            .find_map(|g| g.hosts.first().map(|h| (g, h)))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeListing {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_statuses: Option<BTreeMap<String, String>>,
}

impl TreeListing {
    /// Known status tags keyed by relative path. Unknown tags are treated as unchanged.
    pub fn statuses(&self) -> HashMap<String, FileStatus> {
        self.file_statuses
            .iter()
            .flatten()
            .filter_map(|(path, tag)| FileStatus::from_tag(tag).map(|s| (path.clone(), s)))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    pub path: String,
    #[serde(default)]
    pub remote_content: String,
    #[serde(default)]
    pub compare_content: String,
    #[serde(default)]
    pub diff: String,
    pub mode: Mode,
    #[serde(default)]
    pub compare_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_status: Option<String>,
}

impl DiffRecord {
    pub fn status(&self) -> Option<FileStatus> {
        self.file_status.as_deref().and_then(FileStatus::from_tag)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub updated: u64,
    #[serde(default)]
    pub added: u64,
    #[serde(default)]
    pub deleted: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_files: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NginxCheck {
    #[serde(default)]
    pub command: String,
    pub ok: bool,
    #[serde(default)]
    pub output: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    /// Absent in production mode: prod performs no sync-on-check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nginx: Option<NginxCheck>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nginx: Option<NginxCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncStats>,
}

impl PrepareResult {
    /// Gate verdict: only the nginx check decides, never a top-level flag.
    pub fn nginx_ok(&self) -> bool {
        self.nginx.as_ref().is_some_and(|n| n.ok)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nginx: Option<NginxCheck>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "lowercase")]
pub enum UpdateResult {
    Prepare(PrepareResult),
    Apply(ApplyResult),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub hash: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub timestamp: String,
}

impl CommitInfo {
    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.hash.len());
        &self.hash[..end]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftState {
    Synced,
    Ahead,
    Behind,
    Diverged,
    Error,
    #[serde(other)]
    Unknown,
}

impl DriftState {
    pub fn label(self) -> &'static str {
        match self {
            DriftState::Synced => "synced",
            DriftState::Ahead => "ahead",
            DriftState::Behind => "behind",
            DriftState::Diverged => "diverged",
            DriftState::Error => "error",
            DriftState::Unknown => "unknown",
        }
    }

    pub fn is_alarming(self) -> bool {
        matches!(self, DriftState::Diverged | DriftState::Error)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitStatus {
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub sync_mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_commit: Option<CommitInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_commit: Option<CommitInfo>,
    pub status: DriftState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
