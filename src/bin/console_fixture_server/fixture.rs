//! Canned backend data. Loaded from a JSON file or built in.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use gitops_console::model::{GroupSummary, GroupsListing, HostSummary, Mode, SyncStats};

#[derive(Clone, Debug, Deserialize)]
pub(super) struct Fixture {
    pub(super) groups: Vec<FixtureGroup>,
    #[serde(default = "default_git_status")]
    pub(super) git_status: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct FixtureGroup {
    pub(super) name: String,
    #[serde(default)]
    pub(super) hosts: Vec<FixtureHost>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct FixtureHost {
    pub(super) name: String,
    pub(super) host: String,
    #[serde(default)]
    pub(super) config_dir_suffix: String,
    #[serde(default)]
    pub(super) prefix: String,
    #[serde(default)]
    pub(super) files: Vec<FixtureFile>,
    /// Result of `nginx -t` for check and prepare.
    #[serde(default = "default_true")]
    pub(super) nginx_ok: bool,
    #[serde(default)]
    pub(super) prepare: ScriptedStatus,
    #[serde(default)]
    pub(super) apply: ScriptedStatus,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct FixtureFile {
    pub(super) path: String,
    #[serde(default)]
    pub(super) status: Option<String>,
    #[serde(default)]
    pub(super) remote: String,
    #[serde(default)]
    pub(super) preview: Option<String>,
    #[serde(default)]
    pub(super) prod: Option<String>,
    /// Artificial latency for the triple-diff endpoint.
    #[serde(default)]
    pub(super) delay_ms: u64,
}

/// HTTP status override for an update stage; the body is still sent.
#[derive(Clone, Copy, Debug, Deserialize)]
pub(super) struct ScriptedStatus {
    #[serde(default = "default_status")]
    pub(super) status: u16,
    #[serde(default)]
    pub(super) delay_ms: u64,
}

impl Default for ScriptedStatus {
    fn default() -> Self {
        Self {
            status: default_status(),
            delay_ms: 0,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_status() -> u16 {
    200
}

fn default_git_status() -> serde_json::Value {
    serde_json::json!({
        "branch": "main",
        "sync_mode": "pull",
        "status": "synced",
        "local_commit": {
            "hash": "3f2a9c1d7e8b4a6f",
            "message": "tune upstream keepalive",
            "author": "ops",
            "timestamp": "2024-05-01T12:00:00Z"
        },
        "remote_commit": {
            "hash": "3f2a9c1d7e8b4a6f",
            "message": "tune upstream keepalive",
            "author": "ops",
            "timestamp": "2024-05-01T12:00:00Z"
        }
    })
}

impl FixtureFile {
    /// Content of the environment compared against the remote tree.
    pub(super) fn compare_content(&self, mode: Mode) -> &str {
        let content = match mode {
            Mode::Preview => self.preview.as_deref(),
            Mode::Prod => self.prod.as_deref(),
        };
        content.unwrap_or(&self.remote)
    }

    fn key(&self, prefix: &str) -> String {
        if prefix.is_empty() {
            self.path.clone()
        } else {
            format!("{}/{}", prefix, self.path)
        }
    }
}

impl FixtureHost {
    /// Looks a file up by the key the client sends (prefix plus relative path).
    pub(super) fn file(&self, key: &str) -> Option<&FixtureFile> {
        self.files.iter().find(|f| f.key(&self.prefix) == key)
    }

    pub(super) fn sync_stats(&self) -> SyncStats {
        let mut stats = SyncStats {
            total: self.files.len() as u64,
            ..SyncStats::default()
        };
        let mut lists: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for file in &self.files {
            match file.status.as_deref() {
                Some(tag @ ("modified" | "added" | "deleted")) => {
                    lists.entry(tag).or_default().push(file.path.clone());
                }
                _ => stats.skipped += 1,
            }
        }
        stats.updated_files = lists.remove("modified");
        stats.added_files = lists.remove("added");
        stats.deleted_files = lists.remove("deleted");
        stats.updated = stats.updated_files.as_ref().map_or(0, |v| v.len() as u64);
        stats.added = stats.added_files.as_ref().map_or(0, |v| v.len() as u64);
        stats.deleted = stats.deleted_files.as_ref().map_or(0, |v| v.len() as u64);
        stats
    }

    pub(super) fn nginx_output(&self) -> String {
        if self.nginx_ok {
            "nginx: the configuration file /etc/nginx/nginx.conf syntax is ok\n\
             nginx: configuration file /etc/nginx/nginx.conf test is successful"
                .to_string()
        } else {
            "nginx: [emerg] unknown directive \"proxy_passs\" in /etc/nginx/conf.d/site.conf:12\n\
             nginx: configuration file /etc/nginx/nginx.conf test failed"
                .to_string()
        }
    }
}

impl Fixture {
    pub(super) fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("read fixture {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parse fixture {}", path.display()))
    }

    pub(super) fn host(&self, group: &str, host: &str) -> Option<&FixtureHost> {
        self.groups
            .iter()
            .find(|g| g.name == group)
            .and_then(|g| g.hosts.iter().find(|h| h.host == host))
    }

    pub(super) fn listing(&self) -> GroupsListing {
        GroupsListing {
            groups: self
                .groups
                .iter()
                .map(|g| GroupSummary {
                    name: g.name.clone(),
                    hosts: g
                        .hosts
                        .iter()
                        .map(|h| HostSummary {
                            name: h.name.clone(),
                            host: h.host.clone(),
                            config_dir_suffix: h.config_dir_suffix.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Small two-group estate: `edge-1` passes its nginx check, `edge-2` does not.
    pub(super) fn sample() -> Self {
        let files = |nginx_ok: bool| -> Vec<FixtureFile> {
            let site_preview = if nginx_ok {
                "server {\n    listen 443 ssl;\n    proxy_pass http://app;\n}\n"
            } else {
                "server {\n    listen 443 ssl;\n    proxy_passs http://app;\n}\n"
            };
            vec![
                FixtureFile {
                    path: "nginx.conf".to_string(),
                    status: None,
                    remote: "worker_processes auto;\n".to_string(),
                    preview: None,
                    prod: None,
                    delay_ms: 0,
                },
                FixtureFile {
                    path: "conf.d/site.conf".to_string(),
                    status: Some("modified".to_string()),
                    remote: "server {\n    listen 80;\n    proxy_pass http://app;\n}\n".to_string(),
                    preview: Some(site_preview.to_string()),
                    prod: Some(site_preview.to_string()),
                    delay_ms: 0,
                },
                FixtureFile {
                    path: "conf.d/cache.conf".to_string(),
                    status: Some("added".to_string()),
                    remote: String::new(),
                    preview: Some("proxy_cache_path /var/cache/nginx levels=1:2;\n".to_string()),
                    prod: Some("proxy_cache_path /var/cache/nginx levels=1:2;\n".to_string()),
                    delay_ms: 0,
                },
                FixtureFile {
                    path: "conf.d/legacy.conf".to_string(),
                    status: Some("deleted".to_string()),
                    remote: "# retired vhost\n".to_string(),
                    preview: Some(String::new()),
                    prod: Some(String::new()),
                    delay_ms: 0,
                },
            ]
        };
        let host = |name: &str, host: &str, suffix: &str, nginx_ok: bool| FixtureHost {
            name: name.to_string(),
            host: host.to_string(),
            config_dir_suffix: suffix.to_string(),
            prefix: String::new(),
            files: files(nginx_ok),
            nginx_ok,
            prepare: ScriptedStatus::default(),
            apply: ScriptedStatus::default(),
        };
        Self {
            groups: vec![
                FixtureGroup {
                    name: "edge".to_string(),
                    hosts: vec![
                        host("Edge 1", "edge-1", "edge/edge-1", true),
                        host("Edge 2", "edge-2", "edge/edge-2", false),
                    ],
                },
                FixtureGroup {
                    name: "core".to_string(),
                    hosts: vec![host("Core 1", "core-1", "core/core-1", true)],
                },
            ],
            git_status: default_git_status(),
        }
    }
}

/// Line-by-line unified-style diff; good enough for fixture content.
pub(super) fn unified_diff(remote: &str, compare: &str, label: &str) -> String {
    if remote == compare {
        return String::new();
    }
    let a: Vec<&str> = remote.lines().collect();
    let b: Vec<&str> = compare.lines().collect();
    let mut out = vec![
        "--- remote".to_string(),
        format!("+++ {}", label),
        format!("@@ -1,{} +1,{} @@", a.len(), b.len()),
    ];
    for i in 0..a.len().max(b.len()) {
        match (a.get(i), b.get(i)) {
            (Some(x), Some(y)) if x == y => out.push(format!(" {}", x)),
            (x, y) => {
                if let Some(x) = x {
                    out.push(format!("-{}", x));
                }
                if let Some(y) = y {
                    out.push(format!("+{}", y));
                }
            }
        }
    }
    out.join("\n")
}
