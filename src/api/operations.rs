//! One method per backend endpoint.

use crate::model::{
    ApplyResult, CheckResult, DiffRecord, GitStatus, GroupsListing, PrepareResult, TreeListing,
};

use super::*;

impl ApiClient {
    pub fn list_groups(&self) -> Result<GroupsListing> {
        let resp = self
            .client
            .get(self.url("/groups"))
            .send()
            .context("list groups request")?;
        let groups: GroupsListing = self
            .ensure_ok(resp, "list groups")?
            .json()
            .context("parse groups")?;
        Ok(groups)
    }

    pub fn fetch_tree(&self, group: &str, host: &str, mode: Mode) -> Result<TreeListing> {
        let resp = self
            .client
            .get(self.url("/tree"))
            .query(&[("group", group), ("host", host), ("mode", mode.as_str())])
            .send()
            .context("fetch tree request")?;
        let tree: TreeListing = self
            .ensure_ok(resp, "fetch tree")?
            .json()
            .context("parse tree")?;
        Ok(tree)
    }

    pub fn triple_diff(&self, group: &str, host: &str, path: &str, mode: Mode) -> Result<DiffRecord> {
        let resp = self
            .client
            .get(self.url("/triple-diff"))
            .query(&[
                ("group", group),
                ("host", host),
                ("path", path),
                ("mode", mode.as_str()),
            ])
            .send()
            .context("triple diff request")?;
        let record: DiffRecord = self
            .ensure_ok(resp, "triple diff")?
            .json()
            .context("parse triple diff")?;
        Ok(record)
    }

    pub fn run_check(&self, group: &str, host: &str, mode: Mode) -> Result<CheckResult> {
        let resp = self
            .client
            .post(self.url("/check"))
            .query(&[("mode", mode.as_str())])
            .json(&TargetRequest {
                server: host,
                group,
            })
            .send()
            .context("check request")?;
        // A failed check is still a well-formed result; only unreadable bodies are errors.
        let reply: DiagnosticReply<CheckResult> = self.read_diagnostic(resp, "check")?;
        match reply.body {
            Some(result) => Ok(result),
            None => anyhow::bail!("check failed: HTTP {}", reply.status),
        }
    }

    pub fn prepare_update(&self, group: &str, host: &str) -> Result<DiagnosticReply<PrepareResult>> {
        let resp = self
            .client
            .post(self.url("/update/prepare"))
            .query(&[("mode", UPDATE_MODE.as_str())])
            .json(&TargetRequest {
                server: host,
                group,
            })
            .send()
            .context("prepare update request")?;
        self.read_diagnostic(resp, "prepare update")
    }

    pub fn apply_update(&self, group: &str, host: &str) -> Result<DiagnosticReply<ApplyResult>> {
        let resp = self
            .client
            .post(self.url("/update/apply"))
            .query(&[("mode", UPDATE_MODE.as_str())])
            .json(&TargetRequest {
                server: host,
                group,
            })
            .send()
            .context("apply update request")?;
        self.read_diagnostic(resp, "apply update")
    }

    pub fn git_status(&self) -> Result<GitStatus> {
        let resp = self
            .client
            .get(self.url("/git/status"))
            .send()
            .context("git status request")?;
        let status: GitStatus = self
            .ensure_ok(resp, "git status")?
            .json()
            .context("parse git status")?;
        Ok(status)
    }
}
