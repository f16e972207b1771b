use serde::de::DeserializeOwned;

use super::*;

impl ApiClient {
    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(super) fn ensure_ok(
        &self,
        resp: reqwest::blocking::Response,
        label: &str,
    ) -> Result<reqwest::blocking::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            anyhow::bail!("{}: endpoint not found (is the console backend at {}?)", label, self.base_url);
        }
        let detail = resp
            .json::<ErrorBody>()
            .ok()
            .map(|b| b.error)
            .filter(|e| !e.is_empty());
        match detail {
            Some(detail) => anyhow::bail!("{} failed: {} ({})", label, status, detail),
            None => anyhow::bail!("{} failed: {}", label, status),
        }
    }

    /// Reads a JSON body regardless of status, so a rejected update still
    /// carries the backend's diagnostic.
    pub(super) fn read_diagnostic<T: DeserializeOwned>(
        &self,
        resp: reqwest::blocking::Response,
        label: &str,
    ) -> Result<DiagnosticReply<T>> {
        let status = resp.status();
        let bytes = resp
            .bytes()
            .with_context(|| format!("read {} response", label))?;
        if status.is_success() {
            let body = serde_json::from_slice(&bytes)
                .with_context(|| format!("parse {} response", label))?;
            return Ok(DiagnosticReply {
                status: status.as_u16(),
                body: Some(body),
            });
        }
        Ok(DiagnosticReply {
            status: status.as_u16(),
            body: serde_json::from_slice(&bytes).ok(),
        })
    }
}
