//! Request DTOs and reply wrappers for the console backend.

#[derive(Debug, serde::Serialize)]
pub(super) struct TargetRequest<'a> {
    pub(super) server: &'a str,
    pub(super) group: &'a str,
}

#[derive(Debug, Default, serde::Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub(super) error: String,
}

/// Reply from an endpoint whose non-2xx responses still carry a diagnostic body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticReply<T> {
    pub status: u16,
    pub body: Option<T>,
}

impl<T> DiagnosticReply<T> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
