// Wire envelope shared by every backend response.

use serde::Deserialize;

/// The backend wraps every payload as `{ success, message, data }`.
///
/// `success` is optional; when present and `false` the response is a
/// failure even under a 2xx status.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Body shape of a failed request. Only `message` is read.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.is_empty())
    }
}
