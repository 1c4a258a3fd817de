//! Backend response envelope.

use serde::{Deserialize, Serialize};

/// Envelope wrapping every JSON body returned by the auth API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    /// Best human-readable failure description carried by the envelope.
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        if let Some(message) = self.message.as_ref().filter(|m| !m.is_empty()) {
            return Some(message.clone());
        }
        self.errors.as_ref().filter(|errs| !errs.is_empty()).map(|errs| errs.join("; "))
    }
}
