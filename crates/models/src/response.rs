use serde::{Deserialize, Serialize};

/// Envelope every notes endpoint answers with.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse {
    pub result: String,
    pub data: Option<serde_json::Value>,
    pub error: String,
}

impl ApiResponse {
    pub fn ok(result: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self { result: result.into(), data, error: String::new() }
    }

    pub fn fail(result: impl Into<String>, error: impl Into<String>) -> Self {
        Self { result: result.into(), data: None, error: error.into() }
    }

    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}
