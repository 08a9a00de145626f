//! Data-request sub-workflow records
//!
//! A supervisor may suspend an order to ask the client for extra data
//! or attachments. The request is its own record tied to the order;
//! multiple requests may exist per order over its lifetime.

use serde::{Deserialize, Serialize};

/// Reference to an already-uploaded file
///
/// File transfer itself happens in an external storage collaborator;
/// the workflow only carries opaque references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Original file name
    pub name: String,
    /// Storage URL or key
    pub url: String,
}

/// Data-request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataRequestStatus {
    /// Waiting on the client
    Pending,
    /// Client responded, supervisor has not closed it yet
    Responded,
    /// Terminal
    Closed,
}

/// A supervisor's request for additional data from the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRequest {
    /// Opaque unique id (uuid)
    pub request_id: String,
    /// Order this request belongs to
    pub order_id: String,
    /// Supervisor who opened the request
    pub supervisor_id: String,
    /// Client expected to respond
    pub client_id: String,
    pub status: DataRequestStatus,
    /// What the supervisor is asking for
    pub message: String,
    /// Client's textual answer, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_note: Option<String>,
    /// Files the client attached with the response
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uploaded_files: Vec<FileRef>,
    /// Supervisor's closing remark, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisor_reply: Option<String>,
    /// Unix millis
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<i64>,
}

impl DataRequest {
    pub fn new(
        request_id: impl Into<String>,
        order_id: impl Into<String>,
        supervisor_id: impl Into<String>,
        client_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            order_id: order_id.into(),
            supervisor_id: supervisor_id.into(),
            client_id: client_id.into(),
            status: DataRequestStatus::Pending,
            message: message.into(),
            client_note: None,
            uploaded_files: Vec::new(),
            supervisor_reply: None,
            created_at: chrono::Utc::now().timestamp_millis(),
            responded_at: None,
            closed_at: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status == DataRequestStatus::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request_pending() {
        let req = DataRequest::new("req-1", "ord-1", "sup-1", "client-1", "need the contract scan");
        assert_eq!(req.status, DataRequestStatus::Pending);
        assert!(!req.is_closed());
        assert!(req.uploaded_files.is_empty());
    }

    #[test]
    fn test_serde_skips_empty_fields() {
        let req = DataRequest::new("req-1", "ord-1", "sup-1", "client-1", "id copy");
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("client_note"));
        assert!(!json.contains("uploaded_files"));
        assert!(!json.contains("closed_at"));

        let back: DataRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }
}
