//! Submission of the reviewed working set to the persistence server.
//!
//! Every entry is re-validated first; a single bad entry blocks the whole
//! upload. The working set is only borrowed, so after any failure it is
//! still intact for a manual retry. No retries, no queueing.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Settings;
use crate::models::MedicationEntry;
use crate::prescription::{validate_entry, ValidationError, WorkingSet};

/// Path of the prescription schedule endpoint on the server.
pub const PRESCRIPTION_ENDPOINT: &str = "/prescriptionSchedule";

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("You must be signed in to upload prescriptions")]
    NotSignedIn,

    #[error("No prescription data to upload")]
    NothingToSubmit,

    #[error("Entry {index} ({name}): {source}")]
    InvalidEntry {
        index: usize,
        name: String,
        #[source]
        source: ValidationError,
    },

    #[error("Prescription server is not reachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Server responded with status {status}: {body}")]
    Server { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Request body for `POST /prescriptionSchedule`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionSubmission {
    pub user: String,
    pub medicines: Vec<MedicationEntry>,
}

/// What the server acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub status: u16,
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct SubmitResponse {
    message: Option<String>,
}

/// Persistence collaborator abstraction (allows mocking).
pub trait PrescriptionSink {
    fn send(&self, submission: &PrescriptionSubmission) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Blocking HTTP client for the dashboard server.
pub struct HttpPrescriptionClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpPrescriptionClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, SubmissionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SubmissionError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, SubmissionError> {
        Self::new(&settings.server_url, settings.timeout_secs)
    }

    pub fn endpoint(&self) -> String {
        format!("{}{PRESCRIPTION_ENDPOINT}", self.base_url)
    }
}

impl PrescriptionSink for HttpPrescriptionClient {
    fn send(&self, submission: &PrescriptionSubmission) -> Result<SubmissionReceipt, SubmissionError> {
        let url = self.endpoint();

        let response = self
            .client
            .post(&url)
            .json(submission)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    SubmissionError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    SubmissionError::Timeout(self.timeout_secs)
                } else {
                    SubmissionError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SubmissionError::Server {
                status: status.as_u16(),
                body,
            });
        }

        // The body is informational only; an unexpected shape is not a failure.
        let message = response
            .json::<SubmitResponse>()
            .ok()
            .and_then(|r| r.message);

        Ok(SubmissionReceipt {
            status: status.as_u16(),
            message,
        })
    }
}

/// Build the request body, re-validating every entry.
pub fn build_submission(
    user: &str,
    working_set: &WorkingSet,
) -> Result<PrescriptionSubmission, SubmissionError> {
    let user = user.trim();
    if user.is_empty() {
        return Err(SubmissionError::NotSignedIn);
    }
    if working_set.is_empty() {
        return Err(SubmissionError::NothingToSubmit);
    }

    for (index, entry) in working_set.entries().iter().enumerate() {
        validate_entry(entry).map_err(|source| SubmissionError::InvalidEntry {
            index,
            name: entry.name.clone(),
            source,
        })?;
    }

    Ok(PrescriptionSubmission {
        user: user.to_string(),
        medicines: working_set.entries().to_vec(),
    })
}

/// Validate and send the working set on behalf of `user`.
pub fn submit(
    sink: &dyn PrescriptionSink,
    user: &str,
    working_set: &WorkingSet,
) -> Result<SubmissionReceipt, SubmissionError> {
    let submission = build_submission(user, working_set).map_err(|e| {
        warn!(error = %e, "Prescription upload blocked");
        e
    })?;

    match sink.send(&submission) {
        Ok(receipt) => {
            info!(
                user = %submission.user,
                medicines = submission.medicines.len(),
                status = receipt.status,
                "Prescription data uploaded"
            );
            Ok(receipt)
        }
        Err(e) => {
            warn!(error = %e, "Prescription upload failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::models::EntryFields;
    use crate::prescription::extract;

    /// Records what it was sent; answers with a fixed outcome.
    struct RecordingSink {
        sent: RefCell<Vec<PrescriptionSubmission>>,
        fail_with_status: Option<u16>,
    }

    impl RecordingSink {
        fn accepting() -> Self {
            Self {
                sent: RefCell::new(Vec::new()),
                fail_with_status: None,
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                sent: RefCell::new(Vec::new()),
                fail_with_status: Some(status),
            }
        }
    }

    impl PrescriptionSink for RecordingSink {
        fn send(
            &self,
            submission: &PrescriptionSubmission,
        ) -> Result<SubmissionReceipt, SubmissionError> {
            self.sent.borrow_mut().push(submission.clone());
            match self.fail_with_status {
                Some(status) => Err(SubmissionError::Server {
                    status,
                    body: "boom".into(),
                }),
                None => Ok(SubmissionReceipt {
                    status: 200,
                    message: Some("Prescription schedule saved successfully!".into()),
                }),
            }
        }
    }

    fn complete_set() -> WorkingSet {
        WorkingSet::from_extracted(extract(
            "Paracetamol 500mg morning, evening x 5 days",
            &["Paracetamol"],
        ))
    }

    #[test]
    fn submits_validated_set() {
        let sink = RecordingSink::accepting();
        let receipt = submit(&sink, "alice", &complete_set()).unwrap();
        assert_eq!(receipt.status, 200);

        let sent = sink.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].user, "alice");
        assert_eq!(sent[0].medicines.len(), 1);
    }

    #[test]
    fn request_body_shape() {
        let submission = build_submission("alice", &complete_set()).unwrap();
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["user"], "alice");
        assert_eq!(json["medicines"][0]["name"], "Paracetamol");
        assert_eq!(json["medicines"][0]["interval"][1], "evening");
        assert_eq!(json["medicines"][0]["isPopular"], true);
    }

    #[test]
    fn requires_user() {
        let sink = RecordingSink::accepting();
        let err = submit(&sink, "  ", &complete_set()).unwrap_err();
        assert!(matches!(err, SubmissionError::NotSignedIn));
        assert!(sink.sent.borrow().is_empty());
    }

    #[test]
    fn refuses_empty_set() {
        let sink = RecordingSink::accepting();
        let err = submit(&sink, "alice", &WorkingSet::new()).unwrap_err();
        assert!(matches!(err, SubmissionError::NothingToSubmit));
    }

    #[test]
    fn placeholder_entry_blocks_upload() {
        let sink = RecordingSink::accepting();
        let mut entries = complete_set().into_entries();
        entries.extend(extract("Warfarin", &["Warfarin"]));
        let set = WorkingSet::from_extracted(entries);

        let err = submit(&sink, "alice", &set).unwrap_err();
        match err {
            SubmissionError::InvalidEntry { index, name, .. } => {
                assert_eq!(index, 1);
                assert_eq!(name, "Warfarin");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(sink.sent.borrow().is_empty());
    }

    #[test]
    fn manual_entries_are_submitted() {
        let sink = RecordingSink::accepting();
        let mut set = WorkingSet::new();
        set.add(&EntryFields {
            name: "Aspirin".into(),
            dosage: "75mg".into(),
            days: "1 month".into(),
            schedule: "morning".into(),
        })
        .unwrap();

        submit(&sink, "bob", &set).unwrap();
        assert!(!sink.sent.borrow()[0].medicines[0].is_popular);
    }

    #[test]
    fn server_failure_leaves_set_untouched() {
        let sink = RecordingSink::failing(500);
        let set = complete_set();
        let before = set.clone();

        let err = submit(&sink, "alice", &set).unwrap_err();
        assert!(matches!(err, SubmissionError::Server { status: 500, .. }));
        assert_eq!(set, before);
    }

    #[test]
    fn http_client_endpoint() {
        let client = HttpPrescriptionClient::new("http://localhost:8000/", 10).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8000/prescriptionSchedule");
        assert_eq!(client.timeout_secs, 10);
    }

    #[test]
    fn http_client_from_settings() {
        let settings = Settings {
            server_url: "https://rx.example.org".into(),
            medicines_path: None,
            timeout_secs: 3,
        };
        let client = HttpPrescriptionClient::from_settings(&settings).unwrap();
        assert_eq!(client.endpoint(), "https://rx.example.org/prescriptionSchedule");
    }
}
