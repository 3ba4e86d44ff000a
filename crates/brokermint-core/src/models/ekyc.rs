use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity documents the service accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[default]
    Aadhaar,
    Pan,
    Passport,
}

impl DocumentType {
    pub const ALL: [DocumentType; 3] = [DocumentType::Aadhaar, DocumentType::Pan, DocumentType::Passport];

    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentType::Aadhaar => "Aadhaar Card",
            DocumentType::Pan => "PAN Card",
            DocumentType::Passport => "Passport",
        }
    }

    /// Expected number format, as documented by the service
    pub fn format_hint(&self) -> &'static str {
        match self {
            DocumentType::Aadhaar => "12-digit number",
            DocumentType::Pan => "10-character alphanumeric",
            DocumentType::Passport => "8-character alphanumeric",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            DocumentType::Aadhaar => DocumentType::Pan,
            DocumentType::Pan => DocumentType::Passport,
            DocumentType::Passport => DocumentType::Aadhaar,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            DocumentType::Aadhaar => DocumentType::Passport,
            DocumentType::Pan => DocumentType::Aadhaar,
            DocumentType::Passport => DocumentType::Pan,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentData {
    pub number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub document_type: DocumentType,
    pub document_data: DocumentData,
}

impl VerificationRequest {
    pub fn new(document_type: DocumentType, number: impl Into<String>) -> Self {
        Self {
            document_type,
            document_data: DocumentData {
                number: number.into(),
            },
        }
    }
}

/// Result of `/ekyc/verify`.
///
/// Successful checks carry `score` and `verification_id`; unsuccessful
/// ones carry `error`. `status` may be present on either.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub verification_id: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl VerificationResult {
    pub fn status_label(&self) -> &str {
        self.status
            .as_deref()
            .unwrap_or(if self.success { "verified" } else { "failed" })
    }

    /// Score as a percentage with one decimal, e.g. `80.0%`
    pub fn score_percent(&self) -> Option<String> {
        self.score.map(|s| format!("{:.1}%", s * 100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = VerificationRequest::new(DocumentType::Pan, "ABCDE1234F");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"document_type": "pan", "document_data": {"number": "ABCDE1234F"}})
        );
    }

    #[test]
    fn test_parse_success_and_failure() {
        let ok: VerificationResult = serde_json::from_str(
            r#"{"success":true,"verification_id":3,"status":"verified","score":0.8,"timestamp":"2026-10-19T10:00:00"}"#,
        )
        .unwrap();
        assert_eq!(ok.status_label(), "verified");
        assert_eq!(ok.score_percent().as_deref(), Some("80.0%"));

        let failed: VerificationResult =
            serde_json::from_str(r#"{"success":false,"error":"database is locked"}"#).unwrap();
        assert_eq!(failed.status_label(), "failed");
        assert_eq!(failed.error.as_deref(), Some("database is locked"));
        assert_eq!(failed.score_percent(), None);
    }

    #[test]
    fn test_document_type_cycle() {
        let mut doc = DocumentType::default();
        for _ in 0..DocumentType::ALL.len() {
            doc = doc.next();
        }
        assert_eq!(doc, DocumentType::Aadhaar);
        assert_eq!(DocumentType::Aadhaar.prev(), DocumentType::Passport);
    }
}
