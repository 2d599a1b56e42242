//! Inbound request type and validation.
//!
//! [`QaRequest`] mirrors the wire shape of the service this library backs:
//! a document location plus an ordered list of questions. Validation runs
//! before any external call is made, so a malformed request never costs a
//! download or a backend token.

use crate::config::QaConfig;
use crate::error::QaError;
use serde::{Deserialize, Serialize};

/// A question-answering request: one document, many questions.
///
/// Answer order matches question order; the response always contains exactly
/// one answer string per question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaRequest {
    /// URL or local path of the PDF document.
    #[serde(alias = "documents")]
    pub document: String,
    /// Ordered list of natural-language questions.
    pub questions: Vec<String>,
}

impl QaRequest {
    pub fn new(document: impl Into<String>, questions: Vec<String>) -> Self {
        Self {
            document: document.into(),
            questions,
        }
    }

    /// Validate the request against the configuration.
    ///
    /// Rejects an empty document field and question lists exceeding
    /// `config.max_questions`. An empty question *list* is accepted — the
    /// response is simply an empty answer list.
    pub fn validate(&self, config: &QaConfig) -> Result<(), QaError> {
        if self.document.trim().is_empty() {
            return Err(QaError::InvalidRequest(
                "document field must not be empty".into(),
            ));
        }
        if let Some(bound) = config.max_questions {
            if self.questions.len() > bound {
                return Err(QaError::InvalidRequest(format!(
                    "too many questions: {} (maximum {})",
                    self.questions.len(),
                    bound
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_rejected() {
        let req = QaRequest::new("  ", vec!["q".into()]);
        let config = QaConfig::default();
        assert!(matches!(
            req.validate(&config),
            Err(QaError::InvalidRequest(_))
        ));
    }

    #[test]
    fn question_bound_enforced() {
        let questions = vec!["q".to_string(); 5];
        let req = QaRequest::new("doc.pdf", questions);
        let config = QaConfig::builder().max_questions(Some(4)).build().unwrap();
        assert!(req.validate(&config).is_err());

        let config = QaConfig::builder().max_questions(None).build().unwrap();
        assert!(req.validate(&config).is_ok());
    }

    #[test]
    fn empty_question_list_is_accepted() {
        let req = QaRequest::new("doc.pdf", vec![]);
        assert!(req.validate(&QaConfig::default()).is_ok());
    }

    #[test]
    fn deserialises_legacy_documents_field() {
        let req: QaRequest =
            serde_json::from_str(r#"{"documents":"https://x/doc.pdf","questions":["a"]}"#).unwrap();
        assert_eq!(req.document, "https://x/doc.pdf");
    }
}
