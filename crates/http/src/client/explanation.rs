//! Answer explanations

use super::{ApiClient, ClientError};
use crate::types::{ExplainRequest, Options, VerifyAndExplainRequest};
use reqwest::Method;
use serde_json::Value as JsonValue;

impl ApiClient {
    /// Explain the answer to a question
    pub async fn explain(
        &self,
        question: &str,
        options: Options,
    ) -> Result<JsonValue, ClientError> {
        let request = self
            .request(Method::POST, "/explanations/mcq/explain_only")
            .json(&ExplainRequest {
                question: question.to_string(),
                options,
            });
        self.execute(request).await
    }

    /// Check a claimed answer and explain the verdict
    pub async fn verify_and_explain(
        &self,
        question: &str,
        options: Options,
        claimed_answer: &str,
    ) -> Result<JsonValue, ClientError> {
        let request = self
            .request(Method::POST, "/explanations/mcq/verify_and_explain")
            .json(&VerifyAndExplainRequest {
                question: question.to_string(),
                options,
                claimed_answer: claimed_answer.to_string(),
            });
        self.execute(request).await
    }
}
