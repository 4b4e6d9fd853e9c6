//! AI tutor operations.

use learnx_core::GeneratedLesson;

use crate::client::LearnxClient;
use crate::error::ClientError;
use crate::request::ApiRequest;
use crate::types::{AskRequest, AskResponse, GenerateLessonRequest};

impl LearnxClient {
    /// Ask the tutoring assistant a free-form question. Rate limited
    /// server-side; hitting the limit surfaces as a server error with a
    /// `detail` message.
    pub async fn ask(&self, question: &str) -> Result<String, ClientError> {
        let request = ApiRequest::post("ai/ask/").json(&AskRequest {
            question: question.to_string(),
        })?;

        let response: AskResponse = self.execute(&request).await?;
        Ok(response.answer)
    }

    /// Generate a structured mini-lesson on a topic.
    pub async fn generate_lesson(&self, topic: &str) -> Result<GeneratedLesson, ClientError> {
        let request = ApiRequest::post("ai/generate-lesson/").json(&GenerateLessonRequest {
            topic: topic.to_string(),
        })?;

        self.execute(&request).await
    }
}
