//! Quiz and graded-attempt operations.

use learnx_core::{Quiz, QuizResult, QuizSummary};

use crate::client::LearnxClient;
use crate::error::ClientError;
use crate::request::ApiRequest;
use crate::types::{QuizAnswer, StartQuizResponse, SubmitQuizRequest};

impl LearnxClient {
    pub async fn quizzes(&self) -> Result<Vec<QuizSummary>, ClientError> {
        self.execute(&ApiRequest::get("quizzes/")).await
    }

    /// One quiz with its questions and choices. Correct answers are never
    /// part of the payload; grading happens server-side.
    pub async fn quiz(&self, quiz_id: i64) -> Result<Quiz, ClientError> {
        self.execute(&ApiRequest::get(format!("quizzes/{quiz_id}/")))
            .await
    }

    /// Open a graded attempt, returning its id.
    pub async fn start_quiz(&self, quiz_id: i64) -> Result<i64, ClientError> {
        let response: StartQuizResponse = self
            .execute(&ApiRequest::post(format!("quizzes/{quiz_id}/start/")))
            .await?;
        Ok(response.attempt_id)
    }

    /// Submit the selected choices for grading. Each attempt can be
    /// submitted once; the server rejects a second submission.
    pub async fn submit_quiz(
        &self,
        attempt_id: i64,
        answers: &[QuizAnswer],
    ) -> Result<QuizResult, ClientError> {
        let request = ApiRequest::post(format!("quizzes/attempt/{attempt_id}/submit/")).json(
            &SubmitQuizRequest {
                answers: answers.to_vec(),
            },
        )?;
        self.execute(&request).await
    }
}
