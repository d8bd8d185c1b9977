//! Quiz generation and submission

use super::{ApiClient, ClientError, segment};
use crate::types::{
    GeneratedQuiz, PreviousQuizResponse, QuizAttempt, QuizHistory, StoredQuiz, SubmitQuizRequest,
};
use reqwest::Method;

impl ApiClient {
    /// Generate a fresh quiz across all difficulty levels
    pub async fn generate_quiz(&self, user_id: &str) -> Result<GeneratedQuiz, ClientError> {
        let request = self.request(
            Method::GET,
            &format!("/mcqs/generate_mcqs/{}", segment(user_id)),
        );
        self.execute(request).await
    }

    /// Generate a quiz tuned to the user's estimated ability
    pub async fn generate_adaptive_quiz(
        &self,
        user_id: &str,
        question_count: u32,
    ) -> Result<GeneratedQuiz, ClientError> {
        let request = self.request(
            Method::GET,
            &format!(
                "/quiz/generate_adaptive_mcqs/{}/{question_count}",
                segment(user_id)
            ),
        );
        self.execute(request).await
    }

    /// Fetch a stored quiz with its questions
    pub async fn get_quiz(&self, quiz_id: &str) -> Result<StoredQuiz, ClientError> {
        let request = self.request(
            Method::GET,
            &format!("/mcqs/get_quiz/{}", segment(quiz_id)),
        );
        self.execute(request).await
    }

    /// Submit answers for grading
    pub async fn submit_quiz(
        &self,
        submission: &SubmitQuizRequest,
    ) -> Result<QuizAttempt, ClientError> {
        let request = self
            .request(Method::POST, "/responses/submit_quiz/")
            .json(submission);
        self.execute(request).await
    }

    /// All attempts the user has made, grouped by quiz
    pub async fn quiz_history(&self, user_id: &str) -> Result<QuizHistory, ClientError> {
        let request = self.request(
            Method::GET,
            &format!("/responses/user_quiz_history/{}", segment(user_id)),
        );
        self.execute(request).await
    }

    /// Full results of one attempt
    pub async fn attempt_results(
        &self,
        user_id: &str,
        quiz_id: &str,
        attempt_number: u32,
    ) -> Result<QuizAttempt, ClientError> {
        let request = self.request(
            Method::GET,
            &format!(
                "/responses/quiz_attempt_results/{}/{}/{attempt_number}",
                segment(user_id),
                segment(quiz_id)
            ),
        );
        self.execute(request).await
    }

    /// Whether the user has generated any quiz before
    pub async fn has_previous_quiz(&self, user_id: &str) -> Result<bool, ClientError> {
        let request = self.request(
            Method::GET,
            &format!("/responses/users/{}/has_previous_quiz", segment(user_id)),
        );
        let response: PreviousQuizResponse = self.execute(request).await?;
        Ok(response.has_previous_quiz)
    }
}
