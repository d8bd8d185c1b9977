//! Topic-based (per unit) quizzes

use super::{ApiClient, ClientError, segment};
use crate::types::{
    SubmitUnitQuizRequest, UnitQuiz, UnitQuizResults, UnitQuizStatus, UnitQuizSubmission,
};
use reqwest::Method;

/// Question count used by the backend when none is given
pub const DEFAULT_UNIT_QUESTION_COUNT: u32 = 10;

impl ApiClient {
    /// Draw a quiz from one syllabus unit
    ///
    /// The backend accepts between 1 and 100 questions.
    pub async fn generate_unit_quiz(
        &self,
        user_id: &str,
        unit: &str,
        question_count: u32,
    ) -> Result<UnitQuiz, ClientError> {
        if !(1..=100).contains(&question_count) {
            return Err(ClientError::Validation(format!(
                "question count must be between 1 and 100, got {question_count}"
            )));
        }
        let request = self
            .request(
                Method::GET,
                &format!("/topic/unit_quiz/generate/{}", segment(user_id)),
            )
            .query(&[
                ("unit", unit.to_string()),
                ("question_count", question_count.to_string()),
            ]);
        self.execute(request).await
    }

    pub async fn submit_unit_quiz(
        &self,
        user_id: &str,
        submission: &SubmitUnitQuizRequest,
    ) -> Result<UnitQuizSubmission, ClientError> {
        let request = self
            .request(
                Method::POST,
                &format!("/topic/quiz/submit/{}", segment(user_id)),
            )
            .json(submission);
        self.execute(request).await
    }

    /// Completed attempts grouped by unit
    pub async fn unit_quiz_status(&self, user_id: &str) -> Result<UnitQuizStatus, ClientError> {
        let request = self.request(
            Method::GET,
            &format!("/topic/unit_quiz/status/{}", segment(user_id)),
        );
        self.execute(request).await
    }

    pub async fn unit_quiz_results(&self, quiz_id: &str) -> Result<UnitQuizResults, ClientError> {
        let request = self.request(
            Method::GET,
            &format!("/topic/unit_quiz/results/{}", segment(quiz_id)),
        );
        self.execute(request).await
    }
}
