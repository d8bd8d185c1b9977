//! Request and response types exchanged with the BioMentor backend

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Answer options keyed by letter (`A`..`E`)
pub type Options = BTreeMap<String, String>;

/// Error body returned by the backend (`{"detail": ...}`)
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub detail: JsonValue,
}

impl ApiErrorBody {
    /// Human readable form of `detail`, which is either a string or a list of validation errors
    pub fn message(&self) -> String {
        match &self.detail {
            JsonValue::String(message) => message.clone(),
            JsonValue::Array(items) => items
                .iter()
                .map(|item| {
                    item.get("msg")
                        .and_then(JsonValue::as_str)
                        .map_or_else(|| item.to_string(), str::to_string)
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Login request
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Registration request
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub education_level: String,
}

/// Registration response
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: String,
}

/// Refresh exchange request, the refresh token travels in the body
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Refresh exchange response
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserExistsResponse {
    pub exists: bool,
}

// ---------------------------------------------------------------------------
// Quizzes
// ---------------------------------------------------------------------------

/// A generated multiple-choice question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question_text: String,
    #[serde(default)]
    pub option1: String,
    #[serde(default)]
    pub option2: String,
    #[serde(default)]
    pub option3: String,
    #[serde(default)]
    pub option4: String,
    #[serde(default)]
    pub option5: String,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

impl QuizQuestion {
    /// Options keyed by the letters the backend grades against
    pub fn options(&self) -> Options {
        ["A", "B", "C", "D", "E"]
            .into_iter()
            .zip([
                &self.option1,
                &self.option2,
                &self.option3,
                &self.option4,
                &self.option5,
            ])
            .filter(|(_, text)| !text.is_empty())
            .map(|(letter, text)| (letter.to_string(), text.clone()))
            .collect()
    }
}

/// Result of a quiz generation request
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQuiz {
    pub quiz_id: String,
    pub total_questions: u32,
    pub mcqs: Vec<QuizQuestion>,
    /// Set when generation stopped early; `mcqs` then holds the partial quiz
    #[serde(default)]
    pub error: Option<String>,
}

/// A quiz as stored by the backend
#[derive(Debug, Clone, Deserialize)]
pub struct StoredQuiz {
    pub quiz_id: String,
    pub user_id: String,
    pub questions: Vec<QuizQuestion>,
    #[serde(default)]
    pub created_at: Option<f64>,
}

/// One answer in a quiz submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub question_text: String,
    pub selected_answer: String,
    /// Seconds spent on the question
    pub time_taken: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQuizRequest {
    pub user_id: String,
    pub quiz_id: String,
    pub responses: Vec<QuizAnswer>,
}

/// A graded answer
#[derive(Debug, Clone, Deserialize)]
pub struct GradedResponse {
    pub question_text: String,
    pub selected_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    #[serde(default)]
    pub time_taken: Option<f64>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizSummary {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub accuracy: f64,
    pub total_time: f64,
    pub avg_time_per_question: f64,
}

/// A submitted, graded attempt
#[derive(Debug, Clone, Deserialize)]
pub struct QuizAttempt {
    pub user_id: String,
    pub quiz_id: String,
    /// Unix timestamp in seconds
    pub submitted_at: f64,
    pub attempt_number: u32,
    pub responses: Vec<GradedResponse>,
    pub summary: QuizSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttemptSummary {
    pub response_id: String,
    pub submitted_at: f64,
    pub attempt_number: u32,
    pub summary: QuizSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizHistoryEntry {
    pub quiz_id: String,
    pub attempts: Vec<AttemptSummary>,
}

/// Quiz history; an empty history comes back as a message only
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizHistory {
    #[serde(default)]
    pub quiz_history: Vec<QuizHistoryEntry>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreviousQuizResponse {
    pub has_previous_quiz: bool,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub name: String,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Leaderboard {
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Streak {
    pub streak: u32,
    pub longest_streak: u32,
}

// ---------------------------------------------------------------------------
// Topic (unit) quizzes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitQuestion {
    pub question_text: String,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitQuiz {
    pub quiz_id: String,
    pub questions: Vec<UnitQuestion>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitAnswer {
    pub question_text: String,
    pub selected_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitUnitQuizRequest {
    pub quiz_id: String,
    pub responses: Vec<UnitAnswer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitGradedResponse {
    pub question_text: String,
    pub selected_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitQuizSubmission {
    pub score: u32,
    pub total_questions: u32,
    pub responses: Vec<UnitGradedResponse>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitAttempt {
    pub quiz_id: String,
    pub submitted_at: String,
    pub score: u32,
    pub total_questions: u32,
}

/// Attempts grouped by unit name
pub type UnitQuizStatus = BTreeMap<String, Vec<UnitAttempt>>;

#[derive(Debug, Clone, Deserialize)]
pub struct UnitQuizResults {
    pub quiz_id: String,
    pub unit_name: String,
    pub submitted_at: String,
    pub correct_count: u32,
    pub total_questions: u32,
    pub responses: Vec<UnitGradedResponse>,
}

// ---------------------------------------------------------------------------
// Explanations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ExplainRequest {
    pub question: String,
    pub options: Options,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyAndExplainRequest {
    pub question: String,
    pub options: Options,
    pub claimed_answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_detail_string() {
        let body: ApiErrorBody =
            serde_json::from_value(json!({"detail": "Invalid email or password"})).unwrap();
        assert_eq!(body.message(), "Invalid email or password");
    }

    #[test]
    fn test_error_detail_validation_list() {
        let body: ApiErrorBody = serde_json::from_value(json!({
            "detail": [
                {"loc": ["body", "email"], "msg": "value is not a valid email address"},
                {"loc": ["body", "password"], "msg": "field required"}
            ]
        }))
        .unwrap();
        assert_eq!(
            body.message(),
            "value is not a valid email address; field required"
        );
    }

    #[test]
    fn test_question_options_skip_missing() {
        let question: QuizQuestion = serde_json::from_value(json!({
            "question_text": "Which organelle produces ATP?",
            "option1": "Mitochondria",
            "option2": "Ribosome",
            "option3": "Golgi apparatus",
            "option4": "Nucleus",
            "correct_answer": "A",
            "difficulty": "easy"
        }))
        .unwrap();

        let options = question.options();
        assert_eq!(options.len(), 4);
        assert_eq!(options["A"], "Mitochondria");
        assert!(!options.contains_key("E"));
    }

    #[test]
    fn test_empty_history_is_message_only() {
        let history: QuizHistory =
            serde_json::from_value(json!({"message": "No quiz attempts found."})).unwrap();
        assert!(history.quiz_history.is_empty());
        assert!(history.message.is_some());
    }
}
