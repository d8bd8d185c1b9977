//! Performance dashboard endpoints

use super::{ApiClient, ClientError, segment};
use crate::types::{Leaderboard, Streak};
use reqwest::Method;
use serde_json::Value as JsonValue;

impl ApiClient {
    async fn user_report(&self, report: &str, user_id: &str) -> Result<JsonValue, ClientError> {
        let request = self.request(
            Method::GET,
            &format!("/responses/{report}/{}", segment(user_id)),
        );
        self.execute(request).await
    }

    /// Aggregated accuracy and timing per difficulty
    pub async fn dashboard_data(&self, user_id: &str) -> Result<JsonValue, ClientError> {
        self.user_report("dashboard_data", user_id).await
    }

    /// Accuracy over the user's recent quizzes
    pub async fn performance_graph(&self, user_id: &str) -> Result<JsonValue, ClientError> {
        self.user_report("performance_graph", user_id).await
    }

    pub async fn progress_insights(&self, user_id: &str) -> Result<JsonValue, ClientError> {
        self.user_report("progress_insights", user_id).await
    }

    /// The user's accuracy against the platform average
    pub async fn performance_comparison(&self, user_id: &str) -> Result<JsonValue, ClientError> {
        self.user_report("user_performance_comparison", user_id).await
    }

    pub async fn engagement_score(&self, user_id: &str) -> Result<JsonValue, ClientError> {
        self.user_report("engagement_score", user_id).await
    }

    /// Top users by latest accuracy
    pub async fn leaderboard(&self) -> Result<Leaderboard, ClientError> {
        let request = self.request(Method::GET, "/responses/leaderboard");
        self.execute(request).await
    }

    /// Current and longest daily quiz streak
    pub async fn user_streak(&self, user_id: &str) -> Result<Streak, ClientError> {
        let request = self.request(
            Method::GET,
            &format!("/responses/user_streak/{}", segment(user_id)),
        );
        self.execute(request).await
    }
}
