//! Request payloads and wire-only response shapes.

use learnx_core::{CourseLevel, UserRole};
use serde::{Deserialize, Serialize};

/// Facet filters for browsing the course catalog. Unset fields do not
/// constrain the result.
#[derive(Debug, Clone, Default)]
pub struct CourseQuery {
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    pub language: Option<String>,
    pub min_rating: Option<f64>,
    pub max_price: Option<f64>,
    /// Free-text search over title, description, and tags.
    pub q: Option<String>,
}

impl CourseQuery {
    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(level) = self.level {
            params.push(("level", level.as_str().to_string()));
        }
        if let Some(language) = &self.language {
            params.push(("language", language.clone()));
        }
        if let Some(min_rating) = self.min_rating {
            params.push(("min_rating", min_rating.to_string()));
        }
        if let Some(max_price) = self.max_price {
            params.push(("max_price", max_price.to_string()));
        }
        if let Some(q) = &self.q {
            params.push(("q", q.clone()));
        }
        params
    }
}

/// Playback progress report for an enrolled course.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    pub lesson_id: i64,
    pub position_seconds: u32,
    pub progress_percent: f64,
}

/// Partial profile update. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

/// One selected choice in a quiz attempt submission.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuizAnswer {
    pub question_id: i64,
    pub choice_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenRefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenRefreshResponse {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LogoutRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewRequest {
    pub rating: u8,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct NoteRequest {
    pub timestamp_seconds: u32,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct DiscussionRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitQuizRequest {
    pub answers: Vec<QuizAnswer>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StartQuizResponse {
    pub attempt_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct AskRequest {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateLessonRequest {
    pub topic: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_query_emits_only_set_facets() {
        let query = CourseQuery {
            level: Some(CourseLevel::Advanced),
            max_price: Some(49.99),
            q: Some("rust".to_string()),
            ..CourseQuery::default()
        };

        assert_eq!(
            query.params(),
            vec![
                ("level", "advanced".to_string()),
                ("max_price", "49.99".to_string()),
                ("q", "rust".to_string()),
            ]
        );
        assert!(CourseQuery::default().params().is_empty());
    }

    #[test]
    fn profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            bio: Some("Rust instructor".to_string()),
            role: None,
        };

        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({"bio": "Rust instructor"}));
    }
}
