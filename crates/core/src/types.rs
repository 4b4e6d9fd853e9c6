use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Instructor,
}

/// Extended account data served by `auth/profile/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub bio: String,
    pub avatar: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    /// Wire value, as used by the catalog filter parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CourseType {
    #[default]
    Recorded,
    Ai,
}

/// A catalog course, with its lessons embedded.
///
/// `price` is a decimal carried as a string on the wire; `tags` is the raw
/// comma-separated tag field, see [`Course::tag_list`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub instructor: Option<String>,
    pub category: String,
    pub level: CourseLevel,
    pub language: String,
    pub price: String,
    pub rating_avg: f64,
    pub rating_count: u32,
    pub tags: String,
    pub trailer_video_url: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(rename = "type")]
    pub course_type: CourseType,
    pub lessons: Vec<Lesson>,
}

impl Course {
    /// Individual tags, with surrounding whitespace and empty entries removed.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub title: String,
    pub video_url: Option<String>,
    pub content: Option<String>,
    pub transcript: Option<String>,
    pub duration_seconds: u32,
    pub order: u32,
}

/// A lesson as served by the player endpoint, with navigation ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonDetail {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub next_lesson_id: Option<i64>,
    pub prev_lesson_id: Option<i64>,
}

/// Per-user enrollment record for one course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub course: i64,
    pub created_at: DateTime<Utc>,
    pub progress_percent: f64,
    pub last_lesson: Option<i64>,
    pub last_position_seconds: u32,
}

impl Enrollment {
    /// Whether the course counts as completed (certificate eligibility).
    pub fn completed(&self) -> bool {
        self.progress_percent >= 100.0
    }
}

/// Dashboard row: one enrolled course with resume state flattened in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrolledCourse {
    pub id: i64,
    pub title: String,
    pub thumbnail: Option<String>,
    pub level: CourseLevel,
    #[serde(rename = "type")]
    pub course_type: CourseType,
    pub progress_percent: f64,
    pub last_position_seconds: u32,
    pub last_lesson_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user: i64,
    pub user_name: String,
    pub course: i64,
    pub rating: u8,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A timestamped note a user keeps against one lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub lesson: i64,
    pub timestamp_seconds: u32,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Top-level discussion entry on a lesson, with its replies nested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discussion {
    pub id: i64,
    pub user: i64,
    pub user_name: String,
    pub lesson: i64,
    pub text: String,
    pub parent: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<DiscussionReply>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscussionReply {
    pub id: i64,
    pub user_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Quiz as listed, without questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub time_limit_minutes: Option<u32>,
    pub questions_count: u32,
}

/// Full quiz with questions and choices, as served to a taker.
///
/// Choices never reveal which one is correct; grading happens server-side
/// on attempt submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub time_limit_minutes: Option<u32>,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub order: u32,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub id: i64,
    pub text: String,
}

/// Grading outcome of a submitted quiz attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuizResult {
    pub score: f64,
    pub correct: u32,
    pub total: u32,
}

/// Output of the AI lesson generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedLesson {
    pub title: String,
    pub transcript: String,
    pub video_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_list_splits_and_trims() {
        let course: Course = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Rust from Zero",
            "description": "Systems programming",
            "instructor": "Ada",
            "category": "programming",
            "level": "beginner",
            "language": "English",
            "price": "49.99",
            "rating_avg": 4.5,
            "rating_count": 12,
            "tags": "rust, systems , ,backend",
            "trailer_video_url": null,
            "thumbnail": null,
            "type": "recorded",
            "lessons": []
        }))
        .expect("course fixture");

        assert_eq!(course.tag_list(), vec!["rust", "systems", "backend"]);
        assert_eq!(course.level, CourseLevel::Beginner);
        assert_eq!(course.course_type, CourseType::Recorded);
    }

    #[test]
    fn lesson_detail_flattens_lesson_fields() {
        let detail: LessonDetail = serde_json::from_value(serde_json::json!({
            "id": 7,
            "title": "Ownership",
            "video_url": "https://cdn.learnx.app/lessons/7.mp4",
            "content": null,
            "transcript": "Moves and borrows.",
            "duration_seconds": 480,
            "order": 2,
            "next_lesson_id": 8,
            "prev_lesson_id": 6
        }))
        .expect("lesson detail fixture");

        assert_eq!(detail.lesson.id, 7);
        assert_eq!(detail.lesson.order, 2);
        assert_eq!(detail.next_lesson_id, Some(8));
    }

    #[test]
    fn enrollment_completed_at_full_progress() {
        let enrollment: Enrollment = serde_json::from_value(serde_json::json!({
            "id": 3,
            "course": 1,
            "created_at": "2026-01-10T09:00:00Z",
            "progress_percent": 100.0,
            "last_lesson": 9,
            "last_position_seconds": 0
        }))
        .expect("enrollment fixture");

        assert!(enrollment.completed());
    }
}
