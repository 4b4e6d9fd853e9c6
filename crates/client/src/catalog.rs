//! Course catalog, lessons, enrollment, and engagement operations.

use bytes::Bytes;

use learnx_core::{
    Course, Discussion, EnrolledCourse, Enrollment, Lesson, LessonDetail, Note, Review,
};

use crate::client::LearnxClient;
use crate::error::ClientError;
use crate::request::ApiRequest;
use crate::types::{CourseQuery, DiscussionRequest, NoteRequest, ProgressUpdate, ReviewRequest};

impl LearnxClient {
    /// Browse the catalog with the given facet filters.
    pub async fn courses(&self, query: &CourseQuery) -> Result<Vec<Course>, ClientError> {
        let mut request = ApiRequest::get("courses/");
        for (key, value) in query.params() {
            request = request.query(key, value);
        }
        self.execute(&request).await
    }

    pub async fn course(&self, course_id: i64) -> Result<Course, ClientError> {
        self.execute(&ApiRequest::get(format!("courses/{course_id}/")))
            .await
    }

    /// Up to six other courses from the same category.
    pub async fn related_courses(&self, course_id: i64) -> Result<Vec<Course>, ClientError> {
        self.execute(&ApiRequest::get(format!("courses/{course_id}/related/")))
            .await
    }

    /// The authenticated user's enrolled courses with resume state.
    pub async fn enrolled_courses(&self) -> Result<Vec<EnrolledCourse>, ClientError> {
        self.execute(&ApiRequest::get("courses/enrolled/")).await
    }

    /// Courses opened recently in this server session, most recent first.
    pub async fn recently_viewed(&self) -> Result<Vec<Course>, ClientError> {
        self.execute(&ApiRequest::get("courses/recently_viewed/"))
            .await
    }

    pub async fn lessons(&self, course_id: i64) -> Result<Vec<Lesson>, ClientError> {
        self.execute(&ApiRequest::get(format!("courses/{course_id}/lessons/")))
            .await
    }

    /// One lesson, with the neighboring lesson ids for player navigation.
    pub async fn lesson(
        &self,
        course_id: i64,
        lesson_id: i64,
    ) -> Result<LessonDetail, ClientError> {
        self.execute(&ApiRequest::get(format!(
            "courses/{course_id}/lessons/{lesson_id}/"
        )))
        .await
    }

    /// Enroll the authenticated user. Enrolling twice is harmless; the
    /// server returns the existing record.
    pub async fn enroll(&self, course_id: i64) -> Result<Enrollment, ClientError> {
        self.execute(&ApiRequest::post(format!("courses/{course_id}/enroll/")))
            .await
    }

    pub async fn unenroll(&self, course_id: i64) -> Result<(), ClientError> {
        self.execute_empty(&ApiRequest::delete(format!("courses/{course_id}/enroll/")))
            .await
    }

    /// The authenticated user's enrollment in one course, or `None` when
    /// not enrolled.
    pub async fn enrollment(&self, course_id: i64) -> Result<Option<Enrollment>, ClientError> {
        let value: serde_json::Value = self
            .execute(&ApiRequest::get(format!("courses/{course_id}/enrollment/")))
            .await?;

        // The endpoint answers {"enrolled": false} when there is no record,
        // or the record itself with an "enrolled": true marker mixed in
        if value.get("enrolled").and_then(serde_json::Value::as_bool) == Some(true) {
            Ok(Some(serde_json::from_value(value)?))
        } else {
            Ok(None)
        }
    }

    /// Record playback progress against an enrolled course.
    pub async fn update_progress(
        &self,
        course_id: i64,
        progress: &ProgressUpdate,
    ) -> Result<Enrollment, ClientError> {
        let request =
            ApiRequest::post(format!("courses/{course_id}/progress/")).json(progress)?;
        self.execute(&request).await
    }

    pub async fn reviews(&self, course_id: i64) -> Result<Vec<Review>, ClientError> {
        self.execute(&ApiRequest::get(format!("courses/{course_id}/reviews/")))
            .await
    }

    /// Create or replace the authenticated user's review. `rating` must be
    /// between 1 and 5; the server rejects anything else.
    pub async fn submit_review(
        &self,
        course_id: i64,
        rating: u8,
        text: &str,
    ) -> Result<Review, ClientError> {
        let request =
            ApiRequest::post(format!("courses/{course_id}/reviews/")).json(&ReviewRequest {
                rating,
                text: text.to_string(),
            })?;
        self.execute(&request).await
    }

    /// The authenticated user's notes on one lesson, in timestamp order.
    pub async fn notes(&self, course_id: i64, lesson_id: i64) -> Result<Vec<Note>, ClientError> {
        self.execute(&ApiRequest::get(format!(
            "courses/{course_id}/lessons/{lesson_id}/notes/"
        )))
        .await
    }

    /// Attach a note to a point in a lesson's video.
    pub async fn add_note(
        &self,
        course_id: i64,
        lesson_id: i64,
        timestamp_seconds: u32,
        text: &str,
    ) -> Result<Note, ClientError> {
        let request = ApiRequest::post(format!(
            "courses/{course_id}/lessons/{lesson_id}/notes/"
        ))
        .json(&NoteRequest {
            timestamp_seconds,
            text: text.to_string(),
        })?;
        self.execute(&request).await
    }

    /// Top-level discussion threads on one lesson, newest first, replies
    /// nested.
    pub async fn discussions(
        &self,
        course_id: i64,
        lesson_id: i64,
    ) -> Result<Vec<Discussion>, ClientError> {
        self.execute(&ApiRequest::get(format!(
            "courses/{course_id}/lessons/{lesson_id}/discussions/"
        )))
        .await
    }

    /// Post to a lesson discussion; pass `parent` to reply to a thread.
    pub async fn post_discussion(
        &self,
        course_id: i64,
        lesson_id: i64,
        text: &str,
        parent: Option<i64>,
    ) -> Result<Discussion, ClientError> {
        let request = ApiRequest::post(format!(
            "courses/{course_id}/lessons/{lesson_id}/discussions/"
        ))
        .json(&DiscussionRequest {
            text: text.to_string(),
            parent,
        })?;
        self.execute(&request).await
    }

    /// The completion certificate as PDF bytes. The server requires 100%
    /// progress and answers 403 below that.
    pub async fn certificate(&self, course_id: i64) -> Result<Bytes, ClientError> {
        self.execute_raw(&ApiRequest::get(format!(
            "courses/{course_id}/certificate/"
        )))
        .await
    }
}
