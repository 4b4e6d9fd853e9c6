//! Core types for the LearnX platform client.
//!
//! This crate carries the pieces shared by every LearnX frontend: the domain
//! model returned by the platform API, the token storage abstraction used by
//! the authenticated HTTP client, and the built-in storage backends.

pub mod errors;
pub mod store;
#[cfg(feature = "tracing")]
pub mod telemetry;
pub mod tokens;
pub mod types;

pub use errors::{Error, Result};
pub use store::{FileTokenStore, MemoryTokenStore};
pub use tokens::{TokenPair, TokenStore};
pub use types::{
    Choice, Course, CourseLevel, CourseType, Discussion, DiscussionReply, EnrolledCourse,
    Enrollment, GeneratedLesson, Lesson, LessonDetail, Note, Profile, Question, Quiz, QuizResult,
    QuizSummary, Review, User, UserRole,
};
