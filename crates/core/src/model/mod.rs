pub mod chat;
mod course;
mod enrollment;
mod ids;
mod lesson;
mod progress;

pub use ids::{CourseId, EnrollmentId, LessonId, ParseIdError, UserId};

pub use chat::{ChatRole, ChatTurn, HISTORY_LIMIT};
pub use course::{Course, CourseDraft, CourseError, CourseLevel};
pub use enrollment::{EnrolledCourse, Enrollment};
pub use lesson::{CourseOutline, Lesson, LessonDraft, LessonError};
pub use progress::LessonProgress;
