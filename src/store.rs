//! Read port consumed by the engine.
//!
//! The engine never writes catalog or ledger data. Everything it needs is
//! behind [`ProgressStore`], which [`crate::db::Database`] implements and tests
//! can replace with a failing double.

use anyhow::Result;
use uuid::Uuid;

use crate::models::{CompletedAssignment, Course, CourseOutline, Student, TeamLeader};

pub trait ProgressStore: Send + Sync {
    fn course_by_slug(&self, slug: &str) -> Result<Option<Course>>;

    fn course_by_id(&self, id: Uuid) -> Result<Option<Course>>;

    /// Modules ascending by order index, each with its lessons ascending.
    fn course_outline(&self, course: Course) -> Result<CourseOutline>;

    /// Ledger rows for `student_id` on lessons belonging to `course_id`.
    fn completions_in_course(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<CompletedAssignment>>;

    fn student(&self, id: Uuid) -> Result<Option<Student>>;

    fn team_leader(&self, id: Uuid) -> Result<Option<TeamLeader>>;

    fn enrolled_courses(&self, student_id: Uuid) -> Result<Vec<Course>>;

    fn agents_of(&self, team_leader_id: Uuid) -> Result<Vec<Student>>;
}
